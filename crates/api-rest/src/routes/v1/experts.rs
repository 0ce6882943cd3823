//! Expert registration and profile management endpoints.

use crate::{
    error::{ApiError, ApiResult},
    extractors::{JsonBody, ListQuery, ValidatedJson},
    middleware::request_id::current_request_id,
    responses::{ApiResponse, Created, NoContent, PaginatedResponse},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use expert_roster_application::{validate_paths, ServiceContext, Step};
use expert_roster_domain::{
    ChildRows, ExpertSubmission, Profile, ProfileId, ProfileSummary, Relation, ReviewStatus,
    ScalarUpdate, SubmissionError,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Step gating request for clients that keep the draft themselves
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateStepRequest {
    /// Wizard step number, 1 to 6
    pub step: u8,

    /// The whole draft; only the step's fields are checked
    #[schema(value_type = Object)]
    pub submission: ExpertSubmission,
}

/// Step gating result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateStepResponse {
    /// The step that was checked
    pub step: u8,

    /// Step the wizard may advance to
    pub next_step: u8,
}

/// Quick edit of identity fields
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsRequest {
    /// Display name
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    /// Contact email, unique across experts
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// New bio; the current one is kept when absent
    pub bio: Option<String>,
}

impl From<UpdateDetailsRequest> for ScalarUpdate {
    fn from(req: UpdateDetailsRequest) -> Self {
        Self {
            full_name: req.full_name,
            email: req.email,
            bio: req.bio,
        }
    }
}

/// Review decision
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// New review status (pending, in_review, approved, rejected, more_info_needed)
    #[schema(value_type = String)]
    pub status: ReviewStatus,
}

/// Expert routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/experts", get(list_experts).post(register_expert))
        .route("/experts/validate", post(validate_step))
        .route(
            "/experts/:id",
            get(get_expert)
                .put(update_expert)
                .patch(update_details)
                .delete(delete_expert),
        )
        .route("/experts/:id/relations/:relation", put(replace_relation))
        .route("/experts/:id/review", post(review_expert))
}

fn service_context() -> ServiceContext {
    ServiceContext::new(current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string()))
}

fn parse_id(id: &str) -> ApiResult<ProfileId> {
    id.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid expert id: {}", id)))
}

/// List experts
///
/// Case-insensitive search over name and email, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/experts",
    tag = "experts",
    params(
        ("search" = Option<String>, Query, description = "Text contained in name or email"),
        ("page" = Option<u32>, Query, description = "Page number (1-indexed)"),
        ("per_page" = Option<u32>, Query, description = "Items per page (max 100, configured default when absent)"),
    ),
    responses(
        (status = 200, description = "Page of experts"),
        (status = 400, description = "Invalid pagination"),
    )
)]
pub async fn list_experts(
    State(state): State<AppState>,
    query: ListQuery,
) -> ApiResult<Json<PaginatedResponse<ProfileSummary>>> {
    let ctx = service_context();

    let page = state
        .profiles
        .list(&ctx, query.search.as_deref(), query.page, query.per_page)
        .await?;

    Ok(Json(page.into()))
}

/// Register an expert
///
/// Validates the whole submission and stores the profile with all of its
/// child collections in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/experts",
    tag = "experts",
    responses(
        (status = 201, description = "Expert registered"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation failed"),
        (status = 503, description = "Profile could not be saved"),
    )
)]
pub async fn register_expert(
    State(state): State<AppState>,
    JsonBody(submission): JsonBody<ExpertSubmission>,
) -> ApiResult<Created<Profile>> {
    let ctx = service_context();
    let profile = state.profiles.submit(&ctx, submission).await?;
    Ok(Created::at(format!("/api/v1/experts/{}", profile.id), profile))
}

/// Check one wizard step
///
/// Returns the step's field errors, or the step the wizard may advance to.
#[utoipa::path(
    post,
    path = "/api/v1/experts/validate",
    tag = "experts",
    request_body = ValidateStepRequest,
    responses(
        (status = 200, description = "Step is valid", body = ValidateStepResponse),
        (status = 400, description = "Unknown step"),
        (status = 422, description = "Step has field errors"),
    )
)]
pub async fn validate_step(
    JsonBody(req): JsonBody<ValidateStepRequest>,
) -> ApiResult<Json<ApiResponse<ValidateStepResponse>>> {
    let step = Step::from_number(req.step)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown step: {}", req.step)))?;

    validate_paths(&req.submission, step.field_paths()).map_err(SubmissionError::Validation)?;

    Ok(Json(ApiResponse::success_with_message(
        ValidateStepResponse {
            step: step.number(),
            next_step: step.next().number(),
        },
        step.title(),
    )))
}

/// Get an expert
#[utoipa::path(
    get,
    path = "/api/v1/experts/{id}",
    tag = "experts",
    params(("id" = String, Path, description = "Expert ID")),
    responses(
        (status = 200, description = "Expert with all child collections"),
        (status = 404, description = "Expert not found"),
    )
)]
pub async fn get_expert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let ctx = service_context();
    let profile = state.profiles.get(&ctx, parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Replace an expert's profile
///
/// Overwrites the scalar fields and replaces all seven child collections.
#[utoipa::path(
    put,
    path = "/api/v1/experts/{id}",
    tag = "experts",
    params(("id" = String, Path, description = "Expert ID")),
    responses(
        (status = 200, description = "Expert updated"),
        (status = 404, description = "Expert not found"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn update_expert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(submission): JsonBody<ExpertSubmission>,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let ctx = service_context();
    let profile = state
        .profiles
        .update(&ctx, parse_id(&id)?, submission)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Edit name, email and bio
#[utoipa::path(
    patch,
    path = "/api/v1/experts/{id}",
    tag = "experts",
    params(("id" = String, Path, description = "Expert ID")),
    request_body = UpdateDetailsRequest,
    responses(
        (status = 200, description = "Expert updated"),
        (status = 404, description = "Expert not found"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn update_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateDetailsRequest>,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let ctx = service_context();
    let profile = state
        .profiles
        .update_scalar_fields(&ctx, parse_id(&id)?, req.into())
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Replace one child collection
///
/// The body is the full new list of rows; existing rows are discarded.
#[utoipa::path(
    put,
    path = "/api/v1/experts/{id}/relations/{relation}",
    tag = "experts",
    params(
        ("id" = String, Path, description = "Expert ID"),
        ("relation" = String, Path, description = "skills, languages, experiences, education, certifications, publications or references"),
    ),
    responses(
        (status = 200, description = "Collection replaced"),
        (status = 400, description = "Unknown relation or malformed rows"),
        (status = 404, description = "Expert not found"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn replace_relation(
    State(state): State<AppState>,
    Path((id, relation)): Path<(String, String)>,
    JsonBody(rows): JsonBody<serde_json::Value>,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let ctx = service_context();
    let id = parse_id(&id)?;
    let relation: Relation = relation
        .parse()
        .map_err(|e: expert_roster_domain::ParseError| ApiError::BadRequest(e.to_string()))?;
    let rows = ChildRows::from_json(relation, rows)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} rows: {}", relation, e)))?;

    let profile = state.profiles.replace_children(&ctx, id, rows).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Review an expert
///
/// Approval also marks the expert verified.
#[utoipa::path(
    post,
    path = "/api/v1/experts/{id}/review",
    tag = "experts",
    params(("id" = String, Path, description = "Expert ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review status recorded"),
        (status = 404, description = "Expert not found"),
    )
)]
pub async fn review_expert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ReviewRequest>,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let ctx = service_context();
    let profile = state
        .profiles
        .review(&ctx, parse_id(&id)?, req.status)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Delete an expert
#[utoipa::path(
    delete,
    path = "/api/v1/experts/{id}",
    tag = "experts",
    params(("id" = String, Path, description = "Expert ID")),
    responses(
        (status = 204, description = "Expert deleted"),
        (status = 404, description = "Expert not found"),
    )
)]
pub async fn delete_expert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<NoContent> {
    let ctx = service_context();
    state.profiles.delete(&ctx, parse_id(&id)?).await?;
    Ok(NoContent)
}
