//! Application builder.
//!
//! Assembles routes, middleware and state into an Axum router.

use crate::{
    config::ApiConfig,
    middleware::{logging_middleware, request_id_middleware},
    routes,
    state::AppState,
};
use axum::{extract::DefaultBodyLimit, http::HeaderValue, middleware, Router};
use expert_roster_common::AppConfig;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build state from settings and assemble the router
pub async fn create_app(settings: &AppConfig, config: &ApiConfig) -> anyhow::Result<Router> {
    let state = AppState::from_settings(settings).await?;
    Ok(build_router(state, config))
}

/// Assemble the router around an existing state
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    let mut app = Router::new()
        // Health check routes
        .merge(routes::health::routes())
        // API v1 routes
        .nest("/api/v1", routes::v1::routes())
        .with_state(state);

    if config.enable_swagger {
        app = app.merge(swagger_ui());
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(build_cors_layer(config))
            .layer(TimeoutLayer::new(config.request_timeout()))
            .layer(DefaultBodyLimit::max(config.max_body_size))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(middleware::from_fn(logging_middleware)),
    )
}

/// Build CORS layer from configuration
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// OpenAPI document for the public endpoints
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Expert Roster API",
        version = "1.0.0",
        description = "Registration and management of expert profiles",
        license(name = "MIT"),
    ),
    paths(
        routes::health::health,
        routes::health::ready,
        routes::v1::experts::list_experts,
        routes::v1::experts::register_expert,
        routes::v1::experts::validate_step,
        routes::v1::experts::get_expert,
        routes::v1::experts::update_expert,
        routes::v1::experts::update_details,
        routes::v1::experts::replace_relation,
        routes::v1::experts::review_expert,
        routes::v1::experts::delete_expert,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::health::ReadinessResponse,
        routes::health::ReadinessChecks,
        routes::v1::experts::ValidateStepRequest,
        routes::v1::experts::ValidateStepResponse,
        routes::v1::experts::UpdateDetailsRequest,
        routes::v1::experts::ReviewRequest,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "experts", description = "Expert registration and profile management"),
    )
)]
pub struct ApiDoc;

fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
