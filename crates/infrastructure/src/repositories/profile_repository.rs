//! Profile repository implementation.
//!
//! PostgreSQL-backed profile store. The parent record lives in
//! `expert_profiles`; each child collection has its own table keyed by
//! `profile_id` and ordered by `sort_order`.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::{debug, instrument};
use uuid::Uuid;

use expert_roster_application::{ApplicationError, ApplicationResult, ProfileStore, ProfileUnitOfWork};
use expert_roster_common::PaginationParams;
use expert_roster_domain::{
    Certification, ChildRows, Education, Experience, Language, ParseError, Profile, ProfileFields,
    ProfileId, ProfileSummary, Publication, Record, RecordId, Reference, Relation, ReviewStatus,
    Skill,
};

use crate::database::ping;
use crate::{Error, Result};

const SUMMARY_COLUMNS: &str = r#"
    id, full_name, email, country, region, expertise_areas,
    years_experience, review_status, is_verified, created_at
"#;

/// PostgreSQL implementation of [`ProfileStore`].
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Create a new PostgreSQL profile store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read the parent row and, when asked, every child collection from one
    /// snapshot, so a concurrent replace is seen either fully or not at all.
    async fn load_profile(&self, id: ProfileId, include_relations: bool) -> Result<Option<Profile>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let row = sqlx::query(
            r#"
            SELECT
                id, full_name, email, bio, country, region, expertise_areas,
                years_experience, review_status, is_verified, created_at, updated_at
            FROM expert_profiles
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut profile = row_to_profile(&row)?;
        if include_relations {
            load_children(&mut tx, &mut profile).await?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(Some(profile))
    }
}

async fn load_children(tx: &mut Transaction<'_, Postgres>, profile: &mut Profile) -> Result<()> {
    let id = profile.id;
    profile.skills = records(child_rows(tx, Relation::Skills, id).await?, row_to_skill)?;
    profile.languages = records(child_rows(tx, Relation::Languages, id).await?, row_to_language)?;
    profile.experiences =
        records(child_rows(tx, Relation::Experiences, id).await?, row_to_experience)?;
    profile.education = records(child_rows(tx, Relation::Education, id).await?, row_to_education)?;
    profile.certifications = records(
        child_rows(tx, Relation::Certifications, id).await?,
        row_to_certification,
    )?;
    profile.publications =
        records(child_rows(tx, Relation::Publications, id).await?, row_to_publication)?;
    profile.references =
        records(child_rows(tx, Relation::References, id).await?, row_to_reference)?;
    Ok(())
}

async fn child_rows(
    tx: &mut Transaction<'_, Postgres>,
    relation: Relation,
    id: ProfileId,
) -> Result<Vec<PgRow>> {
    let sql = format!(
        "SELECT * FROM {} WHERE profile_id = $1 ORDER BY sort_order",
        relation.table()
    );

    sqlx::query(&sql)
        .bind(id.as_uuid())
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    type UnitOfWork = PgUnitOfWork;

    async fn begin(&self) -> ApplicationResult<PgUnitOfWork> {
        let tx = self.pool.begin().await.map_err(Error::Database)?;
        Ok(PgUnitOfWork { tx })
    }

    #[instrument(skip(self, email))]
    async fn find_unique_by_email(&self, email: &str) -> ApplicationResult<Option<ProfileSummary>> {
        let sql = format!(
            "SELECT {} FROM expert_profiles WHERE LOWER(email) = LOWER($1)",
            SUMMARY_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|row| row_to_summary(&row)).transpose()?)
    }

    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        id: ProfileId,
        include_relations: bool,
    ) -> ApplicationResult<Option<Profile>> {
        Ok(self.load_profile(id, include_relations).await?)
    }

    #[instrument(skip(self))]
    async fn list_paged(
        &self,
        search: Option<&str>,
        pagination: &PaginationParams,
    ) -> ApplicationResult<(Vec<ProfileSummary>, u64)> {
        let pattern = search.map(like_pattern);
        let where_clause = if pattern.is_some() {
            "WHERE full_name ILIKE $1 OR email ILIKE $1"
        } else {
            ""
        };

        let count_sql = format!("SELECT COUNT(*) FROM expert_profiles {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(pattern) = pattern.as_deref() {
            count_query = count_query.bind(pattern);
        }

        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let list_sql = format!(
            r#"
            SELECT {}
            FROM expert_profiles
            {}
            ORDER BY created_at DESC, id DESC
            LIMIT {} OFFSET {}
            "#,
            SUMMARY_COLUMNS,
            where_clause,
            pagination.limit(),
            pagination.offset()
        );

        let mut list_query = sqlx::query(&list_sql);
        if let Some(pattern) = pattern.as_deref() {
            list_query = list_query.bind(pattern);
        }

        let rows = list_query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let items = rows
            .iter()
            .map(row_to_summary)
            .collect::<Result<Vec<_>>>()?;

        Ok((items, total.max(0) as u64))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProfileId) -> ApplicationResult<bool> {
        // Child rows go with the parent via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM expert_profiles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        ping(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| ApplicationError::ServiceUnavailable(e.to_string()))
    }
}

/// One database transaction. Dropping it without commit rolls back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl PgUnitOfWork {
    async fn touch(&mut self, id: ProfileId) -> Result<bool> {
        let result = sqlx::query("UPDATE expert_profiles SET updated_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(Utc::now())
            .execute(&mut *self.tx)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_rows(&mut self, profile_id: ProfileId, rows: &ChildRows) -> Result<()> {
        let owner = *profile_id.as_uuid();
        let mut builder: QueryBuilder<Postgres> = match rows {
            ChildRows::Skills(skills) => {
                let mut builder = QueryBuilder::new(
                    "INSERT INTO profile_skills \
                     (id, profile_id, sort_order, name, category, level, endorsements) ",
                );
                builder.push_values(skills.iter().enumerate(), |mut b, (i, skill)| {
                    b.push_bind(Uuid::now_v7())
                        .push_bind(owner)
                        .push_bind(i as i32)
                        .push_bind(skill.name.clone())
                        .push_bind(skill.category.clone())
                        .push_bind(skill.level.map(|level| level.as_str()))
                        .push_bind(skill.endorsements as i32);
                });
                builder
            }
            ChildRows::Languages(languages) => {
                let mut builder = QueryBuilder::new(
                    "INSERT INTO profile_languages (id, profile_id, sort_order, name, proficiency) ",
                );
                builder.push_values(languages.iter().enumerate(), |mut b, (i, language)| {
                    b.push_bind(Uuid::now_v7())
                        .push_bind(owner)
                        .push_bind(i as i32)
                        .push_bind(language.name.clone())
                        .push_bind(language.proficiency.map(|p| p.as_str()));
                });
                builder
            }
            ChildRows::Experiences(experiences) => {
                let mut builder = QueryBuilder::new(
                    "INSERT INTO profile_experiences \
                     (id, profile_id, sort_order, role, organization, location, \
                      start_date, end_date, current, description, skills) ",
                );
                builder.push_values(experiences.iter().enumerate(), |mut b, (i, exp)| {
                    b.push_bind(Uuid::now_v7())
                        .push_bind(owner)
                        .push_bind(i as i32)
                        .push_bind(exp.role.clone())
                        .push_bind(exp.organization.clone())
                        .push_bind(exp.location.clone())
                        .push_bind(exp.start_date)
                        .push_bind(exp.end_date)
                        .push_bind(exp.current)
                        .push_bind(exp.description.clone())
                        .push_bind(exp.skills.iter().cloned().collect::<Vec<String>>());
                });
                builder
            }
            ChildRows::Education(education) => {
                let mut builder = QueryBuilder::new(
                    "INSERT INTO profile_education \
                     (id, profile_id, sort_order, degree, field, institution, year) ",
                );
                builder.push_values(education.iter().enumerate(), |mut b, (i, edu)| {
                    b.push_bind(Uuid::now_v7())
                        .push_bind(owner)
                        .push_bind(i as i32)
                        .push_bind(edu.degree.clone())
                        .push_bind(edu.field.clone())
                        .push_bind(edu.institution.clone())
                        .push_bind(edu.year.clone());
                });
                builder
            }
            ChildRows::Certifications(certifications) => {
                let mut builder = QueryBuilder::new(
                    "INSERT INTO profile_certifications \
                     (id, profile_id, sort_order, title, issuer, issue_date, expiry_date, \
                      document_url, verification_status) ",
                );
                builder.push_values(certifications.iter().enumerate(), |mut b, (i, cert)| {
                    b.push_bind(Uuid::now_v7())
                        .push_bind(owner)
                        .push_bind(i as i32)
                        .push_bind(cert.title.clone())
                        .push_bind(cert.issuer.clone())
                        .push_bind(cert.issue_date)
                        .push_bind(cert.expiry_date)
                        .push_bind(cert.document_url.clone())
                        .push_bind(cert.verification_status.unwrap_or_default().as_str());
                });
                builder
            }
            ChildRows::Publications(publications) => {
                let mut builder = QueryBuilder::new(
                    "INSERT INTO profile_publications \
                     (id, profile_id, sort_order, title, journal, year, url) ",
                );
                builder.push_values(publications.iter().enumerate(), |mut b, (i, publication)| {
                    b.push_bind(Uuid::now_v7())
                        .push_bind(owner)
                        .push_bind(i as i32)
                        .push_bind(publication.title.clone())
                        .push_bind(publication.journal.clone())
                        .push_bind(publication.year.clone())
                        .push_bind(publication.url.clone());
                });
                builder
            }
            ChildRows::References(references) => {
                let mut builder = QueryBuilder::new(
                    "INSERT INTO profile_references \
                     (id, profile_id, sort_order, name, position, organization, email, phone, \
                      relationship) ",
                );
                builder.push_values(references.iter().enumerate(), |mut b, (i, reference)| {
                    b.push_bind(Uuid::now_v7())
                        .push_bind(owner)
                        .push_bind(i as i32)
                        .push_bind(reference.name.clone())
                        .push_bind(reference.position.clone())
                        .push_bind(reference.organization.clone())
                        .push_bind(reference.email.clone())
                        .push_bind(reference.phone.clone())
                        .push_bind(reference.relationship.clone());
                });
                builder
            }
        };

        builder
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(Error::from_write)?;

        Ok(())
    }
}

#[async_trait]
impl ProfileUnitOfWork for PgUnitOfWork {
    #[instrument(skip(self, fields))]
    async fn create_profile(&mut self, fields: &ProfileFields) -> ApplicationResult<ProfileId> {
        let id = ProfileId::new();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO expert_profiles (
                id, full_name, email, bio, country, region,
                expertise_areas, years_experience, review_status, is_verified,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, $10, $10)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.bio)
        .bind(&fields.country)
        .bind(&fields.region)
        .bind(areas(&fields.expertise_areas))
        .bind(fields.years_experience)
        .bind(ReviewStatus::Pending.as_str())
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(Error::from_write)?;

        debug!(profile_id = %id, "Profile row inserted");
        Ok(id)
    }

    #[instrument(skip(self, rows), fields(relation = %rows.relation(), count = rows.len()))]
    async fn create_many(&mut self, profile_id: ProfileId, rows: &ChildRows) -> ApplicationResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        self.insert_rows(profile_id, rows).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_many(&mut self, profile_id: ProfileId, relation: Relation) -> ApplicationResult<u64> {
        let sql = format!("DELETE FROM {} WHERE profile_id = $1", relation.table());
        let result = sqlx::query(&sql)
            .bind(profile_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(Error::Database)?;

        if !self.touch(profile_id).await? {
            return Err(Error::NotFound(profile_id.to_string()).into());
        }

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, fields))]
    async fn update_scalar_fields(
        &mut self,
        id: ProfileId,
        fields: &ProfileFields,
    ) -> ApplicationResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expert_profiles SET
                full_name = $2,
                email = $3,
                bio = $4,
                country = $5,
                region = $6,
                expertise_areas = $7,
                years_experience = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.bio)
        .bind(&fields.country)
        .bind(&fields.region)
        .bind(areas(&fields.expertise_areas))
        .bind(fields.years_experience)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(Error::from_write)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn update_review_status(
        &mut self,
        id: ProfileId,
        status: ReviewStatus,
        is_verified: bool,
    ) -> ApplicationResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expert_profiles
            SET review_status = $2, is_verified = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(is_verified)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(self) -> ApplicationResult<()> {
        self.tx.commit().await.map_err(Error::from_write)?;
        Ok(())
    }

    async fn rollback(self) -> ApplicationResult<()> {
        self.tx.rollback().await.map_err(Error::Database)?;
        Ok(())
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn areas(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

/// ILIKE pattern matching `search` anywhere, with wildcards escaped
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn parse_text<T>(value: &str) -> Result<T>
where
    T: FromStr<Err = ParseError>,
{
    value
        .parse()
        .map_err(|e: ParseError| Error::InvalidData(e.to_string()))
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = ParseError>,
{
    value.as_deref().map(parse_text).transpose()
}

fn records<T>(rows: Vec<PgRow>, decode: fn(&PgRow) -> Result<T>) -> Result<Vec<Record<T>>> {
    rows.iter()
        .map(|row| -> Result<Record<T>> {
            Ok(Record {
                id: RecordId::from(row.try_get::<Uuid, _>("id")?),
                profile_id: ProfileId::from(row.try_get::<Uuid, _>("profile_id")?),
                data: decode(row)?,
            })
        })
        .collect()
}

fn row_to_fields(row: &PgRow) -> Result<ProfileFields> {
    Ok(ProfileFields {
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        bio: row.try_get("bio")?,
        country: row.try_get("country")?,
        region: row.try_get("region")?,
        expertise_areas: row
            .try_get::<Vec<String>, _>("expertise_areas")?
            .into_iter()
            .collect(),
        years_experience: row.try_get("years_experience")?,
    })
}

fn row_to_profile(row: &PgRow) -> Result<Profile> {
    let id = ProfileId::from(row.try_get::<Uuid, _>("id")?);
    let mut profile = Profile::new(id, row_to_fields(row)?, row.try_get("created_at")?);
    profile.review_status = parse_text(&row.try_get::<String, _>("review_status")?)?;
    profile.is_verified = row.try_get("is_verified")?;
    profile.updated_at = row.try_get("updated_at")?;
    Ok(profile)
}

fn row_to_summary(row: &PgRow) -> Result<ProfileSummary> {
    Ok(ProfileSummary {
        id: ProfileId::from(row.try_get::<Uuid, _>("id")?),
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        country: row.try_get("country")?,
        region: row.try_get("region")?,
        expertise_areas: row
            .try_get::<Vec<String>, _>("expertise_areas")?
            .into_iter()
            .collect(),
        years_experience: row.try_get("years_experience")?,
        review_status: parse_text(&row.try_get::<String, _>("review_status")?)?,
        is_verified: row.try_get("is_verified")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_skill(row: &PgRow) -> Result<Skill> {
    Ok(Skill {
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        level: parse_optional(row.try_get("level")?)?,
        endorsements: row.try_get::<i32, _>("endorsements")?.max(0) as u32,
    })
}

fn row_to_language(row: &PgRow) -> Result<Language> {
    Ok(Language {
        name: row.try_get("name")?,
        proficiency: parse_optional(row.try_get("proficiency")?)?,
    })
}

fn row_to_experience(row: &PgRow) -> Result<Experience> {
    Ok(Experience {
        role: row.try_get("role")?,
        organization: row.try_get("organization")?,
        location: row.try_get("location")?,
        start_date: row.try_get::<Option<NaiveDate>, _>("start_date")?,
        end_date: row.try_get::<Option<NaiveDate>, _>("end_date")?,
        current: row.try_get("current")?,
        description: row.try_get("description")?,
        skills: row.try_get::<Vec<String>, _>("skills")?.into_iter().collect(),
    })
}

fn row_to_education(row: &PgRow) -> Result<Education> {
    Ok(Education {
        degree: row.try_get("degree")?,
        field: row.try_get("field")?,
        institution: row.try_get("institution")?,
        year: row.try_get("year")?,
    })
}

fn row_to_certification(row: &PgRow) -> Result<Certification> {
    Ok(Certification {
        title: row.try_get("title")?,
        issuer: row.try_get("issuer")?,
        issue_date: row.try_get::<Option<NaiveDate>, _>("issue_date")?,
        expiry_date: row.try_get::<Option<NaiveDate>, _>("expiry_date")?,
        document_url: row.try_get("document_url")?,
        verification_status: Some(parse_text(
            &row.try_get::<String, _>("verification_status")?,
        )?),
    })
}

fn row_to_publication(row: &PgRow) -> Result<Publication> {
    Ok(Publication {
        title: row.try_get("title")?,
        journal: row.try_get("journal")?,
        year: row.try_get("year")?,
        url: row.try_get("url")?,
    })
}

fn row_to_reference(row: &PgRow) -> Result<Reference> {
    Ok(Reference {
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        organization: row.try_get("organization")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        relationship: row.try_get("relationship")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use expert_roster_domain::SkillLevel;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ada"), "%ada%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_parse_optional_levels() {
        let level: Option<SkillLevel> = parse_optional(Some("Expert".to_string())).unwrap();
        assert_eq!(level, Some(SkillLevel::Expert));

        let missing: Option<SkillLevel> = parse_optional(None).unwrap();
        assert!(missing.is_none());

        let bad: Result<Option<SkillLevel>> = parse_optional(Some("Guru".to_string()));
        assert!(matches!(bad, Err(Error::InvalidData(_))));
    }
}
