//! In-memory profile store.
//!
//! Used for local development when no database URL is configured, and as the
//! store behind service and API tests. Writes are staged in the unit of work
//! and applied under a single write lock on commit.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use expert_roster_application::{ApplicationResult, ProfileStore, ProfileUnitOfWork};
use expert_roster_common::PaginationParams;
use expert_roster_domain::{
    ChildRows, Profile, ProfileFields, ProfileId, ProfileSummary, Record, Relation, ReviewStatus,
};

use crate::Error;

type ProfileMap = HashMap<ProfileId, Profile>;

/// Profile store holding everything in a shared map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<ProfileMap>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles
    pub fn profile_count(&self) -> usize {
        self.profiles.read().len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    type UnitOfWork = InMemoryUnitOfWork;

    async fn begin(&self) -> ApplicationResult<InMemoryUnitOfWork> {
        Ok(InMemoryUnitOfWork {
            profiles: Arc::clone(&self.profiles),
            staged: HashMap::new(),
            created: HashSet::new(),
        })
    }

    async fn find_unique_by_email(&self, email: &str) -> ApplicationResult<Option<ProfileSummary>> {
        let email = email.to_lowercase();
        Ok(self
            .profiles
            .read()
            .values()
            .find(|p| p.fields.email.to_lowercase() == email)
            .map(Profile::summary))
    }

    async fn find_by_id(
        &self,
        id: ProfileId,
        include_relations: bool,
    ) -> ApplicationResult<Option<Profile>> {
        let profiles = self.profiles.read();
        Ok(profiles.get(&id).map(|profile| {
            if include_relations {
                profile.clone()
            } else {
                let mut bare = Profile::new(profile.id, profile.fields.clone(), profile.created_at);
                bare.review_status = profile.review_status;
                bare.is_verified = profile.is_verified;
                bare.updated_at = profile.updated_at;
                bare
            }
        }))
    }

    async fn list_paged(
        &self,
        search: Option<&str>,
        pagination: &PaginationParams,
    ) -> ApplicationResult<(Vec<ProfileSummary>, u64)> {
        let needle = search.map(str::to_lowercase);
        let mut matches: Vec<ProfileSummary> = self
            .profiles
            .read()
            .values()
            .filter(|p| match needle.as_deref() {
                Some(needle) => {
                    p.fields.full_name.to_lowercase().contains(needle)
                        || p.fields.email.to_lowercase().contains(needle)
                }
                None => true,
            })
            .map(Profile::summary)
            .collect();

        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();

        Ok((items, total))
    }

    async fn delete(&self, id: ProfileId) -> ApplicationResult<bool> {
        Ok(self.profiles.write().remove(&id).is_some())
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        Ok(())
    }
}

/// Staged copy of every profile touched by the unit of work.
pub struct InMemoryUnitOfWork {
    profiles: Arc<RwLock<ProfileMap>>,
    staged: ProfileMap,
    created: HashSet<ProfileId>,
}

impl InMemoryUnitOfWork {
    fn profile_mut(&mut self, id: ProfileId) -> Option<&mut Profile> {
        if !self.staged.contains_key(&id) {
            let current = self.profiles.read().get(&id).cloned()?;
            self.staged.insert(id, current);
        }
        self.staged.get_mut(&id)
    }
}

#[async_trait]
impl ProfileUnitOfWork for InMemoryUnitOfWork {
    async fn create_profile(&mut self, fields: &ProfileFields) -> ApplicationResult<ProfileId> {
        let id = ProfileId::new();
        self.staged
            .insert(id, Profile::new(id, fields.clone(), Utc::now()));
        self.created.insert(id);
        Ok(id)
    }

    async fn create_many(&mut self, profile_id: ProfileId, rows: &ChildRows) -> ApplicationResult<()> {
        let profile = self
            .profile_mut(profile_id)
            .ok_or_else(|| Error::NotFound(profile_id.to_string()))?;

        fn attach<T: Clone>(target: &mut Vec<Record<T>>, owner: ProfileId, rows: &[T]) {
            target.extend(rows.iter().cloned().map(|row| Record::new(owner, row)));
        }

        match rows {
            ChildRows::Skills(rows) => attach(&mut profile.skills, profile_id, rows),
            ChildRows::Languages(rows) => attach(&mut profile.languages, profile_id, rows),
            ChildRows::Experiences(rows) => attach(&mut profile.experiences, profile_id, rows),
            ChildRows::Education(rows) => attach(&mut profile.education, profile_id, rows),
            ChildRows::Certifications(rows) => {
                attach(&mut profile.certifications, profile_id, rows)
            }
            ChildRows::Publications(rows) => attach(&mut profile.publications, profile_id, rows),
            ChildRows::References(rows) => attach(&mut profile.references, profile_id, rows),
        }

        Ok(())
    }

    async fn delete_many(&mut self, profile_id: ProfileId, relation: Relation) -> ApplicationResult<u64> {
        let profile = self
            .profile_mut(profile_id)
            .ok_or_else(|| Error::NotFound(profile_id.to_string()))?;

        let removed = match relation {
            Relation::Skills => profile.skills.drain(..).count(),
            Relation::Languages => profile.languages.drain(..).count(),
            Relation::Experiences => profile.experiences.drain(..).count(),
            Relation::Education => profile.education.drain(..).count(),
            Relation::Certifications => profile.certifications.drain(..).count(),
            Relation::Publications => profile.publications.drain(..).count(),
            Relation::References => profile.references.drain(..).count(),
        };
        profile.updated_at = Utc::now();

        Ok(removed as u64)
    }

    async fn update_scalar_fields(
        &mut self,
        id: ProfileId,
        fields: &ProfileFields,
    ) -> ApplicationResult<bool> {
        Ok(match self.profile_mut(id) {
            Some(profile) => {
                profile.fields = fields.clone();
                profile.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn update_review_status(
        &mut self,
        id: ProfileId,
        status: ReviewStatus,
        is_verified: bool,
    ) -> ApplicationResult<bool> {
        Ok(match self.profile_mut(id) {
            Some(profile) => {
                profile.review_status = status;
                profile.is_verified = is_verified;
                profile.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn commit(self) -> ApplicationResult<()> {
        let mut profiles = self.profiles.write();

        for (id, staged) in &self.staged {
            let email = staged.fields.email.to_lowercase();
            let taken = profiles
                .values()
                .filter(|other| !self.staged.contains_key(&other.id))
                .chain(self.staged.values())
                .any(|other| other.id != *id && other.fields.email.to_lowercase() == email);
            if taken {
                return Err(Error::Conflict(format!("email {} already registered", email)).into());
            }
        }

        // A profile deleted after it was staged must not come back
        for id in self.staged.keys() {
            if !profiles.contains_key(id) && !self.created.contains(id) {
                return Err(Error::NotFound(id.to_string()).into());
            }
        }

        let count = self.staged.len();
        profiles.extend(self.staged);
        debug!(profiles = count, "In-memory unit of work committed");
        Ok(())
    }

    async fn rollback(self) -> ApplicationResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expert_roster_domain::{Language, Proficiency, Skill, SkillLevel};
    use std::collections::BTreeSet;

    fn fields(email: &str) -> ProfileFields {
        ProfileFields {
            full_name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            bio: "Analyst".to_string(),
            country: None,
            region: None,
            expertise_areas: BTreeSet::new(),
            years_experience: 4,
        }
    }

    async fn create(store: &InMemoryProfileStore, email: &str) -> ProfileId {
        let mut uow = store.begin().await.unwrap();
        let id = uow.create_profile(&fields(email)).await.unwrap();
        uow.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let store = InMemoryProfileStore::new();
        let mut uow = store.begin().await.unwrap();
        let id = uow.create_profile(&fields("ada@example.com")).await.unwrap();

        assert!(store.find_by_id(id, true).await.unwrap().is_none());
        uow.commit().await.unwrap();
        assert!(store.find_by_id(id, true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_rows() {
        let store = InMemoryProfileStore::new();
        let id = create(&store, "ada@example.com").await;

        let mut uow = store.begin().await.unwrap();
        uow.create_many(
            id,
            &ChildRows::Languages(vec![Language {
                name: "English".to_string(),
                proficiency: Some(Proficiency::Native),
            }]),
        )
        .await
        .unwrap();
        uow.rollback().await.unwrap();

        let profile = store.find_by_id(id, true).await.unwrap().unwrap();
        assert!(profile.languages.is_empty());
    }

    #[tokio::test]
    async fn test_delete_many_then_create_many_replaces_rows() {
        let store = InMemoryProfileStore::new();
        let id = create(&store, "ada@example.com").await;
        let skill = |name: &str| Skill {
            name: name.to_string(),
            category: "Technical".to_string(),
            level: Some(SkillLevel::Advanced),
            endorsements: 0,
        };

        let mut uow = store.begin().await.unwrap();
        uow.create_many(id, &ChildRows::Skills(vec![skill("A"), skill("B")]))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let removed = uow.delete_many(id, Relation::Skills).await.unwrap();
        uow.create_many(id, &ChildRows::Skills(vec![skill("C")]))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(removed, 2);
        let profile = store.find_by_id(id, true).await.unwrap().unwrap();
        let names: Vec<&str> = profile.skills.iter().map(|r| r.data.name.as_str()).collect();
        assert_eq!(names, vec!["C"]);
        assert!(profile.skills.iter().all(|r| r.profile_id == id));
    }

    #[tokio::test]
    async fn test_commit_rejects_duplicate_email_case_insensitively() {
        let store = InMemoryProfileStore::new();
        create(&store, "ada@example.com").await;

        let mut uow = store.begin().await.unwrap();
        uow.create_profile(&fields("ADA@Example.com")).await.unwrap();
        let err = uow.commit().await.unwrap_err();

        assert!(matches!(err, expert_roster_application::ApplicationError::Conflict(_)));
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn test_commit_fails_when_target_deleted_meanwhile() {
        let store = InMemoryProfileStore::new();
        let id = create(&store, "ada@example.com").await;

        let mut uow = store.begin().await.unwrap();
        assert!(uow.update_scalar_fields(id, &fields("new@example.com")).await.unwrap());
        assert!(store.delete(id).await.unwrap());

        assert!(uow.commit().await.is_err());
        assert_eq!(store.profile_count(), 0);
    }

    #[tokio::test]
    async fn test_list_paged_searches_name_and_email() {
        let store = InMemoryProfileStore::new();
        create(&store, "ada@example.com").await;
        create(&store, "grace@navy.mil").await;

        let params = PaginationParams::new(1, 10);
        let (items, total) = store.list_paged(Some("NAVY"), &params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].email, "grace@navy.mil");

        let (items, total) = store.list_paged(None, &PaginationParams::new(2, 1)).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_id_without_relations_omits_children() {
        let store = InMemoryProfileStore::new();
        let id = create(&store, "ada@example.com").await;

        let mut uow = store.begin().await.unwrap();
        uow.create_many(
            id,
            &ChildRows::Languages(vec![Language {
                name: "French".to_string(),
                proficiency: Some(Proficiency::Advanced),
            }]),
        )
        .await
        .unwrap();
        uow.commit().await.unwrap();

        let bare = store.find_by_id(id, false).await.unwrap().unwrap();
        assert!(bare.languages.is_empty());
        let full = store.find_by_id(id, true).await.unwrap().unwrap();
        assert_eq!(full.languages.len(), 1);
    }
}
