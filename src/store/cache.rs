use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Contact, ContactDraft, ContactPatch, Profile, ProfileDraft, Project, ProjectDraft};

use super::{RecordStore, StoreResult};

/// Read-through cache of whole collections in front of another store.
///
/// Reads are served from the last full fetch. A write goes straight to the
/// inner store and, once it succeeds, drops the cached copy of that collection
/// so the next read comes back from the store. A failed write leaves the cache
/// as it was.
pub struct CachedStore<S> {
    inner: S,
    profile: RwLock<Option<Option<Profile>>>,
    projects: RwLock<Option<Arc<Vec<Project>>>>,
    contacts: RwLock<Option<Arc<Vec<Contact>>>>,
}

impl<S: RecordStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            profile: RwLock::new(None),
            projects: RwLock::new(None),
            contacts: RwLock::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn all_projects(&self) -> StoreResult<Arc<Vec<Project>>> {
        read_through(&self.projects, "projects", async {
            self.inner.projects(None).await.map(Arc::new)
        }).await
    }

    async fn all_contacts(&self) -> StoreResult<Arc<Vec<Contact>>> {
        read_through(&self.contacts, "contacts", async {
            self.inner.contacts().await.map(Arc::new)
        }).await
    }
}

async fn read_through<T, F>(slot: &RwLock<Option<T>>, name: &str, load: F) -> StoreResult<T>
where
    T: Clone,
    F: Future<Output = StoreResult<T>>,
{
    if let Some(cached) = slot.read().await.as_ref() {
        return Ok(cached.clone());
    }

    let mut slot = slot.write().await;
    if let Some(cached) = slot.as_ref() {
        return Ok(cached.clone());
    }
    debug!("loading {name} into cache");
    let fresh = load.await?;
    *slot = Some(fresh.clone());
    Ok(fresh)
}

async fn invalidate<T>(slot: &RwLock<Option<T>>, name: &str) {
    debug!("invalidating cached {name}");
    *slot.write().await = None;
}

#[async_trait]
impl<S: RecordStore> RecordStore for CachedStore<S> {
    async fn profile(&self) -> StoreResult<Option<Profile>> {
        read_through(&self.profile, "profile", self.inner.profile()).await
    }

    async fn insert_profile(&self, draft: ProfileDraft) -> StoreResult<Profile> {
        let profile = self.inner.insert_profile(draft).await?;
        invalidate(&self.profile, "profile").await;
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, draft: ProfileDraft) -> StoreResult<()> {
        self.inner.update_profile(id, draft).await?;
        invalidate(&self.profile, "profile").await;
        Ok(())
    }

    async fn projects(&self, limit: Option<u32>) -> StoreResult<Vec<Project>> {
        let all = self.all_projects().await?;
        let limit = limit.map_or(all.len(), |l| l as usize);
        Ok(all.iter().take(limit).cloned().collect())
    }

    async fn project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let all = self.all_projects().await?;
        Ok(all.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_project(&self, draft: ProjectDraft) -> StoreResult<Project> {
        let project = self.inner.insert_project(draft).await?;
        invalidate(&self.projects, "projects").await;
        Ok(project)
    }

    async fn update_project(&self, id: Uuid, draft: ProjectDraft) -> StoreResult<()> {
        self.inner.update_project(id, draft).await?;
        invalidate(&self.projects, "projects").await;
        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_project(id).await?;
        invalidate(&self.projects, "projects").await;
        Ok(())
    }

    async fn contacts(&self) -> StoreResult<Vec<Contact>> {
        Ok(self.all_contacts().await?.as_ref().clone())
    }

    async fn contact(&self, id: Uuid) -> StoreResult<Option<Contact>> {
        let all = self.all_contacts().await?;
        Ok(all.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_contact(&self, draft: ContactDraft) -> StoreResult<Contact> {
        let contact = self.inner.insert_contact(draft).await?;
        invalidate(&self.contacts, "contacts").await;
        Ok(contact)
    }

    async fn update_contact(&self, id: Uuid, patch: ContactPatch) -> StoreResult<()> {
        self.inner.update_contact(id, patch).await?;
        invalidate(&self.contacts, "contacts").await;
        Ok(())
    }

    async fn delete_contact(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_contact(id).await?;
        invalidate(&self.contacts, "contacts").await;
        Ok(())
    }
}
