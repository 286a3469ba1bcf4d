//! Capability interfaces over the record collections and the object store.
//!
//! Writes are last-writer-wins: there is no version check on any row.

use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{Contact, ContactDraft, ContactPatch, Profile, ProfileDraft, Project, ProjectDraft};

pub mod cache;

pub use cache::CachedStore;

pub const PROFILE: &str = "profile";
pub const PROJECTS: &str = "projects";
pub const CONTACTS: &str = "contacts";

/// Bucket holding uploaded project screenshots.
pub const PROJECT_IMAGES: &str = "project-images";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: Uuid },

    #[error("malformed {collection} record: {reason}")]
    Malformed { collection: &'static str, reason: String },

    #[error("invalid object path {0:?}")]
    InvalidPath(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub type Store = Arc<dyn RecordStore>;
pub type Objects = Arc<dyn ObjectStore>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn profile(&self) -> StoreResult<Option<Profile>>;
    async fn insert_profile(&self, draft: ProfileDraft) -> StoreResult<Profile>;
    async fn update_profile(&self, id: Uuid, draft: ProfileDraft) -> StoreResult<()>;

    /// Projects in insertion order, at most `limit` of them.
    async fn projects(&self, limit: Option<u32>) -> StoreResult<Vec<Project>>;
    async fn project(&self, id: Uuid) -> StoreResult<Option<Project>>;
    async fn insert_project(&self, draft: ProjectDraft) -> StoreResult<Project>;
    async fn update_project(&self, id: Uuid, draft: ProjectDraft) -> StoreResult<()>;
    async fn delete_project(&self, id: Uuid) -> StoreResult<()>;

    /// Contacts, newest first.
    async fn contacts(&self) -> StoreResult<Vec<Contact>>;
    async fn contact(&self, id: Uuid) -> StoreResult<Option<Contact>>;
    /// Stores a new unread, unreplied contact stamped with the current time.
    async fn insert_contact(&self, draft: ContactDraft) -> StoreResult<Contact>;
    async fn update_contact(&self, id: Uuid, patch: ContactPatch) -> StoreResult<()>;
    async fn delete_contact(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> StoreResult<()>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Creates the profile on first save, updates the existing row afterwards.
pub async fn save_profile(store: &dyn RecordStore, draft: ProfileDraft) -> StoreResult<Profile> {
    match store.profile().await? {
        Some(existing) => {
            store.update_profile(existing.id, draft.clone()).await?;
            Ok(draft.into_profile(existing.id))
        }
        None => store.insert_profile(draft).await,
    }
}

/// Objects kept on local disk as `{root}/{bucket}/{path}` and served under
/// `{url_prefix}/{bucket}/{path}`.
pub struct DiskObjectStore {
    root: PathBuf,
    url_prefix: String,
}

impl DiskObjectStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_owned(),
        }
    }

    fn resolve(&self, bucket: &str, path: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(bucket).join(path);
        let plain = !bucket.is_empty()
            && !path.is_empty()
            && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StoreError::InvalidPath(format!("{bucket}/{path}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for DiskObjectStore {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> StoreResult<()> {
        let target = self.resolve(bucket, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let len = bytes.len();
        tokio::fs::write(&target, bytes).await?;
        info!(bucket, path, len, "stored object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", self.url_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("folio-objects-{}", Uuid::now_v7().simple()))
    }

    #[tokio::test]
    async fn upload_lands_under_bucket() {
        let root = scratch_dir();
        let objects = DiskObjectStore::new(&root, "/storage/");

        objects.upload(PROJECT_IMAGES, "shot.png", vec![1, 2, 3]).await.unwrap();

        let written = tokio::fs::read(root.join(PROJECT_IMAGES).join("shot.png")).await.unwrap();
        assert_eq!(written, vec![1, 2, 3]);
        assert_eq!(
            objects.public_url(PROJECT_IMAGES, "shot.png"),
            "/storage/project-images/shot.png"
        );

        tokio::fs::remove_dir_all(root).await.unwrap();
    }

    #[tokio::test]
    async fn upload_rejects_escaping_paths() {
        let objects = DiskObjectStore::new(scratch_dir(), "/storage");
        for path in ["../secret", "/etc/passwd", ""] {
            let err = objects.upload(PROJECT_IMAGES, path, vec![]).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidPath(_)), "{path}: {err}");
        }
    }
}
