use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::resume::Resume;

/// Keyed résumé storage. Entries are inserted once and only read afterwards.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Option<Arc<Resume>>;

    /// Returns `false` (and keeps the existing entry) if the id is taken.
    async fn insert(&self, resume: Resume) -> bool;
}

/// Process-lifetime store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryResumeStore {
    resumes: RwLock<HashMap<Uuid, Arc<Resume>>>,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn get(&self, id: Uuid) -> Option<Arc<Resume>> {
        self.resumes.read().await.get(&id).cloned()
    }

    async fn insert(&self, resume: Resume) -> bool {
        let mut resumes = self.resumes.write().await;
        if resumes.contains_key(&resume.id) {
            return false;
        }
        resumes.insert(resume.id, Arc::new(resume));
        true
    }
}
