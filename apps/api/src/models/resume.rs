use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored résumé. Created once on upload and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Resume {
    pub id: Uuid,
    pub text: Option<String>,
    /// Lower-cased keyword phrases, de-duplicated and sorted.
    pub keywords: Vec<String>,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl Resume {
    pub fn new(text: Option<String>, keywords: Vec<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            keywords,
            embedding,
            created_at: Utc::now(),
        }
    }
}
