//! Normalized job posting and its deduplication identity.
//!
//! Providers return loosely-typed JSON. It is resolved once, at ingestion, into
//! `JobPosting` using a fixed fallback order per field:
//!
//! | field       | keys tried, in order                                    |
//! |-------------|---------------------------------------------------------|
//! | title       | `title`, `titulo`                                       |
//! | company     | `company_name`, `company`, `empresa`                    |
//! | location    | `candidate_required_location`, `location`, `localizacao`|
//! | description | `description`, `descricao`                              |
//! | id          | `id` (string or number)                                 |
//! | url         | `url`                                                   |

use serde_json::Value;

const TITLE_KEYS: &[&str] = &["title", "titulo"];
const COMPANY_KEYS: &[&str] = &["company_name", "company", "empresa"];
const LOCATION_KEYS: &[&str] = &["candidate_required_location", "location", "localizacao"];
const DESCRIPTION_KEYS: &[&str] = &["description", "descricao"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPosting {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: String,
    pub company: String,
    pub location: String,
    /// Raw description as delivered by the provider (may contain markup).
    pub description: String,
}

/// Dedup key for a posting: provider id, else url, else title + company.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobIdentity {
    Id(String),
    Url(String),
    TitleCompany(String, String),
}

impl JobPosting {
    /// Builds a posting from a provider JSON object. Missing or mistyped
    /// fields become empty strings (or `None`); this never fails.
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: raw.get("id").and_then(scalar_to_string),
            url: raw
                .get("url")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            title: first_string(raw, TITLE_KEYS),
            company: first_string(raw, COMPANY_KEYS),
            location: first_string(raw, LOCATION_KEYS),
            description: first_string(raw, DESCRIPTION_KEYS),
        }
    }

    pub fn identity(&self) -> JobIdentity {
        if let Some(id) = &self.id {
            return JobIdentity::Id(id.clone());
        }
        if let Some(url) = &self.url {
            return JobIdentity::Url(url.clone());
        }
        JobIdentity::TitleCompany(self.title.clone(), self.company.clone())
    }
}

/// First non-empty string among `keys`, or "".
fn first_string(raw: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| raw.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
        .to_string()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
