use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Upper bound on query combination size. C(n, k) grows fast and every query
/// is one call against a rate-limited job board.
pub const MAX_COMBO_SIZE_LIMIT: usize = 3;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or tunables are out of range.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub embedding: EmbeddingConfig,
    pub job_provider: JobProviderConfig,
    pub search: SearchConfig,
    pub keywords: KeywordConfig,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Which external job board the fetcher talks to.
#[derive(Debug, Clone)]
pub enum JobProviderConfig {
    Remotive {
        base_url: String,
    },
    Catho {
        base_url: String,
        client_id: String,
        client_secret: String,
    },
}

impl JobProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            JobProviderConfig::Remotive { .. } => "remotive",
            JobProviderConfig::Catho { .. } => "catho",
        }
    }
}

/// Tunables for the job-aggregation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Largest number of search terms joined into one query.
    pub max_combo_size: usize,
    /// Queries allowed in flight at the same time.
    pub max_concurrent_queries: usize,
    /// Unique postings after which fetching stops early.
    pub min_unique_postings: usize,
    /// Ranked results returned to the caller.
    pub top_k: usize,
    /// Per-call timeout for the job provider.
    pub fetch_timeout: Duration,
    /// `None` means the query cache never evicts.
    pub cache_capacity: Option<usize>,
    /// `None` means cached queries never expire.
    pub cache_ttl: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_combo_size: 2,
            max_concurrent_queries: 6,
            min_unique_postings: 5,
            top_k: 3,
            fetch_timeout: Duration::from_secs(10),
            cache_capacity: None,
            cache_ttl: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_combo_size == 0 || self.max_combo_size > MAX_COMBO_SIZE_LIMIT {
            bail!(
                "MAX_COMBO_SIZE must be between 1 and {MAX_COMBO_SIZE_LIMIT}, got {}",
                self.max_combo_size
            );
        }
        if self.max_concurrent_queries == 0 {
            bail!("MAX_CONCURRENT_QUERIES must be at least 1");
        }
        if self.min_unique_postings == 0 {
            bail!("MIN_UNIQUE_POSTINGS must be at least 1");
        }
        if self.top_k == 0 {
            bail!("TOP_K must be at least 1");
        }
        if self.fetch_timeout.is_zero() {
            bail!("FETCH_TIMEOUT_SECS must be at least 1");
        }
        if self.cache_capacity == Some(0) {
            bail!("QUERY_CACHE_CAPACITY must be at least 1 when set");
        }
        Ok(())
    }
}

/// Settings for the embedding-based keyword extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordConfig {
    pub top_n: usize,
    pub candidates: usize,
    /// 0.0 = pure relevance, 1.0 = pure diversity.
    pub diversity: f32,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            candidates: 30,
            diversity: 0.7,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = SearchConfig::default();
        let search = SearchConfig {
            max_combo_size: parse_env("MAX_COMBO_SIZE", defaults.max_combo_size)?,
            max_concurrent_queries: parse_env(
                "MAX_CONCURRENT_QUERIES",
                defaults.max_concurrent_queries,
            )?,
            min_unique_postings: parse_env("MIN_UNIQUE_POSTINGS", defaults.min_unique_postings)?,
            top_k: parse_env("TOP_K", defaults.top_k)?,
            fetch_timeout: Duration::from_secs(parse_env("FETCH_TIMEOUT_SECS", 10u64)?),
            cache_capacity: parse_optional_env("QUERY_CACHE_CAPACITY")?,
            cache_ttl: parse_optional_env::<u64>("QUERY_CACHE_TTL_SECS")?
                .map(Duration::from_secs),
        };
        search.validate()?;

        let keyword_defaults = KeywordConfig::default();
        let keywords = KeywordConfig {
            top_n: parse_env("KEYWORD_TOP_N", keyword_defaults.top_n)?,
            candidates: parse_env("KEYWORD_CANDIDATES", keyword_defaults.candidates)?,
            diversity: parse_env("KEYWORD_DIVERSITY", keyword_defaults.diversity)?,
        };
        if !(0.0..=1.0).contains(&keywords.diversity) {
            bail!("KEYWORD_DIVERSITY must be between 0.0 and 1.0");
        }

        Ok(Config {
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            embedding: EmbeddingConfig {
                api_key: require_env("EMBEDDING_API_KEY")?,
                base_url: env_or("EMBEDDING_BASE_URL", "https://api.openai.com/v1"),
                model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
                timeout: Duration::from_secs(parse_env("EMBEDDING_TIMEOUT_SECS", 30u64)?),
            },
            job_provider: job_provider_from_env()?,
            search,
            keywords,
        })
    }
}

fn job_provider_from_env() -> Result<JobProviderConfig> {
    let provider = env_or("JOB_PROVIDER", "remotive").to_lowercase();
    match provider.as_str() {
        "remotive" => Ok(JobProviderConfig::Remotive {
            base_url: env_or("REMOTIVE_BASE_URL", "https://remotive.com/api"),
        }),
        "catho" => Ok(JobProviderConfig::Catho {
            base_url: env_or("CATHO_BASE_URL", "https://api.catho.com.br"),
            client_id: require_env("CATHO_CLIENT_ID")?,
            client_secret: require_env("CATHO_CLIENT_SECRET")?,
        }),
        other => bail!("Unknown JOB_PROVIDER '{other}' (expected 'remotive' or 'catho')"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        _ => Ok(None),
    }
}
