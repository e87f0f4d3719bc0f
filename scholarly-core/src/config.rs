//! Environment-driven configuration
//!
//! Every setting is read once at startup into [`AppConfig`], which is then
//! passed explicitly to the services that need it. Missing required variables
//! are collected and reported together as a single configuration error.

use crate::error::ScholarlyResult;
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const COMPONENT: &str = "config";

/// Fallback key used when `SECRET_KEY` is unset. Never meant for production.
pub const INSECURE_SECRET_KEY: &str = "insecure-build-time-only-key-not-for-production-use";

/// A string that never shows up in `Debug` output or logs
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub secret_key: Secret,
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_insecure_secret(&self) -> bool {
        self.secret_key.expose() == INSECURE_SECRET_KEY
    }
}

/// Relational database connection parameters (carried for deployment parity)
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub engine: String,
    pub name: String,
    pub user: String,
    pub password: Secret,
    pub host: String,
    pub port: String,
}

/// Outgoing email and contact queue settings
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub default_from_email: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<Secret>,
    pub frontend_url: String,
    pub logo_url: String,
    pub broker_url: Option<String>,
    pub workers: usize,
    pub queue_limit: usize,
    pub max_attempts: usize,
    pub job_timeout: Duration,
    pub retry_delay: Duration,
}

/// Managed vector index settings
#[derive(Debug, Clone)]
pub struct PineconeSettings {
    pub api_key: Secret,
    pub index_name: String,
    pub environment: String,
    /// Data-plane host; discovered from the control plane when unset
    pub index_host: Option<String>,
    pub controller_url: String,
    /// Dimension used when the index cannot be described
    pub default_dimension: usize,
}

/// Hosted embedding and completion API settings
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Secret,
    pub llm_model: String,
    pub embedding_model: String,
    pub base_url: String,
}

/// Query pipeline tuning
#[derive(Debug, Clone)]
pub struct RagSettings {
    pub top_k: usize,
    pub upstream_timeout: Duration,
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub email: EmailSettings,
    pub pinecone: PineconeSettings,
    pub openai: OpenAiSettings,
    pub rag: RagSettings,
}

/// Raw view of the process environment, lower-cased by the `config` crate
#[derive(Debug, Default, Deserialize)]
struct RawEnv {
    host: Option<String>,
    port: Option<String>,
    secret_key: Option<String>,
    debug: Option<String>,
    allowed_hosts: Option<String>,
    cors_allowed_origins: Option<String>,

    db_engine: Option<String>,
    db_name: Option<String>,
    db_user: Option<String>,
    db_password: Option<String>,
    db_host: Option<String>,
    db_port: Option<String>,

    broker_url: Option<String>,
    default_from_email: Option<String>,
    email_host: Option<String>,
    email_port: Option<String>,
    email_host_user: Option<String>,
    email_host_password: Option<String>,
    email_workers: Option<String>,
    email_queue_limit: Option<String>,
    email_max_attempts: Option<String>,
    email_timeout_secs: Option<String>,
    email_retry_delay_ms: Option<String>,
    frontend_url: Option<String>,
    logo_url: Option<String>,

    pinecone_api_key: Option<String>,
    pinecone_index_name: Option<String>,
    pinecone_environment: Option<String>,
    pinecone_index_host: Option<String>,
    pinecone_controller_url: Option<String>,
    pinecone_embedding_dimension: Option<String>,

    openai_api_key: Option<String>,
    openai_llm_model: Option<String>,
    openai_embedding_model: Option<String>,
    openai_base_url: Option<String>,

    rag_top_k: Option<String>,
    upstream_timeout_secs: Option<String>,
}

/// Collects missing and malformed variables while reading [`RawEnv`]
#[derive(Default)]
struct Problems {
    missing: Vec<String>,
    invalid: Vec<String>,
}

impl Problems {
    fn required(&mut self, name: &str, value: Option<String>) -> String {
        match non_empty(value) {
            Some(value) => value,
            None => {
                self.missing.push(name.to_string());
                String::new()
            }
        }
    }

    fn parsed<T: FromStr>(&mut self, name: &str, value: Option<String>, default: T) -> T {
        match non_empty(value) {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    self.invalid.push(name.to_string());
                    default
                }
            },
            None => default,
        }
    }

    fn positive(&mut self, name: &str, value: Option<String>, default: usize) -> usize {
        let parsed = self.parsed(name, value, default);
        if parsed == 0 {
            self.invalid.push(name.to_string());
            return default;
        }
        parsed
    }

    fn into_result(self) -> ScholarlyResult<()> {
        if self.missing.is_empty() && self.invalid.is_empty() {
            return Ok(());
        }

        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!(
                "missing required environment variables: {}",
                self.missing.join(", ")
            ));
        }
        if !self.invalid.is_empty() {
            parts.push(format!(
                "invalid values for environment variables: {}",
                self.invalid.join(", ")
            ));
        }

        let mut variables = self.missing;
        variables.extend(self.invalid);

        Err(crate::config_error!(parts.join("; "), COMPONENT, variables))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn split_list(value: Option<String>, default: &[&str]) -> Vec<String> {
    match non_empty(value) {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        None => default.iter().map(|item| item.to_string()).collect(),
    }
}

/// Strips the provider prefix some tooling expects on model identifiers
pub fn normalize_model_name(model: &str) -> String {
    model
        .trim()
        .strip_prefix("openai/")
        .unwrap_or(model.trim())
        .to_string()
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> ScholarlyResult<Self> {
        Self::load(Environment::default())
    }

    /// Load configuration from an explicit variable map (upper-case names)
    pub fn from_map(vars: HashMap<String, String>) -> ScholarlyResult<Self> {
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(source: Environment) -> ScholarlyResult<Self> {
        let raw: RawEnv = Config::builder()
            .add_source(source)
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| {
                crate::config_error!(format!("Failed to read environment: {}", e), COMPONENT)
            })?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawEnv) -> ScholarlyResult<Self> {
        let mut problems = Problems::default();

        let server = ServerSettings {
            host: non_empty(raw.host).unwrap_or_else(|| "127.0.0.1".to_string()),
            port: problems.parsed("PORT", raw.port, 8000u16),
            secret_key: Secret::new(
                non_empty(raw.secret_key).unwrap_or_else(|| INSECURE_SECRET_KEY.to_string()),
            ),
            debug: raw.debug.as_deref().map(str::trim) == Some("True"),
            allowed_hosts: split_list(raw.allowed_hosts, &["*"]),
            cors_allowed_origins: split_list(
                raw.cors_allowed_origins,
                &["http://localhost:3000", "http://127.0.0.1:3000"],
            ),
        };

        let database = DatabaseSettings {
            engine: non_empty(raw.db_engine).unwrap_or_else(|| "sqlite3".to_string()),
            name: non_empty(raw.db_name).unwrap_or_else(|| "db.sqlite3".to_string()),
            user: raw.db_user.unwrap_or_default(),
            password: Secret::new(raw.db_password.unwrap_or_default()),
            host: raw.db_host.unwrap_or_default(),
            port: raw.db_port.unwrap_or_default(),
        };

        let email = EmailSettings {
            default_from_email: problems.required("DEFAULT_FROM_EMAIL", raw.default_from_email),
            host: non_empty(raw.email_host).unwrap_or_else(|| "smtp-relay.brevo.com".to_string()),
            port: problems.parsed("EMAIL_PORT", raw.email_port, 587u16),
            username: non_empty(raw.email_host_user),
            password: non_empty(raw.email_host_password).map(Secret::new),
            frontend_url: raw.frontend_url.unwrap_or_default(),
            logo_url: raw.logo_url.unwrap_or_default(),
            broker_url: non_empty(raw.broker_url),
            workers: problems.positive("EMAIL_WORKERS", raw.email_workers, 2),
            queue_limit: problems.positive("EMAIL_QUEUE_LIMIT", raw.email_queue_limit, 50),
            max_attempts: problems.positive("EMAIL_MAX_ATTEMPTS", raw.email_max_attempts, 3),
            job_timeout: Duration::from_secs(
                problems.positive("EMAIL_TIMEOUT_SECS", raw.email_timeout_secs, 60) as u64,
            ),
            retry_delay: Duration::from_millis(problems.parsed(
                "EMAIL_RETRY_DELAY_MS",
                raw.email_retry_delay_ms,
                2000u64,
            )),
        };

        let pinecone = PineconeSettings {
            api_key: Secret::new(problems.required("PINECONE_API_KEY", raw.pinecone_api_key)),
            index_name: problems.required("PINECONE_INDEX_NAME", raw.pinecone_index_name),
            environment: non_empty(raw.pinecone_environment)
                .unwrap_or_else(|| "us-east-1".to_string()),
            index_host: non_empty(raw.pinecone_index_host),
            controller_url: non_empty(raw.pinecone_controller_url)
                .unwrap_or_else(|| "https://api.pinecone.io".to_string()),
            default_dimension: problems.positive(
                "PINECONE_EMBEDDING_DIMENSION",
                raw.pinecone_embedding_dimension,
                1536,
            ),
        };

        let openai = OpenAiSettings {
            api_key: Secret::new(problems.required("OPENAI_API_KEY", raw.openai_api_key)),
            llm_model: normalize_model_name(
                &non_empty(raw.openai_llm_model).unwrap_or_else(|| "gpt-5-nano".to_string()),
            ),
            embedding_model: non_empty(raw.openai_embedding_model)
                .unwrap_or_else(|| "text-embedding-3-small".to_string()),
            base_url: non_empty(raw.openai_base_url)
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        };

        let rag = RagSettings {
            top_k: problems.positive("RAG_TOP_K", raw.rag_top_k, 5),
            upstream_timeout: Duration::from_secs(
                problems.positive("UPSTREAM_TIMEOUT_SECS", raw.upstream_timeout_secs, 60) as u64,
            ),
        };

        problems.into_result()?;

        Ok(Self {
            server,
            database,
            email,
            pinecone,
            openai,
            rag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScholarlyError;

    fn required_vars() -> HashMap<String, String> {
        [
            ("DEFAULT_FROM_EMAIL", "noreply@example.org"),
            ("PINECONE_API_KEY", "pc-key"),
            ("PINECONE_INDEX_NAME", "scholarly"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_map(required_vars()).unwrap();

        assert_eq!(config.server.port, 8000);
        assert!(!config.server.debug);
        assert_eq!(config.server.allowed_hosts, vec!["*".to_string()]);
        assert!(config.server.uses_insecure_secret());
        assert_eq!(config.email.host, "smtp-relay.brevo.com");
        assert_eq!(config.email.port, 587);
        assert_eq!(config.email.workers, 2);
        assert_eq!(config.email.queue_limit, 50);
        assert_eq!(config.email.max_attempts, 3);
        assert_eq!(config.pinecone.environment, "us-east-1");
        assert_eq!(config.pinecone.default_dimension, 1536);
        assert_eq!(config.openai.llm_model, "gpt-5-nano");
        assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
        assert_eq!(config.rag.top_k, 5);
    }

    #[test]
    fn test_missing_required_reported_together() {
        let err = AppConfig::from_map(HashMap::new()).unwrap_err();
        match err {
            ScholarlyError::Config {
                variables, context, ..
            } => {
                assert_eq!(context.component, "config");
                for name in [
                    "DEFAULT_FROM_EMAIL",
                    "PINECONE_API_KEY",
                    "PINECONE_INDEX_NAME",
                    "OPENAI_API_KEY",
                ] {
                    assert!(variables.contains(&name.to_string()), "{name} not reported");
                }
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_only_for_capitalised_true() {
        let mut vars = required_vars();
        vars.insert("DEBUG".to_string(), "true".to_string());
        assert!(!AppConfig::from_map(vars.clone()).unwrap().server.debug);

        vars.insert("DEBUG".to_string(), "True".to_string());
        assert!(AppConfig::from_map(vars).unwrap().server.debug);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut vars = required_vars();
        vars.insert("RAG_TOP_K".to_string(), "zero".to_string());
        let err = AppConfig::from_map(vars).unwrap_err();
        assert!(err.to_string().contains("RAG_TOP_K"));
    }

    #[test]
    fn test_llm_model_prefix_stripped() {
        let mut vars = required_vars();
        vars.insert("OPENAI_LLM_MODEL".to_string(), "openai/gpt-4o-mini".to_string());
        let config = AppConfig::from_map(vars).unwrap();
        assert_eq!(config.openai.llm_model, "gpt-4o-mini");
    }

    #[test]
    fn test_lists_split_on_commas() {
        let mut vars = required_vars();
        vars.insert(
            "ALLOWED_HOSTS".to_string(),
            "example.org, api.example.org ,".to_string(),
        );
        let config = AppConfig::from_map(vars).unwrap();
        assert_eq!(
            config.server.allowed_hosts,
            vec!["example.org".to_string(), "api.example.org".to_string()]
        );
    }

    #[test]
    fn test_secret_debug_redacted() {
        let config = AppConfig::from_map(required_vars()).unwrap();
        let rendered = format!("{:?}", config.openai);
        assert!(!rendered.contains("sk-test"));
    }
}
