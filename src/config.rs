use crate::llm::LlmSettings;
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Prefix of layered environment overrides, e.g. `THOUGHTFUL_SERVER__PORT=8000`.
const ENV_PREFIX: &str = "THOUGHTFUL";

/// Config file picked up from the working directory when none is given.
const CWD_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Storage provider: "memory" or "postgres"
    #[arg(long)]
    pub persistence_provider: Option<String>,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub persistence: PersistenceConfig,
    pub llm: LlmConfig,
    pub enrichment: EnrichmentConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct SecurityConfig {
    /// HS256 secret used to verify bearer tokens.
    pub jwt_secret: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    pub provider: String,
    pub database_url: String,
    pub max_connections: u32,
}

#[derive(Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrichmentConfig {
    /// Delay before a scheduled enrichment starts.
    pub schedule_delay_ms: u64,
    /// How long finished task records stay queryable.
    pub task_retention_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Layering: defaults, then conventional env names, then config file,
    /// then `THOUGHTFUL_*` env vars, then explicit CLI flags.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("security.jwt_secret", "")?
            .set_default("persistence.provider", "memory")?
            .set_default("persistence.database_url", "")?
            .set_default("persistence.max_connections", 5)?
            .set_default("llm.base_url", "https://api.openai.com")?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.max_tokens", 150)?
            .set_default("llm.request_timeout_secs", 60)?
            .set_default("enrichment.schedule_delay_ms", 0)?
            .set_default("enrichment.task_retention_secs", 3600)?
            .set_default("telemetry.json", false)?;

        // Conventional names used by OpenAI-compatible tooling. They only
        // replace built-in defaults; later entries win, so LLM_* beats OPENAI_*.
        for (var, key) in [
            ("OPENAI_BASE_URL", "llm.base_url"),
            ("LLM_BASE_URL", "llm.base_url"),
            ("OPENAI_API_KEY", "llm.api_key"),
            ("LLM_API_KEY", "llm.api_key"),
            ("LLM_MODEL", "llm.model"),
            ("JWT_SECRET", "security.jwt_secret"),
        ] {
            if let Ok(val) = env::var(var)
                && !val.trim().is_empty()
            {
                builder = builder.set_default(key, val)?;
            }
        }

        // Config file: explicit path must exist; ./config.yaml is optional.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(CWD_CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(CWD_CONFIG_FILE).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(provider) = cli.persistence_provider {
            builder = builder.set_override("persistence.provider", provider)?;
        }
        if let Some(url) = cli.database_url {
            builder = builder.set_override("persistence.database_url", url)?;
        }
        if let Some(json) = cli.json_logs {
            builder = builder.set_override("telemetry.json", json)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Check settings that have no usable default.
    pub fn validate(&self) -> Result<(), String> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err("security.jwt_secret must be set (JWT_SECRET)".to_string());
        }
        if self.llm.base_url.trim().is_empty() {
            return Err("llm.base_url cannot be empty".to_string());
        }
        if self.llm.model.trim().is_empty() {
            return Err("llm.model cannot be empty".to_string());
        }
        if self.persistence.provider == "postgres" && self.persistence.database_url.is_empty() {
            return Err("persistence.database_url is required for postgres".to_string());
        }
        Ok(())
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            base_url: self.llm.base_url.clone(),
            api_key: self
                .llm
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            model: self.llm.model.clone(),
            max_tokens: self.llm.max_tokens,
            request_timeout_secs: self.llm.request_timeout_secs,
        }
    }
}
