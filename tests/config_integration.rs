use serial_test::serial;
use std::env;
use std::fs;
use thoughtful::config::AppConfig;

const BIN: &str = "thoughtful";

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("THOUGHTFUL_SERVER__PORT");
        env::remove_var("THOUGHTFUL_LLM__MODEL");
        env::remove_var("THOUGHTFUL_LLM__BASE_URL");
        env::remove_var("THOUGHTFUL_ENRICHMENT__SCHEDULE_DELAY_MS");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("JWT_SECRET");
        env::remove_var("LLM_MODEL");
        env::remove_var("LLM_BASE_URL");
        env::remove_var("OPENAI_BASE_URL");
        env::remove_var("LLM_API_KEY");
        env::remove_var("OPENAI_API_KEY");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args([BIN]).expect("defaults should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.persistence.provider, "memory");
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.max_tokens, 150);
    assert_eq!(config.enrichment.schedule_delay_ms, 0);
    assert!(!config.telemetry.json);

    // No secret configured yet.
    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("THOUGHTFUL_SERVER__PORT", "9090");
        env::set_var("THOUGHTFUL_ENRICHMENT__SCHEDULE_DELAY_MS", "250");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.enrichment.schedule_delay_ms, 250);

    clear_env_vars();
}

#[test]
#[serial]
fn test_conventional_env_names() {
    clear_env_vars();
    unsafe {
        env::set_var("JWT_SECRET", "s3cret");
        env::set_var("OPENAI_BASE_URL", "http://localhost:11434/v1");
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("LLM_MODEL", "llama3");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.security.jwt_secret, "s3cret");
    assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
    assert_eq!(config.llm.model, "llama3");
    assert!(config.validate().is_ok());

    let settings = config.llm_settings();
    assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
    assert!(!format!("{config:?}").contains("s3cret"));
    assert!(!format!("{config:?}").contains("sk-test"));

    clear_env_vars();
}

#[test]
#[serial]
fn test_prefixed_env_beats_conventional_names() {
    clear_env_vars();
    unsafe {
        env::set_var("OPENAI_BASE_URL", "http://openai-fallback.example");
        env::set_var("THOUGHTFUL_LLM__BASE_URL", "http://prefixed.example");
        env::set_var("LLM_MODEL", "llama3");
        env::set_var("THOUGHTFUL_LLM__MODEL", "mistral");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.llm.base_url, "http://prefixed.example");
    assert_eq!(config.llm.model, "mistral");

    clear_env_vars();
}

#[test]
#[serial]
fn test_llm_names_beat_openai_names() {
    clear_env_vars();
    unsafe {
        env::set_var("OPENAI_BASE_URL", "http://openai.example");
        env::set_var("LLM_BASE_URL", "http://llm.example");
        env::set_var("OPENAI_API_KEY", "sk-openai");
        env::set_var("LLM_API_KEY", "sk-llm");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.llm.base_url, "http://llm.example");
    assert_eq!(config.llm_settings().api_key.as_deref(), Some("sk-llm"));

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_beats_conventional_names() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join("thoughtful.yaml");
    fs::write(
        &file_path,
        r#"
security:
  jwt_secret: from-file
llm:
  base_url: http://from-file.example
"#,
    )
    .expect("Failed to write temp config");

    unsafe {
        env::set_var("JWT_SECRET", "from-env");
        env::set_var("OPENAI_BASE_URL", "http://openai.example");
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.security.jwt_secret, "from-file");
    assert_eq!(config.llm.base_url, "http://from-file.example");

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join("thoughtful.yaml");
    fs::write(
        &file_path,
        r#"
server:
  port: 7070
llm:
  max_tokens: 64
"#,
    )
    .expect("Failed to write temp config");

    // CONFIG_FILE is read through the CLI layer
    unsafe {
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.llm.max_tokens, 64);

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args([BIN, "--config", "/nonexistent/thoughtful.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env_vars();
    unsafe {
        env::set_var("THOUGHTFUL_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args([
        BIN,
        "--port",
        "8081",
        "--persistence-provider",
        "postgres",
        "--database-url",
        "postgres://localhost/thoughtful",
    ])
    .expect("Failed to load config");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.persistence.provider, "postgres");
    assert_eq!(
        config.persistence.database_url,
        "postgres://localhost/thoughtful"
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_postgres_requires_url() {
    clear_env_vars();
    unsafe {
        env::set_var("JWT_SECRET", "s3cret");
    }

    let mut config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    config.persistence.provider = "postgres".to_string();
    config.persistence.database_url.clear();
    assert!(config.validate().is_err());

    clear_env_vars();
}
