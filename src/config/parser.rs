use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `output.s3-bucket`
pub const ENV_S3_BUCKET: &str = "S3_BUCKET";

/// Environment variable overriding `output.s3-endpoint`
pub const ENV_S3_ENDPOINT: &str = "AWS_ENDPOINT_URL";

/// Environment variable overriding `output.slack-webhook`
pub const ENV_SLACK_WEBHOOK: &str = "SLACK_WEBHOOK_URL";

/// Loads and parses a configuration file from the given path
///
/// Values from the process environment override the file, see
/// [`apply_env_overrides`].
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use scrapework::config::load_config;
///
/// let config = load_config(Path::new("scraper.toml")).unwrap();
/// println!("Job: {}", config.scraper.name);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Loads a configuration file, resolving overrides through `lookup`
pub fn load_config_with_env<F>(path: &Path, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, lookup);

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Overrides output settings from environment-style variables
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(bucket) = non_empty(ENV_S3_BUCKET) {
        config.output.s3_bucket = Some(bucket);
    }
    if let Some(endpoint) = non_empty(ENV_S3_ENDPOINT) {
        config.output.s3_endpoint = Some(endpoint);
    }
    if let Some(webhook) = non_empty(ENV_SLACK_WEBHOOK) {
        config.output.slack_webhook = Some(webhook);
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - Successfully loaded configuration and its hash
/// * `Err(ConfigError)` - Failed to load or parse the configuration
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ExtractorKind;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[scraper]
name = "quotes"
start-urls = ["https://quotes.toscrape.com/"]

[scraper.variables]
category = "humor"

[request]
timeout-secs = 5
follow-redirects = true
headers = { Accept = "text/html" }

[middleware]
user-agents = ["agent-a", "agent-b"]
proxy-service = { api-key = "secret" }

[extractor]
kind = "selector"
item = ".quote"
fields = { text = ".text", author = ".author" }

[output]
json-path = "./quotes.json"
summary-path = "./summary.md"
"#;

        let file = create_temp_config(config_content);
        let config = load_config_with_env(file.path(), no_env).unwrap();

        assert_eq!(config.scraper.name, "quotes");
        assert_eq!(config.scraper.start_urls.len(), 1);
        assert_eq!(config.scraper.variables["category"], "humor");
        assert_eq!(config.request.timeout_secs, 5);
        assert!(config.request.follow_redirects);
        assert_eq!(config.middleware.user_agents.len(), 2);
        assert!(config.middleware.log_requests);
        assert_eq!(
            config.middleware.proxy_service.as_ref().unwrap().api_key,
            "secret"
        );
        assert_eq!(config.extractor.kind, ExtractorKind::Selector);
        assert_eq!(config.extractor.fields.len(), 2);
        assert_eq!(config.output.json_path.as_deref(), Some("./quotes.json"));
        assert!(config.output.log_summary);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = create_temp_config("[scraper]\nname = \"minimal\"\n");
        let config = load_config_with_env(file.path(), no_env).unwrap();

        assert!(config.scraper.start_urls.is_empty());
        assert_eq!(config.request.timeout_secs, 10);
        assert_eq!(config.extractor.kind, ExtractorKind::Empty);
        assert!(config.output.json_path.is_none());

        let request = config.request_spec().unwrap();
        assert_eq!(request.timeout, std::time::Duration::from_secs(10));
        assert!(!request.follow_redirects);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config_with_env(file.path(), no_env);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[scraper]
name = "quotes"

[request]
timeout-secs = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config_with_env(file.path(), no_env);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_env_overrides_output_settings() {
        let config_content = r#"
[scraper]
name = "quotes"

[output]
s3-bucket = "from-file"
"#;
        let env: HashMap<&str, &str> = [
            (ENV_S3_BUCKET, "from-env"),
            (ENV_S3_ENDPOINT, "http://localhost:9000"),
            (ENV_SLACK_WEBHOOK, "  "),
        ]
        .into_iter()
        .collect();

        let file = create_temp_config(config_content);
        let config =
            load_config_with_env(file.path(), |key| env.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.output.s3_bucket.as_deref(), Some("from-env"));
        assert_eq!(
            config.output.s3_endpoint.as_deref(),
            Some("http://localhost:9000")
        );
        assert!(config.output.slack_webhook.is_none());
    }

    #[test]
    fn test_compute_config_hash() {
        let config_content = "test content";
        let file = create_temp_config(config_content);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
