//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ArchivistConfig, DynamoDbConfig, StoreBackend};
use crate::config::secret_string;
use crate::domain::errors::ArchivistError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ArchivistConfig
/// 4. Applies environment variable overrides (ARCHIVIST_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use archivist::config::loader::load_config;
///
/// let config = load_config("archivist.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ArchivistConfig> {
    let config = parse_config(path)?;

    config.validate().map_err(|e| {
        ArchivistError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Loads configuration without validating it
///
/// Used by callers that adjust the configuration (e.g. CLI flags) before
/// validating.
pub fn parse_config(path: impl AsRef<Path>) -> Result<ArchivistConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ArchivistError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ArchivistError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ArchivistConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ArchivistError::Configuration(e.to_string()))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(ArchivistError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parsed_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env(name) {
        Some(val) => val.parse().map(Some).map_err(|_| {
            ArchivistError::Configuration(format!("Invalid value for {name}: '{val}'"))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using ARCHIVIST_* prefix
///
/// Environment variables follow the pattern: ARCHIVIST_<SECTION>_<KEY>
/// For example: ARCHIVIST_ORCHESTRATOR_POLL_INTERVAL_SECONDS, ARCHIVIST_STORE_BACKEND
fn apply_env_overrides(config: &mut ArchivistConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env("ARCHIVIST_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parsed_env("ARCHIVIST_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Export overrides
    if let Some(val) = env("ARCHIVIST_EXPORT_DESTINATION_PREFIX") {
        config.export.destination_prefix = val;
    }
    if let Some(val) = parsed_env("ARCHIVIST_EXPORT_WINDOW_DAYS")? {
        config.export.window_days = val;
    }
    if let Some(val) = env("ARCHIVIST_EXPORT_WINDOW_START") {
        config.export.window_start = Some(val);
    }
    if let Some(val) = env("ARCHIVIST_EXPORT_WINDOW_END") {
        config.export.window_end = Some(val);
    }
    if let Some(val) = env("ARCHIVIST_EXPORT_LOG_GROUP_PREFIX") {
        config.export.log_group_prefix = Some(val);
    }

    // Orchestrator overrides
    if let Some(val) = parsed_env("ARCHIVIST_ORCHESTRATOR_POLL_INTERVAL_SECONDS")? {
        config.orchestrator.poll_interval_seconds = val;
    }
    if let Some(val) = parsed_env("ARCHIVIST_ORCHESTRATOR_RUN_TIMEOUT_SECONDS")? {
        config.orchestrator.run_timeout_seconds = val;
    }
    if let Some(val) = env("ARCHIVIST_ORCHESTRATOR_SCHEDULE") {
        config.orchestrator.schedule = val;
    }

    // Store overrides
    if let Some(val) = env("ARCHIVIST_STORE_BACKEND") {
        config.store.backend = StoreBackend::from_str(&val).map_err(ArchivistError::Configuration)?;
    }
    if let Some(val) = env("ARCHIVIST_STORE_DYNAMODB_TABLE_NAME") {
        config
            .store
            .dynamodb
            .get_or_insert_with(DynamoDbConfig::default)
            .table_name = val;
    }
    if let Some(val) = env("ARCHIVIST_STORE_DYNAMODB_ENDPOINT_URL") {
        config
            .store
            .dynamodb
            .get_or_insert_with(DynamoDbConfig::default)
            .endpoint_url = Some(val);
    }
    if let Some(ref mut pg_config) = config.store.postgresql {
        if let Some(val) = env("ARCHIVIST_STORE_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Some(val) = env("ARCHIVIST_STORE_POSTGRESQL_SSL_MODE") {
            pg_config.ssl_mode = val;
        }
    }

    // Notification overrides
    if let Some(val) = env("ARCHIVIST_NOTIFICATION_TOPIC_ARN") {
        config.notification.topic_arn = Some(val);
    }

    // Logging overrides
    if let Some(val) = parsed_env("ARCHIVIST_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("ARCHIVIST_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
