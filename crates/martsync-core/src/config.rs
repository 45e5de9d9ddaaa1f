use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_MSG91_VERIFY_URL: &str =
    "https://control.msg91.com/api/v5/widget/verifyAccessToken";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_chunk = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "chunk size must be at least 1".to_string(),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("MARTSYNC_ENV", "development"));

    let bind_addr = parse_addr("MARTSYNC_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("MARTSYNC_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("MARTSYNC_CATALOG_PATH", "./config/catalog.yaml"));

    let firestore_project_id = lookup("FIRESTORE_PROJECT_ID").ok();
    let firestore_base_url = lookup("FIRESTORE_BASE_URL").ok();
    let firestore_bearer_token = lookup("FIRESTORE_BEARER_TOKEN").ok();

    let store_request_timeout_secs = parse_u64("MARTSYNC_STORE_TIMEOUT_SECS", "30")?;
    let import_chunk_size = parse_chunk("MARTSYNC_IMPORT_CHUNK_SIZE", "100")?;
    let update_chunk_size = parse_chunk("MARTSYNC_UPDATE_CHUNK_SIZE", "500")?;
    let wipe_chunk_size = parse_chunk("MARTSYNC_WIPE_CHUNK_SIZE", "100")?;

    let msg91_authkey = lookup("MSG91_AUTHKEY").ok();
    let msg91_verify_url = or_default("MSG91_VERIFY_URL", DEFAULT_MSG91_VERIFY_URL);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        firestore_project_id,
        firestore_base_url,
        firestore_bearer_token,
        store_request_timeout_secs,
        import_chunk_size,
        update_chunk_size,
        wipe_chunk_size,
        msg91_authkey,
        msg91_verify_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_development() {
        assert_eq!(parse_environment("development"), Environment::Development);
    }

    #[test]
    fn parse_environment_test() {
        assert_eq!(parse_environment("test"), Environment::Test);
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("unknown"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.firestore_project_id.is_none());
        assert!(cfg.firestore_bearer_token.is_none());
        assert_eq!(cfg.store_request_timeout_secs, 30);
        assert_eq!(cfg.import_chunk_size, 100);
        assert_eq!(cfg.update_chunk_size, 500);
        assert_eq!(cfg.wipe_chunk_size, 100);
        assert!(cfg.msg91_authkey.is_none());
        assert_eq!(cfg.msg91_verify_url, DEFAULT_MSG91_VERIFY_URL);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("MARTSYNC_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MARTSYNC_BIND_ADDR"),
            "expected InvalidEnvVar(MARTSYNC_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_import_chunk_size_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("MARTSYNC_IMPORT_CHUNK_SIZE", "25");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.import_chunk_size, 25);
    }

    #[test]
    fn build_app_config_rejects_zero_chunk_size() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("MARTSYNC_IMPORT_CHUNK_SIZE", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MARTSYNC_IMPORT_CHUNK_SIZE"),
            "expected InvalidEnvVar(MARTSYNC_IMPORT_CHUNK_SIZE), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_non_numeric_timeout() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("MARTSYNC_STORE_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MARTSYNC_STORE_TIMEOUT_SECS"),
            "expected InvalidEnvVar(MARTSYNC_STORE_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_reads_store_settings() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("FIRESTORE_PROJECT_ID", "mart-dev");
        map.insert("FIRESTORE_BASE_URL", "http://localhost:8080");
        map.insert("FIRESTORE_BEARER_TOKEN", "ya29.token");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.firestore_project_id.as_deref(), Some("mart-dev"));
        assert_eq!(
            cfg.firestore_base_url.as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(cfg.firestore_bearer_token.as_deref(), Some("ya29.token"));
    }

    #[test]
    fn build_app_config_msg91_overrides() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("MSG91_AUTHKEY", "key-123");
        map.insert("MSG91_VERIFY_URL", "http://localhost:9999/verify");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.msg91_authkey.as_deref(), Some("key-123"));
        assert_eq!(cfg.msg91_verify_url, "http://localhost:9999/verify");
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("FIRESTORE_BEARER_TOKEN", "ya29.secret");
        map.insert("MSG91_AUTHKEY", "authkey-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("ya29.secret"));
        assert!(!rendered.contains("authkey-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
