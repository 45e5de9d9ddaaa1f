//! Shared helpers for store-backed commands: client construction and
//! field rendering. Commands receive the store handle from here and pass
//! it down — there is no process-wide store.

use martsync_core::{catalog::load_catalog, AppConfig, CatalogRules};
use martsync_store::{DocValue, FirestoreClient, StoreError};

/// Build the Firestore client from config. Fails when the project id is
/// missing — only commands that actually touch the store call this.
///
/// # Errors
///
/// Returns [`StoreError::MissingProjectId`] when `FIRESTORE_PROJECT_ID`
/// is unset, or a client construction error.
pub fn build_store(config: &AppConfig) -> Result<FirestoreClient, StoreError> {
    let project_id = config
        .firestore_project_id
        .as_deref()
        .ok_or(StoreError::MissingProjectId)?;
    let token = config.firestore_bearer_token.clone();

    match config.firestore_base_url.as_deref() {
        Some(base_url) => FirestoreClient::with_base_url(
            project_id,
            token,
            config.store_request_timeout_secs,
            base_url,
        ),
        None => FirestoreClient::new(project_id, token, config.store_request_timeout_secs),
    }
}

/// Load catalog rules from the configured file, falling back to the
/// compiled-in set when the file is absent.
///
/// # Errors
///
/// Returns a config error when the file exists but cannot be parsed or
/// fails validation.
pub fn load_rules(config: &AppConfig) -> anyhow::Result<CatalogRules> {
    if config.catalog_path.exists() {
        Ok(load_catalog(&config.catalog_path)?)
    } else {
        tracing::info!(
            path = %config.catalog_path.display(),
            "catalog file not found, using built-in rules"
        );
        Ok(CatalogRules::builtin())
    }
}

/// Render a field value for terminal output.
#[must_use]
pub fn render_value(value: &DocValue) -> String {
    match value {
        DocValue::Null | DocValue::ServerTimestamp => "null".to_string(),
        DocValue::Bool(b) => b.to_string(),
        DocValue::Integer(v) => v.to_string(),
        DocValue::Double(v) => v.to_string(),
        DocValue::Text(s) => s.clone(),
        DocValue::Timestamp(t) => t.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use martsync_core::Environment;

    use super::*;

    fn config_without_store() -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            catalog_path: PathBuf::from("./does-not-exist.yaml"),
            firestore_project_id: None,
            firestore_base_url: None,
            firestore_bearer_token: None,
            store_request_timeout_secs: 30,
            import_chunk_size: 100,
            update_chunk_size: 500,
            wipe_chunk_size: 100,
            msg91_authkey: None,
            msg91_verify_url: "http://localhost/verify".to_string(),
        }
    }

    #[test]
    fn build_store_requires_project_id() {
        let result = build_store(&config_without_store());
        assert!(matches!(result, Err(StoreError::MissingProjectId)));
    }

    #[test]
    fn build_store_accepts_emulator_base_url() {
        let mut config = config_without_store();
        config.firestore_project_id = Some("mart-dev".to_string());
        config.firestore_base_url = Some("http://localhost:8080".to_string());
        assert!(build_store(&config).is_ok());
    }

    #[test]
    fn load_rules_falls_back_to_builtin() {
        let rules = load_rules(&config_without_store()).unwrap();
        assert_eq!(rules.header_marker, "PRODUCTS");
    }

    #[test]
    fn render_value_shapes() {
        assert_eq!(render_value(&DocValue::Text("Rava".to_string())), "Rava");
        assert_eq!(render_value(&DocValue::Double(26.4)), "26.4");
        assert_eq!(render_value(&DocValue::Bool(true)), "true");
        assert_eq!(render_value(&DocValue::Null), "null");
    }
}
