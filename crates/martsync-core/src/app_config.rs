use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    /// GCP project the `products`/`categories` collections live in.
    /// Optional so sheet-only commands run without store credentials;
    /// store-backed commands fail at client construction when unset.
    pub firestore_project_id: Option<String>,
    /// Override for the Firestore REST endpoint (emulator or tests).
    pub firestore_base_url: Option<String>,
    /// Pre-issued OAuth bearer token; absent means unauthenticated
    /// (emulator) access.
    pub firestore_bearer_token: Option<String>,
    pub store_request_timeout_secs: u64,
    pub import_chunk_size: usize,
    pub update_chunk_size: usize,
    pub wipe_chunk_size: usize,
    pub msg91_authkey: Option<String>,
    pub msg91_verify_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("firestore_project_id", &self.firestore_project_id)
            .field("firestore_base_url", &self.firestore_base_url)
            .field(
                "firestore_bearer_token",
                &self.firestore_bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "store_request_timeout_secs",
                &self.store_request_timeout_secs,
            )
            .field("import_chunk_size", &self.import_chunk_size)
            .field("update_chunk_size", &self.update_chunk_size)
            .field("wipe_chunk_size", &self.wipe_chunk_size)
            .field(
                "msg91_authkey",
                &self.msg91_authkey.as_ref().map(|_| "[redacted]"),
            )
            .field("msg91_verify_url", &self.msg91_verify_url)
            .finish()
    }
}
