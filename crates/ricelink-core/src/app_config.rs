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
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub facilities_path: PathBuf,
    pub password_hash_salt: String,
    pub vietmap_api_key: Option<String>,
    pub vietmap_base_url: String,
    pub vietmap_timeout_secs: u64,
    pub route_max_concurrent: usize,
    pub chatbot_endpoint: Option<String>,
    pub chatbot_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("facilities_path", &self.facilities_path)
            .field("database_url", &"[redacted]")
            .field("password_hash_salt", &"[redacted]")
            .field(
                "vietmap_api_key",
                &self.vietmap_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("vietmap_base_url", &self.vietmap_base_url)
            .field("vietmap_timeout_secs", &self.vietmap_timeout_secs)
            .field("route_max_concurrent", &self.route_max_concurrent)
            .field("chatbot_endpoint", &self.chatbot_endpoint)
            .field("chatbot_timeout_secs", &self.chatbot_timeout_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
