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
    pub reviews_path: PathBuf,
    pub geoapify_key: String,
    pub geocode_base_url: String,
    pub places_base_url: String,
    pub request_timeout_secs: u64,
    pub result_limit: u32,
    /// Starting search radius used when a caller does not supply one.
    pub default_radius_km: f64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("reviews_path", &self.reviews_path)
            .field("geoapify_key", &"[redacted]")
            .field("geocode_base_url", &self.geocode_base_url)
            .field("places_base_url", &self.places_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("result_limit", &self.result_limit)
            .field("default_radius_km", &self.default_radius_km)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
