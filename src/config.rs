use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the backend API, without a trailing slash
    #[serde(default = "default_backend_api_url")]
    pub backend_api_url: String,

    /// Directory holding the built storefront UI
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Mark session cookies `Secure`
    #[serde(default)]
    pub cookie_secure: bool,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_backend_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_api_url: default_backend_api_url(),
            static_dir: default_static_dir(),
            cookie_secure: false,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    fn from_vars(vars: impl Iterator<Item = (String, String)>) -> anyhow::Result<Self> {
        let mut config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.backend_api_url = config.backend_api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
