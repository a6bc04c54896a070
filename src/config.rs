use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub secure_cookies: bool,
    pub seed_email: String,
    pub seed_password: String,
}

impl Config {
    /// Read settings from the environment, falling back to local development defaults.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:data/journal.db".to_string());

        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 5000)));

        let secure_cookies = std::env::var("SECURE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            database_url,
            bind_addr,
            secure_cookies,
            seed_email: std::env::var("SEED_EMAIL")
                .unwrap_or_else(|_| "techdegreestudent@treehouse.com".to_string()),
            seed_password: std::env::var("SEED_PASSWORD").unwrap_or_else(|_| "lemon pie".to_string()),
        }
    }
}
