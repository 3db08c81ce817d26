use std::env;

#[derive(Clone)]
pub struct Config {
    pub gateway_url: String,
    pub gateway_key: String,
    pub database_url: String,
}

impl Config {
    /// Loads `.env` when present, then reads the environment.
    pub fn load() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            gateway_url: env::var("NEOFIT_GATEWAY_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:54321".to_string()),
            gateway_key: env::var("NEOFIT_GATEWAY_KEY").unwrap_or_default(),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:neofit.db?mode=rwc".to_string()),
        })
    }
}
