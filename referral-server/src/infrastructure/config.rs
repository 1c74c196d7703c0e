use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub hunter_api_url: String,
    pub hunter_api_key: String,
    /// Link included in referral emails, pointing at the end-registration
    /// endpoint of this deployment.
    pub registration_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let mail_api_url = std::env::var("MAIL_API_URL")
            .map_err(|_| anyhow::anyhow!("MAIL_API_URL must be set"))?;
        let mail_api_key = std::env::var("MAIL_API_KEY")
            .map_err(|_| anyhow::anyhow!("MAIL_API_KEY must be set"))?;
        let mail_from =
            std::env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@localhost".into());
        let hunter_api_url = std::env::var("EMAIL_HUNTER_API_URL")
            .unwrap_or_else(|_| "https://api.hunter.io/v2".into());
        let hunter_api_key = std::env::var("EMAIL_HUNTER_API_KEY")
            .map_err(|_| anyhow::anyhow!("EMAIL_HUNTER_API_KEY must be set"))?;
        let registration_url = std::env::var("REGISTRATION_URL").unwrap_or_else(|_| {
            format!("http://{}:{}/api/users/end_registration", host, port)
        });

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            cors_origins,
            mail_api_url,
            mail_api_key,
            mail_from,
            hunter_api_url,
            hunter_api_key,
            registration_url,
        })
    }
}
