use serde::Deserialize;

use crate::glucose::ModelKind;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Remote vision-model endpoint used for photo meals.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub vision: VisionConfig,
    /// Preset used when a predict request does not name a model.
    pub default_model: ModelKind,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "glucast".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "glucast-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let vision = VisionConfig {
            endpoint: std::env::var("VISION_ENDPOINT")?,
            api_key: std::env::var("VISION_API_KEY").unwrap_or_default(),
            timeout_secs: std::env::var("VISION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        };
        let default_model = std::env::var("PREDICTION_MODEL")
            .ok()
            .and_then(|v| ModelKind::from_label(&v))
            .unwrap_or(ModelKind::Baseline);
        Ok(Self {
            database_url,
            jwt,
            vision,
            default_model,
        })
    }
}
