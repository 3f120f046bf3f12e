use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    pub folder_path: PathBuf,
    pub max_size_mb: u64,
}

impl ImagesConfig {
    /// Saturates instead of overflowing on absurd configured sizes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub images: ImagesConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url_from_parts(),
        };
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let images = ImagesConfig {
            folder_path: std::env::var("IMAGES_FOLDER_PATH")
                .unwrap_or_else(|_| "./images".into())
                .into(),
            max_size_mb: std::env::var("PROFILE_PICTURE_MAX_SIZE_MB")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5),
        };
        Ok(Self {
            database_url,
            db_max_connections,
            images,
        })
    }
}

fn database_url_from_parts() -> String {
    let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.into());
    format!(
        "postgres://{}:{}@{}:{}/{}",
        var("DB_USERNAME", "postgres"),
        var("DB_PASSWORD", "password123"),
        var("DB_HOST", "localhost"),
        var("DB_PORT", "5432"),
        var("DB_NAME", "marketplace"),
    )
}
