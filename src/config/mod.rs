use std::env;
use std::path::PathBuf;

/// Runtime configuration, loaded from the environment with sane defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection string (default: local sqlite file)
    pub database_url: String,

    /// Directory where uploaded originals are stored (default: "uploads")
    pub upload_dir: PathBuf,

    /// Port to bind on (default: 4000)
    pub port: u16,

    /// Maximum size per uploaded file in bytes (default: 10 MB)
    pub max_file_size: usize,

    /// Maximum total request body size in bytes (default: 64 MB) — a single
    /// upload request may carry several files
    pub max_request_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://gallery.db?mode=rwc".to_string(),
            upload_dir: PathBuf::from("uploads"),
            port: 4000,
            max_file_size: 10 * 1024 * 1024,
            max_request_size: 64 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            max_request_size: env::var("MAX_REQUEST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_request_size),
        }
    }
}
