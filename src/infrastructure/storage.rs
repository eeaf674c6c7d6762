use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::services::storage::LocalStorageService;

pub async fn setup_storage(upload_dir: &Path) -> anyhow::Result<Arc<LocalStorageService>> {
    tokio::fs::create_dir_all(upload_dir).await?;
    info!("🗂️  Upload directory: {}", upload_dir.display());

    Ok(Arc::new(LocalStorageService::new(upload_dir.to_path_buf())))
}
