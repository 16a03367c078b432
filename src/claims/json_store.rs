use crate::claims::model::PaymentClaim;
use crate::claims::repository::ClaimRepository;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use uuid::Uuid;

pub const DEFAULT_FILE_NAME: &str = "pending_payments.json";

/// Claim store backed by a single pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/pending_payments.json`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ClaimRepository for JsonFileStore {
    async fn load_all(&self) -> AppResult<Vec<PaymentClaim>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No claim file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                error!("Failed to read claim file {}: {}", self.path.display(), e);
                return Err(AppError::storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let claims: Vec<PaymentClaim> = serde_json::from_str(&raw).map_err(|e| {
            error!("Claim file {} is malformed: {}", self.path.display(), e);
            AppError::storage(format!("malformed claim file {}: {}", self.path.display(), e))
        })?;

        debug!("Loaded {} claims from {}", claims.len(), self.path.display());
        Ok(claims)
    }

    async fn save_all(&self, claims: &[PaymentClaim]) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!("Failed to create data directory {}: {}", parent.display(), e);
                AppError::storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let payload = serde_json::to_vec_pretty(claims)?;

        // Write next to the target so the rename stays on one filesystem.
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, payload).await.map_err(|e| {
            error!("Failed to write claim file {}: {}", temp_path.display(), e);
            AppError::storage(format!("failed to write {}: {}", temp_path.display(), e))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            error!("Failed to replace claim file {}: {}", self.path.display(), e);
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(AppError::storage(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            )));
        }

        debug!("Saved {} claims to {}", claims.len(), self.path.display());
        Ok(())
    }
}
