use crate::claims::model::PaymentClaim;
use crate::error::AppResult;
use async_trait::async_trait;

/// Whole-list persistence for payment claims.
///
/// Every workflow operation re-reads the full list, mutates it in memory and writes
/// it back. There is no locking: two writers racing on `save_all` lose one update
/// (last write wins).
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Read every stored claim in insertion order. A store that has never been
    /// written reads as empty.
    async fn load_all(&self) -> AppResult<Vec<PaymentClaim>>;

    /// Replace the stored list. Readers never observe a partial write.
    async fn save_all(&self, claims: &[PaymentClaim]) -> AppResult<()>;
}
