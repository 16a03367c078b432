//! Payment claim records and their on-disk store.

pub mod json_store;
pub mod model;
pub mod repository;

pub use json_store::JsonFileStore;
pub use model::{
    filter_newest_first, reference_in_use, ClaimFilter, ClaimStatus, ClaimSummary, PaymentClaim,
};
pub use repository::ClaimRepository;
