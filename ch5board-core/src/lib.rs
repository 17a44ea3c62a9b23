pub mod config;
pub mod error;
pub mod identity;
pub mod momentum;

pub use config::{BoardConfig, BoardSeed, DatabaseSection, IdentitySalts, PostingRules, ServerSection};
pub use error::{CoreError, Result};
pub use identity::IdentityHasher;
pub use momentum::momentum;
