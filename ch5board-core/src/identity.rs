//! Poster identity hashing
//!
//! Two derived values per submission:
//! - a short daily ID shown next to each response, stable for one
//!   address within one UTC day
//! - a full address hash kept for moderation, never shown to clients

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::config::IdentitySalts;

/// Length of the public daily poster ID
pub const USER_ID_LEN: usize = 8;

/// Derives poster identities from a client address
#[derive(Debug, Clone)]
pub struct IdentityHasher {
    salts: IdentitySalts,
}

impl IdentityHasher {
    pub fn new(salts: IdentitySalts) -> Self {
        Self { salts }
    }

    /// Daily poster ID: first 8 hex chars of SHA-256(ip ‖ YYYY-MM-DD ‖ salt).
    pub fn user_id(&self, ip: &str, day: NaiveDate) -> String {
        let mut hasher = Sha256::new();
        hasher.update(ip.as_bytes());
        hasher.update(day.format("%Y-%m-%d").to_string().as_bytes());
        hasher.update(self.salts.user_id_salt.as_bytes());
        let hash = hex::encode(hasher.finalize());
        hash[..USER_ID_LEN].to_string()
    }

    /// Stored address hash: hex SHA-256(ip ‖ ip_salt).
    pub fn ip_hash(&self, ip: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(ip.as_bytes());
        hasher.update(self.salts.ip_salt.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl Default for IdentityHasher {
    fn default() -> Self {
        Self::new(IdentitySalts::default())
    }
}
