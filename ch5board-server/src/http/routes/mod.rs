//! Route handlers organized by resource

pub mod health;
pub mod boards;
pub mod threads;
pub mod responses;
