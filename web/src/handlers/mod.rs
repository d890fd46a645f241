//! Handlers shared by every gateway router.

pub mod health;

pub use health::health_check;
