//! Data models

pub mod transaction;
pub mod bridge;
pub mod score;

pub use transaction::*;
pub use bridge::*;
pub use score::*;
