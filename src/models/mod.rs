//! Data models

pub mod threat;
pub mod views;

pub use threat::*;
pub use views::*;
