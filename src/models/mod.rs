//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod export;
pub mod response;
pub mod settings;

pub use export::*;
pub use response::*;
pub use settings::*;
