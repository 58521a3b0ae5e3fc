//! Commands
//!
//! The command surface used by front ends. Every command takes the shared
//! `AppState` and returns a `CommandResponse`.

pub mod backend;
pub mod conversation;
pub mod export;
pub mod health;
pub mod pipeline;
pub mod settings;

pub use backend::*;
pub use conversation::*;
pub use export::*;
pub use health::*;
pub use pipeline::*;
pub use settings::*;
