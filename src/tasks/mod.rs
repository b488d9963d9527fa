//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the engine is started.
//!
//! # Tasks
//! - Cache Cleaner: Removes expired and corrupt envelope files every `clean_every`

mod cleaner;

pub use cleaner::{spawn_cleaner, sweep, CleanerHandle};
