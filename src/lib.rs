//! Validate skill directories and package them into `.skill` archives.

pub mod config;
pub mod error;
pub mod skillpacks;

pub use error::{Result, SkillError};
