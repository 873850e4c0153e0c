//! Pyproject Settings
//!
//! Loads Django-style settings from a `pyproject.toml` document, running
//! every entry through a recursive directive resolver and applying
//! environment-dependent tier overrides.

pub mod cli;
pub mod error;
pub mod settings;

pub use error::{SettingsError, SettingsResult};
pub use settings::{Settings, SettingsLoader};
