//! Configuration module.
//!
//! Loads the sweep description (query, seed statements, swept parameters)
//! and worker settings from a TOML file.

mod settings;

pub use settings::{
    expand_env_vars, ParameterSettings, Settings, SettingsError, StatementSettings,
    WorkerSettings,
};
