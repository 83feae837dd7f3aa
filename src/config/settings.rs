//! TOML-based sweep configuration.
//!
//! Example configuration:
//! ```toml
//! title = "Join strategy by table size"
//! query = "SELECT * FROM a JOIN b ON a.id = b.a_id"
//!
//! [[setup]]
//! statement = "CREATE TABLE a AS SELECT generate_series(1, $1) AS id"
//! parameters = 1
//!
//! [[setup]]
//! statement = "CREATE TABLE b AS SELECT generate_series(1, $1) AS a_id"
//! parameters = 1
//!
//! [[parameters]]
//! name = "rows in a"
//! start = 10
//! stop = 100000
//! steps = 20
//!
//! [[parameters]]
//! name = "rows in b"
//! start = 10
//! stop = 100000
//! steps = 20
//!
//! [worker]
//! path = "${HOME}/bin/plancharts-worker"
//! args = ["--image", "postgres:16"]
//! timeout_secs = 600
//! ```

use serde::{Deserialize, Serialize};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sweep::{ParameterConfig, ParameterizedStatement};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("No config file given and none found in the default locations")]
    NoConfigFile,

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Chart and report title.
    #[serde(default)]
    pub title: String,

    /// The query whose plan is captured for every sample.
    pub query: String,

    /// Seed statements, run in order before planning.
    #[serde(default)]
    pub setup: Vec<StatementSettings>,

    /// Swept parameters (zero, one or two).
    #[serde(default)]
    pub parameters: Vec<ParameterSettings>,

    /// Worker configuration.
    #[serde(default)]
    pub worker: WorkerSettings,
}

/// One seed statement.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatementSettings {
    /// SQL text with `$1`, `$2`, ... placeholders.
    pub statement: String,

    /// How many sweep parameter values this statement consumes.
    #[serde(default)]
    pub parameters: usize,
}

/// One swept axis.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParameterSettings {
    /// Axis label.
    pub name: String,
    pub start: f64,
    pub stop: f64,
    /// Requested number of samples; rounding may yield fewer.
    pub steps: usize,
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to worker binary (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Extra command-line arguments for the worker.
    pub args: Vec<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            args: Vec::new(),
            timeout_secs: 600,
        }
    }
}

impl WorkerSettings {
    /// Get the worker binary path.
    ///
    /// Returns the configured path, or searches common locations and `PATH`.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        let candidates = [
            "plancharts-worker",
            "./plancharts-worker",
            "./worker/plancharts-worker",
        ];

        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        // Try PATH
        if let Ok(output) = std::process::Command::new("which")
            .arg("plancharts-worker")
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }

    /// Worker arguments with environment variables expanded.
    pub fn resolved_args(&self) -> Result<Vec<String>, SettingsError> {
        self.args.iter().map(|arg| expand_env_vars(arg)).collect()
    }
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `PLANCHARTS_CONFIG`
    /// 2. `./plancharts.toml`
    /// 3. `~/.config/plancharts/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("PLANCHARTS_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("plancharts.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("plancharts").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Err(SettingsError::NoConfigFile)
    }

    /// Check the configuration for problems that would waste a sweep.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.query.trim().is_empty() {
            return Err(SettingsError::InvalidConfig("query is empty".to_string()));
        }

        if self.parameters.len() > 2 {
            return Err(SettingsError::InvalidConfig(format!(
                "at most two parameters can be swept, got {}",
                self.parameters.len()
            )));
        }

        for param in &self.parameters {
            let positive = |v: f64| v.is_finite() && v > 0.0;
            if !positive(param.start) || !positive(param.stop) || param.steps == 0 {
                return Err(SettingsError::InvalidConfig(format!(
                    "parameter '{}' needs start > 0, stop > 0 and steps >= 1",
                    param.name
                )));
            }
        }

        let declared: usize = self.setup.iter().map(|s| s.parameters).sum();
        if declared != self.parameters.len() {
            return Err(SettingsError::InvalidConfig(format!(
                "setup statements consume {} parameter values but {} parameters are swept",
                declared,
                self.parameters.len()
            )));
        }

        for (i, stmt) in self.setup.iter().enumerate() {
            let placeholders = placeholder_count(&stmt.statement).map_err(|e| {
                SettingsError::InvalidConfig(format!("setup statement {}: {}", i + 1, e))
            })?;
            if placeholders != stmt.parameters {
                return Err(SettingsError::InvalidConfig(format!(
                    "setup statement {} declares {} parameters but uses {} placeholders",
                    i + 1,
                    stmt.parameters,
                    placeholders
                )));
            }
            warn_unparsed("setup statement", &stmt.statement);
        }
        warn_unparsed("query", &self.query);

        Ok(())
    }

    /// Seed statements in declaration order.
    pub fn statements(&self) -> Vec<ParameterizedStatement> {
        self.setup
            .iter()
            .map(|s| ParameterizedStatement::new(s.statement.clone(), s.parameters))
            .collect()
    }

    /// Swept axes in declaration order.
    pub fn parameter_configs(&self) -> Vec<ParameterConfig> {
        self.parameters
            .iter()
            .map(|p| ParameterConfig::new(p.name.clone(), p.start, p.stop, p.steps))
            .collect()
    }
}

/// Highest `$n` placeholder index used in a statement.
fn placeholder_count(sql: &str) -> Result<usize, String> {
    let tokens = Tokenizer::new(&PostgreSqlDialect {}, sql)
        .tokenize()
        .map_err(|e| e.to_string())?;

    let mut max = 0;
    for token in tokens {
        if let Token::Placeholder(p) = token {
            let index = p
                .strip_prefix('$')
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| format!("unsupported placeholder {}", p))?;
            max = max.max(index);
        }
    }
    Ok(max)
}

/// sqlparser does not cover every PostgreSQL statement, so parse failures are
/// only reported; the database has the final word.
fn warn_unparsed(what: &str, sql: &str) {
    if let Err(e) = Parser::parse_sql(&PostgreSqlDialect {}, sql) {
        tracing::warn!(error = %e, sql, "{} could not be parsed locally", what);
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
