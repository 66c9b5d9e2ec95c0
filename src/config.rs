//! Configuration loading.
//!
//! The default configuration file is `flare.toml` in the current working
//! directory. Use [`Config::load`] to read it:
//!
//! ```rust,no_run
//! use flare::config::Config;
//!
//! let config = Config::load(None).expect("failed to load config");
//! ```

use std::path::Path;

use crate::types::ActionPolicy;

fn default_osv_timeout() -> u64 {
    1500
}

/// Configuration for one [`crate::assess::assess`] call.
///
/// Loaded from a TOML file (typically `flare.toml`). Unlike the teacher's
/// config, [`action_policy`](Config::action_policy) has no default: `spec.md`
/// §3 requires every caller to state it explicitly.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(rename = "actionPolicy")]
    pub action_policy: ActionPolicy,

    #[serde(rename = "sensitivePatterns", default)]
    pub sensitive_patterns: Vec<String>,

    #[serde(rename = "safeHosts", default)]
    pub safe_hosts: Vec<String>,

    #[serde(rename = "osvTimeout", default = "default_osv_timeout")]
    pub osv_timeout: u64,

    #[serde(rename = "packageAllowlist", default)]
    pub package_allowlist: Vec<String>,

    #[serde(rename = "commandAllowlist", default)]
    pub command_allowlist: Vec<String>,
}

impl Config {
    /// The reference configuration: the reference action policy and every
    /// other field at its default. Used by the CLI when no config file is
    /// found, and by tests that don't care about policy specifics.
    pub fn reference() -> Self {
        Config {
            action_policy: ActionPolicy::reference(),
            sensitive_patterns: Vec::new(),
            safe_hosts: Vec::new(),
            osv_timeout: default_osv_timeout(),
            package_allowlist: Vec::new(),
            command_allowlist: Vec::new(),
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// Resolution order:
    /// 1. If `path` is `Some`, load from that file (error if missing).
    /// 2. If `path` is `None`, try `flare.toml` in the current directory.
    /// 3. If that file does not exist either, return [`Config::reference`].
    ///
    /// # Errors
    ///
    /// Returns `Err(String)` when:
    /// - The explicit path does not exist.
    /// - The file cannot be read from disk.
    /// - The TOML content fails to parse (including a missing `actionPolicy`).
    pub fn load(path: Option<&Path>) -> Result<Config, String> {
        let config_path = if let Some(p) = path {
            if p.exists() {
                Some(p.to_path_buf())
            } else {
                return Err(format!("Config file not found: {}", p.display()));
            }
        } else {
            let default_path = Path::new("flare.toml");
            if default_path.exists() {
                Some(default_path.to_path_buf())
            } else {
                None
            }
        };

        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
                toml::from_str(&content).map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))
            }
            None => Ok(Config::reference()),
        }
    }

    /// Returns `true` when `command` begins with a [`command_allowlist`](Config::command_allowlist) prefix.
    pub fn is_allowlisted_command(&self, command: &str) -> bool {
        self.command_allowlist.iter().any(|prefix| command.starts_with(prefix.as_str()))
    }
}
