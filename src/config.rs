//! Loads the controller's configuration: which appliances exist and how to reach them.
//!
//! ```yaml
//! log_dir: /var/log/switchyard
//! appliances:
//!   ns-lab:
//!     host: 192.0.2.10
//!     username: nsroot
//!     password: nsroot
//!     use_ssl: false
//!   ns-prod-1:
//!     host: ns-prod-1.example.com
//!     username: automation
//!     password: hunter2
//!     verify_ssl: false
//!     timeout_secs: 10
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The configuration file's name, in every directory it is searched for.
pub const CONFIG_FILE: &str = "appliances.yaml";

/// The directory under the user's home directory that may hold [CONFIG_FILE].
const USER_CONFIG_DIR: &str = ".switchyard";

#[derive(Error, Debug)]
pub enum Error {
    #[error("no configuration file found; searched: {}", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("appliance not configured: {0}")]
    UnknownAppliance(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns a [PathBuf] to the directory where switchyard's system-wide configuration should live.
///
/// When compiled for testing, this returns `CARGO_MANIFEST_DIR` plus `resources/etc/switchyard`.
/// Otherwise, it returns `/etc/switchyard`.
pub fn config_dir() -> PathBuf {
    // Omit the leading slash so that PathBuf::push appends instead of replacing.
    const CONFIG_DIR: &str = "etc/switchyard";

    let mut path = PathBuf::new();

    #[cfg(test)]
    {
        path.push(env!("CARGO_MANIFEST_DIR"));
        path.push("resources");
    }

    #[cfg(not(test))]
    path.push("/");

    path.push(CONFIG_DIR);
    path
}

/// Connection settings for one appliance.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplianceConfig {
    /// Host name or IP address, optionally with a port.
    pub host: String,

    pub username: String,

    pub password: String,

    /// Use HTTPS rather than HTTP.
    #[serde(default = "default_true")]
    pub use_ssl: bool,

    /// Verify the appliance's TLS certificate. Appliances often ship with self-signed
    /// certificates; set this to `false` to accept them.
    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl fmt::Debug for ApplianceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplianceConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("use_ssl", &self.use_ssl)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// The controller's configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where to write audit logs. Audit logging is off when this is unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Appliances by name. Names are what manifests and `switchyard call` target.
    #[serde(default)]
    pub appliances: IndexMap<String, ApplianceConfig>,
}

impl Config {
    /// Finds and loads the configuration file.
    ///
    /// If `explicit` is given, only that file is tried. Otherwise, the first of these that exists
    /// is used:
    ///
    /// 1. `~/.switchyard/appliances.yaml`
    /// 2. [config_dir]`/appliances.yaml`
    pub fn load(explicit: Option<&Path>) -> Result<Self, Error> {
        let path = Self::locate(explicit)?;
        Self::from_file(path)
    }

    /// Returns the path [Self::load] would read.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, Error> {
        if let Some(path) = explicit {
            return Ok(path.to_owned());
        }

        let mut candidates = Vec::new();
        if let Some(home) = home::home_dir() {
            candidates.push(home.join(USER_CONFIG_DIR).join(CONFIG_FILE));
        }
        candidates.push(config_dir().join(CONFIG_FILE));

        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(Error::NotFound {
                searched: candidates,
            }),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| Error::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn appliance(&self, name: &str) -> Result<&ApplianceConfig, Error> {
        self.appliances
            .get(name)
            .ok_or_else(|| Error::UnknownAppliance(name.to_owned()))
    }

    /// Configured appliance names, in file order.
    pub fn appliance_names(&self) -> Vec<&str> {
        self.appliances.keys().map(String::as_str).collect()
    }
}
