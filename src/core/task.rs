//! Types for representing task files.

use crate::core::action::Action;
#[cfg(doc)]
use crate::core::manifest::Manifest;
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Represents a task file; typically used in the context of a [Manifest].
///
/// ```yaml
/// name: web front end
/// vars:
///   vip: 10.0.0.10
/// actions:
///   - add_csvserver:
///       name: web
///       servicetype: HTTP
///       ipv46: $vip
///       port: 80
///   - add_csvserver_cspolicy_binding:
///       name: web
///       policyname: images
///       priority: 100
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Task {
    /// The file from which this value was parsed (if any).
    #[serde(skip)]
    pub source: Option<PathBuf>,

    /// The [Task]'s name. Used for informational, logging, and debugging purposes.
    pub name: String,

    /// The list of [Action]s that comprise this [Task].
    ///
    /// Order is preserved from the source file. Actions are executed in order.
    pub actions: Vec<Action>,

    /// [Task]-level variables, which are substituted into actions when they run.
    ///
    /// Order is preserved from the source file and matters only for cascading substitutions.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub vars: IndexMap<String, String>,
}

impl Task {
    /// Loads a task file. Sets [Self::source] to `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read task file {}", path.display()))?;
        let mut task: Task = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse task file {}", path.display()))?;
        task.source = Some(path.to_owned());
        Ok(task)
    }
}
