//! Types for representing manifest files.
use crate::core::action::{Action, HostAction};
#[cfg(doc)]
use crate::core::plan::Plan;
use crate::core::task::Task;
use crate::targeting::{self, Target};
use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Represents one document in a manifest file; typically used in the context of a [Plan].
///
/// ```yaml
/// name: storefront
/// appliances:
///   - ns-prod-*
/// include:
///   - tasks/web.yaml
///   - tasks/policies.yaml
/// vars:
///   vip: 10.0.0.10
/// ```
///
/// A manifest file may contain several documents, separated by `---`.
#[derive(Clone, Debug, PartialEq)]
pub struct Manifest {
    /// The file from which this value was parsed (if any).
    pub source: Option<PathBuf>,

    /// The [Manifest]'s name. Used for informational, logging, and debugging purposes.
    pub name: String,

    /// The appliances this manifest configures.
    ///
    /// In a manifest file, entries may be glob patterns. [Plan::expand_appliances] replaces them
    /// with the configured appliance names they match.
    pub appliances: Vec<String>,

    /// [Task]s (loaded from task files) that comprise this manifest.
    ///
    /// Order is preserved from the source file. Tasks are executed in order.
    pub include: Vec<Task>,

    /// [Manifest]-level variables, which are substituted into actions when they run.
    ///
    /// Order is preserved from the source file and matters only for cascading substitutions.
    pub vars: IndexMap<String, String>,
}

/// The on-disk form of a [Manifest], before its task files are loaded.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    name: String,

    #[serde(default)]
    appliances: Vec<String>,

    /// Paths to task files, relative to the manifest file.
    #[serde(default)]
    include: Vec<PathBuf>,

    #[serde(default)]
    vars: IndexMap<String, String>,
}

/// Loads [Manifest] values from a manifest file, along with the task files each one includes.
pub fn load_manifests(path: impl AsRef<Path>) -> anyhow::Result<Vec<Manifest>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest file {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let mut manifests = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&contents) {
        let file = ManifestFile::deserialize(document)
            .with_context(|| format!("failed to parse manifest file {}", path.display()))?;

        let include = file
            .include
            .iter()
            .map(|task| Task::load(base.join(task)))
            .collect::<anyhow::Result<_>>()
            .with_context(|| format!("in manifest \"{}\" ({})", file.name, path.display()))?;

        manifests.push(Manifest {
            source: Some(path.to_owned()),
            name: file.name,
            appliances: file.appliances,
            include,
            vars: file.vars,
        });
    }
    Ok(manifests)
}

impl Manifest {
    /// Replaces glob patterns in [Self::appliances] with the names in `configured` that they
    /// match. Keeps the first occurrence of each name.
    ///
    /// Returns an error if a pattern is invalid or matches nothing.
    pub fn expand_appliances<S: AsRef<str>>(
        &mut self,
        configured: &[S],
    ) -> Result<(), targeting::Error> {
        let mut expanded: Vec<String> = Vec::new();
        for pattern in &self.appliances {
            for name in Target::parse(pattern)?.select(configured)? {
                if !expanded.iter().any(|e| e == name) {
                    expanded.push(name.to_owned());
                }
            }
        }
        self.appliances = expanded;
        Ok(())
    }

    /// Returns a [TaskIter] over tasks in this manifest, or [None] if `appliance` doesn't
    /// match.
    pub(in crate::core) fn tasks_for<'p>(&'p self, appliance: &'p str) -> Option<TaskIter<'p>> {
        if self.appliances.iter().all(|a| appliance != a) {
            return None;
        }

        Some(TaskIter {
            appliance,
            manifest: self,
            task_iter: self.include.iter(),
            current: None,
        })
    }

    /// Owned version of [Self::tasks_for].
    pub(in crate::core) fn into_tasks_for(
        self,
        appliance: impl Into<String>,
    ) -> Option<TaskIntoIter> {
        let appliance = appliance.into();

        if self.appliances.iter().all(|a| &appliance != a) {
            return None;
        }

        let task_iter = self.include.clone().into_iter();
        Some(TaskIntoIter {
            appliance,
            manifest: self,
            task_iter,
            current: None,
        })
    }
}

/// Iterates over [Task]s in a [Manifest].
///
/// Returns [HostAction] values representing a given [Action] in the context of an appliance and
/// [Manifest].
#[derive(Debug)]
pub(in crate::core) struct TaskIter<'p> {
    /// Passed through to [HostAction].
    appliance: &'p str,

    /// Passed through to [HostAction].
    manifest: &'p Manifest,

    /// Yields the [Task]s that TaskIter walks.
    task_iter: std::slice::Iter<'p, Task>,

    /// The [Task] from which [Action]s are currently being read, and an iterator over the rest of
    /// its [Action]s. [None] until the first [Task] is reached.
    current: Option<(&'p Task, std::slice::Iter<'p, Action>)>,
}

impl<'p> Iterator for TaskIter<'p> {
    type Item = Arc<HostAction>;

    fn next(&mut self) -> Option<Self::Item> {
        // If the current `Task` has another `Action` for us, then we're done.
        if let Some((task, actions)) = self.current.as_mut() {
            if let Some(action) = actions.next() {
                return Some(Arc::new(HostAction::new(
                    self.appliance,
                    self.manifest,
                    task,
                    action,
                )));
            }
        }

        // If we have another `Task`, then move on to its `Action`s and retry.
        if let Some(task) = self.task_iter.next() {
            self.current = Some((task, task.actions.iter()));
            return self.next();
        }

        None
    }
}

/// Owned version of [TaskIter].
#[derive(Debug)]
pub(in crate::core) struct TaskIntoIter {
    appliance: String,

    manifest: Manifest,

    task_iter: std::vec::IntoIter<Task>,

    /// Unlike [TaskIter::current], this owns its [Action]s and moves them out as it yields them.
    current: Option<(Task, std::vec::IntoIter<Action>)>,
}

impl Iterator for TaskIntoIter {
    type Item = Arc<HostAction>;

    fn next(&mut self) -> Option<Self::Item> {
        // Modeled after [TaskIter].

        if let Some((task, actions)) = self.current.as_mut() {
            if let Some(action) = actions.next() {
                return Some(Arc::new(HostAction::new(
                    &self.appliance,
                    &self.manifest,
                    task,
                    &action,
                )));
            }
        }

        if let Some(task) = self.task_iter.next() {
            let actions = task.actions.clone().into_iter();
            self.current = Some((task, actions));
            return self.next();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::plan;

    fn resource(path: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/test/load_manifests").join(path)
    }

    mod load_manifests {
        use super::*;

        #[test]
        fn loads_every_document_and_its_tasks() {
            let manifests = load_manifests(resource("manifest1.yaml")).unwrap();

            let names: Vec<_> = manifests.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(vec!["storefront", "maintenance"], names);

            let storefront = &manifests[0];
            assert_eq!(Some(resource("manifest1.yaml")), storefront.source);
            assert_eq!(vec!["ns-prod-*".to_owned()], storefront.appliances);
            assert_eq!(2, storefront.include.len());
            assert_eq!(Some(resource("web.yaml")), storefront.include[0].source);
            assert_eq!(Some(&"HTTP".to_owned()), storefront.vars.get("service"));
        }

        #[test]
        fn names_the_manifest_when_a_task_fails() {
            let err = load_manifests(resource("broken_include.yaml")).unwrap_err();
            let message = format!("{err:#}");
            assert!(message.contains("in manifest \"broken\""), "{message}");
            assert!(message.contains("missing.yaml"), "{message}");
        }

        #[test]
        fn rejects_unknown_keys() {
            assert!(load_manifests(resource("unknown_key.yaml")).is_err());
        }
    }

    mod expand_appliances {
        use super::*;

        #[test]
        fn replaces_patterns_with_matches() {
            let (_, mut manifest, _, _) = plan();
            manifest.appliances = vec!["ns-prod-*".into(), "ns-lab".into(), "ns-prod-1".into()];

            manifest
                .expand_appliances(&["ns-lab", "ns-prod-1", "ns-prod-2", "ns-dev"])
                .unwrap();

            assert_eq!(vec!["ns-prod-1", "ns-prod-2", "ns-lab"], manifest.appliances);
        }

        #[test]
        fn fails_when_a_pattern_matches_nothing() {
            let (_, mut manifest, _, _) = plan();
            manifest.appliances = vec!["ns-qa-*".into()];

            assert!(matches!(
                manifest.expand_appliances(&["ns-lab"]),
                Err(targeting::Error::NoMatch(pattern)) if pattern == "ns-qa-*"
            ));
        }
    }
}
