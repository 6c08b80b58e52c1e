//! Types for representing an ordered list of manifests to run.

use crate::core::action::{Action, HostAction};
use crate::core::manifest::{self, Manifest, TaskIntoIter, TaskIter};
use crate::core::task::Task;
use crate::targeting;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// A plan of action for executing a given list of manifests.
///
/// This struct constitutes the public interface that runners use to interact with [Manifest]s,
/// [Task]s, and [Action]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    /// The official, ordered list of manifests that comprise the plan.
    ///
    /// Everything else can be computed from these manifests.
    pub manifests: Vec<Manifest>,
}

impl Plan {
    /// Creates an empty [Plan], i.e. one with no [Manifest]s.
    pub fn new() -> Self {
        Plan {
            manifests: Vec::new(),
        }
    }

    /// Loads every manifest in each of `files`, in order.
    pub fn from_manifest_files(files: &[impl AsRef<Path>]) -> anyhow::Result<Self> {
        let mut manifests = vec![];
        for file in files {
            manifests.extend(manifest::load_manifests(file)?);
        }
        Ok(Plan { manifests })
    }

    /// Builds a plan that runs a single [Action] on each of `appliances`.
    ///
    /// This is how one-off calls from the command line run.
    pub fn from_action(appliances: Vec<String>, action: Action) -> Self {
        let name = action.to_command_line();
        let task = Task {
            source: None,
            name: name.clone(),
            actions: vec![action],
            vars: IndexMap::new(),
        };
        Plan {
            manifests: vec![Manifest {
                source: None,
                name,
                appliances,
                include: vec![task],
                vars: IndexMap::new(),
            }],
        }
    }

    /// Expands the appliance patterns in every manifest. See [Manifest::expand_appliances].
    pub fn expand_appliances<S: AsRef<str>>(
        &mut self,
        configured: &[S],
    ) -> Result<(), targeting::Error> {
        for manifest in &mut self.manifests {
            manifest.expand_appliances(configured)?;
        }
        Ok(())
    }

    /// Returns a list of appliances involved in this `Plan` in alphabetical order.
    pub fn appliances(&self) -> Vec<String> {
        let mut set = BTreeSet::new();

        for manifest in &self.manifests {
            for appliance in &manifest.appliances {
                set.insert(appliance.to_string());
            }
        }

        set.into_iter().collect()
    }

    /// Returns an execution plan for the specified appliance.
    ///
    /// Returns [None] if `appliance` was not in the plan's list of appliances.
    pub fn plan_for(&self, appliance: &str) -> Option<HostPlan> {
        // Return a reference into the plan itself rather than the value we were passed, as the
        // lifetimes of HostPlan suggest.
        self.manifests
            .iter()
            .flat_map(|manifest| manifest.appliances.iter())
            .find(|a| *a == appliance)
            .map(|appliance| HostPlan {
                appliance,
                plan: self,
            })
    }
}

/// A [Plan] in the context of a single appliance.
#[derive(Debug, PartialEq)]
pub struct HostPlan<'p> {
    appliance: &'p str,

    plan: &'p Plan,
}

impl<'p> HostPlan<'p> {
    /// Returns an iterator over [Action]s for this appliance.
    pub fn iter(&self) -> HostPlanIter<'p> {
        HostPlanIter {
            appliance: self.appliance,
            manifests: self.plan.manifests.iter(),

            // `current_iter` must be `None`, otherwise we inadvertently bypass the logic in the
            // `Iterator::next` method that skips manifests that don't target `appliance`.
            current_iter: None,
        }
    }
}

/// An iterator that yields actions to take on a specific appliance, in order.
#[derive(Debug)]
pub struct HostPlanIter<'p> {
    appliance: &'p str,

    manifests: std::slice::Iter<'p, Manifest>,

    /// The current task iterator, which yields [HostAction] values.
    current_iter: Option<TaskIter<'p>>,
}

impl<'p> Iterator for HostPlanIter<'p> {
    type Item = Arc<HostAction>;

    fn next(&mut self) -> Option<Self::Item> {
        // A `TaskIter` knows how to walk a list of tasks and return a single `HostAction`. Our
        // job here is to walk the list of manifests, in order, generating a new `TaskIter` from
        // the next `Manifest` when the previous one is done.

        if let Some(ref mut iter) = self.current_iter {
            if let Some(next) = iter.next() {
                return Some(next);
            }
        }

        // Skip any manifests that don't target `appliance`.
        if let Some(next_manifest) = self.manifests.next() {
            self.current_iter = next_manifest.tasks_for(self.appliance);
            return self.next();
        }

        None
    }
}

impl<'p> IntoIterator for &HostPlan<'p> {
    type Item = Arc<HostAction>;
    type IntoIter = HostPlanIter<'p>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owned version of [HostPlanIter].
#[derive(Debug)]
pub struct HostPlanIntoIter {
    appliance: String,

    manifests: std::vec::IntoIter<Manifest>,

    current_iter: Option<TaskIntoIter>,
}

impl Iterator for HostPlanIntoIter {
    type Item = Arc<HostAction>;

    fn next(&mut self) -> Option<Self::Item> {
        // Modeled after [HostPlanIter].

        if let Some(ref mut iter) = self.current_iter {
            if let Some(next) = iter.next() {
                return Some(next);
            }
        }

        if let Some(next_manifest) = self.manifests.next() {
            self.current_iter = next_manifest.into_tasks_for(&self.appliance);
            return self.next();
        }

        None
    }
}

impl<'p> IntoIterator for HostPlan<'p> {
    type Item = Arc<HostAction>;
    type IntoIter = HostPlanIntoIter;

    fn into_iter(self) -> Self::IntoIter {
        // Modeled after [HostPlan::iter].
        HostPlanIntoIter {
            appliance: self.appliance.to_string(),
            manifests: self.plan.manifests.clone().into_iter(),
            current_iter: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::plan;
    use super::*;
    use crate::core::Function;

    mod plan {
        use super::*;

        // from_manifest_files surfaces any errors it encounters, and the parsing itself is tested
        // in the manifest module, so we only test ordering across files here.
        mod from_manifest_files {
            use super::*;

            #[test]
            fn works() {
                let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/test/load_manifests");
                let files = [dir.join("manifest1.yaml"), dir.join("manifest2.yaml")];
                let plan = Plan::from_manifest_files(&files).unwrap();

                let names: Vec<_> = plan.manifests.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(vec!["storefront", "maintenance", "lab"], names);

                let sources: Vec<_> = plan
                    .manifests
                    .iter()
                    .map(|m| m.source.clone().unwrap())
                    .collect();
                assert_eq!(
                    vec![files[0].clone(), files[0].clone(), files[1].clone()],
                    sources,
                );
            }

            #[test]
            fn surfaces_errors() {
                assert!(Plan::from_manifest_files(&["/nonexistent/manifest.yaml"]).is_err());
            }
        }

        mod from_action {
            use super::*;

            #[test]
            fn runs_action_on_every_appliance() {
                let action = Action::new(Function::SaveConfig, IndexMap::new());
                let plan = Plan::from_action(vec!["b".into(), "a".into()], action.clone());

                assert_eq!(vec!["a".to_owned(), "b".to_owned()], plan.appliances());
                for appliance in ["a", "b"] {
                    let actions: Vec<_> = plan
                        .plan_for(appliance)
                        .unwrap()
                        .iter()
                        .map(|ha| ha.action().clone())
                        .collect();
                    assert_eq!(vec![action.clone()], actions);
                }
                assert_eq!("save_config", plan.manifests[0].name);
            }
        }

        mod appliances {
            use super::*;

            #[test]
            fn works_with_no_manifests() {
                let plan = Plan { manifests: vec![] };
                assert_eq!(Vec::<String>::new(), plan.appliances());
            }

            #[test]
            fn works_with_no_appliances() {
                let (mut plan, _, _, _) = plan();
                plan.manifests[0].appliances.clear();
                assert_eq!(Vec::<String>::new(), plan.appliances());
            }

            #[test]
            fn deduplicates_appliances() {
                let (mut plan, _, _, _) = plan();

                plan.manifests.push(plan.manifests[0].clone());
                assert_eq!(plan.manifests[0].appliances, plan.appliances());
            }

            #[test]
            fn sorts_appliances() {
                let (mut plan, _, _, _) = plan();

                plan.manifests[0].appliances.clear();
                plan.manifests.push(plan.manifests[0].clone());

                // Out of order both within a manifest and across manifests.
                plan.manifests[0].appliances.push("zzz".to_string());
                plan.manifests[0].appliances.push("yyy".to_string());
                plan.manifests[1].appliances.push("bbb".to_string());
                plan.manifests[1].appliances.push("aaa".to_string());

                let expected = vec![
                    "aaa".to_string(),
                    "bbb".to_string(),
                    "yyy".to_string(),
                    "zzz".to_string(),
                ];
                assert_eq!(expected, plan.appliances());
            }
        }

        mod expand_appliances {
            use super::*;

            #[test]
            fn expands_every_manifest() {
                let (mut plan, mut manifest, _, _) = plan();
                plan.manifests[0].appliances = vec!["ns-*".into()];
                manifest.appliances = vec!["lb-?".into()];
                plan.manifests.push(manifest);

                plan.expand_appliances(&["ns-a", "ns-b", "lb-1"]).unwrap();

                assert_eq!(vec!["ns-a", "ns-b"], plan.manifests[0].appliances);
                assert_eq!(vec!["lb-1"], plan.manifests[1].appliances);
            }

            #[test]
            fn stops_at_first_unmatched_pattern() {
                let (mut plan, _, _, _) = plan();
                plan.manifests[0].appliances = vec!["ns-*".into()];
                assert!(plan.expand_appliances(&["lb-1"]).is_err());
            }
        }

        mod plan_for {
            use super::*;

            #[test]
            fn works_with_no_manifests() {
                let plan = Plan { manifests: vec![] };
                assert!(plan.plan_for("ns-lab").is_none());
            }

            #[test]
            fn works_with_no_matching_manifests() {
                let (plan, _, _, _) = plan();
                assert!(plan.plan_for("ns-nowhere").is_none());
            }

            #[test]
            fn works_with_some_non_matching_manifests() {
                let (_, mut m1, _, _) = plan();
                let mut m2 = m1.clone();
                let mut m3 = m1.clone();

                // m1 and m3 will match; m2 will not and should be skipped.
                m1.appliances = vec!["ns-lab".into()];
                m2.appliances = vec!["ns-prod".into()];
                m3.appliances = vec!["ns-lab".into()];

                m1.name = "m1".into();
                m2.name = "m2".into();
                m3.name = "m3".into();

                let plan = Plan {
                    manifests: vec![m1, m2, m3],
                };

                let expected = HostPlan {
                    appliance: &plan.manifests[0].appliances[0],
                    plan: &plan,
                };
                assert_eq!(Some(expected), plan.plan_for("ns-lab"));
            }
        }
    }

    mod iterators {
        // By-reference and by-value iterators are parallel, so we test them together.

        use super::*;

        // Collects the actions a HostPlan yields, both by reference and by value.
        fn collect(host_plan: HostPlan) -> (Vec<Action>, Vec<Action>) {
            let by_reference: Vec<_> = host_plan.iter().map(|ha| ha.action().clone()).collect();
            let by_value: Vec<_> = host_plan
                .into_iter()
                .map(|ha| ha.action().clone())
                .collect();
            (by_reference, by_value)
        }

        #[test]
        fn returns_all_actions_in_a_manifest() {
            let (mut plan, _, _, action) = plan();
            let second = Action::new(Function::SaveConfig, IndexMap::new());
            plan.manifests[0].include[0].actions.push(second.clone());

            let (by_reference, by_value) = collect(HostPlan {
                appliance: &plan.manifests[0].appliances[0],
                plan: &plan,
            });

            let expected = vec![action, second];
            assert_eq!(expected, by_reference);
            assert_eq!(expected, by_value);
        }

        #[test]
        fn iterates_over_multiple_manifests() {
            let (mut plan, manifest, _, action) = plan();
            plan.manifests.push(manifest);

            let (by_reference, by_value) = collect(HostPlan {
                appliance: &plan.manifests[0].appliances[0],
                plan: &plan,
            });

            let expected = vec![action.clone(), action];
            assert_eq!(expected, by_reference);
            assert_eq!(expected, by_value);
        }

        #[test]
        fn skips_empty_manifests() {
            let (mut plan, mut manifest, _, action) = plan();
            manifest.include.clear();
            plan.manifests.insert(0, manifest);

            let (by_reference, by_value) = collect(HostPlan {
                appliance: &plan.manifests[0].appliances[0],
                plan: &plan,
            });

            assert_eq!(vec![action.clone()], by_reference);
            assert_eq!(vec![action], by_value);
        }

        #[test]
        fn skips_manifests_for_different_appliances() {
            let (mut plan, mut manifest, _, action) = plan();
            manifest.appliances.clear();
            plan.manifests.insert(0, manifest);

            let (by_reference, by_value) = collect(HostPlan {
                appliance: &plan.manifests[1].appliances[0],
                plan: &plan,
            });

            assert_eq!(vec![action.clone()], by_reference);
            assert_eq!(vec![action], by_value);
        }

        #[test]
        fn implements_into_iterator() {
            let (plan, _, _, _) = plan();

            let host_plan = HostPlan {
                appliance: &plan.manifests[0].appliances[0],
                plan: &plan,
            };

            let by_reference: Vec<_> = (&host_plan).into_iter().collect();
            let by_value: Vec<_> = host_plan.into_iter().collect();
            assert_eq!(by_reference, by_value);
        }
    }
}
