//! Types for representing individual actions.

#[cfg(doc)]
use crate::core::plan::Plan;
use crate::core::operation::{Function, Operation};
use crate::core::{manifest::Manifest, task::Task, Error};
use indexmap::IndexMap;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::borrow::Cow;
#[cfg(doc)]
use std::sync::Arc;

/// The on-disk form of an [Action]: a map with exactly one entry, from a function name to its
/// (optional) arguments.
type ActionMap = IndexMap<String, Option<IndexMap<String, Value>>>;

/// One function call, as written in a task file.
///
/// ```yaml
/// - add_csvserver:
///     name: web
///     servicetype: HTTP
///     port: 80
/// - save_config:
/// ```
///
/// The function name is checked when the action is parsed. The arguments are only checked when
/// the action is compiled for an appliance, because they may contain variables.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "ActionMap", into = "ActionMap")]
pub struct Action {
    pub function: Function,
    pub args: IndexMap<String, Value>,
}

impl Action {
    pub fn new(function: Function, args: IndexMap<String, Value>) -> Self {
        Action { function, args }
    }

    /// Renders the action as a `switchyard call` argument list, quoting values for the shell.
    ///
    /// ```
    /// # use switchyard::core::Action;
    /// let action: Action = serde_yaml::from_str("add_csaction: {name: a1, comment: two words}")
    ///     .unwrap();
    /// assert_eq!("add_csaction name=a1 comment='two words'", action.to_command_line());
    /// ```
    pub fn to_command_line(&self) -> String {
        let mut line = self.function.to_string();
        for (name, value) in &self.args {
            let value = display_arg(value);
            let quoted = shlex::try_quote(&value).unwrap_or(Cow::Borrowed(value.as_ref()));
            line.push_str(&format!(" {name}={quoted}"));
        }
        line
    }
}

impl TryFrom<ActionMap> for Action {
    type Error = String;

    fn try_from(map: ActionMap) -> Result<Self, Self::Error> {
        let mut entries = map.into_iter();
        let (name, args) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => return Err("an action must name exactly one function".to_owned()),
        };
        let function = name.parse().map_err(|err: Error| err.to_string())?;
        Ok(Action {
            function,
            args: args.unwrap_or_default(),
        })
    }
}

impl From<Action> for ActionMap {
    fn from(action: Action) -> Self {
        let args = match action.args.is_empty() {
            true => None,
            false => Some(action.args),
        };
        IndexMap::from([(action.function.to_string(), args)])
    }
}

/// Renders an argument the way a user would type it on the command line.
fn display_arg(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(
            serde_yaml::to_string(other)
                .map(|s| s.trim_end().to_owned())
                .unwrap_or_default(),
        ),
    }
}

/// An [Action] in the context of a single [Manifest], [Task], and appliance.
///
/// A [HostAction] is typically produced by running a [Plan]. The [HostAction] contains all the
/// information needed to run an [Action] on a given appliance as well as information about where
/// the [Action] was specified, for informational, logging, and debugging purposes.
///
/// This type makes an awful lot of copies. [HostAction] values get passed throughout the program
/// and across tasks, so references are not a great fit. If copying ever matters, an easy first
/// step is to store [Manifest]s and [Task]s behind [Arc]s.
#[derive(Clone, Debug, PartialEq)]
pub struct HostAction {
    /// The appliance to which this [Action] applies.
    appliance: String,

    /// The [Manifest] that listed the [Task] containing this [Action].
    manifest: Manifest,

    /// The [Task] that listed this [Action].
    task: Task,

    /// The [Action] to perform.
    action: Action,
}

impl HostAction {
    /// Creates a new [HostAction].
    ///
    /// # Panics
    ///
    /// Panics if the values provided are not sane. For instance, `manifest` must target
    /// `appliance`, and `task` must specify `action`. Violating these sanity checks would result
    /// in unwanted (though well-defined) behavior and is clearly a bug in the calling code.
    pub fn new<'plan>(
        appliance: &'plan str,
        manifest: &'plan Manifest,
        task: &'plan Task,
        action: &'plan Action,
    ) -> Self {
        assert!(
            manifest.appliances.iter().any(|a| a == appliance),
            "Cannot create HostAction for manifest \"{}\" and appliance \"{}\" because the \
            manifest does not include this appliance:\n\
            {:?}",
            manifest.name,
            appliance,
            manifest,
        );
        assert!(
            manifest.include.iter().any(|tsk| tsk == task),
            "Cannot create HostAction for manifest \"{}\" and task \"{}\" because the manifest does \
            not include this task:\n\
            {:?}\n\
            {:?}",
            manifest.name,
            task.name,
            manifest,
            task,
        );
        assert!(
            task.actions.iter().any(|act| act == action),
            "Cannot create HostAction for manifest \"{}\" and task \"{}\" because the task does not \
            include this action:\n\
            {:?}\n\
            {:?}",
            manifest.name,
            task.name,
            task,
            action,
        );

        HostAction {
            appliance: appliance.to_string(),
            manifest: manifest.clone(),
            task: task.clone(),
            action: action.clone(),
        }
    }

    /// The target appliance name.
    pub fn appliance(&self) -> &str {
        &self.appliance
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    /// The original [Action] from the [Task], before variable substitution.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Substitutes variables into the [Action]'s string arguments. Merges manifest and task vars.
    ///
    /// # Variable precedence
    ///
    /// [Task] variables take precedence over [Manifest] variables. For example, if in
    /// [Manifest::vars] you set the variable `port` to be `80` and in [Task::vars] you set `port`
    /// to be `8080`, the final value of `port` will be `8080`.
    ///
    /// # Variable substitution
    ///
    /// There are two forms of variable substitution:
    ///
    /// 1. Simple substitution (`$var`): any occurrence of `$var` is replaced with the variable
    ///    named `var`, if one exists. If `var` does not exist, the text remains unchanged.
    ///    Matching works on word boundaries, so `$foobar` does not match the variable `foo`. Use
    ///    braced substitution for that: `${foo}bar`.
    ///
    /// 2. Braced substitution (`${var}`): any occurrence of `${var}` is replaced with the variable
    ///    named `var`, if one exists. This is a simple text substitution, not a recursive one.
    ///
    /// Only string arguments are substituted. An argument written as a bare variable, e.g.
    /// `port: $port`, is a string until substitution and is then coerced like any other value,
    /// so `port: $port` with `port: "8080"` yields the integer `8080`.
    ///
    /// # Substitution order
    ///
    /// Variables are substituted in the order in which they are defined, and variables defined in
    /// [Manifest::vars] are substituted before variables defined in [Task::vars]. This allows a
    /// limited form of cascading substitution, though relying on it is not recommended.
    pub fn compile(&self) -> Action {
        let mut action = self.action.clone();

        // Merge in order, then substitute in order.
        let mut vars = self.manifest.vars.clone();
        for (var, value) in &self.task.vars {
            let _ = vars.insert(var.clone(), value.clone());
        }

        for (var, value) in vars {
            // Matches $<var> (as a whole word) and ${<var>}. A single regular expression avoids
            // substituting into the output of a previous substitution for the same variable.
            let pattern = format!(r"\${}\b|\$\{{{}}}", regex::escape(&var), regex::escape(&var));
            let regex = match Regex::new(&pattern) {
                Ok(regex) => regex,
                Err(_) => continue,
            };

            for arg in action.args.values_mut() {
                if let Value::String(s) = arg {
                    let replaced = regex.replace_all(s, NoExpand(&value)).into_owned();
                    *s = replaced;
                }
            }
        }
        action
    }

    /// Compiles the [Action] (see [Self::compile]) and validates it into an [Operation].
    pub fn operation(&self) -> Result<Operation, Error> {
        let Action { function, args } = self.compile();
        Operation::new(function, args)
    }
}
