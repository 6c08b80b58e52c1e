//! Compiles a function call into the NITRO request that carries it out.

use crate::core::field::{is_truthy, Field};
use crate::core::outcome::Outcome;
use crate::core::resource::{Resource, Verb};
use crate::core::Error;
use crate::nitro::{build_filter, Request};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value as YamlValue;
use std::fmt;
use std::str::FromStr;

/// The module prefix callers may put in front of any catalog function.
const MODULE_PREFIX: &str = "content_switching.";

/// The module prefix of `save_config`, which lives alongside the rest of the appliance functions.
const NS_PREFIX: &str = "ns.";

/// The argument every mutating function accepts, asking for a save afterwards.
const SAVE: &str = "save";

/// A callable function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    /// A catalog function, e.g. `add_csvserver`.
    Resource {
        verb: Verb,
        resource: &'static Resource,
    },

    /// Persists the running configuration.
    SaveConfig,
}

impl Function {
    pub fn new(verb: Verb, resource: &'static Resource) -> Result<Self, Error> {
        if !resource.supports(verb) {
            return Err(Error::UnsupportedVerb {
                resource: resource.name,
                verb: verb.as_str(),
            });
        }
        Ok(Function::Resource { verb, resource })
    }

    /// The arguments this function accepts, excluding `save`.
    pub fn arguments(&self) -> Vec<Field> {
        match *self {
            Function::Resource { verb, resource } => match verb {
                Verb::Add | Verb::Update => resource.fields.to_vec(),
                Verb::Unset => resource.fields.iter().map(|f| f.as_flag()).collect(),
                Verb::Enable | Verb::Disable => vec![Field::str("name")],
                Verb::Get => resource.filter_fields().to_vec(),
            },
            Function::SaveConfig => vec![],
        }
    }

    /// Whether the function accepts the `save` argument.
    pub fn accepts_save(&self) -> bool {
        match self {
            Function::Resource { verb, .. } => verb.is_mutating(),
            Function::SaveConfig => false,
        }
    }

    /// Every callable function: the catalog functions sorted by name, then `save_config`.
    pub fn all() -> Vec<Function> {
        Resource::functions()
            .into_iter()
            .map(|(_, verb, resource)| Function::Resource { verb, resource })
            .chain(std::iter::once(Function::SaveConfig))
            .collect()
    }

    /// A one-line summary of the function and its arguments, e.g.
    /// `enable_csvserver(name: str, save: bool)`.
    pub fn signature(&self) -> String {
        let mut arguments: Vec<String> = self
            .arguments()
            .iter()
            .map(|field| format!("{}: {}", field.name, field.kind))
            .collect();
        if self.accepts_save() {
            arguments.push(format!("{SAVE}: bool"));
        }
        format!("{self}({})", arguments.join(", "))
    }
}

impl FromStr for Function {
    type Err = Error;

    /// Parses a function name, with or without its module prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownFunction(s.to_owned());

        if let Some(name) = s.strip_prefix(NS_PREFIX) {
            return match name {
                "save_config" => Ok(Function::SaveConfig),
                _ => Err(unknown()),
            };
        }

        let name = s.strip_prefix(MODULE_PREFIX).unwrap_or(s);
        if name == "save_config" {
            return Ok(Function::SaveConfig);
        }

        // Verbs never prefix one another, so at most one verb matches.
        let (verb, resource) = Verb::ALL
            .iter()
            .find_map(|&verb| {
                name.strip_prefix(verb.as_str())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|resource| (verb, resource))
            })
            .ok_or_else(unknown)?;
        let resource = Resource::lookup(resource).ok_or_else(unknown)?;

        // A name that looks right but names an unsupported pair is still unknown to the caller.
        Function::new(verb, resource).map_err(|_| unknown())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Resource { verb, resource } => {
                write!(f, "{}", resource.function_name(*verb))
            }
            Function::SaveConfig => f.write_str("save_config"),
        }
    }
}

/// The next thing to do for an [Operation].
#[derive(Debug, PartialEq)]
pub enum Step {
    /// Send this request to the appliance.
    Call(Request),

    /// The operation finished without contacting the appliance.
    Complete(Outcome),
}

/// A validated function call with its arguments coerced to the types the appliance expects.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    function: Function,

    /// The truthy arguments, in catalog field order.
    values: IndexMap<&'static str, JsonValue>,

    save: bool,
}

impl Operation {
    /// Validates and coerces `args` for `function`.
    ///
    /// Falsy arguments (see [is_truthy]) are accepted but dropped before coercion. `unset_*`
    /// functions take any truthy scalar as a request to reset that field. `save` asks for a save
    /// only when it is `true`. Any other value means no save.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is not accepted by the function or cannot be coerced to the
    /// field's kind.
    pub fn new(function: Function, args: IndexMap<String, YamlValue>) -> Result<Self, Error> {
        let fields = function.arguments();
        let unset = matches!(
            function,
            Function::Resource {
                verb: Verb::Unset,
                ..
            }
        );
        let mut save = false;
        let mut supplied = IndexMap::new();

        for (name, value) in args {
            if name == SAVE && function.accepts_save() {
                save = matches!(
                    Field::bool(SAVE).coerce(&value),
                    Ok(Some(JsonValue::Bool(true)))
                );
                continue;
            }

            let field = fields
                .iter()
                .find(|field| field.name == name)
                .ok_or_else(|| Error::UnknownArgument {
                    function: function.to_string(),
                    argument: name.clone(),
                })?;
            if !is_truthy(&value) {
                continue;
            }
            let coerced = match unset {
                true => field.flag(&value)?,
                false => field.coerce(&value)?,
            };
            if let Some(value) = coerced {
                supplied.insert(field.name, value);
            }
        }

        let values = fields
            .iter()
            .filter_map(|field| {
                supplied
                    .shift_remove(field.name)
                    .map(|value| (field.name, value))
            })
            .collect();

        Ok(Operation {
            function,
            values,
            save,
        })
    }

    /// Parses `key=value` pairs from a command line and builds an operation from them.
    ///
    /// Values are read as YAML scalars, so `port=80` is an integer and `save=true` a boolean.
    pub fn from_cli<S: AsRef<str>>(function: &str, args: &[S]) -> Result<Self, Error> {
        let function = function.parse()?;
        Self::new(function, parse_cli_args(args)?)
    }

    pub fn function(&self) -> Function {
        self.function
    }

    /// Whether a `save_config` call follows a successful change.
    pub fn save(&self) -> bool {
        self.save
    }

    /// The supplied (truthy) arguments, in catalog field order.
    pub fn values(&self) -> &IndexMap<&'static str, JsonValue> {
        &self.values
    }

    /// For `get_*` functions, the key under which the appliance returns the records.
    pub fn response_key(&self) -> Option<&'static str> {
        match self.function {
            Function::Resource {
                verb: Verb::Get,
                resource,
            } => Some(resource.name),
            _ => None,
        }
    }

    /// Decides what to do for this operation.
    pub fn step(&self) -> Step {
        let (verb, resource) = match self.function {
            Function::Resource { verb, resource } => (verb, resource),
            Function::SaveConfig => return Step::Call(Request::save_config()),
        };
        let path = format!("config/{}", resource.name);

        let request = match verb {
            Verb::Add => Request::post(path, self.payload(resource)),
            Verb::Update => Request::put(path, self.payload(resource)),
            Verb::Unset => Request::post(format!("{path}?action=unset"), self.payload(resource)),
            Verb::Enable | Verb::Disable => {
                if !self.values.contains_key("name") {
                    return Step::Complete(Outcome::failed("name value not specified."));
                }
                Request::post(format!("{path}?action={verb}"), self.payload(resource))
            }
            Verb::Get => {
                let filters: Vec<(&str, String)> = self
                    .values
                    .iter()
                    .map(|(&name, value)| (name, filter_value(value)))
                    .collect();
                Request::get(format!("{path}{}", build_filter(&filters)))
            }
        };
        Step::Call(request)
    }

    /// `{"<resource>": {field: value, ...}}`
    fn payload(&self, resource: &Resource) -> JsonValue {
        let attributes: Map<String, JsonValue> = self
            .values
            .iter()
            .map(|(&name, value)| (name.to_owned(), value.clone()))
            .collect();
        let mut payload = Map::new();
        payload.insert(resource.name.to_owned(), JsonValue::Object(attributes));
        JsonValue::Object(payload)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.function)?;
        for (name, value) in &self.values {
            write!(f, " {name}={}", filter_value(value))?;
        }
        if self.save {
            write!(f, " save=true")?;
        }
        Ok(())
    }
}

/// Parses `key=value` command-line arguments.
///
/// Each value is read as a YAML scalar. Anything else, including values that would parse as a YAML
/// mapping or sequence, is kept as a plain string.
pub fn parse_cli_args<S: AsRef<str>>(args: &[S]) -> Result<IndexMap<String, YamlValue>, Error> {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| Error::MalformedArgument(arg.to_owned()))?;
            let value = match serde_yaml::from_str(value) {
                Ok(YamlValue::Mapping(_) | YamlValue::Sequence(_) | YamlValue::Tagged(_))
                | Err(_) => YamlValue::String(value.to_owned()),
                Ok(scalar) => scalar,
            };
            Ok((key.to_owned(), value))
        })
        .collect()
}

/// Renders a coerced value the way it appears in a query string or command line.
fn filter_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nitro::Method;
    use serde_json::json;

    fn args(yaml: &str) -> IndexMap<String, YamlValue> {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn operation(function: &str, yaml: &str) -> Operation {
        Operation::new(function.parse().unwrap(), args(yaml)).unwrap()
    }

    fn request(function: &str, yaml: &str) -> Request {
        match operation(function, yaml).step() {
            Step::Call(request) => request,
            Step::Complete(outcome) => panic!("expected a request, got {outcome:?}"),
        }
    }

    mod function_from_str {
        use super::*;

        #[test]
        fn parses_bare_and_prefixed_names() {
            let bare: Function = "add_csvserver".parse().unwrap();
            let prefixed: Function = "content_switching.add_csvserver".parse().unwrap();
            assert_eq!(bare, prefixed);
            assert_eq!("add_csvserver", bare.to_string());
        }

        #[test]
        fn parses_save_config() {
            assert_eq!(Function::SaveConfig, "save_config".parse().unwrap());
            assert_eq!(Function::SaveConfig, "ns.save_config".parse().unwrap());
        }

        #[test]
        fn splits_verb_from_binding_resource() {
            match "get_csvserver_cspolicy_binding".parse().unwrap() {
                Function::Resource { verb, resource } => {
                    assert_eq!(Verb::Get, verb);
                    assert_eq!("csvserver_cspolicy_binding", resource.name);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn rejects_unsupported_verb() {
            assert_eq!(
                Err(Error::UnknownFunction("enable_cspolicy".into())),
                "enable_cspolicy".parse::<Function>(),
            );
            assert!("update_cspolicy_binding".parse::<Function>().is_err());
        }

        #[test]
        fn every_listed_function_parses() {
            let all = Function::all();
            assert_eq!(68, all.len());
            for function in all {
                assert_eq!(Ok(function), function.to_string().parse::<Function>());
            }
        }

        #[test]
        fn rejects_unknown_names() {
            assert!("add_lbvserver".parse::<Function>().is_err());
            assert!("csvserver".parse::<Function>().is_err());
            assert!("addcsvserver".parse::<Function>().is_err());
            assert!("ns.add_csvserver".parse::<Function>().is_err());
        }
    }

    mod new {
        use super::*;

        #[test]
        fn keeps_truthy_values_in_field_order() {
            let op = operation(
                "add_csvserver",
                "{port: 80, name: web, servicetype: HTTP, ipv46: '', td: 0}",
            );
            let names: Vec<_> = op.values().keys().copied().collect();
            assert_eq!(vec!["name", "servicetype", "port"], names);
        }

        #[test]
        fn rejects_unknown_argument() {
            let err =
                Operation::new("add_csaction".parse().unwrap(), args("{nme: a}")).unwrap_err();
            assert_eq!(
                Error::UnknownArgument {
                    function: "add_csaction".into(),
                    argument: "nme".into(),
                },
                err,
            );
        }

        #[test]
        fn rejects_uncoercible_value() {
            let err = Operation::new("add_csvserver".parse().unwrap(), args("{port: http}"))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidValue { .. }));
        }

        #[test]
        fn drops_falsy_values_before_coercion() {
            let op = operation(
                "add_csaction",
                "{name: a1, comment: 0, targetvserver: false, targetvserverexpr: ''}",
            );
            assert_eq!(Some(&json!("a1")), op.values().get("name"));
            assert_eq!(1, op.values().len());
        }

        #[test]
        fn keeps_truthy_text_that_looks_falsy() {
            let op = operation("add_csaction", "{name: a1, comment: '0'}");
            assert_eq!(Some(&json!("0")), op.values().get("comment"));
        }

        #[test]
        fn save_only_when_true() {
            assert!(operation("add_csaction", "{name: a1, save: 'TRUE'}").save());
            assert!(!operation("add_csaction", "{name: a1, save: yes}").save());
            assert!(!operation("add_csaction", "{name: a1, save: 1}").save());
        }

        #[test]
        fn unset_accepts_truthy_scalars() {
            let op = operation("unset_csvserver", "{name: web, port: 80, comment: 0}");
            assert_eq!(Some(&json!(true)), op.values().get("name"));
            assert_eq!(Some(&json!(true)), op.values().get("port"));
            assert_eq!(None, op.values().get("comment"));
        }

        #[test]
        fn save_is_only_for_mutating_functions() {
            assert!(operation("update_csparameter", "{save: true}").save());
            assert!(!operation("update_csparameter", "{save: false}").save());
            assert!(Operation::new("get_csaction".parse().unwrap(), args("{save: true}")).is_err());
            assert!(Operation::new(Function::SaveConfig, args("{save: true}")).is_err());
        }

        #[test]
        fn unfilterable_get_takes_no_arguments() {
            let err = Operation::new(
                "get_csparameter".parse().unwrap(),
                args("{stateupdate: ENABLED}"),
            )
            .unwrap_err();
            assert!(matches!(err, Error::UnknownArgument { .. }));
        }

        #[test]
        fn enable_takes_only_name() {
            assert!(Operation::new(
                "enable_csvserver".parse().unwrap(),
                args("{name: web, port: 80}"),
            )
            .is_err());
        }
    }

    mod step {
        use super::*;

        #[test]
        fn add_posts_payload() {
            let request = request(
                "add_csvserver",
                "{name: web, servicetype: HTTP, port: '80', save: true}",
            );
            assert_eq!(Method::Post, request.method);
            assert_eq!("config/csvserver", request.path);
            assert_eq!(
                Some(json!({ "csvserver": { "name": "web", "servicetype": "HTTP", "port": 80 } })),
                request.body,
            );
        }

        #[test]
        fn update_puts_payload() {
            let request = request("update_csparameter", "{stateupdate: ENABLED}");
            assert_eq!(Method::Put, request.method);
            assert_eq!("config/csparameter", request.path);
            assert_eq!(
                Some(json!({ "csparameter": { "stateupdate": "ENABLED" } })),
                request.body,
            );
        }

        #[test]
        fn unset_sends_flags() {
            let request = request(
                "unset_cspolicy",
                "{policyname: p1, url: yes, rule: true, action: false}",
            );
            assert_eq!(Method::Post, request.method);
            assert_eq!("config/cspolicy?action=unset", request.path);
            assert_eq!(
                Some(json!({ "cspolicy": { "policyname": true, "url": true, "rule": true } })),
                request.body,
            );
        }

        #[test]
        fn falsy_text_fields_stay_out_of_payload() {
            let request = request("add_csaction", "{name: a1, comment: 0, targetvserver: false}");
            assert_eq!(Some(json!({ "csaction": { "name": "a1" } })), request.body);
        }

        #[test]
        fn empty_payload() {
            let request = request("add_cspolicylabel", "{}");
            assert_eq!(Some(json!({ "cspolicylabel": {} })), request.body);
        }

        #[test]
        fn enable_and_disable() {
            let disabled = request("disable_csvserver", "{name: web}");
            assert_eq!(Method::Post, disabled.method);
            assert_eq!("config/csvserver?action=disable", disabled.path);
            assert_eq!(Some(json!({ "csvserver": { "name": "web" } })), disabled.body);

            let enabled = request("enable_csvserver", "{name: web}");
            assert_eq!("config/csvserver?action=enable", enabled.path);
        }

        #[test]
        fn enable_without_name_completes_locally() {
            for function in ["enable_csvserver", "disable_csvserver"] {
                for name in ["''", "0", "false", "~"] {
                    assert_eq!(
                        Step::Complete(Outcome::failed("name value not specified.")),
                        operation(function, &format!("{{name: {name}}}")).step(),
                    );
                }
            }
        }

        #[test]
        fn get_without_filters() {
            let request = request("get_csvserver", "{}");
            assert_eq!(Request::get("config/csvserver"), request);
        }

        #[test]
        fn get_with_filters() {
            let request = request("get_csvserver", "{port: 80, name: 'web 1', td: 0}");
            assert_eq!(
                Request::get("config/csvserver?filter=name:web%201,port:80"),
                request,
            );
        }

        #[test]
        fn save_config() {
            assert_eq!(
                Step::Call(Request::save_config()),
                Operation::new(Function::SaveConfig, IndexMap::new())
                    .unwrap()
                    .step(),
            );
        }
    }

    mod response_key {
        use super::*;

        #[test]
        fn only_for_get() {
            assert_eq!(
                Some("csvserver_binding"),
                operation("get_csvserver_binding", "{}").response_key(),
            );
            assert_eq!(None, operation("add_csaction", "{}").response_key());
        }
    }

    mod parse_cli_args {
        use super::*;

        #[test]
        fn reads_values_as_yaml() {
            let parsed = parse_cli_args(&["name=web", "port=80", "save=true", "rule=a=b"]).unwrap();
            assert_eq!(args("{name: web, port: 80, save: true, rule: a=b}"), parsed);
        }

        #[test]
        fn keeps_non_scalars_as_strings() {
            let parsed = parse_cli_args(&["rule=HTTP.REQ.URL.CONTAINS(\"x\"): y"]).unwrap();
            assert_eq!(
                Some(&YamlValue::String("HTTP.REQ.URL.CONTAINS(\"x\"): y".into())),
                parsed.get("rule"),
            );

            let parsed = parse_cli_args(&["comment='unterminated"]).unwrap();
            assert_eq!(
                Some(&YamlValue::String("'unterminated".into())),
                parsed.get("comment"),
            );
        }

        #[test]
        fn rejects_missing_equals() {
            assert_eq!(
                Err(Error::MalformedArgument("web".into())),
                parse_cli_args(&["web"]),
            );
            assert!(parse_cli_args(&["=web"]).is_err());
        }
    }

    mod signature {
        use super::*;

        #[test]
        fn lists_arguments_and_save() {
            let function: Function = "enable_csvserver".parse().unwrap();
            assert_eq!("enable_csvserver(name: str, save: bool)", function.signature());

            let function: Function = "unset_csparameter".parse().unwrap();
            assert_eq!(
                "unset_csparameter(stateupdate: bool, save: bool)",
                function.signature(),
            );
        }

        #[test]
        fn read_only_functions_take_no_save() {
            let function: Function = "get_csparameter".parse().unwrap();
            assert_eq!("get_csparameter()", function.signature());
            assert_eq!("save_config()", Function::SaveConfig.signature());
        }
    }

    #[test]
    fn from_cli() {
        let op = Operation::from_cli("content_switching.get_cspolicy", &["policyname=p1"]).unwrap();
        assert_eq!("get_cspolicy policyname=p1", op.to_string());
    }
}
