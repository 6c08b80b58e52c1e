//! Types describing the resources in [CATALOG] and the verbs that act on them.

pub use crate::core::catalog::CATALOG;
use crate::core::field::Field;
use std::fmt;

/// What a function does to a resource. Every catalog function is named `<verb>_<resource>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Creates an object. `POST config/<resource>`.
    Add,

    /// Changes attributes of an existing object. `PUT config/<resource>`.
    Update,

    /// Resets attributes to their defaults. `POST config/<resource>?action=unset`.
    Unset,

    /// `POST config/<resource>?action=enable`, addressed by `name`.
    Enable,

    /// `POST config/<resource>?action=disable`, addressed by `name`.
    Disable,

    /// Reads the running configuration. `GET config/<resource>[?filter=...]`.
    Get,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Add,
        Verb::Update,
        Verb::Unset,
        Verb::Enable,
        Verb::Disable,
        Verb::Get,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Add => "add",
            Verb::Update => "update",
            Verb::Unset => "unset",
            Verb::Enable => "enable",
            Verb::Disable => "disable",
            Verb::Get => "get",
        }
    }

    /// Whether the verb changes the running configuration, and can therefore be followed by a
    /// save.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Verb::Get)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A NITRO configuration object type, e.g. `csvserver`.
#[derive(Debug, PartialEq, Eq)]
pub struct Resource {
    /// The NITRO object name. Used in URLs and as the payload's top-level key.
    pub name: &'static str,

    /// Attributes accepted by `add_*`, `update_*`, and `get_*`. `unset_*` accepts the same names
    /// as flags.
    pub fields: &'static [Field],

    /// Whether `get_*` accepts the fields as search filters. When `false`, `get_*` takes no
    /// arguments.
    pub filterable: bool,

    pub verbs: &'static [Verb],
}

impl Resource {
    /// Finds a resource in [CATALOG] by name.
    pub fn lookup(name: &str) -> Option<&'static Resource> {
        CATALOG.iter().find(|resource| resource.name == name)
    }

    pub fn supports(&self, verb: Verb) -> bool {
        self.verbs.contains(&verb)
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The fields `get_*` accepts as search filters.
    pub fn filter_fields(&self) -> &'static [Field] {
        match self.filterable {
            true => self.fields,
            false => &[],
        }
    }

    /// The function name for `verb` on this resource, e.g. `add_csvserver`.
    pub fn function_name(&self, verb: Verb) -> String {
        format!("{}_{}", verb, self.name)
    }

    /// Lists every function in [CATALOG], sorted by name.
    pub fn functions() -> Vec<(String, Verb, &'static Resource)> {
        let mut functions: Vec<_> = CATALOG
            .iter()
            .flat_map(|resource| {
                resource
                    .verbs
                    .iter()
                    .map(move |&verb| (resource.function_name(verb), verb, resource))
            })
            .collect();
        functions.sort_by(|a, b| a.0.cmp(&b.0));
        functions
    }
}
