//! Content-switching administration for Citrix NetScaler appliances.
//!
//! switchyard exposes every content-switching object an appliance knows about (virtual servers,
//! policies, actions, policy labels, and their bindings) as a small, uniform set of functions:
//! `add_*`, `update_*`, `unset_*`, `enable_*`, `disable_*`, and `get_*`, plus `save_config`. Each
//! function call compiles to exactly one NITRO REST request, optionally followed by a save.
//!
//! # YAML file types
//!
//! Manifest files and Task files. A manifest names the appliances to target and the task files to
//! run on them; a task file is an ordered list of function calls. See [core::Manifest] and
//! [core::Task].
//!
//! # Program flow
//!
//! This section is meant specifically for developers working on switchyard.
//!
//! 1. The user invokes a controller application such as the `switchyard` binary, either with
//!    manifest files or with a single function call.
//!
//! 2. The controller builds a [core::Plan] and resolves its appliance patterns against the
//!    configured appliances (see [config] and [targeting]).
//!
//! 3. [run_plan] runs the plan on every appliance concurrently. For each appliance, actions run in
//!    order: variables are substituted ([core::action::HostAction::compile]), arguments are
//!    validated and coerced ([core::Operation]), and [execute::execute] sends the resulting
//!    request through a [nitro::Nitro] connection.
//!
//! 4. Each [core::Outcome] is printed to the user and sent to the audit log ([logger]). The first
//!    failed outcome stops that appliance's run.

pub mod config;
pub mod core;
pub mod execute;
pub mod logger;
pub mod nitro;
pub mod run_plan;
pub mod targeting;

#[doc(inline)]
pub use run_plan::run_plan;
