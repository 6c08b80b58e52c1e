//! Provides types that represent the user's instructions, from manifest files down to the single
//! NITRO request that carries out one function call.

pub mod action;
mod catalog;
pub mod error;
pub mod field;
pub mod manifest;
pub mod operation;
pub mod outcome;
pub mod plan;
pub mod resource;
pub mod task;

#[doc(inline)]
pub use action::Action;

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use manifest::Manifest;

#[doc(inline)]
pub use operation::{Function, Operation, Step};

#[doc(inline)]
pub use outcome::{Outcome, SaveStatus};

#[doc(inline)]
pub use plan::Plan;

#[doc(inline)]
pub use resource::{Resource, Verb, CATALOG};

#[doc(inline)]
pub use task::Task;
