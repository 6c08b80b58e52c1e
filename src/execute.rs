//! Carries out one [Operation] against one appliance.

use crate::core::{Function, Operation, Outcome, SaveStatus, Step};
use crate::nitro::{parse_return, Nitro, Request};
use tracing::{debug, warn};

/// Executes an operation and reports what happened.
///
/// Makes at most two calls: the operation's own request and, for a successful mutating call that
/// asked for it, a `save_config`. A failed call is never followed by a save. This never returns an
/// error; NITRO faults are folded into the [Outcome].
pub async fn execute<N: Nitro + ?Sized>(nitro: &mut N, operation: &Operation) -> Outcome {
    let request = match operation.step() {
        Step::Call(request) => request,
        Step::Complete(outcome) => return outcome,
    };

    debug!(%operation, %request, "calling NITRO");
    let response = match nitro.send(&request).await {
        Ok(response) => response,
        Err(fault) => {
            warn!(%operation, %fault, "operation failed");
            return Outcome::Failed(fault.into_value());
        }
    };

    if let Function::SaveConfig = operation.function() {
        return Outcome::Saved;
    }

    if let Some(key) = operation.response_key() {
        return Outcome::Records(parse_return(response, key));
    }

    let save = match operation.save() {
        false => SaveStatus::NotRequested,
        true => match nitro.send(&Request::save_config()).await {
            Ok(_) => SaveStatus::Saved,
            Err(fault) => {
                warn!(%operation, %fault, "change applied but save_config failed");
                SaveStatus::Failed(fault.into_value())
            }
        },
    };
    Outcome::Changed { save }
}
