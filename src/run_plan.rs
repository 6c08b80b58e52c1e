//! Runs a [Plan] on every appliance it targets.

pub mod client;
pub mod report;

use crate::core::plan::HostPlanIntoIter;
use crate::core::Plan;
use crate::execute::execute;
use crate::logger::{Event, Log, LogEntry};
use crate::nitro::Nitro;
use anyhow::{anyhow, bail, Context};
use client::ManageClient;
use report::Report;
use tracing::info;

#[cfg(feature = "http")]
use {
    crate::config::Config, client::ConnectionManager, report::Reporter, std::sync::Arc,
};

/// Runs `plan` against real appliances, using `config` to reach them.
///
/// Appliances run concurrently. On each appliance, actions run in order, and the first failed
/// action ends that appliance's run. Returns every appliance that did not finish, with the reason.
///
/// Prints progress to stdout/stderr, so this requires a multi-threaded Tokio runtime.
#[cfg(feature = "http")]
pub async fn run_plan(
    plan: Plan,
    config: Arc<Config>,
    log: Log,
) -> Result<(), Vec<(String, anyhow::Error)>> {
    _run_plan(plan, ConnectionManager::new(config), Reporter, log).await
}

/// Runs `plan` with the given connection manager and reporter. See [run_plan].
pub async fn _run_plan<C, M, R>(
    plan: Plan,
    manager: M,
    reporter: R,
    log: Log,
) -> Result<(), Vec<(String, anyhow::Error)>>
where
    C: Nitro + 'static,
    M: ManageClient<C> + Clone + Send + 'static,
    R: Report + Clone + Send + 'static,
{
    let mut handles = Vec::new();
    for appliance in plan.appliances() {
        let Some(host_plan) = plan.plan_for(&appliance) else {
            continue;
        };
        let future = run_host_plan(
            appliance.clone(),
            host_plan.into_iter(),
            manager.clone(),
            reporter.clone(),
            log.clone(),
        );
        handles.push((appliance, tokio::spawn(future)));
    }

    let mut errors = Vec::new();
    for (appliance, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(anyhow!(err)),
        };
        if let Err(err) = result {
            log.error(format!("[{appliance}] {err:#}"));
            errors.push((appliance, err));
        }
    }

    match errors.len() {
        0 => Ok(()),
        _ => Err(errors),
    }
}

/// Runs one appliance's actions in order, stopping at the first failure.
async fn run_host_plan<C, M, R>(
    appliance: String,
    plan: HostPlanIntoIter,
    mut manager: M,
    mut reporter: R,
    log: Log,
) -> anyhow::Result<()>
where
    C: Nitro,
    M: ManageClient<C>,
    R: Report,
{
    let mut nitro = match manager.connect(&appliance).await {
        Ok(nitro) => nitro,
        Err(err) => {
            log.event(LogEntry::Error(Event::ConnectionFailed {
                appliance: appliance.clone(),
                error: format!("{err:#}"),
            }));
            return Err(err.context(format!("failed to connect to {appliance}")));
        }
    };
    log.event(LogEntry::Notice(Event::Connected {
        appliance: appliance.clone(),
    }));

    for host_action in plan {
        let operation = host_action.operation().with_context(|| {
            format!(
                "invalid action in task \"{}\": {}",
                host_action.task().name,
                host_action.action().to_command_line(),
            )
        })?;
        let action = host_action.compile();

        reporter.starting(&appliance, &action).await?;
        let outcome = execute(&mut nitro, &operation).await;
        info!(%appliance, %operation, success = outcome.is_success(), "action finished");

        let event = Event::ActionResult {
            appliance: appliance.clone(),
            manifest: host_action.manifest().name.clone(),
            task: host_action.task().name.clone(),
            operation: operation.to_string(),
            outcome: outcome.to_value(),
        };
        log.event(match outcome.is_success() {
            true => LogEntry::Notice(event),
            false => LogEntry::Error(event),
        });

        reporter.report(&appliance, &action, &outcome).await?;

        if !outcome.is_success() {
            bail!("action failed: {operation}");
        }
    }
    Ok(())
}
