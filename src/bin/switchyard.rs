use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use switchyard::config::Config;
use switchyard::core::operation::parse_cli_args;
use switchyard::core::{Action, Function, Operation, Plan};
use switchyard::logger::standard::StandardLogger;
use switchyard::logger::{Log, LogReceiver};
use switchyard::targeting::Target;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Appliance configuration file. Defaults to ~/.switchyard/appliances.yaml, then
    /// /etc/switchyard/appliances.yaml
    #[arg(long, global = true, env = "SWITCHYARD_CONFIG")]
    config: Option<PathBuf>,

    /// Diagnostic log level, used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Call one function on every appliance matching a pattern
    Call {
        /// Appliance name or glob pattern, e.g. 'ns-prod-*'
        target: String,

        /// Function name, e.g. add_csvserver or content_switching.add_csvserver
        function: String,

        /// Arguments as key=value pairs
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run manifest files
    Run {
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },

    /// List callable functions and their arguments
    Functions {
        /// Only list functions matching this glob pattern, e.g. '*_csvserver'
        pattern: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let (plan, config) = match args.command {
        Commands::Functions { pattern } => {
            list_functions(pattern.as_deref())?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Call {
            target,
            function,
            args: call_args,
        } => {
            let config = Config::load(args.config.as_deref())?;
            let plan = call_plan(&config, &target, &function, &call_args)?;
            (plan, config)
        }
        Commands::Run { manifests } => {
            let config = Config::load(args.config.as_deref())?;
            let mut plan = Plan::from_manifest_files(&manifests)?;
            plan.expand_appliances(&config.appliance_names())?;
            (plan, config)
        }
    };
    debug!(appliances = ?plan.appliances(), "plan ready");

    let (log, audit) = start_audit_log(&config)?;
    log.notice(format!(
        "running {} manifest(s) on {}",
        plan.manifests.len(),
        plan.appliances().join(", "),
    ));

    let result = switchyard::run_plan(plan, Arc::new(config), log.clone()).await;
    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(errors) => {
            for (appliance, err) in &errors {
                eprintln!("[{appliance}] {err:#}");
            }
            log.fatal(format!("{} appliance(s) did not finish", errors.len()));
            ExitCode::FAILURE
        }
    };

    drop(log);
    if let Some(handle) = audit {
        if handle.join().is_err() {
            eprintln!("Error: audit logger panicked");
        }
    }
    Ok(code)
}

/// Builds a one-off plan for `switchyard call`. Validates the arguments before anything is sent.
fn call_plan(
    config: &Config,
    target: &str,
    function: &str,
    args: &[String],
) -> anyhow::Result<Plan> {
    Operation::from_cli(function, args)?;
    let function: Function = function.parse()?;
    let action = Action::new(function, parse_cli_args(args)?);

    let names = config.appliance_names();
    let appliances = Target::parse(target)?
        .select(&names)?
        .into_iter()
        .map(str::to_owned)
        .collect();
    Ok(Plan::from_action(appliances, action))
}

fn list_functions(pattern: Option<&str>) -> anyhow::Result<()> {
    let target = pattern.map(Target::parse).transpose()?;
    for function in Function::all() {
        let name = function.to_string();
        if target.as_ref().map_or(true, |t| t.matches(&name)) {
            println!("{}", function.signature());
        }
    }
    Ok(())
}

/// Starts the audit logger if the configuration names a log directory.
fn start_audit_log(config: &Config) -> anyhow::Result<(Log, Option<JoinHandle<StandardLogger>>)> {
    let Some(dir) = &config.log_dir else {
        return Ok((Log::disabled(), None));
    };

    let logger = StandardLogger::new(dir)
        .with_context(|| format!("failed to open audit log directory {}", dir.display()))?;
    info!(directory = %dir.display(), "audit logging enabled");
    let (receiver, log) = LogReceiver::new(logger);
    let handle = thread::spawn(move || receiver.run());
    Ok((log, Some(handle)))
}
