use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use daemon_pool::{
    DaemonPool, Delivery, DispatchOptions, InstanceError, InstanceResult, LogFacade, Logger, PoolConfig, RpcCall,
};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "daemon-pool", about = "Fan JSON-RPC commands out to a pool of coin daemons", version)]
struct Args {
    #[arg(long, default_value = "daemons.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe every daemon and report which ones answered.
    Status,
    /// Send one command to every daemon.
    Cmd {
        method: String,
        /// Positional params; each is parsed as JSON, falling back to a plain string.
        params: Vec<String>,
        /// Print each result as soon as its daemon answers.
        #[arg(long)]
        stream: bool,
        /// Include the raw response body with each result.
        #[arg(long)]
        raw: bool,
    },
    /// Send a JSON-RPC batch, e.g. '[["getblockhash",[1]],["getblockhash",[2]]]', to the first daemon.
    Batch { calls: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let pool = load_pool(&args.config)?;

    match args.command {
        Command::Status => status(&pool).await,
        Command::Cmd { method, params, stream, raw } => {
            let params: Vec<JsonValue> = params.iter().map(String::as_str).map(parse_param).collect();
            let mut options =
                if stream { DispatchOptions::streaming() } else { DispatchOptions::aggregate() };
            if raw {
                options = options.with_raw();
            }
            let mut failed = false;
            pool.cmd(&method, &params, options, |delivery| match delivery {
                Delivery::One(result) => failed |= print_result(&result),
                Delivery::All(results) => {
                    for result in &results {
                        failed |= print_result(result);
                    }
                }
            })
            .await;
            Ok(exit_code(!failed))
        }
        Command::Batch { calls } => {
            let calls = parse_batch(&calls)?;
            let reply = pool.batch_cmd(&calls).await.context("batch command failed")?;
            println!("{reply}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_pool(path: &Path) -> anyhow::Result<DaemonPool> {
    let config = PoolConfig::load(path)?;
    let logger: Arc<dyn Logger> = Arc::new(LogFacade);
    DaemonPool::from_config(config, Some(logger))
        .with_context(|| format!("no daemon instances configured in {}", path.display()))
}

async fn status(pool: &DaemonPool) -> anyhow::Result<ExitCode> {
    let report = pool.probe().await;
    for instance in pool.instances() {
        if !report.results.iter().any(|result| result.instance.index() == instance.index()) {
            println!("{instance} offline: no result");
        }
    }
    for result in report.failing() {
        if let Some(error) = &result.error {
            println!("{} {}: {error}", result.instance, status_label(error));
        }
    }
    println!(
        "{} ({} of {} instances failing)",
        if report.online { "online" } else { "offline" },
        pool.instances().len() - report.results.iter().filter(|result| result.is_ok()).count(),
        pool.instances().len()
    );
    Ok(exit_code(report.online))
}

fn status_label(error: &InstanceError) -> &'static str {
    if error.is_transport() {
        "unreachable"
    } else {
        "offline"
    }
}

/// Prints one result as a JSON line and reports whether it carried an error.
fn print_result(result: &InstanceResult) -> bool {
    match serde_json::to_string(result) {
        Ok(line) => println!("{line}"),
        Err(err) => log::error!("could not encode result from {}: {err}", result.instance),
    }
    result.error.is_some()
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn parse_param(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

fn parse_batch(raw: &str) -> anyhow::Result<Vec<RpcCall>> {
    let value: JsonValue = serde_json::from_str(raw).context("batch must be a JSON array")?;
    let Some(entries) = value.as_array() else {
        bail!("batch must be a JSON array of [method, [params]] pairs");
    };
    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| -> anyhow::Result<RpcCall> {
            let method = entry.get(0).and_then(JsonValue::as_str).with_context(|| {
                format!("batch entry {position} has no method name")
            })?;
            let params = match entry.get(1) {
                None | Some(JsonValue::Null) => Vec::new(),
                Some(JsonValue::Array(params)) => params.clone(),
                Some(other) => bail!("batch entry {position} params must be an array, got {other}"),
            };
            Ok(RpcCall::new(method, params))
        })
        .collect()
}
