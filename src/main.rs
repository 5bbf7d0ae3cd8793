//! Purpose: `batchsort` CLI entry point.
//! Role: Binary crate root; parses args, runs the server or a local comparison.
//! Invariants: Running with no subcommand serves on the default bind address.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};

mod command_dispatch;
mod compare;
mod serve;

use batchsort::api::{Error, ErrorKind, to_exit_code};
use command_dispatch::dispatch_command;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 10_000;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.use_stderr() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `batchsort --help` for usage."));
            }
            err.print().map_err(|io_err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to write help")
                    .with_source(io_err)
            })?;
            return Ok(RunOutcome::ok());
        }
    };

    let command = cli.command.unwrap_or(Command::Serve {
        run: ServeRunArgs::default(),
    });
    dispatch_command(command)
}

#[derive(Parser)]
#[command(
    name = "batchsort",
    version,
    about = "Sort batches of integer arrays over HTTP, sequentially or one thread per array",
    after_help = r#"EXAMPLES
  $ batchsort                                   # serve on 0.0.0.0:8000
  $ batchsort serve --bind 127.0.0.1:9000
  $ curl -s localhost:8000/process-concurrent -d '{"to_sort": [[3,1,2],[9,-1]]}'
  $ batchsort compare batch.json --rounds 5"#
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Serve /process-single and /process-concurrent over HTTP",
        after_help = r#"NOTES
  - Malformed bodies get HTTP 400 with the JSON parser message
  - Set RUST_LOG (e.g. RUST_LOG=debug) to adjust log verbosity"#
    )]
    Serve {
        #[command(flatten)]
        run: ServeRunArgs,
    },
    #[command(
        about = "Run both sorters locally on one request document and report timings",
        after_help = r#"EXAMPLES
  $ batchsort compare batch.json
  $ echo '{"to_sort": [[3,1,2]]}' | batchsort compare --rounds 10"#
    )]
    Compare {
        #[arg(
            value_name = "PATH",
            help = "Request JSON file (default: stdin; `-` also reads stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 1, help = "Number of rounds per sorter")]
        rounds: u32,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Args)]
struct ServeRunArgs {
    #[arg(long, default_value = DEFAULT_BIND, help = "Bind address")]
    bind: String,
    #[arg(
        long,
        default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_MS,
        help = "Max wait for in-flight requests on shutdown, in milliseconds"
    )]
    shutdown_timeout_ms: u64,
}

impl Default for ServeRunArgs {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }
}

fn serve_config_from_run_args(run: ServeRunArgs) -> Result<serve::ServeConfig, Error> {
    let bind: SocketAddr = run.bind.parse().map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid bind address")
            .with_hint("Use a host:port value like 0.0.0.0:8000.")
    })?;
    Ok(serve::ServeConfig {
        bind,
        shutdown_timeout_ms: run.shutdown_timeout_ms,
    })
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches("error: ").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    lines.join("\n")
}
