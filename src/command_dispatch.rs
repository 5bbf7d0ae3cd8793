//! Purpose: Hold top-level CLI command dispatch for `batchsort`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Output envelopes and exit code semantics are owned by `main.rs`.

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Serve { run } => {
            let config = serve_config_from_run_args(run)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            runtime.block_on(serve::serve(config))?;
            Ok(RunOutcome::ok())
        }
        Command::Compare { input, rounds } => {
            let report = compare::run_compare(compare::CompareArgs { input, rounds })?;
            emit_json(report);
            Ok(RunOutcome::ok())
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "batchsort", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}
