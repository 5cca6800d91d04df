use dockunit::cli::{self, Cli};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::parse_or_exit_code(std::env::args()) {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };

    let default_level = if cli.verbose >= 1 {
        "dockunit=debug,warn"
    } else {
        "dockunit=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    ExitCode::from(cli::execute(cli))
}
