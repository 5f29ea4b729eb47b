mod cli;
mod commands;
mod config;
mod error;
mod output;
mod server;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GlobalOpts, LogFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let long_running = matches!(cli.command, Command::Run(_));
    init_tracing(&cli.global, long_running);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(global: &GlobalOpts, long_running: bool) {
    // The daemon reports every poll at info
    let filter = match (global.quiet, global.verbose, long_running) {
        (true, _, _) => "error",
        (false, 0, false) => "warn",
        (false, 0 | 1, true) | (false, 1, false) => "info",
        (false, 2, _) => "debug",
        _ => "trace",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr);

    match global.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a router
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wifiguard", &mut std::io::stdout());
            Ok(())
        }

        // Registration happens before any app token exists
        Command::Register(args) => commands::register::handle(args, &cli.global).await,

        Command::Run(args) => commands::run::handle(args, &cli.global).await,

        cmd => {
            let cfg = config::load(&cli.global)?;
            let controller = config::build_controller(&cfg, &cli.global)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &controller, &cli.global).await
        }
    }
}
