//! Command dispatch: bridges CLI args -> controller operations -> output.

pub mod check;
pub mod config_cmd;
pub mod planning;
pub mod register;
pub mod run;
pub mod status;
pub mod wifi;

use wifiguard_core::WifiController;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a one-shot, router-bound command, then log out.
pub async fn dispatch(
    cmd: Command,
    controller: &WifiController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match cmd {
        Command::Check => check::handle(controller, global).await,
        Command::Status => status::handle(controller, global).await,
        Command::Wifi(args) => wifi::handle(controller, args, global).await,
        Command::Planning(args) => planning::handle(controller, args, global).await,
        // Handled before a controller exists
        Command::Run(_) | Command::Register(_) | Command::Config(_) | Command::Completions(_) => {
            Ok(())
        }
    };
    controller.close().await;
    result
}
