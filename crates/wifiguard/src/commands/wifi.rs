//! WiFi radio on/off.

use wifiguard_core::WifiController;

use crate::cli::{GlobalOpts, WifiArgs, WifiCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &WifiController,
    args: WifiArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (confirmed, action) = match args.command {
        WifiCommand::On => (controller.activate_wifi().await, "wifi on"),
        WifiCommand::Off => (controller.deactivate_wifi().await, "wifi off"),
    };

    if !confirmed {
        return Err(CliError::NotConfirmed {
            action: action.into(),
        });
    }

    let state = controller.get_wifi_state().await;
    let color = output::should_color(&global.color);
    output::print_output(
        &format!("WiFi: {}", output::paint_wifi(state, color)),
        global.quiet,
    );
    Ok(())
}
