//! WiFi planning show/enable/disable.

use wifiguard_core::{WifiController, WifiPlanningState};

use crate::cli::{GlobalOpts, PlanningArgs, PlanningCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &WifiController,
    args: PlanningArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let wanted = match args.command {
        PlanningCommand::Show => None,
        PlanningCommand::Enable => Some(true),
        PlanningCommand::Disable => Some(false),
    };

    if let Some(enabled) = wanted {
        if !controller.set_wifi_planning_state(enabled).await {
            return Err(CliError::NotConfirmed {
                action: format!("planning {}", if enabled { "enable" } else { "disable" }),
            });
        }
    }

    let state = controller.get_wifi_planning_state().await;
    let color = output::should_color(&global.color);
    output::print_output(
        &format!("Planning: {}", output::paint_planning(state, color)),
        global.quiet,
    );

    if state == WifiPlanningState::Unknown {
        return Err(CliError::NotConfirmed {
            action: "planning read".into(),
        });
    }
    Ok(())
}
