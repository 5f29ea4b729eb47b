//! One corrective poll, on demand.

use wifiguard_core::{PollReport, WifiController};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn outcome(attempt: Option<bool>) -> &'static str {
    match attempt {
        None => "not needed",
        Some(true) => "done",
        Some(false) => "FAILED",
    }
}

fn detail(report: &PollReport, color: bool) -> String {
    [
        format!("WiFi:            {}", output::paint_wifi(report.wifi_state, color)),
        format!("Activation:      {}", outcome(report.wifi_activated)),
        format!("Planning:        {}", output::paint_planning(report.wifi_planning_state, color)),
        format!("Planning off:    {}", outcome(report.planning_disabled)),
        format!("Checked at:      {}", report.checked_at.to_rfc3339()),
    ]
    .join("\n")
}

pub async fn handle(controller: &WifiController, global: &GlobalOpts) -> Result<(), CliError> {
    let report = controller.enforce().await;
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| format!("{} {}", r.wifi_state, r.wifi_planning_state),
    );
    output::print_output(&out, global.quiet);

    if report.corrections_succeeded() {
        Ok(())
    } else {
        Err(CliError::NotConfirmed {
            action: "corrective poll".into(),
        })
    }
}
