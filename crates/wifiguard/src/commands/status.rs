//! Status overview: radio, planning, and access points.

use serde::Serialize;
use tabled::Tabled;
use wifiguard_core::{AccessPoint, WifiController, WifiPlanningState, WifiState};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccessPointRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Router status")]
    status: String,
    #[tabled(rename = "State")]
    state: String,
}

impl AccessPointRow {
    fn new(ap: &AccessPoint, color: bool) -> Self {
        Self {
            id: ap.id,
            name: ap.name.clone().unwrap_or_else(|| "-".into()),
            status: ap.status.clone(),
            state: output::paint_wifi(ap.state, color),
        }
    }
}

#[derive(Serialize)]
struct Status {
    wifi_state: WifiState,
    wifi_planning_state: WifiPlanningState,
    access_points: Vec<AccessPoint>,
    session_phase: String,
}

pub async fn handle(controller: &WifiController, global: &GlobalOpts) -> Result<(), CliError> {
    let access_points = controller.access_points().await?;
    let status = Status {
        wifi_state: controller.get_wifi_state().await,
        wifi_planning_state: controller.get_wifi_planning_state().await,
        access_points,
        session_phase: format!("{:?}", controller.session_phase()),
    };
    let color = output::should_color(&global.color);

    let out = match global.output {
        OutputFormat::Table => {
            let header = format!(
                "WiFi:      {}\nPlanning:  {}\nSession:   {}\n",
                output::paint_wifi(status.wifi_state, color),
                output::paint_planning(status.wifi_planning_state, color),
                status.session_phase
            );
            let table = output::render_list(
                &global.output,
                &status.access_points,
                |ap| AccessPointRow::new(ap, color),
                |ap| ap.id.to_string(),
            );
            format!("{header}\n{table}")
        }
        _ => output::render_single(
            &global.output,
            &status,
            |_| String::new(),
            |s| format!("{} {}", s.wifi_state, s.wifi_planning_state),
        ),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
