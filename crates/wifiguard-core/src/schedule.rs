// ── Poll schedule ──
//
// Polls land on fixed clock minutes (hh:29 and hh:59 by default) rather
// than on a free-running interval, so the corrective poll runs just
// before the half hours a router planning would typically switch at.

use std::time::Duration;

use chrono::{DateTime, Local, LocalResult, TimeDelta, TimeZone, Timelike};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::controller::WifiController;
use crate::error::CoreError;
use crate::model::PollReport;

/// When the corrective poll fires: every minute `m` with
/// `m % period_minutes == offset_minutes`, at second zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    period_minutes: u32,
    offset_minutes: u32,
    /// Also poll once immediately at startup.
    pub run_on_start: bool,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            period_minutes: 30,
            offset_minutes: 29,
            run_on_start: false,
        }
    }
}

impl PollSchedule {
    /// `period_minutes` must divide an hour; `offset_minutes` must fall
    /// inside the period.
    pub fn new(period_minutes: u32, offset_minutes: u32, run_on_start: bool) -> Result<Self, CoreError> {
        if period_minutes == 0 || period_minutes > 60 || 60 % period_minutes != 0 {
            return Err(CoreError::Config {
                message: format!("poll period must divide 60 minutes, got {period_minutes}"),
            });
        }
        if offset_minutes >= period_minutes {
            return Err(CoreError::Config {
                message: format!(
                    "poll offset must be below the period ({period_minutes}), got {offset_minutes}"
                ),
            });
        }
        Ok(Self {
            period_minutes,
            offset_minutes,
            run_on_start,
        })
    }

    /// First poll instant strictly after `now`, in `now`'s time zone.
    ///
    /// Local times skipped by a DST jump are passed over; for repeated
    /// local times the earliest instant after `now` is used.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let local = now.naive_local();
        let minute_start = local
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(local);

        let mut candidate = minute_start + TimeDelta::minutes(1);
        let misalignment = (self.offset_minutes + self.period_minutes
            - candidate.minute() % self.period_minutes)
            % self.period_minutes;
        candidate += TimeDelta::minutes(i64::from(misalignment));

        loop {
            let resolved = match tz.from_local_datetime(&candidate) {
                LocalResult::Single(at) => Some(at),
                LocalResult::Ambiguous(early, late) => Some(if early > *now { early } else { late }),
                LocalResult::None => None,
            };
            if let Some(at) = resolved.filter(|at| at > now) {
                return at;
            }
            candidate += TimeDelta::minutes(i64::from(self.period_minutes));
        }
    }

    /// How long to sleep from `now` until the next poll.
    pub fn wait_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        let next = self.next_after(now);
        (next - now.clone()).to_std().unwrap_or_default()
    }
}

/// Run the corrective poll on `schedule` until `cancel` fires.
///
/// A failed poll never stops the loop; its problems are already logged
/// and the next slot retries.
pub async fn run_poll_loop(
    controller: WifiController,
    schedule: PollSchedule,
    cancel: CancellationToken,
) {
    info!(
        period_minutes = schedule.period_minutes,
        offset_minutes = schedule.offset_minutes,
        "poll loop started"
    );

    if schedule.run_on_start {
        log_report(&controller.enforce().await);
    }

    loop {
        let now = Local::now();
        let next = schedule.next_after(&now);
        let wait = schedule.wait_from(&now);
        info!(
            next = %next.format("%H:%M:%S"),
            sleep = %humantime::format_duration(Duration::from_secs(wait.as_secs())),
            "waiting for next poll"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(wait) => {}
        }

        log_report(&controller.enforce().await);
    }

    info!("poll loop stopped");
}

fn log_report(report: &PollReport) {
    if report.corrections_succeeded() {
        info!(
            wifi_state = %report.wifi_state,
            planning = %report.wifi_planning_state,
            activated = ?report.wifi_activated,
            planning_disabled = ?report.planning_disabled,
            "poll complete"
        );
    } else {
        warn!(
            wifi_state = %report.wifi_state,
            planning = %report.wifi_planning_state,
            activated = ?report.wifi_activated,
            planning_disabled = ?report.planning_disabled,
            "poll finished with failed corrections"
        );
    }
}
