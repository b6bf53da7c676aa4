use anyhow::{Context, Result};
use gencommit_algo::ScheduleRequest;
use gencommit_core::Fleet;
use std::path::Path;

pub mod check;
pub mod solve;
pub mod sweep;

/// Exit status for a run that completed but produced no optimal schedule.
pub const EXIT_NOT_OPTIMAL: u8 = 2;

pub fn load_inputs(fleet: &Path, request: &Path) -> Result<(Fleet, ScheduleRequest)> {
    let fleet = Fleet::load(fleet)
        .with_context(|| format!("loading fleet '{}'", fleet.display()))?;
    let request = ScheduleRequest::load(request)
        .with_context(|| format!("loading request '{}'", request.display()))?;
    Ok((fleet, request))
}
