//! Structured logging utilities
//!
//! Every matching event is emitted with an `event` field and dotted
//! `ride.*` / `chair.*` / `pass.*` fields so the JSON log format can be
//! queried without parsing messages.

use matcher_errors::MatchingError;
use tracing::{debug, error, info, warn};

/// Structured logging utilities
pub struct StructuredLogger;

impl StructuredLogger {
    /// Log a committed ride → chair assignment
    pub fn log_ride_matched(ride_id: &str, chair_id: &str, score: f64, candidates: usize) {
        info!(
            event = "ride_matched",
            ride.id = ride_id,
            chair.id = chair_id,
            assignment.score = score,
            assignment.candidates = candidates,
            "Ride matched to chair"
        );
    }

    /// Log a ride that another writer matched first
    pub fn log_assignment_conflict(ride_id: &str, chair_id: &str, current_chair: Option<&str>) {
        warn!(
            event = "assignment_conflict",
            ride.id = ride_id,
            chair.id = chair_id,
            ride.current_chair = current_chair.unwrap_or("<missing ride>"),
            "Ride was no longer unmatched, assignment skipped"
        );
    }

    /// Log a ride left unmatched because no free chair was visible
    pub fn log_ride_unmatched(ride_id: &str, active_chairs: usize) {
        debug!(
            event = "ride_unmatched",
            ride.id = ride_id,
            pass.active_chairs = active_chairs,
            "No free chair available for ride"
        );
    }

    /// Log the early end of a pass
    pub fn log_pass_stopped_early(ride_id: &str, skipped_rides: usize) {
        warn!(
            event = "pass_stopped_early",
            ride.id = ride_id,
            pass.skipped_rides = skipped_rides,
            "Matching pass stopped after a ride found no free chair"
        );
    }

    /// Log pass completion
    pub fn log_pass_completed(
        rides_considered: usize,
        assigned: usize,
        conflicts: usize,
        unmatched: usize,
        duration_ms: u64,
    ) {
        info!(
            event = "pass_completed",
            pass.rides = rides_considered,
            pass.assigned = assigned,
            pass.conflicts = conflicts,
            pass.unmatched = unmatched,
            pass.duration_ms = duration_ms,
            "Matching pass completed"
        );
    }

    /// Log a pass aborted by an infrastructure failure
    pub fn log_pass_failed(error: &MatchingError) {
        error!(
            event = "pass_failed",
            pass.step = error.step().map(|step| step.as_str()).unwrap_or("unknown"),
            error.message = %error,
            "Matching pass aborted"
        );
    }
}
