//! In-memory implementation of the matching store
//!
//! Mirrors the SQLite store's semantics closely enough for orchestrator
//! tests, and adds knobs the real store cannot offer: injected failures,
//! simulated competing writers, and a log of every assignment and busy
//! lookup.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use matcher_domain::{
    chair_is_busy, AssignmentOutcome, Chair, ChairCandidate, ChairModel, Coordinate,
    MatchingStore, Ride, RideProgress, DEFAULT_TERMINAL_STATUS_COUNT,
};
use matcher_errors::{MatchingError, MatchingResult};

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    FetchRides,
    FetchCandidates,
    ChairBusy,
    Distance,
    Assign,
}

#[derive(Default)]
struct StoreState {
    models: HashMap<String, i64>,
    chairs: Vec<Chair>,
    locations: HashMap<String, Coordinate>,
    rides: Vec<Ride>,
    progress: HashMap<String, u32>,
    failures: HashSet<StoreOperation>,
    failing_assign_rides: HashSet<String>,
    preempted: HashMap<String, String>,
    progress_on_assign: HashMap<String, (String, u32)>,
    assignments: Vec<(String, String)>,
    busy_checks: usize,
    history_rides: usize,
}

/// In-memory `MatchingStore` for tests
#[derive(Clone)]
pub struct InMemoryMatchingStore {
    state: Arc<Mutex<StoreState>>,
    terminal_status_count: u32,
}

impl InMemoryMatchingStore {
    pub fn new() -> Self {
        Self::with_terminal_status_count(DEFAULT_TERMINAL_STATUS_COUNT)
    }

    pub fn with_terminal_status_count(terminal_status_count: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            terminal_status_count,
        }
    }

    pub fn add_chair_model(&self, model: &ChairModel) {
        self.state
            .lock()
            .unwrap()
            .models
            .insert(model.name.clone(), model.speed);
    }

    pub fn add_chair(&self, chair: &Chair, location: Coordinate) {
        let mut state = self.state.lock().unwrap();
        state.chairs.push(chair.clone());
        state.locations.insert(chair.id.clone(), location);
    }

    /// A chair that never reported a location
    pub fn add_chair_without_location(&self, chair: &Chair) {
        self.state.lock().unwrap().chairs.push(chair.clone());
    }

    /// Add an active chair whose model has the given speed
    pub fn add_chair_at(&self, chair_id: &str, speed: i64, location: Coordinate) {
        let model = format!("speed-{speed}");
        self.add_chair_model(&ChairModel {
            name: model.clone(),
            speed,
        });

        let now = Utc::now();
        self.add_chair(
            &Chair {
                id: chair_id.to_string(),
                owner_id: "owner-1".to_string(),
                name: chair_id.to_string(),
                model,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            location,
        );
    }

    pub fn move_chair(&self, chair_id: &str, location: Coordinate) {
        self.state
            .lock()
            .unwrap()
            .locations
            .insert(chair_id.to_string(), location);
    }

    pub fn add_ride(&self, ride: &Ride) {
        self.state.lock().unwrap().rides.push(ride.clone());
    }

    /// Give a chair an earlier ride with `acknowledged` lifecycle events
    ///
    /// Returns the id of the generated ride.
    pub fn add_active_ride(&self, chair_id: &str, pickup: Coordinate, acknowledged: u32) -> String {
        let mut state = self.state.lock().unwrap();
        state.history_rides += 1;
        let ride_id = format!("history-{}", state.history_rides);
        let created_at = Utc::now() - Duration::hours(1);

        state.rides.push(Ride {
            id: ride_id.clone(),
            user_id: "user-history".to_string(),
            pickup,
            destination: pickup,
            chair_id: Some(chair_id.to_string()),
            created_at,
            updated_at: created_at,
        });
        state.progress.insert(ride_id.clone(), acknowledged);
        ride_id
    }

    pub fn set_progress(&self, ride_id: &str, acknowledged: u32) {
        self.state
            .lock()
            .unwrap()
            .progress
            .insert(ride_id.to_string(), acknowledged);
    }

    /// Make every call to `operation` fail with a database error
    pub fn fail_on(&self, operation: StoreOperation) {
        self.state.lock().unwrap().failures.insert(operation);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failures.clear();
        state.failing_assign_rides.clear();
    }

    /// Fail the assignment of one specific ride
    pub fn fail_assign_for(&self, ride_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_assign_rides
            .insert(ride_id.to_string());
    }

    /// Simulate another writer matching `ride_id` right before our update lands
    pub fn preempt(&self, ride_id: &str, chair_id: &str) {
        self.state
            .lock()
            .unwrap()
            .preempted
            .insert(ride_id.to_string(), chair_id.to_string());
    }

    /// Set the progress of `ride_id` as soon as `trigger_ride` is assigned
    ///
    /// Lets a test change a chair's busy state in the middle of a pass.
    pub fn set_progress_on_assign(&self, trigger_ride: &str, ride_id: &str, acknowledged: u32) {
        self.state
            .lock()
            .unwrap()
            .progress_on_assign
            .insert(trigger_ride.to_string(), (ride_id.to_string(), acknowledged));
    }

    /// Committed assignments in commit order
    pub fn assignments(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().assignments.clone()
    }

    /// Number of busy lookups served
    pub fn busy_checks(&self) -> usize {
        self.state.lock().unwrap().busy_checks
    }

    pub fn ride(&self, ride_id: &str) -> Option<Ride> {
        self.state
            .lock()
            .unwrap()
            .rides
            .iter()
            .find(|ride| ride.id == ride_id)
            .cloned()
    }

    pub fn unmatched_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .rides
            .iter()
            .filter(|ride| !ride.is_matched())
            .count()
    }

    fn check(state: &StoreState, operation: StoreOperation) -> MatchingResult<()> {
        if state.failures.contains(&operation) {
            return Err(MatchingError::database_error(format!(
                "injected failure: {operation:?}"
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryMatchingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchingStore for InMemoryMatchingStore {
    async fn fetch_unmatched_rides(&self, limit: u32) -> MatchingResult<Vec<Ride>> {
        let state = self.state.lock().unwrap();
        Self::check(&state, StoreOperation::FetchRides)?;

        let mut rides: Vec<Ride> = state
            .rides
            .iter()
            .filter(|ride| !ride.is_matched())
            .cloned()
            .collect();
        rides.sort_by_key(|ride| ride.created_at);
        rides.truncate(limit as usize);
        Ok(rides)
    }

    async fn fetch_active_candidates(&self, pickup: Coordinate) -> MatchingResult<Vec<ChairCandidate>> {
        let state = self.state.lock().unwrap();
        Self::check(&state, StoreOperation::FetchCandidates)?;

        let mut candidates: Vec<ChairCandidate> = state
            .chairs
            .iter()
            .filter(|chair| chair.is_active)
            .filter_map(|chair| {
                let location = state.locations.get(&chair.id)?;
                let speed = *state.models.get(&chair.model)?;
                Some(ChairCandidate::new(
                    chair.id.clone(),
                    chair.model.clone(),
                    speed,
                    location.distance_to(&pickup),
                ))
            })
            .collect();
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(candidates)
    }

    async fn chair_has_active_ride(&self, chair_id: &str) -> MatchingResult<bool> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, StoreOperation::ChairBusy)?;
        state.busy_checks += 1;

        let progress = state
            .rides
            .iter()
            .filter(|ride| ride.chair_id.as_deref() == Some(chair_id))
            .map(|ride| RideProgress::new(state.progress.get(&ride.id).copied().unwrap_or(0)));
        Ok(chair_is_busy(progress, self.terminal_status_count))
    }

    async fn distance_between(&self, from: Coordinate, to: Coordinate) -> MatchingResult<f64> {
        let state = self.state.lock().unwrap();
        Self::check(&state, StoreOperation::Distance)?;
        Ok(from.distance_to(&to))
    }

    async fn assign_chair(&self, ride_id: &str, chair_id: &str) -> MatchingResult<AssignmentOutcome> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        Self::check(state, StoreOperation::Assign)?;
        if state.failing_assign_rides.contains(ride_id) {
            return Err(MatchingError::database_error(format!(
                "injected assignment failure for ride {ride_id}"
            )));
        }

        let preempted_by = state.preempted.remove(ride_id);
        let Some(ride) = state.rides.iter_mut().find(|ride| ride.id == ride_id) else {
            return Ok(AssignmentOutcome::Conflict {
                current_chair: None,
            });
        };
        if let Some(other) = preempted_by {
            ride.chair_id.get_or_insert(other);
        }

        if let Some(current) = &ride.chair_id {
            return Ok(AssignmentOutcome::Conflict {
                current_chair: Some(current.clone()),
            });
        }

        ride.chair_id = Some(chair_id.to_string());
        ride.updated_at = Utc::now();
        state
            .assignments
            .push((ride_id.to_string(), chair_id.to_string()));
        if let Some((other, acknowledged)) = state.progress_on_assign.remove(ride_id) {
            state.progress.insert(other, acknowledged);
        }
        Ok(AssignmentOutcome::Assigned)
    }
}
