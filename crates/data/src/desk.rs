use crate::{EligibilityError, RecordStore, Roster, RosterError, TIME_FORMAT};
use chrono::Local;
use prizedraw_core::{DrawEngine, DrawError, DrawOutcome, PoolSnapshot};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("not eligible: {0}")]
    Ineligible(#[from] EligibilityError),
    #[error("draw failed: {0}")]
    Draw(#[from] DrawError),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeskStatus {
    pub participants: usize,
    pub drawn: usize,
    pub remaining_eligible: usize,
    pub pool: PoolSnapshot,
}

/// Front counter of the event: checks who may draw, asks the engine for an
/// outcome and writes it back to the participant records.
pub struct DrawDesk<S> {
    engine: DrawEngine,
    roster: Mutex<Roster>,
    store: S,
}

impl<S: RecordStore> DrawDesk<S> {
    /// Loads the roster and retires prizes that earlier runs already awarded.
    pub fn open(engine: DrawEngine, store: S) -> Result<Self, RosterError> {
        let roster = store.load()?;
        for prize in roster.awarded() {
            if !engine.retire(prize) {
                tracing::warn!(prize, "recorded prize is not in the pool");
            }
        }
        let remaining_eligible = roster.remaining_eligible();
        let remaining_prizes = engine.remaining();
        tracing::info!(
            participants = roster.len(),
            remaining_eligible,
            remaining_prizes,
            "draw desk open"
        );
        if remaining_eligible < remaining_prizes {
            tracing::warn!(
                remaining_eligible,
                remaining_prizes,
                "more prizes than eligible participants, some prizes will not be awarded"
            );
        }
        Ok(Self {
            engine,
            roster: Mutex::new(roster),
            store,
        })
    }

    pub fn check(&self, id: &str, name: &str) -> Result<(), EligibilityError> {
        self.lock_roster().check(id, name).map(|_| ())
    }

    /// Runs one draw for a participant. The roster lock is held from the
    /// eligibility check to the commit so the eligible count handed to the
    /// engine matches the records.
    pub fn spin(&self, id: &str, name: &str) -> Result<DrawOutcome, DeskError> {
        let mut roster = self.lock_roster();
        roster.check(id, name)?;
        let remaining = i64::try_from(roster.remaining_eligible()).unwrap_or(i64::MAX);
        let outcome = self.engine.draw(remaining)?;

        let time = Local::now().format(TIME_FORMAT).to_string();
        roster.commit(id, &outcome, time);
        // The prize is spent either way; a failed save only loses bookkeeping.
        if let Err(err) = self.store.save(&roster) {
            tracing::error!(id = id.trim(), "failed to save roster: {err}");
        }
        tracing::info!(
            id = id.trim(),
            win = outcome.is_win(),
            slots = %outcome.slots_string(),
            "draw recorded"
        );
        Ok(outcome)
    }

    pub fn status(&self) -> DeskStatus {
        let roster = self.lock_roster();
        DeskStatus {
            participants: roster.len(),
            drawn: roster.drawn(),
            remaining_eligible: roster.remaining_eligible(),
            pool: self.engine.snapshot(),
        }
    }

    pub fn engine(&self) -> &DrawEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock_roster(&self) -> MutexGuard<'_, Roster> {
        self.roster.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
