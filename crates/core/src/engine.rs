use crate::{
    loss_display, ConfigError, DrawConfig, DrawEvent, DrawOutcome, DrawReport, PoolError,
    PrizePool, RandomSource, RngState,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("invalid remaining eligible count: {0}")]
    InvalidArgument(i64),
    #[error("draw invariant violated: {0}")]
    Internal(String),
}

impl From<PoolError> for DrawError {
    fn from(value: PoolError) -> Self {
        Self::Internal(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub total: usize,
    pub remaining: usize,
    pub counts: BTreeMap<u32, usize>,
}

#[derive(Debug)]
struct EngineState<R> {
    pool: PrizePool,
    rng: R,
}

/// Owns the prize pool. Every draw runs under one lock from the size check to
/// the pool mutation.
#[derive(Debug)]
pub struct DrawEngine<R = RngState> {
    display_numbers: Vec<u32>,
    total: usize,
    state: Mutex<EngineState<R>>,
}

impl DrawEngine<RngState> {
    pub fn new(config: &DrawConfig, mut rng: RngState) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = PrizePool::from_config(config, &mut rng);
        tracing::info!(
            seed = rng.seed(),
            total = pool.size(),
            "prize pool created"
        );
        Self::with_pool(pool, config.display_numbers.clone(), rng)
    }
}

impl<R: RandomSource> DrawEngine<R> {
    pub fn with_pool(
        pool: PrizePool,
        display_numbers: Vec<u32>,
        rng: R,
    ) -> Result<Self, ConfigError> {
        let mut distinct = display_numbers.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(ConfigError::TooFewDisplayNumbers(distinct.len()));
        }
        Ok(Self {
            display_numbers,
            total: pool.size(),
            state: Mutex::new(EngineState { pool, rng }),
        })
    }

    pub fn draw(&self, remaining_eligible: i64) -> Result<DrawOutcome, DrawError> {
        self.draw_report(remaining_eligible)
            .map(|report| report.outcome)
    }

    pub fn draw_report(&self, remaining_eligible: i64) -> Result<DrawReport, DrawError> {
        let remaining = usize::try_from(remaining_eligible)
            .map_err(|_| DrawError::InvalidArgument(remaining_eligible))?;

        let mut guard = self.lock();
        let EngineState { pool, rng } = &mut *guard;
        let size = pool.size();

        if size == 0 {
            tracing::debug!(remaining, "pool exhausted, forced loss");
            let slots = loss_display(&self.display_numbers, rng)
                .map_err(|err| DrawError::Internal(err.to_string()))?;
            return Ok(DrawReport {
                outcome: DrawOutcome::Lose { slots },
                event: DrawEvent::PoolExhausted,
            });
        }

        if remaining == size {
            let prize = pool.take_guaranteed()?;
            tracing::debug!(prize, remaining, "guaranteed win");
            return Ok(DrawReport {
                outcome: DrawOutcome::win(prize),
                event: DrawEvent::Guaranteed {
                    prize,
                    remaining_prizes: pool.size(),
                },
            });
        }

        if remaining < size {
            tracing::warn!(
                remaining,
                prizes = size,
                "fewer eligible participants than prizes left"
            );
        }
        let blanks = remaining.saturating_sub(size);
        let roll = rng.below(size + blanks);
        if roll >= size {
            let slots = loss_display(&self.display_numbers, rng)
                .map_err(|err| DrawError::Internal(err.to_string()))?;
            tracing::debug!(remaining, prizes = size, "blank drawn");
            return Ok(DrawReport {
                outcome: DrawOutcome::Lose { slots },
                event: DrawEvent::Lost {
                    remaining_prizes: size,
                },
            });
        }

        let prize = pool
            .get(roll)
            .ok_or_else(|| DrawError::Internal(format!("no prize at index {roll}")))?;
        if !pool.remove(prize) {
            tracing::error!(prize, "drawn prize missing from pool");
            return Err(DrawError::Internal(format!(
                "prize {prize} could not be removed from the pool"
            )));
        }
        tracing::debug!(prize, remaining, "prize drawn");
        Ok(DrawReport {
            outcome: DrawOutcome::win(prize),
            event: DrawEvent::Won {
                prize,
                remaining_prizes: pool.size(),
            },
        })
    }

    /// Removes a prize that was awarded before this pool was built, e.g. by a
    /// previous run recorded in the participant store.
    pub fn retire(&self, prize: u32) -> bool {
        self.lock().pool.remove(prize)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.lock().pool.size()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let guard = self.lock();
        PoolSnapshot {
            total: self.total,
            remaining: guard.pool.size(),
            counts: guard.pool.counts(),
        }
    }

    pub fn display_numbers(&self) -> &[u32] {
        &self.display_numbers
    }

    // Pool mutations are single Vec operations; a poisoned lock still guards
    // a consistent pool.
    fn lock(&self) -> MutexGuard<'_, EngineState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
