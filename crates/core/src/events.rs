use crate::DrawOutcome;
use serde::{Deserialize, Serialize};

/// Which branch a draw took and what it left behind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawEvent {
    PoolExhausted,
    Guaranteed { prize: u32, remaining_prizes: usize },
    Won { prize: u32, remaining_prizes: usize },
    Lost { remaining_prizes: usize },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DrawReport {
    pub outcome: DrawOutcome,
    pub event: DrawEvent,
}

impl DrawEvent {
    pub fn remaining_prizes(&self) -> usize {
        match self {
            Self::PoolExhausted => 0,
            Self::Guaranteed {
                remaining_prizes, ..
            }
            | Self::Won {
                remaining_prizes, ..
            }
            | Self::Lost { remaining_prizes } => *remaining_prizes,
        }
    }
}
