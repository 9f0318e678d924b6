use serde::{Deserialize, Serialize};

pub type DisplaySlots = [u32; 3];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DrawOutcome {
    Win { slots: DisplaySlots, prize: u32 },
    Lose { slots: DisplaySlots },
}

impl DrawOutcome {
    pub fn win(prize: u32) -> Self {
        Self::Win {
            slots: [prize; 3],
            prize,
        }
    }

    pub fn slots(&self) -> DisplaySlots {
        match self {
            Self::Win { slots, .. } | Self::Lose { slots } => *slots,
        }
    }

    pub fn prize(&self) -> Option<u32> {
        match self {
            Self::Win { prize, .. } => Some(*prize),
            Self::Lose { .. } => None,
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Self::Win { .. })
    }

    /// Slots as stored in the participant record, e.g. `"50,10,50"`.
    pub fn slots_string(&self) -> String {
        self.slots()
            .iter()
            .map(|slot| slot.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
