use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrizeTier {
    pub value: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawConfig {
    pub prizes: Vec<PrizeTier>,
    /// Numbers the slot reels may show on a losing draw.
    #[serde(default = "default_display_numbers")]
    pub display_numbers: Vec<u32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("prize {0} has a zero count")]
    ZeroCount(u32),
    #[error("prize {0} is listed more than once")]
    DuplicatePrize(u32),
    #[error("need at least two distinct display numbers, got {0}")]
    TooFewDisplayNumbers(usize),
}

const DEFAULT_PRIZES: [(u32, u32); 7] = [
    (300, 5),
    (200, 8),
    (100, 12),
    (50, 17),
    (30, 23),
    (20, 30),
    (10, 50),
];

fn default_display_numbers() -> Vec<u32> {
    vec![10, 20, 30, 50, 100, 200, 300]
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            prizes: DEFAULT_PRIZES
                .iter()
                .map(|&(value, count)| PrizeTier { value, count })
                .collect(),
            display_numbers: default_display_numbers(),
        }
    }
}

impl DrawConfig {
    pub fn total_prizes(&self) -> usize {
        self.prizes.iter().map(|tier| tier.count as usize).sum()
    }

    pub fn count_for(&self, value: u32) -> Option<u32> {
        self.prizes
            .iter()
            .find(|tier| tier.value == value)
            .map(|tier| tier.count)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for tier in &self.prizes {
            if tier.count == 0 {
                return Err(ConfigError::ZeroCount(tier.value));
            }
            if !seen.insert(tier.value) {
                return Err(ConfigError::DuplicatePrize(tier.value));
            }
        }
        let distinct: HashSet<u32> = self.display_numbers.iter().copied().collect();
        if distinct.len() < 2 {
            return Err(ConfigError::TooFewDisplayNumbers(distinct.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_event_layout() {
        let config = DrawConfig::default();
        assert_eq!(config.total_prizes(), 145);
        assert_eq!(config.count_for(300), Some(5));
        assert_eq!(config.count_for(10), Some(50));
        assert_eq!(config.count_for(7), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_tables() {
        let mut config = DrawConfig::default();
        config.prizes.push(PrizeTier { value: 5, count: 0 });
        assert_eq!(config.validate(), Err(ConfigError::ZeroCount(5)));

        let mut config = DrawConfig::default();
        config.prizes.push(PrizeTier { value: 300, count: 1 });
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePrize(300)));

        let config = DrawConfig {
            prizes: vec![PrizeTier { value: 10, count: 1 }],
            display_numbers: vec![10, 10],
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooFewDisplayNumbers(1))
        );
    }

    #[test]
    fn display_numbers_default_when_missing() {
        let config: DrawConfig =
            serde_json::from_str(r#"{"prizes":[{"value":10,"count":3}]}"#).expect("parse");
        assert_eq!(config.display_numbers, vec![10, 20, 30, 50, 100, 200, 300]);
    }
}
