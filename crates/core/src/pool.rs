use crate::{DrawConfig, RandomSource, RngState};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("prize pool is empty")]
    Empty,
}

/// Remaining, not yet awarded prizes. One entry per physical prize.
#[derive(Debug, Default, Clone)]
pub struct PrizePool {
    prizes: Vec<u32>,
}

impl PrizePool {
    pub fn from_config(config: &DrawConfig, rng: &mut RngState) -> Self {
        let mut prizes = Vec::with_capacity(config.total_prizes());
        for tier in &config.prizes {
            prizes.extend(std::iter::repeat(tier.value).take(tier.count as usize));
        }
        rng.shuffle(&mut prizes);
        Self { prizes }
    }

    pub fn from_values(prizes: Vec<u32>) -> Self {
        Self { prizes }
    }

    pub fn size(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.prizes.get(index).copied()
    }

    /// Uniform over remaining copies, so a value with five copies left is five
    /// times as likely as a value with one.
    pub fn take_random<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<u32, PoolError> {
        if self.prizes.is_empty() {
            return Err(PoolError::Empty);
        }
        let idx = rng.below(self.prizes.len());
        Ok(self.prizes.swap_remove(idx))
    }

    /// Takes the front of the shuffled pool.
    pub fn take_guaranteed(&mut self) -> Result<u32, PoolError> {
        if self.prizes.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(self.prizes.remove(0))
    }

    pub fn remove(&mut self, value: u32) -> bool {
        match self.prizes.iter().position(|prize| *prize == value) {
            Some(idx) => {
                self.prizes.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for prize in &self.prizes {
            *counts.entry(*prize).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrizeTier;

    #[test]
    fn from_config_holds_every_prize() {
        let config = DrawConfig {
            prizes: vec![
                PrizeTier { value: 300, count: 2 },
                PrizeTier { value: 10, count: 5 },
            ],
            display_numbers: vec![10, 300],
        };
        let pool = PrizePool::from_config(&config, &mut RngState::from_seed(7));
        assert_eq!(pool.size(), 7);
        assert_eq!(pool.counts().get(&300), Some(&2));
        assert_eq!(pool.counts().get(&10), Some(&5));
    }

    #[test]
    fn takes_fail_on_empty_pool() {
        let mut pool = PrizePool::default();
        let mut rng = RngState::from_seed(1);
        assert_eq!(pool.take_random(&mut rng), Err(PoolError::Empty));
        assert_eq!(pool.take_guaranteed(), Err(PoolError::Empty));
        assert!(!pool.remove(10));
    }

    #[test]
    fn remove_takes_a_single_copy() {
        let mut pool = PrizePool::from_values(vec![10, 20, 10]);
        assert!(pool.remove(10));
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.counts().get(&10), Some(&1));
        assert!(!pool.remove(50));
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn take_guaranteed_drains_in_order() {
        let mut pool = PrizePool::from_values(vec![30, 20, 10]);
        assert_eq!(pool.take_guaranteed(), Ok(30));
        assert_eq!(pool.take_guaranteed(), Ok(20));
        assert_eq!(pool.take_guaranteed(), Ok(10));
        assert!(pool.is_empty());
    }

    #[test]
    fn take_random_weights_by_copies() {
        let mut rng = RngState::from_seed(99);
        let mut big = 0;
        let trials = 20_000;
        for _ in 0..trials {
            let mut pool = PrizePool::from_values(vec![10, 10, 10, 10, 10, 300]);
            if pool.take_random(&mut rng) == Ok(10) {
                big += 1;
            }
        }
        let rate = big as f64 / trials as f64;
        assert!((rate - 5.0 / 6.0).abs() < 0.02, "rate {rate}");
    }
}
