use rand::{rngs::StdRng, seq::SliceRandom, RngCore, SeedableRng};

/// Source of randomness for pool draws and loss displays.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    fn below(&mut self, bound: usize) -> usize {
        let bound = bound as u64;
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let roll = self.next_u64();
            if roll < zone {
                return (roll % bound) as usize;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl RandomSource for RngState {
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}
