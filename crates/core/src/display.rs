use crate::{ConfigError, DisplaySlots, RandomSource};
use std::collections::HashSet;

/// Reel values for a losing draw: three independent picks from `numbers`,
/// resampled while all three match so a loss never looks like a win.
pub fn loss_display<R: RandomSource + ?Sized>(
    numbers: &[u32],
    rng: &mut R,
) -> Result<DisplaySlots, ConfigError> {
    let distinct = numbers.iter().collect::<HashSet<_>>().len();
    if distinct < 2 {
        return Err(ConfigError::TooFewDisplayNumbers(distinct));
    }
    loop {
        let slots = [
            numbers[rng.below(numbers.len())],
            numbers[rng.below(numbers.len())],
            numbers[rng.below(numbers.len())],
        ];
        if !is_triple(&slots) {
            return Ok(slots);
        }
    }
}

pub fn is_triple(slots: &DisplaySlots) -> bool {
    slots[0] == slots[1] && slots[1] == slots[2]
}
