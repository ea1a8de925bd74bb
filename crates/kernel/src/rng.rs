/// Linear congruential generator used for turn-order shuffling.
///
/// The recurrence is fixed so any implementation replays the same order:
///
/// ```text
/// state' = (1664525 * state + 1013904223) mod 2^32
/// ```
///
/// Each call to [`Lcg::next_u32`] advances the state once and returns it.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub const MULTIPLIER: u32 = 1_664_525;
    pub const INCREMENT: u32 = 1_013_904_223;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed for the shuffle of a given turn: `(world_seed + turn) mod 2^32`.
    pub fn for_turn(world_seed: u32, turn: u64) -> Self {
        Self::new(world_seed.wrapping_add(turn as u32))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }

    /// Uniform index in `0..bound`, computed as `(next * bound) >> 32`.
    pub fn below(&mut self, bound: usize) -> usize {
        ((u64::from(self.next_u32()) * bound as u64) >> 32) as usize
    }

    /// Fisher–Yates shuffle, walking from the last element down to index 1.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
