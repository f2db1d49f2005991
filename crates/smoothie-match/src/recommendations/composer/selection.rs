use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks one option among equally acceptable, pre-ranked choices.
///
/// Implementations receive the number of options (always at least one) and return an
/// index below it. Out-of-range answers are clamped by the composer.
pub trait ChoiceStrategy {
    fn choose(&mut self, options: usize) -> usize;
}

/// Always takes the best-ranked option, giving reproducible compositions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoice;

impl ChoiceStrategy for FirstChoice {
    fn choose(&mut self, _options: usize) -> usize {
        0
    }
}

/// Uniform choice among the offered options. Defaults to `StdRng`.
#[derive(Debug, Clone)]
pub struct RandomChoice<R = StdRng> {
    rng: R,
}

impl<R: Rng> RandomChoice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomChoice<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> ChoiceStrategy for RandomChoice<R> {
    fn choose(&mut self, options: usize) -> usize {
        if options <= 1 {
            return 0;
        }
        self.rng.gen_range(0..options)
    }
}
