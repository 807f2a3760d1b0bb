//! Injectable randomness for room codes and symbol assignment.

use rand::Rng;
use std::collections::VecDeque;
use tracing::{instrument, trace};

/// Source of the random decisions a hub makes.
pub trait RandomSource: Send {
    /// Fair coin flip.
    fn coin_flip(&mut self) -> bool;

    /// Uniform index in `0..upper`. `upper` is never zero.
    fn pick(&mut self, upper: usize) -> usize;
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn coin_flip(&mut self) -> bool {
        rand::rng().random_bool(0.5)
    }

    fn pick(&mut self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }
}

/// Replays a fixed script of decisions.
///
/// Once a script runs dry, flips return `false` and picks return `0`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    flips: VecDeque<bool>,
    picks: VecDeque<usize>,
}

impl ScriptedRandom {
    /// Creates a source that always flips `false` and picks `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends coin flips to the script.
    #[instrument(skip(self))]
    pub fn with_flips(mut self, flips: impl IntoIterator<Item = bool> + std::fmt::Debug) -> Self {
        self.flips.extend(flips);
        self
    }

    /// Appends picks to the script. Each is reduced modulo the requested bound.
    #[instrument(skip(self))]
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize> + std::fmt::Debug) -> Self {
        self.picks.extend(picks);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn coin_flip(&mut self) -> bool {
        let flip = self.flips.pop_front().unwrap_or(false);
        trace!(flip, "Scripted coin flip");
        flip
    }

    fn pick(&mut self, upper: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % upper
    }
}
