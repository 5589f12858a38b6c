//! Aesthetic Randomizer
//!
//! Samples the rotation, offset and decoration flag applied to a placeholder.

use std::fmt;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::config::{Bounds, RandomizationConfig};
use crate::models::Aesthetic;

/// Draws [`Aesthetic`] samples within the configured bounds.
///
/// The random source is injectable so tests can seed it.
pub struct AestheticRandomizer {
    config: RandomizationConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl AestheticRandomizer {
    /// Creates a randomizer seeded from the OS.
    pub fn new(config: RandomizationConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a randomizer with a reproducible sequence.
    pub fn seeded(config: RandomizationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: RandomizationConfig, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            config,
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Probability that a sample carries decorations, clamped to 1.0.
    pub fn decoration_chance(&self) -> f64 {
        (self.config.tape_chance + self.config.staple_chance).clamp(0.0, 1.0)
    }

    /// Draws one sample; every value is uniform within its bound.
    pub fn sample(&self) -> Aesthetic {
        let decoration_chance = self.decoration_chance();
        // A poisoned lock only means another sampler panicked mid-draw; the
        // generator state is still usable.
        let mut guard = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let rng: &mut dyn RngCore = &mut **guard;

        Aesthetic {
            rotation: sample_within(rng, self.config.rotation),
            translate_x: sample_within(rng, self.config.translate_x),
            translate_y: sample_within(rng, self.config.translate_y),
            has_decorations: rng.gen_bool(decoration_chance),
        }
    }
}

impl fmt::Debug for AestheticRandomizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AestheticRandomizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Uniform draw from an inclusive interval. Degenerate or inverted bounds yield `min`.
pub(crate) fn sample_within<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds) -> f64 {
    if bounds.max > bounds.min {
        rng.gen_range(bounds.min..=bounds.max)
    } else {
        bounds.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_stay_within_default_bounds() {
        let randomizer = AestheticRandomizer::new(RandomizationConfig::default());

        for _ in 0..1_000 {
            let sample = randomizer.sample();
            assert!((-5.0..=5.0).contains(&sample.rotation), "rotation {}", sample.rotation);
            assert!((-3.0..=3.0).contains(&sample.translate_x), "x {}", sample.translate_x);
            assert!((-3.0..=3.0).contains(&sample.translate_y), "y {}", sample.translate_y);
        }
    }

    #[test]
    fn test_seeded_randomizers_agree() {
        let a = AestheticRandomizer::seeded(RandomizationConfig::default(), 7);
        let b = AestheticRandomizer::seeded(RandomizationConfig::default(), 7);

        for _ in 0..20 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn test_samples_vary() {
        let randomizer = AestheticRandomizer::seeded(RandomizationConfig::default(), 99);
        let first = randomizer.sample();
        let differs = (0..50).any(|_| randomizer.sample().rotation != first.rotation);
        assert!(differs);
    }

    #[test]
    fn test_decoration_chance_clamped() {
        let config = RandomizationConfig {
            tape_chance: 0.8,
            staple_chance: 0.5,
            ..RandomizationConfig::default()
        };
        let randomizer = AestheticRandomizer::seeded(config, 1);

        assert_eq!(randomizer.decoration_chance(), 1.0);
        assert!((0..200).all(|_| randomizer.sample().has_decorations));
    }

    #[test]
    fn test_no_decorations_when_chances_zero() {
        let config = RandomizationConfig {
            tape_chance: 0.0,
            staple_chance: 0.0,
            ..RandomizationConfig::default()
        };
        let randomizer = AestheticRandomizer::seeded(config, 1);
        assert!((0..200).all(|_| !randomizer.sample().has_decorations));
    }

    #[test]
    fn test_decoration_frequency_tracks_chance() {
        let randomizer = AestheticRandomizer::seeded(RandomizationConfig::default(), 42);
        let decorated = (0..10_000).filter(|_| randomizer.sample().has_decorations).count();

        // default chance is 0.3 + 0.1
        assert!((3_600..4_400).contains(&decorated), "decorated {}", decorated);
    }

    #[test]
    fn test_degenerate_bounds() {
        let config = RandomizationConfig {
            rotation: Bounds::new(2.0, 2.0),
            translate_x: Bounds::new(1.0, -1.0),
            ..RandomizationConfig::default()
        };
        let sample = AestheticRandomizer::seeded(config, 3).sample();
        assert_eq!(sample.rotation, 2.0);
        assert_eq!(sample.translate_x, 1.0);
    }
}
