//! Geometric level generator.

use rand::{prelude::*, rngs::OsRng};
use thiserror::Error;

use crate::level_generator::LevelGenerator;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The maximum number of levels must be less than `i32::MAX`.
    #[error("max must be less than i32::MAX.")]
    MaxTooLarge,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
    /// Failed to initialize the random number generator.
    #[error("Failed to initialize the random number generator.")]
    RngInitFailed,
}

/// A level generator using a geometric distribution.
///
/// This distribution assumes that if a tower is present at some level `$n$`,
/// then the probability that it is also present at level `$n+1$` is some
/// constant `$p \in (0, 1)$`, the promotion probability. This produces a
/// geometric distribution, albeit truncated at the maximum number of levels
/// allowed.
#[derive(Debug, Clone)]
pub struct Geometric {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The promotion probability.
    p: f64,
    /// `$p^{\text{total}}$`, the normalisation of the truncated CDF.
    p_total: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator with `total` number of levels,
    /// and `p` as the probability that a given tower is present in the next
    /// level. The generator is seeded from the operating system.
    ///
    /// # Errors
    ///
    /// `p` must be strictly between 0 and 1, and `total` must be at least 1
    /// and fit in an `i32`.
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        let p_total = Self::validate(total, p)?;
        Ok(Geometric {
            total,
            p,
            p_total,
            rng: SmallRng::try_from_rng(&mut OsRng)
                .map_err(|_err| GeometricError::RngInitFailed)?,
        })
    }

    /// Create a new geometric level generator with a fixed seed, so that the
    /// sequence of levels is reproducible.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Geometric::new`].
    #[inline]
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        let p_total = Self::validate(total, p)?;
        Ok(Geometric {
            total,
            p,
            p_total,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Create a generator with promotion probability `1/2`, seeded from the
    /// thread-local generator. `total` is assumed to be small and non-zero,
    /// as computed by the list constructors.
    pub(crate) fn halving(total: usize) -> Self {
        debug_assert!((1..=64).contains(&total));
        let p = 0.5_f64;
        Geometric {
            total,
            p,
            p_total: p.powi(i32::try_from(total).unwrap_or(i32::MAX)),
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// The promotion probability.
    #[inline]
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.p
    }

    fn validate(total: usize, p: f64) -> Result<f64, GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroMax);
        }
        let Ok(exponent) = i32::try_from(total) else {
            return Err(GeometricError::MaxTooLarge);
        };
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(p.powi(exponent))
    }
}

impl LevelGenerator for Geometric {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    /// Generate a level for a new tower using a geometric distribution.
    ///
    /// This function generates a random level in the range
    /// `$[0, \text{total})$` by sampling from a uniform distribution and
    /// inverting the cumulative distribution function (CDF) of the truncated
    /// geometric distribution.
    ///
    /// The CDF of the truncated geometric distribution is
    ///
    /// ```math
    /// \text{CDF}(n) = \frac{1 - p^n}{1 - p^{t}}
    /// ```
    ///
    /// where `$t$` is the total number of levels. Inverting it for `$n$`
    /// gives:
    ///
    /// ```math
    /// n = \left\lfloor \log_p\left(1 + (p^{t} - 1) \cdot u\right) \right\rfloor
    /// ```
    ///
    /// where `$u \in [0, 1)$` is a uniformly distributed random variate.
    #[inline]
    #[expect(clippy::float_arithmetic, reason = "Computing inverse CDF")]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "CDF domain is [0, total] so the cast is safe"
    )]
    #[expect(clippy::as_conversions, reason = "No other way to do this")]
    fn level(&mut self) -> usize {
        let u = self.rng.random::<f64>();
        let level = (1.0 + (self.p_total - 1.0) * u).log(self.p).floor() as usize;
        // Rounding may land exactly on `total` when `u` is very close to 1.
        level.min(self.total - 1)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Geometric, LevelGenerator};
    use crate::level_generator::geometric::GeometricError;

    #[test]
    fn invalid_max() {
        assert_eq!(Geometric::new(0, 0.5).err(), Some(GeometricError::ZeroMax));
        assert_eq!(
            Geometric::with_seed(usize::MAX, 0.5, 0).err(),
            Some(GeometricError::MaxTooLarge)
        );
    }

    #[test]
    fn invalid_p() {
        assert_eq!(
            Geometric::new(1, 0.0).err(),
            Some(GeometricError::InvalidProbability)
        );
        assert_eq!(
            Geometric::new(1, 1.0).err(),
            Some(GeometricError::InvalidProbability)
        );
        assert_eq!(
            Geometric::new(1, f64::NAN).err(),
            Some(GeometricError::InvalidProbability)
        );
    }

    #[rstest]
    fn new(
        #[values(1, 2, 16, 32, 1024)] n: usize,
        #[values(0.01, 0.1, 0.5, 0.9)] p: f64,
    ) -> Result<()> {
        let mut generator = Geometric::new(n, p)?;
        assert_eq!(generator.total(), n);
        for _ in 0..100_000 {
            let level = generator.level();
            assert!((0..n).contains(&level));
        }

        // Level 0 is the most likely outcome for every p.
        if !(0..100_000).any(|_| generator.level() == 0) {
            bail!("Failed to generate a level-0 tower.");
        }
        Ok(())
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    fn reaches_max(#[case] n: usize) -> Result<()> {
        let mut generator = Geometric::with_seed(n, 0.5, 7)?;
        if !(0..100_000).any(|_| generator.level() == n - 1) {
            bail!("Failed to generate a level-{} tower.", n - 1);
        }
        Ok(())
    }

    #[test]
    fn heights_are_never_zero() -> Result<()> {
        let mut generator = Geometric::with_seed(8, 0.5, 42)?;
        for _ in 0..10_000 {
            let height = generator.height();
            assert!((1..=8).contains(&height));
        }
        Ok(())
    }

    #[rstest]
    #[case(0.25)]
    #[case(0.5)]
    #[case(0.75)]
    fn promotion_rate(#[case] p: f64) -> Result<()> {
        let samples = 200_000;
        let mut generator = Geometric::with_seed(32, p, 1)?;
        let promoted = (0..samples).filter(|_| generator.level() >= 1).count();
        #[expect(clippy::as_conversions, clippy::cast_precision_loss, reason = "test")]
        let rate = promoted as f64 / f64::from(samples);
        assert!((rate - p).abs() < 0.01, "rate {rate} too far from {p}");
        Ok(())
    }

    #[test]
    fn halving() {
        let mut generator = Geometric::halving(32);
        assert_eq!(generator.total(), 32);
        assert!((generator.probability() - 0.5).abs() < f64::EPSILON);
        assert!((0..1000).all(|_| generator.level() < 32));
    }

    #[test]
    fn seeded_is_reproducible() -> Result<()> {
        let mut a = Geometric::with_seed(16, 0.5, 99)?;
        let mut b = Geometric::with_seed(16, 0.5, 99)?;
        let xs: Vec<_> = (0..64).map(|_| a.level()).collect();
        let ys: Vec<_> = (0..64).map(|_| b.level()).collect();
        assert_eq!(xs, ys);

        // A clone continues the same sequence independently.
        let mut c = a.clone();
        assert_eq!(a.level(), c.level());
        Ok(())
    }
}
