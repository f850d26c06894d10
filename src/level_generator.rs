//! Skiplists use a probabilistic distribution of towers over the internal
//! levels, whereby the lowest level (level 0) contains every tower, and each
//! level $n > 0$ contains a random subset of the towers on level $n - 1$.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! tower reaches level $n$ is $p$ times the chance of reaching level $n-1$
//! (with $0 < p < 1$).
//!
//! Each list owns its generator, so cloning a list clones the generator state
//! along with it and the two lists draw their heights independently
//! afterwards.

pub mod geometric;

pub use geometric::{Geometric, GeometricError};

// ////////////////////////////////////////////////////////////////////////////
// Level Generator
// ////////////////////////////////////////////////////////////////////////////

/// Upon the insertion of a new tower in the list, the tower is replicated to
/// higher levels with a certain probability as determined by a
/// [`LevelGenerator`].
///
/// A [`SkipList`][crate::SkipList] always draws its heights from a
/// [`Geometric`] generator configured through [`Builder`][crate::Builder].
/// The trait is the interface of that generator; implementing it for another
/// type does not change how lists pick their heights.
///
/// ```
/// use multiskip::level_generator::{Geometric, LevelGenerator};
///
/// let mut generator = Geometric::with_seed(4, 0.5, 7).unwrap();
/// assert_eq!(generator.total(), 4);
/// assert!((1..=4).contains(&generator.height()));
/// ```
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist.
    #[must_use]
    fn total(&self) -> usize;

    /// Generate a random level for a new tower in the range `[0, total)`.
    ///
    /// This function should _never_ return a level greater or equal to
    /// [`total`][LevelGenerator::total].
    #[must_use]
    fn level(&mut self) -> usize;

    /// Generate the height of a new tower, in the range `[1, total]`.
    ///
    /// A tower of height `h` participates in levels `0..h`.
    #[inline]
    #[must_use]
    fn height(&mut self) -> usize {
        self.level().saturating_add(1)
    }
}
