//! Configuration of a skiplist before it is created.

use std::rc::Rc;

use crate::{
    SkipList, SkipListError,
    level_generator::Geometric,
    order::{Order, first, identity, natural},
};

/// Number of levels used when none is configured.
pub const DEFAULT_MAX_LEVEL: usize = 32;

/// Promotion probability used when none is configured.
pub const DEFAULT_P: f64 = 0.5;

/// Builds a [`SkipList`] with a custom number of levels, promotion
/// probability or seed.
///
/// ```
/// use multiskip::Builder;
///
/// let mut set = Builder::new()
///     .max_level(8)
///     .probability(0.25)
///     .seed(7)
///     .build_set()
///     .unwrap();
/// set.insert_equal(3);
/// set.insert_equal(1);
/// assert_eq!(set.max_level(), 8);
/// assert_eq!(set.iter().collect::<Vec<_>>(), [&1, &3]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Builder {
    max_level: usize,
    probability: f64,
    seed: Option<u64>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_P,
            seed: None,
        }
    }
}

impl Builder {
    /// A builder with the default configuration: 32 levels, a promotion
    /// probability of `0.5`, seeded from the operating system.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of levels of the list, which is the height of the tallest
    /// tower it can hold.
    #[inline]
    #[must_use]
    pub fn max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// The probability that a tower present at one level is also present at
    /// the next.
    #[inline]
    #[must_use]
    pub fn probability(mut self, p: f64) -> Self {
        self.probability = p;
        self
    }

    /// Seed the level generator, making tower heights reproducible.
    #[inline]
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn level_generator(&self) -> Result<Geometric, SkipListError> {
        Ok(match self.seed {
            Some(seed) => Geometric::with_seed(self.max_level, self.probability, seed)?,
            None => Geometric::new(self.max_level, self.probability)?,
        })
    }

    /// Build a multiset, where each value is its own key.
    ///
    /// # Errors
    ///
    /// Fails if the number of levels is zero or the probability is not in
    /// `(0, 1)`.
    #[inline]
    pub fn build_set<T: Ord + 'static>(self) -> Result<SkipList<T, T>, SkipListError> {
        Ok(SkipList::from_parts(
            self.level_generator()?,
            Order::new(Rc::new(identity::<T>), Rc::new(natural::<T>)),
        ))
    }

    /// Build a multimap, storing `(key, payload)` pairs ordered by key.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Builder::build_set`].
    #[inline]
    pub fn build_map<K: Ord + 'static, P: 'static>(
        self,
    ) -> Result<SkipList<K, (K, P)>, SkipListError> {
        Ok(SkipList::from_parts(
            self.level_generator()?,
            Order::new(Rc::new(first::<K, P>), Rc::new(natural::<K>)),
        ))
    }

    /// Build a list with a custom key projection and strict weak order.
    ///
    /// ```
    /// use multiskip::Builder;
    ///
    /// // Order words by length, longest first.
    /// let mut words = Builder::new()
    ///     .build_with(|w: &String| w, |a: &String, b: &String| b.len() < a.len())
    ///     .unwrap();
    /// words.extend(["a", "abc", "ab"].map(String::from));
    /// assert_eq!(words.iter().collect::<Vec<_>>(), ["abc", "ab", "a"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Same conditions as [`Builder::build_set`].
    #[inline]
    pub fn build_with<K, V>(
        self,
        key_of: impl Fn(&V) -> &K + 'static,
        less: impl Fn(&K, &K) -> bool + 'static,
    ) -> Result<SkipList<K, V>, SkipListError> {
        Ok(SkipList::from_parts(
            self.level_generator()?,
            Order::new(Rc::new(key_of), Rc::new(less)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::Builder;
    use crate::{SkipListError, level_generator::GeometricError};

    #[test]
    fn invalid() {
        assert_eq!(
            Builder::new().max_level(0).build_set::<u8>().err(),
            Some(SkipListError::Geometric(GeometricError::ZeroMax))
        );
        assert_eq!(
            Builder::new().probability(1.5).build_set::<u8>().err(),
            Some(SkipListError::Geometric(GeometricError::InvalidProbability))
        );
    }

    #[test]
    fn seeded_heights_are_reproducible() -> Result<()> {
        let builder = Builder::new().max_level(12).seed(0x1234_abcd);
        let mut a = builder.build_set()?;
        let mut b = builder.build_set()?;
        for i in 0..256 {
            let (x, y) = (a.insert_equal(i), b.insert_equal(i));
            assert_eq!(a.height(x)?, b.height(y)?);
        }
        Ok(())
    }

    #[test]
    fn map() -> Result<()> {
        let mut map = Builder::new().build_map()?;
        map.insert_equal((2, "b"));
        map.insert_equal((1, "a"));
        map.insert_equal((2, "c"));
        assert_eq!(map.count(&2), 2);
        assert_eq!(map.front(), Some(&(1, "a")));
        Ok(())
    }
}
