//! The membership filter: a classic bit-array Bloom filter.
//!
//! A [`MembershipFilter`] owns a fixed-length bit vector and the first
//! `hash_count` entries of the [`hash bank`](crate::hash). Training a key
//! sets the bit at `hash(key) mod bit_length` for each active hash function;
//! a query reports "possibly present" only if every one of those bits is set.
//!
//! Two guarantees follow from the construction:
//!
//! - **No false negatives**: a trained key always queries positive, because
//!   its bits were set and bits are never cleared.
//! - **Monotonicity**: once a query answers `true` it stays `true` for the
//!   rest of the filter's life, no matter what else is trained.
//!
//! False *positives* are an inherent, intentional property of the structure,
//! not a defect; measuring their empirical rate is the whole point of the
//! [`eval`](crate::eval) module.
//!
//! # Examples
//!
//! ```
//! use bloomgauge::MembershipFilter;
//!
//! let mut filter = MembershipFilter::new(1_000, 3).unwrap();
//! filter.train("hello");
//! filter.train("world");
//!
//! assert!(filter.query("hello"));
//! assert!(filter.query("world"));
//! // "goodbye" is overwhelmingly likely to miss in a filter this sparse.
//! ```

use crate::error::{BloomGaugeError, Result};
use crate::hash;
use tracing::warn;

/// Implementation maximum for the bit array length.
///
/// 2^26 bits (8 MiB of backing store). Requests above this are clamped down
/// with a warning; the dictionaries this crate evaluates sit orders of
/// magnitude below it even at the largest length factors.
pub const MAX_BIT_LENGTH: usize = 1 << 26;

/// A trained-once, queried-many membership filter over strings.
///
/// The bit vector is packed into `u64` words, 64 bits per word. Both
/// `bit_length` and `hash_count` are immutable after construction; the only
/// mutation the type permits is setting bits through [`train`].
///
/// # Index computation
///
/// `train` and `query` share one formula, `hash(key) as usize % bit_length`,
/// applied to the bank entries in their fixed table order. Keeping the two
/// paths byte-for-byte identical is what makes the no-false-negative
/// guarantee hold.
///
/// [`train`]: MembershipFilter::train
#[derive(Debug, Clone)]
pub struct MembershipFilter {
    /// Bit array packed into u64 words.
    bits: Vec<u64>,

    /// Total number of addressable bits.
    bit_length: usize,

    /// Number of bank entries active for this filter.
    hash_count: usize,
}

impl MembershipFilter {
    /// Create a filter with the given bit array length and hash count.
    ///
    /// `bit_length` is clamped down to [`MAX_BIT_LENGTH`] and `hash_count`
    /// to [`hash::BANK_SIZE`]; either clamp emits a `tracing` warning but is
    /// not an error. All bits start unset.
    ///
    /// # Errors
    ///
    /// - [`BloomGaugeError::InvalidBitLength`] if `bit_length == 0`
    /// - [`BloomGaugeError::InvalidHashCount`] if `hash_count == 0`
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomgauge::MembershipFilter;
    ///
    /// let filter = MembershipFilter::new(12, 2).unwrap();
    /// assert_eq!(filter.bit_length(), 12);
    /// assert_eq!(filter.hash_count(), 2);
    ///
    /// assert!(MembershipFilter::new(0, 2).is_err());
    /// assert!(MembershipFilter::new(12, 0).is_err());
    /// ```
    pub fn new(bit_length: usize, hash_count: usize) -> Result<Self> {
        if bit_length == 0 {
            return Err(BloomGaugeError::invalid_bit_length(bit_length));
        }
        if hash_count == 0 {
            return Err(BloomGaugeError::invalid_hash_count(
                hash_count,
                1,
                hash::BANK_SIZE,
            ));
        }

        let bit_length = if bit_length > MAX_BIT_LENGTH {
            warn!(
                requested = bit_length,
                max = MAX_BIT_LENGTH,
                "bit array length clamped to implementation maximum"
            );
            MAX_BIT_LENGTH
        } else {
            bit_length
        };

        let hash_count = if hash_count > hash::BANK_SIZE {
            warn!(
                requested = hash_count,
                available = hash::BANK_SIZE,
                "hash count clamped to the number of implemented hash functions"
            );
            hash::BANK_SIZE
        } else {
            hash_count
        };

        let word_count = (bit_length + 63) / 64;

        Ok(Self {
            bits: vec![0u64; word_count],
            bit_length,
            hash_count,
        })
    }

    /// Effective bit array length after any clamping.
    #[must_use]
    #[inline]
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Effective number of active hash functions after any clamping.
    #[must_use]
    #[inline]
    pub fn hash_count(&self) -> usize {
        self.hash_count
    }

    /// Store a key in the filter.
    ///
    /// Sets the bit at `hash(key) mod bit_length` for each active hash
    /// function. Cannot fail for well-formed input; training the same key
    /// twice is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomgauge::MembershipFilter;
    ///
    /// let mut filter = MembershipFilter::new(1_000, 3).unwrap();
    /// filter.train("alpha");
    /// assert!(filter.query("alpha"));
    /// ```
    #[inline]
    pub fn train(&mut self, key: &str) {
        for hash_fn in &hash::BANK[..self.hash_count] {
            let index = hash_fn(key) as usize % self.bit_length;
            self.set_bit(index);
        }
    }

    /// Test a candidate's membership.
    ///
    /// Recomputes the same indices as [`train`] and answers `true` only if
    /// every indexed bit is set, exiting on the first unset bit. A `true`
    /// result means *possibly present* (false positives are possible); a
    /// `false` result means *definitely absent*.
    ///
    /// [`train`]: MembershipFilter::train
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomgauge::MembershipFilter;
    ///
    /// let mut filter = MembershipFilter::new(1_000, 3).unwrap();
    /// filter.train("present");
    ///
    /// assert!(filter.query("present"));
    /// ```
    #[must_use]
    #[inline]
    pub fn query(&self, candidate: &str) -> bool {
        for hash_fn in &hash::BANK[..self.hash_count] {
            let index = hash_fn(candidate) as usize % self.bit_length;
            if !self.test_bit(index) {
                return false;
            }
        }
        true
    }

    /// Number of bits currently set.
    #[must_use]
    pub fn count_set_bits(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Fraction of bits set, in `[0.0, 1.0]`.
    ///
    /// A fill rate approaching 1.0 means the configuration is saturated and
    /// nearly every query will answer `true`.
    #[must_use]
    pub fn fill_rate(&self) -> f64 {
        self.count_set_bits() as f64 / self.bit_length as f64
    }

    /// True if no key has been trained yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&word| word == 0)
    }

    /// Set the bit at `index`.
    #[inline]
    fn set_bit(&mut self, index: usize) {
        debug_assert!(
            index < self.bit_length,
            "bit index {} out of bounds (bit_length={})",
            index,
            self.bit_length
        );

        let word_idx = index / 64;
        let bit_offset = index % 64;
        self.bits[word_idx] |= 1u64 << bit_offset;
    }

    /// Test the bit at `index`.
    #[inline]
    fn test_bit(&self, index: usize) -> bool {
        debug_assert!(
            index < self.bit_length,
            "bit index {} out of bounds (bit_length={})",
            index,
            self.bit_length
        );

        let word_idx = index / 64;
        let bit_offset = index % 64;
        (self.bits[word_idx] & (1u64 << bit_offset)) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let filter = MembershipFilter::new(1000, 3).unwrap();
        assert_eq!(filter.bit_length(), 1000);
        assert_eq!(filter.hash_count(), 3);
        assert!(filter.is_empty());
        assert_eq!(filter.count_set_bits(), 0);
    }

    #[test]
    fn test_zero_bit_length_rejected() {
        let err = MembershipFilter::new(0, 3).unwrap_err();
        assert!(matches!(err, BloomGaugeError::InvalidBitLength { length: 0 }));
    }

    #[test]
    fn test_zero_hash_count_rejected() {
        let err = MembershipFilter::new(1000, 0).unwrap_err();
        assert!(matches!(err, BloomGaugeError::InvalidHashCount { count: 0, .. }));
    }

    #[test]
    fn test_bit_length_clamped_to_maximum() {
        let filter = MembershipFilter::new(MAX_BIT_LENGTH + 1, 2).unwrap();
        assert_eq!(filter.bit_length(), MAX_BIT_LENGTH);

        let filter = MembershipFilter::new(usize::MAX, 2).unwrap();
        assert_eq!(filter.bit_length(), MAX_BIT_LENGTH);
    }

    #[test]
    fn test_hash_count_clamped_to_bank_size() {
        let filter = MembershipFilter::new(1000, hash::BANK_SIZE + 5).unwrap();
        assert_eq!(filter.hash_count(), hash::BANK_SIZE);
    }

    #[test]
    fn test_train_and_query() {
        let mut filter = MembershipFilter::new(1000, 3).unwrap();
        filter.train("hello");

        assert!(filter.query("hello"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_no_false_negatives() {
        let mut filter = MembershipFilter::new(12_000, 3).unwrap();
        let keys: Vec<String> = (0..1000).map(|i| format!("key-{}", i)).collect();

        for key in &keys {
            filter.train(key);
        }
        for key in &keys {
            assert!(filter.query(key), "false negative for {}", key);
        }
    }

    #[test]
    fn test_no_false_negatives_at_every_hash_count() {
        for hash_count in 1..=hash::BANK_SIZE {
            let mut filter = MembershipFilter::new(512, hash_count).unwrap();
            for i in 0..100 {
                filter.train(&format!("entry-{}", i));
            }
            for i in 0..100 {
                assert!(
                    filter.query(&format!("entry-{}", i)),
                    "false negative at hash_count={}",
                    hash_count
                );
            }
        }
    }

    #[test]
    fn test_monotonicity() {
        let mut filter = MembershipFilter::new(256, 2).unwrap();
        filter.train("anchor");
        assert!(filter.query("anchor"));

        // Further training on other keys must never clear a positive result.
        for i in 0..500 {
            filter.train(&format!("noise-{}", i));
            assert!(filter.query("anchor"));
        }
    }

    #[test]
    fn test_repeated_query_is_consistent() {
        let mut filter = MembershipFilter::new(12, 2).unwrap();
        filter.train("alpha");
        filter.train("beta");
        filter.train("gamma");

        // "zzzzz" may hit or miss in 12 bits, but the answer cannot change
        // between calls with no intervening training.
        let first = filter.query("zzzzz");
        for _ in 0..10 {
            assert_eq!(filter.query("zzzzz"), first);
        }
    }

    #[test]
    fn test_small_dictionary_scenario() {
        let mut filter = MembershipFilter::new(12, 2).unwrap();
        for key in ["alpha", "beta", "gamma"] {
            filter.train(key);
        }

        assert!(filter.query("alpha"));
        assert!(filter.query("beta"));
        assert!(filter.query("gamma"));
    }

    #[test]
    fn test_retraining_same_key_is_idempotent() {
        let mut filter = MembershipFilter::new(1000, 3).unwrap();
        filter.train("twice");
        let set_after_first = filter.count_set_bits();

        filter.train("twice");
        assert_eq!(filter.count_set_bits(), set_after_first);
    }

    #[test]
    fn test_set_bits_bounded_by_hash_count() {
        let mut filter = MembershipFilter::new(10_000, 4).unwrap();
        filter.train("one-key");
        let set = filter.count_set_bits();
        assert!(set > 0);
        assert!(set <= 4, "one key set {} bits with hash_count=4", set);
    }

    #[test]
    fn test_fill_rate() {
        let mut filter = MembershipFilter::new(1000, 3).unwrap();
        assert_eq!(filter.fill_rate(), 0.0);

        for i in 0..100 {
            filter.train(&format!("fill-{}", i));
        }
        let fill_rate = filter.fill_rate();
        assert!(fill_rate > 0.0 && fill_rate < 1.0);
    }

    #[test]
    fn test_bit_length_not_multiple_of_word_size() {
        // 12 bits lives inside a single u64 word; indices above 11 must
        // never be produced by the modulo reduction.
        let mut filter = MembershipFilter::new(12, 4).unwrap();
        for i in 0..200 {
            filter.train(&format!("word-{}", i));
        }
        assert!(filter.count_set_bits() <= 12);
    }
}
