//! Synthesis of plausible-but-absent and pure-noise test keys.
//!
//! The evaluation protocol needs two kinds of negative samples: *near
//! misses*, strings that look like dictionary entries but (almost
//! certainly) are not, and *pure noise*, short uniformly random words.
//! [`Mutator`] produces both. Near misses come from perturbing a sampled
//! valid entry with random substitutions, deletions and insertions, then
//! appending a random suffix so the result is guaranteed to differ from its
//! source even when every probabilistic pass is a no-op.
//!
//! A mutated string is *not* guaranteed absent from the dictionary, only
//! overwhelmingly likely to be. The protocol accepts that approximation.
//!
//! Randomness is threaded in by the caller as `&mut impl Rng`, so one seeded
//! generator stays authoritative for a whole evaluation run and results are
//! reproducible.
//!
//! # Examples
//!
//! ```
//! use bloomgauge::Mutator;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mutator = Mutator::new();
//! let mut rng = ChaCha8Rng::seed_from_u64(1984);
//!
//! let near_miss = mutator.mutate(&mut rng, "alphabet");
//! assert_ne!(near_miss, "alphabet");
//!
//! let noise = mutator.random_word(&mut rng, 5);
//! assert_eq!(noise.len(), 5);
//! ```

use rand::Rng;

/// First character of the sampling range: `'!'`, the lowest printable,
/// non-space ASCII character.
const CHAR_RANGE_START: u8 = b'!';

/// Last character of the sampling range: `'~'`, the highest printable ASCII
/// character.
const CHAR_RANGE_END: u8 = b'~';

/// Insertion allowance used when the length-proportional bound computes to
/// zero (an empty input, or a zero extension rate).
pub const FALLBACK_EXTENSION_LIMIT: usize = 2;

/// Probabilities and bounds for the mutation passes.
///
/// All `*_rate` fields are probabilities in `[0.0, 1.0]`: a
/// `substitution_rate` of 0.3 replaces roughly 30% of characters, not 0.3%.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationConfig {
    /// Chance that any individual character is replaced.
    pub substitution_rate: f64,

    /// Chance that the deletion pass runs at all.
    pub deletion_pass_rate: f64,

    /// Cap on deletions as a fraction of input length:
    /// `floor(len * max_deletion_rate)` characters at most.
    pub max_deletion_rate: f64,

    /// Cap on insertions as a fraction of input length:
    /// `ceil(len * max_extension_rate)` characters at most.
    pub max_extension_rate: f64,

    /// Length of the random word unconditionally appended by `mutate`.
    pub appended_word_length: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            substitution_rate: 0.3,
            deletion_pass_rate: 0.9,
            max_deletion_rate: 0.2,
            max_extension_rate: 0.2,
            appended_word_length: 10,
        }
    }
}

impl MutationConfig {
    /// Panics with a clear message if any rate lies outside `[0, 1]`.
    fn validate(&self) {
        for (name, rate) in [
            ("substitution_rate", self.substitution_rate),
            ("deletion_pass_rate", self.deletion_pass_rate),
            ("max_deletion_rate", self.max_deletion_rate),
            ("max_extension_rate", self.max_extension_rate),
        ] {
            assert!(
                (0.0..=1.0).contains(&rate),
                "{} must be in [0, 1], got {}",
                name,
                rate
            );
        }
    }
}

/// Produces randomized near-duplicates and random fixed-length words.
///
/// Stateless apart from its configuration; every method draws from the
/// caller's RNG.
#[derive(Debug, Clone, Default)]
pub struct Mutator {
    config: MutationConfig,
}

impl Mutator {
    /// Create a mutator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MutationConfig::default())
    }

    /// Create a mutator with an explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if any rate in `config` lies outside `[0, 1]`.
    #[must_use]
    pub fn with_config(config: MutationConfig) -> Self {
        config.validate();
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// One character drawn uniformly from the printable ASCII range
    /// `'!'..='~'`.
    pub fn random_char<R: Rng>(&self, rng: &mut R) -> char {
        rng.gen_range(CHAR_RANGE_START..=CHAR_RANGE_END) as char
    }

    /// A word of `length` characters drawn via [`random_char`].
    ///
    /// [`random_char`]: Mutator::random_char
    pub fn random_word<R: Rng>(&self, rng: &mut R, length: usize) -> String {
        (0..length).map(|_| self.random_char(rng)).collect()
    }

    /// Change `input` in a somewhat random way.
    ///
    /// Four passes, applied independently:
    ///
    /// 1. each character is replaced with probability `substitution_rate`;
    /// 2. with probability `deletion_pass_rate`, up to
    ///    `floor(len * max_deletion_rate)` characters are removed at random
    ///    positions;
    /// 3. up to `ceil(len * max_extension_rate)` random characters are
    ///    inserted at random positions ([`FALLBACK_EXTENSION_LIMIT`] when
    ///    that bound is zero, e.g. for empty input);
    /// 4. a random word of `appended_word_length` characters is appended
    ///    unconditionally, so the output differs from the input even when
    ///    every probabilistic pass was a no-op.
    pub fn mutate<R: Rng>(&self, rng: &mut R, input: &str) -> String {
        let mut chars: Vec<char> = input.chars().collect();
        let original_len = chars.len();

        self.substitute_chars(rng, &mut chars);

        if rng.gen_bool(self.config.deletion_pass_rate) {
            self.delete_chars(rng, &mut chars, original_len);
        }

        self.insert_chars(rng, &mut chars, original_len);

        let mut mutation: String = chars.into_iter().collect();
        mutation.push_str(&self.random_word(rng, self.config.appended_word_length));
        mutation
    }

    /// Pass 1: per-character substitution.
    fn substitute_chars<R: Rng>(&self, rng: &mut R, chars: &mut [char]) {
        for slot in chars.iter_mut() {
            if rng.gen_bool(self.config.substitution_rate) {
                *slot = self.random_char(rng);
            }
        }
    }

    /// Pass 2: remove up to `floor(original_len * max_deletion_rate)`
    /// characters at random positions.
    fn delete_chars<R: Rng>(&self, rng: &mut R, chars: &mut Vec<char>, original_len: usize) {
        let bound = (original_len as f64 * self.config.max_deletion_rate).floor() as usize;
        if bound == 0 {
            return;
        }
        let deletions = rng.gen_range(0..=bound);
        for _ in 0..deletions {
            if chars.is_empty() {
                break;
            }
            let victim = rng.gen_range(0..chars.len());
            chars.remove(victim);
        }
    }

    /// Pass 3: insert up to `ceil(original_len * max_extension_rate)` random
    /// characters at random positions, falling back to a fixed allowance
    /// when the bound is zero.
    fn insert_chars<R: Rng>(&self, rng: &mut R, chars: &mut Vec<char>, original_len: usize) {
        let bound = (original_len as f64 * self.config.max_extension_rate).ceil() as usize;
        let bound = if bound == 0 { FALLBACK_EXTENSION_LIMIT } else { bound };
        let insertions = rng.gen_range(0..=bound);
        for _ in 0..insertions {
            let slot = rng.gen_range(0..=chars.len());
            let glyph = self.random_char(rng);
            chars.insert(slot, glyph);
        }
    }
}
