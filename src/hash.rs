//! Hash bank for the membership filter.
//!
//! A fixed, ordered table of string-hash functions. The filter activates the
//! first `hash_count` entries of [`BANK`] and iterates them in the same order
//! during both training and querying, so bit positions are consistent
//! bit-for-bit between the two operations.
//!
//! All functions here are pure and deterministic across runs: no random
//! hasher keys, no per-process state. None are cryptographically secure,
//! and none need to be; the filter only requires uniform, mutually
//! independent index distributions.
//!
//! # Composition
//!
//! | Slot | Function     | Family                                  |
//! |------|--------------|-----------------------------------------|
//! | 0    | [`built_in`] | Platform string hash (SipHash-1-3)      |
//! | 1    | [`fnv1a`]    | FNV-1a multiplicative                   |
//! | 2    | [`wy_mix`]   | wyhash-style widening-multiply fold     |
//! | 3    | [`split_mix`]| splitmix64-style XOR-shift avalanche    |
//!
//! The table mixes one general-purpose hash with three bit-mixing hashes
//! whose constants come from unrelated families, keeping the k selected
//! functions uncorrelated.
//!
//! # Examples
//!
//! ```
//! use bloomgauge::hash::{BANK, BANK_SIZE, fnv1a};
//!
//! assert_eq!(BANK_SIZE, 4);
//! assert_eq!(BANK[1]("hello"), fnv1a("hello"));
//! ```

/// Signature shared by every entry in the bank.
pub type HashFn = fn(&str) -> u64;

/// The fixed, ordered hash function table.
///
/// Order is part of the filter's contract: `train` and `query` walk this
/// table from slot 0 upward, so reordering entries would silently invalidate
/// every trained filter. New functions are appended, never inserted.
pub const BANK: [HashFn; 4] = [built_in, fnv1a, wy_mix, split_mix];

/// Number of implemented hash functions.
///
/// Requested hash counts above this value are clamped down by the filter.
pub const BANK_SIZE: usize = BANK.len();

/// Platform string hash: `std`'s SipHash-1-3 with its fixed default keys.
///
/// [`std::collections::hash_map::DefaultHasher::new`] seeds SipHash with
/// constant keys, so the result is stable across runs of the same toolchain.
///
/// # Examples
///
/// ```
/// use bloomgauge::hash::built_in;
///
/// assert_eq!(built_in("alpha"), built_in("alpha"));
/// assert_ne!(built_in("alpha"), built_in("beta"));
/// ```
#[must_use]
pub fn built_in(key: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// FNV-1a over the key's bytes.
///
/// Standard 64-bit offset basis and prime. Weak avalanche in the low bits
/// for short keys, but cheap and independent of the other bank entries.
#[must_use]
pub fn fnv1a(key: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut state = OFFSET_BASIS;
    for &byte in key.as_bytes() {
        state ^= u64::from(byte);
        state = state.wrapping_mul(PRIME);
    }
    state
}

/// Widening-multiply fold using wyhash's mixing constants.
///
/// Each byte is folded into the state through a 64x64 -> 128 bit multiply
/// whose halves are XORed back together (the "mum" step), then the state is
/// finalized with one more fold. Length is mixed in up front so prefixes of
/// a key do not share a hash trajectory.
#[must_use]
pub fn wy_mix(key: &str) -> u64 {
    const P0: u64 = 0xa076_1d64_78bd_642f;
    const P1: u64 = 0xe703_7ed1_a0b4_28db;

    let mut state = P0 ^ (key.len() as u64).wrapping_mul(P1);
    for &byte in key.as_bytes() {
        state = mum(state ^ u64::from(byte), P1);
    }
    mum(state, P0 ^ P1)
}

/// splitmix64-style XOR-shift avalanche over 8-byte chunks of the key.
///
/// The key is consumed as little-endian 64-bit words (zero-padded tail),
/// each advanced into the state by the golden-gamma increment and avalanched.
#[must_use]
pub fn split_mix(key: &str) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

    let mut state: u64 = 0;
    for chunk in key.as_bytes().chunks(8) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        state = avalanche(
            state
                .wrapping_add(u64::from_le_bytes(word))
                .wrapping_add(GOLDEN_GAMMA),
        );
    }
    avalanche(state.wrapping_add(GOLDEN_GAMMA))
}

/// 64 -> 128 bit multiply, halves XORed together.
#[inline]
fn mum(a: u64, b: u64) -> u64 {
    let wide = u128::from(a) * u128::from(b);
    ((wide >> 64) as u64) ^ (wide as u64)
}

/// splitmix64 finalizer.
#[inline]
fn avalanche(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
