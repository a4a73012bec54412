//! Session Random Number Generator
//!
//! Xorshift128+ seeded per player session. Used for agility target rolls and
//! quiz question sampling. A pinned seed reproduces a whole session, which the
//! tests rely on.

use sha2::{Sha256, Digest};

/// PRNG using the Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use stand_game::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, so weak seeds
    /// (0, 1, 2...) still give well-spread sequences.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Xorshift must never sit in the all-zero state
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create an RNG for a player session.
    pub fn for_session(session_id: &[u8; 16], wall_nanos: i64) -> Self {
        Self::new(derive_session_seed(session_id, wall_nanos))
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random index in range [0, len). Returns 0 for an empty range.
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }

    /// Draw `count` distinct elements from `slice` without replacement.
    ///
    /// Runs a partial Fisher-Yates over an index table so the source slice
    /// keeps its order. Returns `None` when the slice is shorter than `count`.
    pub fn sample<T: Clone>(&mut self, slice: &[T], count: usize) -> Option<Vec<T>> {
        if count > slice.len() {
            return None;
        }

        let mut indices: Vec<usize> = (0..slice.len()).collect();
        for i in 0..count {
            let j = i + self.next_index(indices.len() - i);
            indices.swap(i, j);
        }

        Some(indices[..count].iter().map(|&i| slice[i].clone()).collect())
    }
}

/// SplitMix64 for seed initialization.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a session seed from the session id and the wall clock.
pub fn derive_session_seed(session_id: &[u8; 16], wall_nanos: i64) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"STAND_GAME_SEED_V1");
    hasher.update(session_id);
    hasher.update(wall_nanos.to_le_bytes());

    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================
