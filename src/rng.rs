use std::time::{SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// Minimal deterministic PRNG (xoshiro256**)
// ---------------------------------------------------------------------------

/// Small, dependency-free xoshiro256** generator.
///
/// Used for the "random sample" button; the selection contract only asks
/// for a uniform draw over `[0, N)`, not reproducibility, so entropy-based
/// seeding is fine for the app while tests pin the seed.
pub struct SmallRng {
    state: [u64; 4],
}

impl SmallRng {
    pub fn new(seed: u64) -> Self {
        // SplitMix-style expansion so a small seed fills all four lanes.
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SmallRng { state: s }
    }

    /// Seed from wall-clock time and the process id.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        SmallRng::new(nanos ^ (std::process::id() as u64).rotate_left(32))
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform draw from `[0, n)` using Lemire's widening-multiply method.
    ///
    /// Panics if `n == 0` (an empty range has no valid draw; the bundle
    /// loader rejects empty test sets before a selector ever exists).
    pub fn next_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "next_below called with an empty range");
        let n = n as u64;
        let mut m = (self.next_u64() as u128) * (n as u128);
        let mut lo = m as u64;
        if lo < n {
            // Rejection step removes the modulo bias on the low word.
            let threshold = n.wrapping_neg() % n;
            while lo < threshold {
                m = (self.next_u64() as u128) * (n as u128);
                lo = m as u64;
            }
        }
        (m >> 64) as usize
    }
}
