//! Deterministic, consensus-safe pseudo-random number generator
//!
//! Counter-mode over SHA-256: `H(seed || counter_be)` is refilled into a
//! byte buffer each time it runs dry, and `next(n)` draws little-endian u64
//! words from it, rejecting draws that would introduce modulo bias. Same
//! seed + same sequence of calls = same stream, byte-for-byte, on every
//! node and every platform — that determinism is the entire point, so this
//! discipline must never change shape once deployed.

use sha2::{Digest, Sha256};

#[derive(Clone, Debug)]
pub struct SeededRng {
    seed: [u8; 32],
    counter: u64,
    buffer: [u8; 32],
    cursor: usize,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed (the host's per-block entropy).
    pub fn new(seed: [u8; 32]) -> Self {
        let mut rng = Self {
            seed,
            counter: 0,
            buffer: [0u8; 32],
            cursor: 32, // force a refill on first draw
        };
        rng.refill();
        rng
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.buffer.copy_from_slice(&hasher.finalize());
        self.counter += 1;
        self.cursor = 0;
    }

    fn next_u64(&mut self) -> u64 {
        if self.cursor + 8 > self.buffer.len() {
            self.refill();
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.buffer[self.cursor..self.cursor + 8]);
        self.cursor += 8;
        u64::from_le_bytes(bytes)
    }

    /// Draw a value uniform in `[0, n)`. Rejects draws that would bias the
    /// result toward the low end of the range — see module docs.
    pub fn next(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        let n64 = n as u128;
        let limit = ((1u128 << 64) / n64) * n64;
        loop {
            let draw = self.next_u64();
            if (draw as u128) < limit {
                return (draw % n as u64) as u32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = [42u8; 32];
        let mut r1 = SeededRng::new(seed);
        let mut r2 = SeededRng::new(seed);

        for _ in 0..200 {
            assert_eq!(r1.next_u64(), r2.next_u64());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut rng1 = SeededRng::new([1u8; 32]);
        let mut rng2 = SeededRng::new([2u8; 32]);

        let vals1: Vec<_> = (0..10).map(|_| rng1.next_u64()).collect();
        let vals2: Vec<_> = (0..10).map(|_| rng2.next_u64()).collect();
        assert_ne!(vals1, vals2);
    }

    #[test]
    fn test_next_range_never_out_of_bounds() {
        let mut rng = SeededRng::new([7u8; 32]);
        for max in [1u32, 2, 3, 5, 10, 100, 1000, u32::MAX] {
            for _ in 0..200 {
                let v = rng.next(max);
                assert!(v < max, "next({}) returned {}", max, v);
            }
        }
    }

    #[test]
    fn test_next_zero_is_zero() {
        let mut rng = SeededRng::new([7u8; 32]);
        assert_eq!(rng.next(0), 0);
    }

    #[test]
    fn test_distribution_statistical_tolerance() {
        let mut rng = SeededRng::new([9u8; 32]);
        let n = 10u32;
        let draws = 1_000_000;
        let mut buckets = [0u32; 10];
        for _ in 0..draws {
            buckets[rng.next(n) as usize] += 1;
        }
        let expected = draws / n;
        for count in buckets {
            let deviation = (count as i64 - expected as i64).unsigned_abs();
            assert!(
                deviation < expected as u64 / 10,
                "bucket count {} too far from expected {}",
                count,
                expected
            );
        }
    }

    #[test]
    fn test_refill_crosses_buffer_boundary() {
        let mut rng = SeededRng::new([3u8; 32]);
        // Draw enough u64s to force multiple refills (buffer holds 4 per refill).
        for _ in 0..50 {
            let _ = rng.next_u64();
        }
    }
}
