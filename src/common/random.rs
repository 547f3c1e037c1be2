// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Shared random utilities for sketches.

const MULTIPLIER: u64 = 0x5DEECE66D;
const INCREMENT: u64 = 0xB;
const STATE_MASK: u64 = (1 << 48) - 1;

/// Random number source for sketches.
pub(crate) trait RandomSource {
    /// Returns the next `bits` (at most 32) random bits as the low bits of a `u32`.
    fn next_bits(&mut self, bits: u32) -> u32;

    /// Returns a uniformly distributed value in `[0, bound)`.
    ///
    /// Values are rejection sampled so that every residue is equally likely.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is 0 or does not fit in 31 bits.
    fn next_below(&mut self, bound: u32) -> u32 {
        assert!(
            bound > 0 && bound <= i32::MAX as u32,
            "bound must be in [1, 2^31 - 1]"
        );

        let bound = bound as i32;
        let m = bound - 1;
        let r = self.next_bits(31) as i32;
        if bound & m == 0 {
            return ((bound as i64 * r as i64) >> 31) as u32;
        }

        let mut u = r;
        loop {
            let r = u % bound;
            // overflow of u - r + m means u fell into the biased tail
            if u.wrapping_sub(r).wrapping_add(m) >= 0 {
                return r as u32;
            }
            u = self.next_bits(31) as i32;
        }
    }
}

/// 48-bit linear congruential generator.
///
/// Uses the classic `0x5DEECE66D` multiplier, so a given seed always yields the
/// same stream on every platform. Not suitable for anything security related.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lcg48 {
    state: u64,
}

impl Lcg48 {
    /// Creates a new generator using the provided seed.
    pub(crate) fn seeded(seed: u64) -> Self {
        Self {
            state: (seed ^ MULTIPLIER) & STATE_MASK,
        }
    }
}

impl RandomSource for Lcg48 {
    fn next_bits(&mut self, bits: u32) -> u32 {
        debug_assert!(bits >= 1 && bits <= 32);
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & STATE_MASK;
        (self.state >> (48 - bits)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_stream() {
        let mut rng = Lcg48::seeded(42);
        assert_eq!(rng.next_bits(32) as i32, -1170105035);

        let mut rng = Lcg48::seeded(42);
        let draws: Vec<u32> = (0..5).map(|_| rng.next_below(10)).collect();
        assert_eq!(draws, vec![0, 3, 8, 4, 0]);
    }

    #[test]
    fn test_power_of_two_bound() {
        let mut rng = Lcg48::seeded(42);
        let draws: Vec<u32> = (0..5).map(|_| rng.next_below(16)).collect();
        assert_eq!(draws, vec![11, 0, 10, 0, 4]);
    }

    #[test]
    fn test_coefficients_below_mersenne_prime() {
        let mut rng = Lcg48::seeded(7364181);
        let draws: Vec<u32> = (0..4).map(|_| rng.next_below(i32::MAX as u32)).collect();
        assert_eq!(draws, vec![15301870, 1817426771, 1515167787, 1100548884]);

        let mut rng = Lcg48::seeded(0);
        let draws: Vec<u32> = (0..3).map(|_| rng.next_below(i32::MAX as u32)).collect();
        assert_eq!(draws, vec![1569741360, 1785505948, 516548029]);
    }

    #[test]
    #[should_panic(expected = "bound must be in [1, 2^31 - 1]")]
    fn test_zero_bound_panics() {
        Lcg48::seeded(1).next_below(0);
    }
}
