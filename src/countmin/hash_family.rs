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

use crate::common::Lcg48;
use crate::common::RandomSource;
use crate::countmin::key::Key;
use crate::hash::buckets_for;

/// Mersenne prime `2^31 - 1`, the modulus of the row hash functions.
pub(super) const PRIME_MODULUS: i64 = (1 << 31) - 1;

/// Seeded family of per-row hash functions `(a_i * x) mod p mod width`.
///
/// The additive term of the classic `(a*x + b) mod p` form is left out, since it
/// only shifts the result without affecting uniformity or independence.
#[derive(Debug, Clone)]
pub(super) struct HashFamily {
    coefficients: Box<[i64]>,
    width: usize,
}

impl HashFamily {
    pub(super) fn new(depth: usize, width: usize, seed: u64) -> Self {
        let mut rng = Lcg48::seeded(seed);
        let coefficients = (0..depth)
            .map(|_| rng.next_below(PRIME_MODULUS as u32) as i64)
            .collect();
        HashFamily {
            coefficients,
            width,
        }
    }

    pub(super) fn depth(&self) -> usize {
        self.coefficients.len()
    }

    /// Column of an integer key in the given row.
    pub(super) fn bucket(&self, item: i64, row: usize) -> usize {
        let mut hash = self.coefficients[row].wrapping_mul(item);
        // fast x mod 2^31-1: fold the high word into the low word
        hash = hash.wrapping_add(hash >> 32);
        hash &= PRIME_MODULUS;
        hash as usize % self.width
    }

    /// Columns of a key, one per row.
    pub(super) fn buckets(&self, key: Key<'_>) -> Vec<usize> {
        match key {
            Key::Long(item) => (0..self.depth()).map(|row| self.bucket(item, row)).collect(),
            Key::Str(item) => buckets_for(item.as_bytes(), self.depth(), self.width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficients_are_reproducible() {
        let family = HashFamily::new(3, 1000, 1);
        assert_eq!(&*family.coefficients, &[1569548985, 215764588, 880641847]);
        assert_eq!(family.buckets(Key::Long(42)), vec![945, 106, 566]);
        assert_eq!(family.buckets(Key::Long(-42)), vec![702, 541, 81]);
        assert_eq!(family.buckets(Key::Long(1)), vec![985, 588, 847]);
    }

    #[test]
    fn test_buckets_in_range() {
        let family = HashFamily::new(4, 37, 99);
        for item in [i64::MIN, -1, 0, 1, 12345, i64::MAX] {
            let buckets = family.buckets(Key::Long(item));
            assert_eq!(buckets.len(), 4);
            assert!(buckets.iter().all(|b| *b < 37));
        }
        let buckets = family.buckets(Key::Str("apple"));
        assert_eq!(buckets.len(), 4);
        assert!(buckets.iter().all(|b| *b < 37));
    }

    #[test]
    fn test_rows_spread_items() {
        let family = HashFamily::new(1, 64, 7);
        let mut seen = [false; 64];
        for item in 0..10_000 {
            seen[family.bucket(item, 0)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
