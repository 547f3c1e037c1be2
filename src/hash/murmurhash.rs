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

use crate::hash::DEFAULT_BUCKET_SEED;

/// Returns one bucket in `[0, width)` for each of the `depth` rows.
///
/// The key is hashed once with MurmurHash3 x64/128 and the two halves are
/// combined as `h1 + i * h2` to derive the per-row buckets.
///
/// # Panics
///
/// Panics if `width` is 0.
pub(crate) fn buckets_for(key: &[u8], depth: usize, width: usize) -> Vec<usize> {
    assert!(width > 0, "width must be at least 1");
    let (h1, h2) = mur3::murmurhash3_x64_128(key, DEFAULT_BUCKET_SEED);
    let width = width as u64;
    (0..depth as u64)
        .map(|i| (h1.wrapping_add(i.wrapping_mul(h2)) % width) as usize)
        .collect()
}
