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

//! Time-decaying Count-Min sketch for recency-weighted frequency estimation.
//!
//! The sketch keeps a fixed `depth x width` grid of floating-point counters. Each
//! item maps to one counter per row; adds decay the touched counters forward to
//! the add's timestamp and fold in the new quantity, and estimates take the
//! minimum over rows of the counters decayed to the query timestamp. How fast old
//! activity fades is controlled by a pluggable [`DecayFormula`](crate::decay::DecayFormula).
//!
//! Updates are lock-free. Each counter's clock is advanced with a compare-and-swap
//! loop and counter values are accumulated with atomic adds, so many threads may
//! add and estimate concurrently through a shared reference.
//!
//! # Usage
//!
//! ```rust
//! use decaysketches::countmin::TimeDecayCountMinSketch;
//! use decaysketches::decay::LinearDecay;
//!
//! let decay = LinearDecay::with_lifetime(100.0).unwrap();
//! let sketch = TimeDecayCountMinSketch::with_dimensions(1, 1000, 9001, decay).unwrap();
//!
//! sketch.add(42, 10, 0).unwrap();
//! sketch.add(7, 3, 0).unwrap();
//!
//! assert_eq!(sketch.estimate_count(42, 0).unwrap(), 10.0);
//! assert_eq!(sketch.estimate_count(42, 50).unwrap(), 5.0);
//! assert_eq!(sketch.estimate_count(42, 100).unwrap(), 0.0);
//! assert_eq!(sketch.size(), 13);
//! ```
//!
//! # Configuration Helpers
//!
//! ```rust
//! use decaysketches::countmin::TimeDecayCountMinSketch;
//! use decaysketches::decay::NoDecay;
//!
//! let width = TimeDecayCountMinSketch::<NoDecay>::suggest_width(0.01).unwrap();
//! let depth = TimeDecayCountMinSketch::<NoDecay>::suggest_depth(0.99).unwrap();
//!
//! let _sketch = TimeDecayCountMinSketch::with_dimensions(depth, width, 9001, NoDecay).unwrap();
//! ```
//!
//! # Clocks
//!
//! By default every column has a single clock shared by all rows
//! ([`ClockMode::SharedColumn`]), so a counter decays relative to whichever row
//! last wrote its column. [`ClockMode::PerCell`] gives every counter its own
//! clock at the cost of `depth` times more timestamps.

mod builder;
mod grid;
mod hash_family;
mod key;
mod sketch;

pub use self::builder::DEFAULT_SEED;
pub use self::builder::TimeDecayCountMinSketchBuilder;
pub use self::grid::ClockMode;
pub use self::key::Key;
pub use self::key::SketchKey;
pub use self::sketch::TimeDecayCountMinSketch;

use crate::error::Error;

/// Frequency estimator whose counts decay with time.
pub trait TimeDecayFrequency<T> {
    /// Adds `quantity` occurrences of `item` observed at `timestamp`.
    fn add(&self, item: T, quantity: i64, timestamp: i64) -> Result<(), Error>;

    /// Estimates the decayed frequency of `item` at `timestamp`.
    fn estimate_count(&self, item: T, timestamp: i64) -> Result<f64, Error>;

    /// Returns the sum of all quantities ever added, without decay.
    fn size(&self) -> u64;
}
