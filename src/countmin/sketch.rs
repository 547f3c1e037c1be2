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

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::countmin::TimeDecayFrequency;
use crate::countmin::builder::TimeDecayCountMinSketchBuilder;
use crate::countmin::grid::ClockMode;
use crate::countmin::grid::Grid;
use crate::countmin::hash_family::HashFamily;
use crate::countmin::key::SketchKey;
use crate::decay::DecayFormula;
use crate::error::Error;
use crate::error::ErrorKind;

/// Largest width accepted when sizing from a relative error.
const MAX_WIDTH: usize = u32::MAX as usize;

/// Count-Min sketch whose counters decay over time.
///
/// Counters are updated on demand: every add decays the touched counters
/// forward to the add's timestamp before folding in the new quantity, and every
/// estimate decays them forward to the query timestamp. All operations take
/// `&self` and are lock-free, so a sketch can be shared between threads.
///
/// See the [module documentation](super) for more details.
pub struct TimeDecayCountMinSketch<D> {
    depth: usize,
    width: usize,
    seed: u64,
    relative_error: f64,
    confidence: f64,
    hashes: HashFamily,
    grid: Grid,
    formula: D,
    size: AtomicU64,
}

impl<D: DecayFormula> TimeDecayCountMinSketch<D> {
    /// Returns a builder for a sketch decaying with `formula`.
    pub fn builder(formula: D) -> TimeDecayCountMinSketchBuilder<D> {
        TimeDecayCountMinSketchBuilder::new(formula)
    }

    /// Creates a sketch with `depth` rows and `width` columns.
    ///
    /// The reported relative error is `2 / width` and the reported confidence
    /// is `1 - 2^-depth`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`] if `depth` or `width` is 0, or if the
    /// grid would not fit in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use decaysketches::countmin::TimeDecayCountMinSketch;
    /// use decaysketches::decay::NoDecay;
    ///
    /// let sketch = TimeDecayCountMinSketch::with_dimensions(7, 200, 9001, NoDecay).unwrap();
    /// assert_eq!(sketch.relative_error(), 0.01);
    /// assert_eq!(sketch.confidence(), 0.9921875);
    /// ```
    pub fn with_dimensions(depth: usize, width: usize, seed: u64, formula: D) -> Result<Self, Error> {
        Self::with_clock_mode(depth, width, seed, ClockMode::default(), formula)
    }

    /// Creates a sketch sized for a relative error `epsilon` of the total count,
    /// holding with probability `confidence`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`] unless `epsilon > 0` and
    /// `0 < confidence < 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use decaysketches::countmin::TimeDecayCountMinSketch;
    /// use decaysketches::decay::ExponentialDecay;
    ///
    /// let decay = ExponentialDecay::with_half_life(3600.0).unwrap();
    /// let sketch = TimeDecayCountMinSketch::with_error_bounds(0.001, 0.99, 9001, decay).unwrap();
    /// assert_eq!(sketch.width(), 2000);
    /// assert_eq!(sketch.depth(), 7);
    /// assert_eq!(sketch.relative_error(), 0.001);
    /// ```
    pub fn with_error_bounds(
        epsilon: f64,
        confidence: f64,
        seed: u64,
        formula: D,
    ) -> Result<Self, Error> {
        Self::builder(formula)
            .error_bounds(epsilon, confidence)
            .seed(seed)
            .build()
    }

    pub(super) fn with_clock_mode(
        depth: usize,
        width: usize,
        seed: u64,
        clock_mode: ClockMode,
        formula: D,
    ) -> Result<Self, Error> {
        let relative_error = 2.0 / width as f64;
        let confidence = 1.0 - (-(depth as f64)).exp2();
        Self::from_parts(depth, width, relative_error, confidence, seed, clock_mode, formula)
    }

    pub(super) fn with_error_bounds_and_clock_mode(
        epsilon: f64,
        confidence: f64,
        seed: u64,
        clock_mode: ClockMode,
        formula: D,
    ) -> Result<Self, Error> {
        let width = Self::suggest_width(epsilon)?;
        let depth = Self::suggest_depth(confidence)?;
        Self::from_parts(depth, width, epsilon, confidence, seed, clock_mode, formula)
    }

    fn from_parts(
        depth: usize,
        width: usize,
        relative_error: f64,
        confidence: f64,
        seed: u64,
        clock_mode: ClockMode,
        formula: D,
    ) -> Result<Self, Error> {
        if depth == 0 {
            return Err(Error::config_invalid("depth must be at least 1").with_context("depth", depth));
        }
        if width == 0 {
            return Err(Error::config_invalid("width must be at least 1").with_context("width", width));
        }
        if depth.checked_mul(width).is_none() {
            return Err(Error::config_invalid("grid size overflows")
                .with_context("depth", depth)
                .with_context("width", width));
        }

        tracing::debug!(
            depth,
            width,
            seed,
            clock_mode = ?clock_mode,
            "building time-decaying count-min sketch"
        );

        Ok(TimeDecayCountMinSketch {
            depth,
            width,
            seed,
            relative_error,
            confidence,
            hashes: HashFamily::new(depth, width, seed),
            grid: Grid::new(depth, width, clock_mode),
            formula,
            size: AtomicU64::new(0),
        })
    }
}

impl<D> TimeDecayCountMinSketch<D> {
    /// Suggests the width needed for a relative error `epsilon`: `ceil(2 / epsilon)`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`] if `epsilon` is not positive and finite, or is so
    /// small that the width would exceed `u32::MAX`.
    pub fn suggest_width(epsilon: f64) -> Result<usize, Error> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(Error::config_invalid("relative error must be a positive finite number")
                .with_context("epsilon", epsilon));
        }
        let width = (2.0 / epsilon).ceil();
        if width > MAX_WIDTH as f64 {
            return Err(Error::config_invalid("relative error is too small")
                .with_context("epsilon", epsilon));
        }
        Ok(width as usize)
    }

    /// Suggests the depth needed for `confidence`: `ceil(-log2(1 - confidence))`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`] unless `0 < confidence < 1`.
    pub fn suggest_depth(confidence: f64) -> Result<usize, Error> {
        if confidence.is_nan() || confidence <= 0.0 || confidence >= 1.0 {
            return Err(Error::config_invalid("confidence must be in (0, 1)")
                .with_context("confidence", confidence));
        }
        Ok((-(1.0 - confidence).ln() / 2f64.ln()).ceil() as usize)
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the seed of the row hash functions.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns how counters are associated with their decay clocks.
    pub fn clock_mode(&self) -> ClockMode {
        self.grid.clock_mode()
    }

    /// Returns the relative error of estimates, as a fraction of the total count.
    pub fn relative_error(&self) -> f64 {
        self.relative_error
    }

    /// Returns the probability that an estimate stays within the relative error.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Returns the decay formula.
    pub fn decay_formula(&self) -> &D {
        &self.formula
    }

    /// Returns the sum of all quantities ever added, without decay.
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    /// Returns true if nothing with a positive quantity was ever added.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<D: DecayFormula> TimeDecayCountMinSketch<D> {
    /// Adds `quantity` occurrences of `item`, observed at `timestamp`.
    ///
    /// Arguments are validated before any counter is touched, so a failed add
    /// leaves the sketch unchanged and a successful add updates every row.
    /// Adds may arrive out of timestamp order; a contribution older than a
    /// counter's clock is decayed forward to that clock.
    ///
    /// Counters hold `f64` values, so a quantity above 2^53 is rounded to the
    /// nearest representable value when folded into them. [`size`](Self::size)
    /// keeps the exact sum.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`] if `quantity` is negative or would
    /// push [`size`](Self::size) past `u64::MAX`, and
    /// [`ErrorKind::UnsupportedKeyType`] if `item` does not map to a key.
    pub fn add<K: SketchKey>(&self, item: K, quantity: i64, timestamp: i64) -> Result<(), Error> {
        if quantity < 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "negative increments are not supported",
            )
            .with_context("quantity", quantity));
        }
        let key = item.key()?;

        // reserve the quantity in the total first so an overflow touches no cell
        self.size
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |size| {
                size.checked_add(quantity as u64)
            })
            .map_err(|size| {
                Error::new(
                    ErrorKind::InvalidArgument,
                    "total quantity would overflow the size accumulator",
                )
                .with_context("size", size)
                .with_context("quantity", quantity)
            })?;

        let columns = self.hashes.buckets(key);
        for (row, column) in columns.into_iter().enumerate() {
            self.grid
                .apply_increment(&self.formula, row, column, quantity as f64, timestamp);
        }
        Ok(())
    }

    /// Estimates the decayed frequency of `item` at `timestamp`.
    ///
    /// The estimate never undercounts the true decayed frequency, and exceeds it
    /// by at most `relative_error * total` with probability `confidence`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::TemporalOrderingViolation`] if `timestamp` is earlier
    /// than the clock of any counter the item maps to, and
    /// [`ErrorKind::UnsupportedKeyType`] if `item` does not map to a key.
    pub fn estimate_count<K: SketchKey>(&self, item: K, timestamp: i64) -> Result<f64, Error> {
        let key = item.key()?;

        let mut estimate = f64::MAX;
        for (row, column) in self.hashes.buckets(key).into_iter().enumerate() {
            let value = self
                .grid
                .read_projected(&self.formula, row, column, timestamp)?;
            estimate = estimate.min(value);
        }
        // racing delta updates can leave a cell a few ulps below zero
        Ok(estimate.max(0.0))
    }
}

impl<T: SketchKey, D: DecayFormula> TimeDecayFrequency<T> for TimeDecayCountMinSketch<D> {
    fn add(&self, item: T, quantity: i64, timestamp: i64) -> Result<(), Error> {
        TimeDecayCountMinSketch::add(self, item, quantity, timestamp)
    }

    fn estimate_count(&self, item: T, timestamp: i64) -> Result<f64, Error> {
        TimeDecayCountMinSketch::estimate_count(self, item, timestamp)
    }

    fn size(&self) -> u64 {
        TimeDecayCountMinSketch::size(self)
    }
}

impl<D: fmt::Debug> fmt::Debug for TimeDecayCountMinSketch<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeDecayCountMinSketch")
            .field("depth", &self.depth)
            .field("width", &self.width)
            .field("seed", &self.seed)
            .field("relative_error", &self.relative_error)
            .field("confidence", &self.confidence)
            .field("clock_mode", &self.grid.clock_mode())
            .field("formula", &self.formula)
            .field("size", &self.size())
            .finish()
    }
}
