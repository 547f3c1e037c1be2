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

use crate::countmin::grid::ClockMode;
use crate::countmin::sketch::TimeDecayCountMinSketch;
use crate::decay::DecayFormula;
use crate::error::Error;

/// The default seed of the row hash functions.
pub const DEFAULT_SEED: u64 = 9001;

const DEFAULT_RELATIVE_ERROR: f64 = 0.001;
const DEFAULT_CONFIDENCE: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sizing {
    Dimensions { depth: usize, width: usize },
    ErrorBounds { epsilon: f64, confidence: f64 },
}

/// Builder for time-decaying Count-Min sketches.
///
/// The grid is sized either from explicit dimensions or from error bounds; the
/// last one set wins. Without either, the sketch is sized for a relative error
/// of 0.001 with confidence 0.99.
///
/// # Examples
///
/// ```
/// use decaysketches::countmin::ClockMode;
/// use decaysketches::countmin::TimeDecayCountMinSketch;
/// use decaysketches::decay::LinearDecay;
///
/// let decay = LinearDecay::with_lifetime(60.0).unwrap();
/// let sketch = TimeDecayCountMinSketch::builder(decay)
///     .dimensions(4, 512)
///     .seed(7)
///     .clock_mode(ClockMode::PerCell)
///     .build()
///     .unwrap();
///
/// assert_eq!(sketch.depth(), 4);
/// assert_eq!(sketch.width(), 512);
/// assert_eq!(sketch.clock_mode(), ClockMode::PerCell);
/// ```
#[derive(Debug, Clone)]
pub struct TimeDecayCountMinSketchBuilder<D> {
    formula: D,
    sizing: Sizing,
    seed: u64,
    clock_mode: ClockMode,
}

impl<D: DecayFormula> TimeDecayCountMinSketchBuilder<D> {
    pub(super) fn new(formula: D) -> Self {
        Self {
            formula,
            sizing: Sizing::ErrorBounds {
                epsilon: DEFAULT_RELATIVE_ERROR,
                confidence: DEFAULT_CONFIDENCE,
            },
            seed: DEFAULT_SEED,
            clock_mode: ClockMode::default(),
        }
    }

    /// Sizes the sketch with `depth` rows and `width` columns.
    pub fn dimensions(mut self, depth: usize, width: usize) -> Self {
        self.sizing = Sizing::Dimensions { depth, width };
        self
    }

    /// Sizes the sketch for a relative error `epsilon` holding with `confidence`.
    pub fn error_bounds(mut self, epsilon: f64, confidence: f64) -> Self {
        self.sizing = Sizing::ErrorBounds {
            epsilon,
            confidence,
        };
        self
    }

    /// Sets the seed of the row hash functions.
    ///
    /// Sketches built with the same seed and dimensions bucket integer keys
    /// identically.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets how counters are associated with decay clocks.
    pub fn clock_mode(mut self, clock_mode: ClockMode) -> Self {
        self.clock_mode = clock_mode;
        self
    }

    /// Builds the sketch.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if the dimensions or error bounds are out of range.
    pub fn build(self) -> Result<TimeDecayCountMinSketch<D>, Error> {
        match self.sizing {
            Sizing::Dimensions { depth, width } => TimeDecayCountMinSketch::with_clock_mode(
                depth,
                width,
                self.seed,
                self.clock_mode,
                self.formula,
            ),
            Sizing::ErrorBounds {
                epsilon,
                confidence,
            } => TimeDecayCountMinSketch::with_error_bounds_and_clock_mode(
                epsilon,
                confidence,
                self.seed,
                self.clock_mode,
                self.formula,
            ),
        }
    }
}
