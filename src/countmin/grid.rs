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

use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::decay::DecayFormula;
use crate::error::Error;

/// Which timestamp a counter cell decays against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClockMode {
    /// One timestamp per column, shared by every row.
    ///
    /// A row's counter decays relative to whichever row last advanced the
    /// column clock.
    #[default]
    SharedColumn,
    /// One timestamp per cell, so each row keeps its own decay clock.
    PerCell,
}

/// Fixed `depth x width` grid of decaying counters and their clocks.
///
/// Counters are `f64` values stored as bit patterns in `AtomicU64` cells and
/// accumulated with a compare-and-swap loop. Clocks start at 0.
#[derive(Debug)]
pub(super) struct Grid {
    width: usize,
    clock_mode: ClockMode,
    cells: Box<[AtomicU64]>,
    clocks: Box<[AtomicI64]>,
}

impl Grid {
    pub(super) fn new(depth: usize, width: usize, clock_mode: ClockMode) -> Self {
        let num_clocks = match clock_mode {
            ClockMode::SharedColumn => width,
            ClockMode::PerCell => depth * width,
        };
        Grid {
            width,
            clock_mode,
            cells: (0..depth * width).map(|_| AtomicU64::new(0)).collect(),
            clocks: (0..num_clocks).map(|_| AtomicI64::new(0)).collect(),
        }
    }

    pub(super) fn clock_mode(&self) -> ClockMode {
        self.clock_mode
    }

    fn cell(&self, row: usize, column: usize) -> &AtomicU64 {
        &self.cells[row * self.width + column]
    }

    fn clock(&self, row: usize, column: usize) -> &AtomicI64 {
        match self.clock_mode {
            ClockMode::SharedColumn => &self.clocks[column],
            ClockMode::PerCell => &self.clocks[row * self.width + column],
        }
    }

    /// Folds `quantity`, recorded at `timestamp`, into the counter at `(row, column)`.
    ///
    /// The clock is the serialization point: the writer that advances it owns
    /// decaying the stored value forward, and a writer older than the clock
    /// projects its own contribution forward to the clock instead.
    pub(super) fn apply_increment<D: DecayFormula>(
        &self,
        formula: &D,
        row: usize,
        column: usize,
        quantity: f64,
        timestamp: i64,
    ) {
        let clock = self.clock(row, column);
        let cell = self.cell(row, column);
        loop {
            let old_timestamp = clock.load(Ordering::Acquire);
            if old_timestamp <= timestamp {
                if clock
                    .compare_exchange(
                        old_timestamp,
                        timestamp,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_err()
                {
                    tracing::trace!(row, column, timestamp, "clock advanced concurrently, retrying");
                    continue;
                }

                // the delta is relative to what we read, so concurrent adds are kept
                let old_count = load_f64(cell);
                let decayed = decay_between(formula, timestamp, old_timestamp, old_count);
                fetch_add_f64(cell, decayed + quantity - old_count);
            } else {
                tracing::trace!(
                    row,
                    column,
                    timestamp,
                    clock = old_timestamp,
                    "stale contribution projected to column clock"
                );
                fetch_add_f64(
                    cell,
                    decay_between(formula, old_timestamp, timestamp, quantity),
                );
            }
            return;
        }
    }

    /// Reads the counter at `(row, column)` decayed to `timestamp`.
    pub(super) fn read_projected<D: DecayFormula>(
        &self,
        formula: &D,
        row: usize,
        column: usize,
        timestamp: i64,
    ) -> Result<f64, Error> {
        let recorded = self.clock(row, column).load(Ordering::Acquire);
        let value = load_f64(self.cell(row, column));
        project(formula, timestamp, recorded, value)
    }

    /// Raw `(clock, value)` pair of a cell, without any decay applied.
    #[cfg(test)]
    pub(super) fn raw(&self, row: usize, column: usize) -> (i64, f64) {
        (
            self.clock(row, column).load(Ordering::Acquire),
            load_f64(self.cell(row, column)),
        )
    }
}

/// Projects `quantity` recorded at `past` to `future`.
///
/// # Errors
///
/// Returns [`ErrorKind::TemporalOrderingViolation`](crate::error::ErrorKind::TemporalOrderingViolation)
/// if `future` is earlier than `past`.
pub(super) fn project<D: DecayFormula>(
    formula: &D,
    future: i64,
    past: i64,
    quantity: f64,
) -> Result<f64, Error> {
    if future < past {
        tracing::debug!(future, past, "refusing to project decaying quantity into the past");
        return Err(Error::projection_into_past(future, past));
    }
    Ok(decay_between(formula, future, past, quantity))
}

fn decay_between<D: DecayFormula>(formula: &D, future: i64, past: i64, quantity: f64) -> f64 {
    debug_assert!(future >= past);
    formula.evaluate(quantity, future.abs_diff(past) as f64)
}

fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Acquire))
}

fn fetch_add_f64(cell: &AtomicU64, delta: f64) -> f64 {
    let prev = cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
        Some((f64::from_bits(bits) + delta).to_bits())
    });
    match prev {
        Ok(bits) | Err(bits) => f64::from_bits(bits),
    }
}
