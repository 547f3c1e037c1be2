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

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use decaysketches::countmin::TimeDecayFrequency;
use decaysketches::decay::DecayFormula;
use decaysketches::error::Error;
use decaysketches::error::ErrorKind;

/// Exact per-item decayed counter used as a reference for sketch estimates.
pub struct ExactDecayCounter<D> {
    formula: D,
    counts: Mutex<HashMap<i64, (f64, i64)>>,
    size: Mutex<u64>,
}

impl<D: DecayFormula> ExactDecayCounter<D> {
    pub fn new(formula: D) -> Self {
        Self {
            formula,
            counts: Mutex::new(HashMap::new()),
            size: Mutex::new(0),
        }
    }

    pub fn items(&self) -> Vec<i64> {
        let mut items: Vec<i64> = self.counts.lock().unwrap().keys().copied().collect();
        items.sort_unstable();
        items
    }

    /// Sum of the decayed counts of all items at `timestamp`.
    pub fn total(&self, timestamp: i64) -> f64 {
        self.items()
            .into_iter()
            .map(|item| self.estimate_count(item, timestamp).unwrap())
            .sum()
    }
}

impl<D: DecayFormula> TimeDecayFrequency<i64> for ExactDecayCounter<D> {
    fn add(&self, item: i64, quantity: i64, timestamp: i64) -> Result<(), Error> {
        if quantity < 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "negative quantity"));
        }
        let mut counts = self.counts.lock().unwrap();
        let (value, last) = counts.entry(item).or_insert((0.0, timestamp));
        if timestamp >= *last {
            *value = self.formula.evaluate(*value, (timestamp - *last) as f64) + quantity as f64;
            *last = timestamp;
        } else {
            *value += self.formula.evaluate(quantity as f64, (*last - timestamp) as f64);
        }
        *self.size.lock().unwrap() += quantity as u64;
        Ok(())
    }

    fn estimate_count(&self, item: i64, timestamp: i64) -> Result<f64, Error> {
        let counts = self.counts.lock().unwrap();
        match counts.get(&item) {
            None => Ok(0.0),
            Some((value, last)) if timestamp >= *last => {
                Ok(self.formula.evaluate(*value, (timestamp - *last) as f64))
            }
            Some(_) => Err(Error::new(
                ErrorKind::TemporalOrderingViolation,
                "cannot project into the past",
            )),
        }
    }

    fn size(&self) -> u64 {
        *self.size.lock().unwrap()
    }
}

/// Small xorshift generator for reproducible test streams.
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn seeded(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn next_below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}
