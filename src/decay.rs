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

//! Decay formulas projecting a recorded quantity to a later point in time.
//!
//! A formula is a pure function `evaluate(quantity, elapsed)`. Every formula must
//! satisfy `evaluate(q, 0) == q`, `evaluate(0, t) == 0`, and be non-increasing in
//! `elapsed` for non-negative quantities.
//!
//! # Usage
//!
//! ```rust
//! use decaysketches::decay::DecayFormula;
//! use decaysketches::decay::LinearDecay;
//!
//! let decay = LinearDecay::with_lifetime(100.0).unwrap();
//! assert_eq!(decay.evaluate(10.0, 50.0), 5.0);
//! assert_eq!(decay.evaluate(10.0, 150.0), 0.0);
//! ```
//!
//! Closures work as formulas too:
//!
//! ```rust
//! use decaysketches::decay::DecayFormula;
//!
//! let halve_per_tick = |quantity: f64, elapsed: f64| quantity * 0.5f64.powf(elapsed);
//! assert_eq!(halve_per_tick.evaluate(8.0, 3.0), 1.0);
//! ```

use crate::error::Error;

/// Projects a quantity recorded at one time to its decayed value `elapsed` later.
pub trait DecayFormula: Send + Sync {
    /// Returns the decayed value of `quantity` after `elapsed` time units.
    fn evaluate(&self, quantity: f64, elapsed: f64) -> f64;
}

impl<F> DecayFormula for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, quantity: f64, elapsed: f64) -> f64 {
        self(quantity, elapsed)
    }
}

/// Exponential decay: a quantity halves every `half_life` time units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    half_life: f64,
}

impl ExponentialDecay {
    /// Creates an exponential decay with the given half-life.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `half_life` is not a positive finite number.
    pub fn with_half_life(half_life: f64) -> Result<Self, Error> {
        check_positive("half_life", half_life)?;
        Ok(Self { half_life })
    }

    /// Returns the configured half-life.
    pub fn half_life(&self) -> f64 {
        self.half_life
    }
}

impl DecayFormula for ExponentialDecay {
    fn evaluate(&self, quantity: f64, elapsed: f64) -> f64 {
        quantity * (-elapsed / self.half_life).exp2()
    }
}

/// Linear decay: a quantity fades to zero over `lifetime` time units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDecay {
    lifetime: f64,
}

impl LinearDecay {
    /// Creates a linear decay reaching zero after `lifetime`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `lifetime` is not a positive finite number.
    pub fn with_lifetime(lifetime: f64) -> Result<Self, Error> {
        check_positive("lifetime", lifetime)?;
        Ok(Self { lifetime })
    }

    /// Returns the configured lifetime.
    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }
}

impl DecayFormula for LinearDecay {
    fn evaluate(&self, quantity: f64, elapsed: f64) -> f64 {
        quantity * (1.0 - elapsed / self.lifetime).max(0.0)
    }
}

/// No decay; quantities keep their full value forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDecay;

impl DecayFormula for NoDecay {
    fn evaluate(&self, quantity: f64, _elapsed: f64) -> f64 {
        quantity
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::config_invalid(format!("{name} must be a positive finite number"))
            .with_context(name, value))
    }
}
