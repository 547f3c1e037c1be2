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

//! Error types for decaying sketch operations

use std::fmt;

/// ErrorKind is all kinds of Error of decaysketches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The config for sketches or decay formulas is invalid.
    ConfigInvalid,
    /// An argument passed to a sketch operation is out of its domain.
    InvalidArgument,
    /// A decaying quantity was asked to move to an earlier timestamp.
    TemporalOrderingViolation,
    /// The item can not be mapped to a supported key.
    UnsupportedKeyType,
}

impl ErrorKind {
    /// Convert this error kind instance into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::TemporalOrderingViolation => "TemporalOrderingViolation",
            ErrorKind::UnsupportedKeyType => "UnsupportedKeyType",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// Error is the error struct returned by all decaysketches functions.
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::default(),
        }
    }

    /// Add more context in error.
    ///
    /// # Examples
    ///
    /// ```
    /// use decaysketches::error::{Error, ErrorKind};
    ///
    /// let error = Error::new(ErrorKind::InvalidArgument, "negative increments are not supported")
    ///     .with_context("quantity", -3);
    /// assert_eq!(
    ///     error.to_string(),
    ///     "InvalidArgument, context: { quantity: -3 } => negative increments are not supported"
    /// );
    /// ```
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return error's message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Return the value recorded for a context key, if any.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    pub(crate) fn projection_into_past(future: i64, past: i64) -> Self {
        Self::new(
            ErrorKind::TemporalOrderingViolation,
            "cannot project decaying quantity into the past",
        )
        .with_context("target_timestamp", future)
        .with_context("recorded_timestamp", past)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_error_carries_both_timestamps() {
        let err = Error::projection_into_past(10, 42);
        assert_eq!(err.kind(), ErrorKind::TemporalOrderingViolation);
        assert_eq!(err.context("target_timestamp"), Some("10"));
        assert_eq!(err.context("recorded_timestamp"), Some("42"));
        assert_eq!(err.context("missing"), None);
    }

    #[test]
    fn test_debug_lists_context() {
        let err = Error::config_invalid("width must be at least 1").with_context("width", 0);
        let rendered = format!("{err:?}");
        assert!(rendered.starts_with("ConfigInvalid => width must be at least 1"));
        assert!(rendered.contains("   width: 0"));
    }
}
