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

use crate::error::Error;
use crate::error::ErrorKind;

/// A key as seen by the sketch: either a 64-bit integer or a string.
///
/// Integer keys go through the sketch's seeded hash family, string keys are
/// bucketed with MurmurHash3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key<'a> {
    /// Integer-like key.
    Long(i64),
    /// Textual key.
    Str(&'a str),
}

/// Types that can be counted by a time-decaying sketch.
///
/// Integers that do not fit in an `i64` report
/// [`ErrorKind::UnsupportedKeyType`] rather than being dropped.
pub trait SketchKey {
    /// Returns the sketch key for this item.
    fn key(&self) -> Result<Key<'_>, Error>;
}

impl SketchKey for Key<'_> {
    fn key(&self) -> Result<Key<'_>, Error> {
        Ok(*self)
    }
}

impl SketchKey for str {
    fn key(&self) -> Result<Key<'_>, Error> {
        Ok(Key::Str(self))
    }
}

impl SketchKey for String {
    fn key(&self) -> Result<Key<'_>, Error> {
        Ok(Key::Str(self.as_str()))
    }
}

impl<T: SketchKey + ?Sized> SketchKey for &T {
    fn key(&self) -> Result<Key<'_>, Error> {
        (**self).key()
    }
}

macro_rules! impl_lossless_key {
    ($($t:ty),*) => {
        $(
            impl SketchKey for $t {
                fn key(&self) -> Result<Key<'_>, Error> {
                    Ok(Key::Long(i64::from(*self)))
                }
            }
        )*
    };
}

macro_rules! impl_narrowing_key {
    ($($t:ty),*) => {
        $(
            impl SketchKey for $t {
                fn key(&self) -> Result<Key<'_>, Error> {
                    i64::try_from(*self).map(Key::Long).map_err(|_| {
                        Error::new(
                            ErrorKind::UnsupportedKeyType,
                            "integer key does not fit in a signed 64-bit integer",
                        )
                        .with_context("type", stringify!($t))
                        .with_context("value", self)
                    })
                }
            }
        )*
    };
}

impl_lossless_key!(i8, i16, i32, i64, u8, u16, u32);
impl_narrowing_key!(u64, usize, isize, i128, u128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_map_to_long() {
        assert_eq!(7i32.key().unwrap(), Key::Long(7));
        assert_eq!((-7i64).key().unwrap(), Key::Long(-7));
        assert_eq!(u32::MAX.key().unwrap(), Key::Long(u32::MAX as i64));
        assert_eq!(42u64.key().unwrap(), Key::Long(42));
        assert_eq!((i64::MIN as i128).key().unwrap(), Key::Long(i64::MIN));
    }

    #[test]
    fn test_strings_map_to_str() {
        assert_eq!("apple".key().unwrap(), Key::Str("apple"));
        let owned = String::from("banana");
        assert_eq!(owned.key().unwrap(), Key::Str("banana"));
        assert_eq!((&&owned).key().unwrap(), Key::Str("banana"));
    }

    #[test]
    fn test_out_of_range_integers_are_reported() {
        let err = u64::MAX.key().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKeyType);
        assert_eq!(err.context("type"), Some("u64"));

        let err = (i64::MAX as u128 + 1).key().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKeyType);
    }
}
