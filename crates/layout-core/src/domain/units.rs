//! Unit-suffixed values parsed at the serialization boundary.
//!
//! Persisted settings carry sizes as CSS-like strings (`"24px"`, `"1.5rem"`)
//! and display resolutions as `"1920x1080"`.  Core logic never sees those
//! strings: they are parsed into [`CssLength`] and [`Resolution`] when a
//! document is read and rendered back only when it is written.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced while parsing unit-suffixed strings.
#[derive(Debug, Error, PartialEq)]
pub enum UnitParseError {
    /// The numeric part is missing or not a finite number.
    #[error("invalid number in {0:?}")]
    InvalidNumber(String),

    /// The suffix is not one of the supported units.
    #[error("unknown unit {unit:?} in {input:?}")]
    UnknownUnit { input: String, unit: String },

    /// Sizes must not be negative.
    #[error("negative length {0:?}")]
    Negative(String),

    /// A resolution is not of the form `WIDTHxHEIGHT` with non-zero parts.
    #[error("invalid resolution {0:?}, expected WIDTHxHEIGHT")]
    InvalidResolution(String),
}

/// Unit of a [`CssLength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Px,
    Rem,
    Em,
    Percent,
}

impl LengthUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Rem => "rem",
            LengthUnit::Em => "em",
            LengthUnit::Percent => "%",
        }
    }

    fn from_suffix(suffix: &str) -> Option<LengthUnit> {
        match suffix.to_ascii_lowercase().as_str() {
            "" | "px" => Some(LengthUnit::Px),
            "rem" => Some(LengthUnit::Rem),
            "em" => Some(LengthUnit::Em),
            "%" => Some(LengthUnit::Percent),
            _ => None,
        }
    }
}

/// A non-negative length with an explicit unit.
///
/// Serialized as a string such as `"24px"`.  On input a bare JSON number is
/// also accepted and read as pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssLength {
    pub value: f64,
    pub unit: LengthUnit,
}

impl CssLength {
    pub const fn px(value: f64) -> Self {
        Self { value, unit: LengthUnit::Px }
    }

    pub const fn rem(value: f64) -> Self {
        Self { value, unit: LengthUnit::Rem }
    }
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for CssLength {
    type Err = UnitParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic() || c == '%')
            .unwrap_or(trimmed.len());
        let (number, suffix) = trimmed.split_at(split);

        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| UnitParseError::InvalidNumber(input.to_string()))?;
        if !value.is_finite() {
            return Err(UnitParseError::InvalidNumber(input.to_string()));
        }
        if value < 0.0 {
            return Err(UnitParseError::Negative(input.to_string()));
        }
        let unit = LengthUnit::from_suffix(suffix.trim()).ok_or_else(|| UnitParseError::UnknownUnit {
            input: input.to_string(),
            unit: suffix.to_string(),
        })?;

        Ok(CssLength { value, unit })
    }
}

impl Serialize for CssLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CssLength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CssLengthVisitor;

        impl Visitor<'_> for CssLengthVisitor {
            type Value = CssLength;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a length such as \"24px\" or a number of pixels")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CssLength, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<CssLength, E> {
                if v.is_finite() && v >= 0.0 {
                    Ok(CssLength::px(v))
                } else {
                    Err(E::custom(UnitParseError::Negative(v.to_string())))
                }
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CssLength, E> {
                Ok(CssLength::px(v as f64))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CssLength, E> {
                self.visit_f64(v as f64)
            }
        }

        deserializer.deserialize_any(CssLengthVisitor)
    }
}

/// Pixel resolution of a display, written as `"1920x1080"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const FULL_HD: Resolution = Resolution { width: 1920, height: 1080 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the same resolution rotated by 90°.
    pub fn rotated(self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::FULL_HD
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = UnitParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || UnitParseError::InvalidResolution(input.to_string());
        let lowered = input.trim().to_ascii_lowercase();
        let (w, h) = lowered
            .split_once('x')
            .or_else(|| lowered.split_once('×'))
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Resolution { width, height })
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
