use std::fmt::{Display, Formatter};

use weft_error::{WeftError, WeftResult, weft_bail};

use crate::FieldType;

/// Physical type of a fixed-width numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PType {
    /// 8-bit signed integer ("byte")
    I8,
    /// 16-bit signed integer ("short")
    I16,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl PType {
    /// Returns `true` if the type is an integer.
    pub const fn is_int(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Returns `true` if the type is a float.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Number of decimal digits every value of an integer type fits in.
    ///
    /// Returns `None` for floats.
    pub const fn max_decimal_digits(self) -> Option<u8> {
        match self {
            Self::I8 => Some(3),
            Self::I16 => Some(5),
            Self::I32 => Some(10),
            Self::I64 => Some(19),
            Self::F32 | Self::F64 => None,
        }
    }

    /// Whether every value of `self` is exactly representable as a value of `other`.
    pub fn widens_to(self, other: PType) -> bool {
        use PType::*;

        match (self, other) {
            (a, b) if a == b => true,
            (I8, I16 | I32 | I64 | F32 | F64) => true,
            (I16, I32 | I64 | F32 | F64) => true,
            (I32, I64 | F64) => true,
            (F32, F64) => true,
            _ => false,
        }
    }

    /// Whether `self` can be converted to `other` with a checked, per-value conversion.
    ///
    /// This is the case for every pair of numeric types that does not widen.
    pub fn narrows_to(self, other: PType) -> bool {
        !self.widens_to(other)
    }
}

impl Display for PType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

impl TryFrom<&FieldType> for PType {
    type Error = WeftError;

    fn try_from(value: &FieldType) -> WeftResult<Self> {
        match value {
            FieldType::Primitive(p, _) => Ok(*p),
            _ => weft_bail!("Cannot convert FieldType {value} into PType"),
        }
    }
}
