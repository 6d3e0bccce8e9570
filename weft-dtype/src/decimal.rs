use std::fmt::{Display, Formatter};

use weft_error::{WeftError, WeftResult, weft_bail, weft_err};

use crate::FieldType;

/// The largest precision a decimal column can declare.
///
/// This is the number of significant digits a host decimal carries exactly.
pub const MAX_PRECISION: u8 = 28;

/// Parameters that define the precision and scale of a decimal type.
///
/// `precision` is the total number of significant digits, `scale` the number of them found after
/// the decimal point. A valid pair satisfies `0 < precision <= MAX_PRECISION` and
/// `scale <= precision`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecimalDType {
    precision: u8,
    scale: u8,
}

impl DecimalDType {
    /// Checked constructor for a `DecimalDType`.
    pub fn try_new(precision: u8, scale: u8) -> WeftResult<Self> {
        if precision == 0 {
            weft_bail!(InvalidDecimalSpec: "precision must be positive");
        }
        if precision > MAX_PRECISION {
            weft_bail!(InvalidDecimalSpec: "precision {precision} exceeds the maximum of {MAX_PRECISION}");
        }
        if scale > precision {
            weft_bail!(InvalidDecimalSpec: "scale {scale} is larger than precision {precision}");
        }
        Ok(Self { precision, scale })
    }

    /// Builds a `DecimalDType` from signed parameters, as they come out of relational metadata.
    pub fn try_from_signed(precision: i32, scale: i32) -> WeftResult<Self> {
        let precision = u8::try_from(precision).map_err(|_| {
            weft_err!(InvalidDecimalSpec: "precision {precision} is out of range")
        })?;
        let scale = u8::try_from(scale).map_err(|_| {
            weft_err!(InvalidDecimalSpec: "scale {scale} is out of range")
        })?;
        Self::try_new(precision, scale)
    }

    /// The precision is the number of significant figures that the decimal tracks.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// The scale is the number of digits after the decimal point.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Number of digits available before the decimal point.
    pub fn integral_digits(&self) -> u8 {
        self.precision - self.scale
    }

    /// Whether every value of `self` fits `other` without losing digits on either side of the
    /// decimal point.
    pub fn widens_to(&self, other: &DecimalDType) -> bool {
        other.scale >= self.scale && other.integral_digits() >= self.integral_digits()
    }
}

impl Display for DecimalDType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "decimal({},{})", self.precision, self.scale)
    }
}

impl TryFrom<&FieldType> for DecimalDType {
    type Error = WeftError;

    fn try_from(value: &FieldType) -> Result<Self, Self::Error> {
        match value {
            FieldType::Decimal(dt, _) => Ok(*dt),
            _ => weft_bail!("Cannot convert FieldType {value} into DecimalDType"),
        }
    }
}
