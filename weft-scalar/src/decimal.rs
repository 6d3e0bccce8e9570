use rust_decimal::{Decimal, RoundingStrategy};
use weft_dtype::DecimalDType;
use weft_error::{WeftResult, weft_bail, weft_err};

/// How to drop fractional digits that do not fit the scale of a decimal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundingMode {
    /// Round half away from zero
    HalfUp,
    /// Round half towards zero
    HalfDown,
    /// Round half to the nearest even digit
    HalfEven,
    /// Round away from zero
    Up,
    /// Round towards zero
    Down,
    /// Round towards positive infinity
    Ceiling,
    /// Round towards negative infinity
    Floor,
}

impl From<RoundingMode> for RoundingStrategy {
    fn from(value: RoundingMode) -> Self {
        match value {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
        }
    }
}

/// Decimal handling shared by model construction and value marshaling.
///
/// Without a rounding mode a value that would lose non-zero digits is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecimalConfig {
    default: Option<DecimalDType>,
    rounding: Option<RoundingMode>,
}

impl DecimalConfig {
    /// Sets the precision and scale used for decimal fields that declare none.
    pub fn with_default(mut self, precision: u8, scale: u8) -> WeftResult<Self> {
        self.default = Some(DecimalDType::try_new(precision, scale)?);
        Ok(self)
    }

    /// Sets the rounding mode applied when a value has more fractional digits than the column.
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = Some(rounding);
        self
    }

    pub fn default_dtype(&self) -> Option<DecimalDType> {
        self.default
    }

    pub fn rounding(&self) -> Option<RoundingMode> {
        self.rounding
    }
}

fn pow10(digits: u8) -> u128 {
    10u128.pow(u32::from(digits))
}

/// Number of significant digits of the unscaled value.
pub fn unscaled_digits(value: &Decimal) -> u8 {
    let mut mantissa = value.mantissa().unsigned_abs();
    let mut digits = 0u8;
    while mantissa > 0 {
        mantissa /= 10;
        digits += 1;
    }
    digits.max(1)
}

/// Brings `value` to exactly the scale of `dtype`, checking it fits the precision.
pub fn rescale(
    value: Decimal,
    dtype: &DecimalDType,
    rounding: Option<RoundingMode>,
) -> WeftResult<Decimal> {
    let scale = u32::from(dtype.scale());
    let mut rescaled = if value.scale() > scale {
        match rounding {
            Some(mode) => value.round_dp_with_strategy(scale, mode.into()),
            None => {
                let truncated = value.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
                if truncated != value {
                    weft_bail!(ScaleOverflow: "{value} has more than {scale} fractional digits and no rounding mode is configured");
                }
                truncated
            }
        }
    } else {
        value
    };

    rescaled.rescale(scale);
    if rescaled.scale() != scale {
        weft_bail!(ScaleOverflow: "{value} cannot be represented with scale {scale}");
    }

    if rescaled.mantissa().unsigned_abs() >= pow10(dtype.precision()) {
        weft_bail!(ScaleOverflow: "{value} does not fit {dtype}");
    }
    Ok(rescaled)
}

/// Converts an integer into a decimal of type `dtype`.
pub fn from_integer(value: i64, dtype: &DecimalDType) -> WeftResult<Decimal> {
    rescale(Decimal::from(value), dtype, None)
}

/// Converts a float into a decimal of type `dtype`.
pub fn from_float(
    value: f64,
    dtype: &DecimalDType,
    rounding: Option<RoundingMode>,
) -> WeftResult<Decimal> {
    let decimal = Decimal::try_from(value)
        .map_err(|_| weft_err!(ScaleOverflow: "{value} cannot be represented as a decimal"))?;
    rescale(decimal, dtype, rounding)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use rust_decimal::Decimal;
    use weft_dtype::DecimalDType;
    use weft_error::WeftError;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn dtype(p: u8, s: u8) -> DecimalDType {
        DecimalDType::try_new(p, s).unwrap()
    }

    #[rstest]
    #[case("99999999.99", "99999999.99")]
    #[case("-0.01", "-0.01")]
    #[case("1.5", "1.50")]
    #[case("7", "7.00")]
    fn exact_fit(#[case] input: &str, #[case] expected: &str) {
        let rescaled = rescale(dec(input), &dtype(10, 2), None).unwrap();
        assert_eq!(rescaled, dec(expected));
        assert_eq!(rescaled.scale(), 2);
    }

    #[test]
    fn integral_overflow() {
        assert!(matches!(
            rescale(dec("100000000.00"), &dtype(10, 2), None),
            Err(WeftError::ScaleOverflow(..))
        ));
    }

    #[test]
    fn dropping_digits_without_rounding() {
        assert!(matches!(
            rescale(dec("1.005"), &dtype(10, 2), None),
            Err(WeftError::ScaleOverflow(..))
        ));
        // trailing zeros are not lost digits
        assert_eq!(
            rescale(dec("1.500"), &dtype(10, 2), None).unwrap(),
            dec("1.50")
        );
    }

    #[rstest]
    #[case(RoundingMode::HalfUp, "1.005", "1.01")]
    #[case(RoundingMode::HalfEven, "1.005", "1.00")]
    #[case(RoundingMode::Down, "1.009", "1.00")]
    #[case(RoundingMode::Up, "1.001", "1.01")]
    #[case(RoundingMode::Floor, "-1.001", "-1.01")]
    #[case(RoundingMode::Ceiling, "-1.009", "-1.00")]
    fn rounding(#[case] mode: RoundingMode, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(
            rescale(dec(input), &dtype(10, 2), Some(mode)).unwrap(),
            dec(expected)
        );
    }

    #[test]
    fn integers() {
        assert_eq!(from_integer(42, &dtype(5, 2)).unwrap(), dec("42.00"));
        assert!(from_integer(1000, &dtype(5, 2)).is_err());
    }

    #[test]
    fn digits() {
        assert_eq!(unscaled_digits(&dec("0")), 1);
        assert_eq!(unscaled_digits(&dec("-123.45")), 5);
    }
}
