use std::fmt::{Display, Formatter};

use num_traits::NumCast;
use paste::paste;
use weft_dtype::PType;
use weft_error::{WeftError, weft_err};

/// A single fixed-width numeric value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum PValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

macro_rules! match_each_pvalue {
    ($self:expr, |$v:ident| $body:expr) => {
        match $self {
            PValue::I8($v) => $body,
            PValue::I16($v) => $body,
            PValue::I32($v) => $body,
            PValue::I64($v) => $body,
            PValue::F32($v) => $body,
            PValue::F64($v) => $body,
        }
    };
}

/// Converts `v` into `T` only if converting back yields `v` again.
fn exact<S, T>(v: S) -> Option<T>
where
    S: NumCast + Copy + PartialEq,
    T: NumCast + Copy,
{
    let t = <T as NumCast>::from(v)?;
    let back = <S as NumCast>::from(t)?;
    (back == v).then_some(t)
}

macro_rules! as_primitive {
    ($T:ty) => {
        paste! {
            #[doc = "Access PValue as `" $T "`, returning `None` unless the value is represented exactly"]
            pub fn [<as_ $T>](self) -> Option<$T> {
                match_each_pvalue!(self, |v| exact::<_, $T>(v))
            }
        }
    };
}

impl PValue {
    pub fn ptype(&self) -> PType {
        match self {
            Self::I8(_) => PType::I8,
            Self::I16(_) => PType::I16,
            Self::I32(_) => PType::I32,
            Self::I64(_) => PType::I64,
            Self::F32(_) => PType::F32,
            Self::F64(_) => PType::F64,
        }
    }

    pub fn is_instance_of(&self, ptype: PType) -> bool {
        self.ptype() == ptype
    }

    as_primitive!(i8);
    as_primitive!(i16);
    as_primitive!(i32);
    as_primitive!(i64);
    as_primitive!(f32);
    as_primitive!(f64);

    /// Converts the value to `ptype`.
    ///
    /// Widening conversions always succeed. Any other conversion succeeds only if the value is
    /// represented exactly in the target type.
    pub fn cast(self, ptype: PType) -> Option<PValue> {
        if self.ptype() == ptype {
            return Some(self);
        }
        let widening = self.ptype().widens_to(ptype);
        Some(match ptype {
            PType::I8 => PValue::I8(self.as_i8()?),
            PType::I16 => PValue::I16(self.as_i16()?),
            PType::I32 => PValue::I32(self.as_i32()?),
            PType::I64 => PValue::I64(self.as_i64()?),
            PType::F32 if widening => {
                PValue::F32(match_each_pvalue!(self, |v| <f32 as NumCast>::from(v))?)
            }
            PType::F32 => PValue::F32(self.as_f32()?),
            PType::F64 if widening => {
                PValue::F64(match_each_pvalue!(self, |v| <f64 as NumCast>::from(v))?)
            }
            PType::F64 => PValue::F64(self.as_f64()?),
        })
    }

    /// Like [`PValue::cast`], failing with [`WeftError::NarrowingConversion`].
    pub fn try_cast(self, ptype: PType) -> Result<PValue, WeftError> {
        let value = self;
        self.cast(ptype).ok_or_else(|| {
            weft_err!(NarrowingConversion: "{value} ({}) does not fit {ptype}", value.ptype())
        })
    }

    /// Returns `true` for integer values.
    pub fn is_int(&self) -> bool {
        self.ptype().is_int()
    }
}

impl Display for PValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match_each_pvalue!(self, |v| write!(f, "{v}"))
    }
}

macro_rules! pvalue_conversions {
    ($T:ty, $PT:tt) => {
        impl From<$T> for PValue {
            fn from(value: $T) -> Self {
                PValue::$PT(value)
            }
        }

        impl TryFrom<PValue> for $T {
            type Error = WeftError;

            fn try_from(value: PValue) -> Result<Self, Self::Error> {
                paste! { value.[<as_ $T>]() }.ok_or_else(|| {
                    weft_err!(NarrowingConversion: "cannot read {} value {value} as {}", value.ptype(), PType::$PT)
                })
            }
        }
    };
}

pvalue_conversions!(i8, I8);
pvalue_conversions!(i16, I16);
pvalue_conversions!(i32, I32);
pvalue_conversions!(i64, I64);
pvalue_conversions!(f32, F32);
pvalue_conversions!(f64, F64);
