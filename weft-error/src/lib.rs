//! Error handling for the weft crates.
//!
//! Errors fall into three groups. Build-time errors ([`WeftError::DuplicateField`],
//! [`WeftError::NullabilityMismatch`], [`WeftError::InvalidDecimalSpec`],
//! [`WeftError::MissingColumn`], [`WeftError::SchemaMismatch`]) are raised while a write model or
//! a read plan is constructed. Value-time errors ([`WeftError::UnexpectedNull`],
//! [`WeftError::ScaleOverflow`], [`WeftError::NarrowingConversion`]) are raised per record.
//! External errors ([`WeftError::External`], [`WeftError::Io`]) come from the storage engine or
//! the relational source and are passed through untouched.

#![feature(error_generic_member_access)]

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{fmt, io};

mod ext;

pub use ext::*;

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Boxed error coming from a collaborator outside of weft.
pub type ExternalError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The top-level error type for weft.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum WeftError {
    /// A field name was registered twice in the same record.
    #[error("duplicate field: {0}\nBacktrace:\n{1}")]
    DuplicateField(ErrString, Backtrace),
    /// A nullable type was bound to an accessor that cannot represent absence.
    #[error("nullability mismatch: {0}\nBacktrace:\n{1}")]
    NullabilityMismatch(ErrString, Backtrace),
    /// A decimal precision/scale pair is not valid.
    #[error("invalid decimal: {0}\nBacktrace:\n{1}")]
    InvalidDecimalSpec(ErrString, Backtrace),
    /// A requested column does not exist in the stored schema.
    #[error("missing column: {0}\nBacktrace:\n{1}")]
    MissingColumn(ErrString, Backtrace),
    /// Two schemas cannot be reconciled.
    #[error("schema mismatch: {0}\nBacktrace:\n{1}")]
    SchemaMismatch(ErrString, Backtrace),
    /// A value or type does not fit the narrower requested type.
    #[error("narrowing conversion: {0}\nBacktrace:\n{1}")]
    NarrowingConversion(ErrString, Backtrace),
    /// A null was found where the schema requires a value.
    #[error("unexpected null: {0}\nBacktrace:\n{1}")]
    UnexpectedNull(ErrString, Backtrace),
    /// A decimal does not fit the declared precision after rescaling.
    #[error("scale overflow: {0}\nBacktrace:\n{1}")]
    ScaleOverflow(ErrString, Backtrace),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// An operation was attempted in a state that does not allow it.
    #[error("invalid state: {0}\nBacktrace:\n{1}")]
    InvalidState(ErrString, Backtrace),
    /// An internal invariant did not hold.
    #[error("{0}\nBacktrace:\n{1}")]
    AssertionFailed(ErrString, Backtrace),
    /// An error raised by the storage engine or the relational source.
    #[error("external error: {0}")]
    External(#[source] ExternalError),
    /// Wrapper for errors from the standard library I/O types.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Wrapper for errors from `serde_json`.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<WeftError>),
}

impl WeftError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        WeftError::Context(msg.into(), Box::new(self))
    }

    /// Wraps an error raised by an external collaborator.
    pub fn external<E>(err: E) -> Self
    where
        E: Into<ExternalError>,
    {
        WeftError::External(err.into())
    }

    /// Whether the root cause of this error lies outside of weft.
    pub fn is_external(&self) -> bool {
        match self {
            WeftError::External(..) | WeftError::Io(_) => true,
            WeftError::Context(_, inner) => inner.is_external(),
            _ => false,
        }
    }

    /// Whether the error was raised by a single value rather than by a schema or a collaborator.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self.root(),
            WeftError::UnexpectedNull(..)
                | WeftError::NarrowingConversion(..)
                | WeftError::ScaleOverflow(..)
        )
    }

    /// The innermost error, looking through any context wrappers.
    pub fn root(&self) -> &WeftError {
        match self {
            WeftError::Context(_, inner) => inner.root(),
            _ => self,
        }
    }
}

impl Debug for WeftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`WeftError`]s as their error type.
pub type WeftResult<T> = Result<T, WeftError>;

/// A convenient macro for creating a [`WeftError`].
///
/// The variant defaults to [`WeftError::InvalidArgument`] when none is named.
#[macro_export]
macro_rules! weft_err {
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::WeftError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::weft_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a [`WeftError`].
#[macro_export]
macro_rules! weft_bail {
    ($($tt:tt)+) => {
        return Err($crate::weft_err!($($tt)+))
    };
}

#[doc(hidden)]
pub mod __private {
    use crate::WeftError;

    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub fn must_use(error: WeftError) -> WeftError {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct ConnectionReset;

    #[test]
    fn variant_defaults_to_invalid_argument() {
        let err = weft_err!("bad {}", 1);
        assert!(matches!(err, WeftError::InvalidArgument(..)));
        assert!(err.to_string().starts_with("bad 1"));
    }

    #[test]
    fn named_variant() {
        let name = "salary";
        let err = weft_err!(ScaleOverflow: "{name} does not fit");
        assert!(matches!(err, WeftError::ScaleOverflow(..)));
        assert!(err.to_string().contains("salary does not fit"));
    }

    #[test]
    fn external_through_context() {
        let err = WeftError::external(ConnectionReset).with_context("fetching next row");
        assert!(err.is_external());
        assert!(matches!(err.root(), WeftError::External(..)));
        assert!(std::error::Error::source(err.root()).is_some());
        assert!(!weft_err!(UnexpectedNull: "id").is_external());
    }

    #[test]
    fn value_errors() {
        assert!(
            weft_err!(ScaleOverflow: "1.005")
                .with_context("writing $price")
                .is_value_error()
        );
        assert!(!weft_err!(MissingColumn: "id").is_value_error());
    }

    #[test]
    fn io_is_external() {
        let err: WeftError = io::Error::other("disk full").into();
        assert!(err.is_external());
    }

    #[test]
    fn bail_returns_early() {
        fn check(v: i32) -> WeftResult<i32> {
            if v < 0 {
                weft_bail!(NarrowingConversion: "{v} is negative");
            }
            Ok(v)
        }
        assert_eq!(check(1).unwrap(), 1);
        assert!(matches!(
            check(-1).unwrap_err(),
            WeftError::NarrowingConversion(..)
        ));
    }

    #[test]
    fn context_on_results() {
        let failed: WeftResult<()> = Err(weft_err!(UnexpectedNull: "id"));
        let err = failed.with_context(|| format!("reading row {}", 3)).unwrap_err();
        assert_eq!(err.to_string().lines().next(), Some("reading row 3: unexpected null: id"));
        assert!(err.is_value_error());

        let ok: WeftResult<u8> = Ok(1);
        assert_eq!(ok.context("never used").unwrap(), 1);
    }
}
