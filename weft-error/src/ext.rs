use crate::{ErrString, WeftResult};

/// Attach a context message to the error of a [`WeftResult`].
pub trait ContextExt<T>: private::Sealed {
    /// Wraps the error, if any, with `msg`.
    fn context<M: Into<ErrString>>(self, msg: M) -> WeftResult<T>;

    /// Like [`ContextExt::context`], but only builds the message on the error path.
    fn with_context<M: Into<ErrString>, F: FnOnce() -> M>(self, f: F) -> WeftResult<T>;
}

mod private {
    use crate::WeftResult;

    pub trait Sealed {}

    impl<T> Sealed for WeftResult<T> {}
}

impl<T> ContextExt<T> for WeftResult<T> {
    fn context<M: Into<ErrString>>(self, msg: M) -> WeftResult<T> {
        self.map_err(|e| e.with_context(msg))
    }

    fn with_context<M: Into<ErrString>, F: FnOnce() -> M>(self, f: F) -> WeftResult<T> {
        self.map_err(|e| e.with_context(f()))
    }
}
