use std::{fmt, sync::Arc};

use crate::{DynError, signal::Ticker, value::Value};

/// Either a payload or an error, as stored in an [`ErrorValue`].
#[derive(Debug)]
pub enum Fallible<T, E> {
    Payload(Arc<T>),
    Error(Arc<E>),
}

// Clone is implemented manually because auto deriving introduces unnecessary
// Clone bounds on T and E.
impl<T, E> Clone for Fallible<T, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Payload(payload) => Self::Payload(Arc::clone(payload)),
            Self::Error(error) => Self::Error(Arc::clone(error)),
        }
    }
}

impl<T, E> Fallible<T, E> {
    pub const fn as_result(&self) -> Result<&Arc<T>, &Arc<E>> {
        match self {
            Self::Payload(payload) => Ok(payload),
            Self::Error(error) => Err(error),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A [`Value`] that holds either a payload or an error.
///
/// Producers that can fail publish their failures through the same channel as
/// their values. Storing an error replaces the payload, and storing a payload
/// clears the error. Nothing is retried or cleared automatically.
pub struct ErrorValue<T, E = DynError> {
    value: Value<Fallible<T, E>>,
}

impl<T, E> ErrorValue<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: Value::new(),
        }
    }

    /// Create a new [`Ticker`] for value and error updates.
    pub fn subscribe(&self) -> Ticker {
        self.value.subscribe()
    }

    /// Get the currently stored payload or error.
    ///
    /// At most one side is `Some`; both are `None` if nothing was stored yet.
    #[must_use]
    pub fn get(&self) -> (Option<Arc<T>>, Option<Arc<E>>) {
        match self.value.get().as_deref() {
            Some(Fallible::Payload(payload)) => (Some(Arc::clone(payload)), None),
            Some(Fallible::Error(error)) => (None, Some(Arc::clone(error))),
            None => (None, None),
        }
    }

    /// Get the raw stored [`Fallible`], or `None` if nothing was stored yet.
    #[must_use]
    pub fn outcome(&self) -> Option<Arc<Fallible<T, E>>> {
        self.value.get()
    }

    /// Store `payload`, clearing any stored error.
    pub fn set(&self, payload: T) {
        self.value.set(Fallible::Payload(Arc::new(payload)));
    }

    /// Store `error` if there is one.
    ///
    /// Returns `true` if an error was stored, in which case the caller is
    /// expected to abandon its current work and report the failure. `None`
    /// leaves the stored payload untouched and returns `false`.
    pub fn error(&self, error: Option<E>) -> bool {
        let Some(error) = error else {
            return false;
        };
        self.value.set(Fallible::Error(Arc::new(error)));
        true
    }

    /// Unwrap `result`, storing its error if it failed.
    ///
    /// ```
    /// # use observable_value::value::ErrorValue;
    /// let value = ErrorValue::<u32, String>::new();
    /// assert_eq!(value.check(Ok::<_, String>(4)), Some(4));
    /// assert_eq!(value.check(Err::<u32, _>(String::from("gone"))), None);
    /// assert_eq!(value.get().1.as_deref(), Some(&String::from("gone")));
    /// ```
    pub fn check<U>(&self, result: Result<U, E>) -> Option<U> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.error(Some(error));
                None
            }
        }
    }

    /// Wait for the next payload or error. See [`Value::next`].
    pub fn next(&self) -> impl Future<Output = ()> + Send + '_ {
        self.value.next()
    }
}

impl<T, E> Default for ErrorValue<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for ErrorValue<T, E>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorValue").field(&self.value).finish()
    }
}
