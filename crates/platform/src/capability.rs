//! Outcome of probing for an optional native capability.

use std::fmt;

/// Result of trying to load something the host may not provide.
///
/// `Unavailable` is the expected "not on this machine" case. `Failed` means
/// the capability was found but could not be initialized.
pub enum Capability<T> {
    Available(T),
    Unavailable(String),
    Failed(anyhow::Error),
}

impl<T> Capability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Capability<U> {
        match self {
            Self::Available(value) => Capability::Available(f(value)),
            Self::Unavailable(reason) => Capability::Unavailable(reason),
            Self::Failed(err) => Capability::Failed(err),
        }
    }
}

impl<T> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(_) => f.write_str("Available"),
            Self::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
            Self::Failed(err) => f.debug_tuple("Failed").field(&format!("{:#}", err)).finish(),
        }
    }
}
