use std::fmt::{Display, Formatter};

/// Resolution of a timestamp column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    /// Milliseconds since the epoch
    #[default]
    Millis,
    /// Microseconds since the epoch
    Micros,
}

impl TimeUnit {
    /// Number of units in one second.
    pub const fn per_second(self) -> i64 {
        match self {
            Self::Millis => 1_000,
            Self::Micros => 1_000_000,
        }
    }

    /// Whether values of `self` can be represented in `other` without losing resolution.
    pub fn widens_to(self, other: TimeUnit) -> bool {
        self.per_second() <= other.per_second()
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Millis => write!(f, "ms"),
            Self::Micros => write!(f, "us"),
        }
    }
}
