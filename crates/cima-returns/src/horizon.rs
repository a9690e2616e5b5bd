//! Momentum horizons measured in calendar months.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A momentum window length in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Horizon(u32);

impl Horizon {
    /// 12-month horizon, ranked first in the cascade.
    pub const LONG: Self = Self(12);
    /// 6-month horizon.
    pub const MEDIUM: Self = Self(6);
    /// 3-month horizon; its ranking publishes the top tier.
    pub const SHORT: Self = Self(3);
    /// 1-month horizon; its ranking publishes the ultra tier.
    pub const MICRO: Self = Self(1);

    /// The default horizon set, longest first.
    pub const DEFAULTS: [Self; 4] = [Self::LONG, Self::MEDIUM, Self::SHORT, Self::MICRO];

    /// Create a horizon of `months` months. Zero is not a horizon.
    #[must_use]
    pub const fn new(months: u32) -> Option<Self> {
        if months == 0 { None } else { Some(Self(months)) }
    }

    /// Window length in months.
    #[must_use]
    pub const fn months(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}
