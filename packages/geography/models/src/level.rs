//! Discrete simplification levels and their zoom mapping.

use std::fmt;

/// Number of precomputed simplification levels.
pub const LEVEL_COUNT: usize = 10;

/// Index of a precomputed boundary resolution.
///
/// Level 0 is the coarsest, `LEVEL_COUNT - 1` the finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimplificationLevel(usize);

impl SimplificationLevel {
    /// The coarsest level.
    pub const COARSEST: Self = Self(0);
    /// The finest level.
    pub const FINEST: Self = Self(LEVEL_COUNT - 1);

    /// Maps a client zoom value to a level.
    ///
    /// Zoom 1 selects the coarsest level and zoom `LEVEL_COUNT` the finest.
    /// Values outside that range are clamped, never rejected.
    #[must_use]
    pub fn from_zoom(zoom: i64) -> Self {
        let max = i64::try_from(LEVEL_COUNT - 1).unwrap_or(i64::MAX);
        let index = zoom.saturating_sub(1).clamp(0, max);
        Self(usize::try_from(index).unwrap_or(0))
    }

    /// Returns the level for an array index, or `None` if out of range.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < LEVEL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Array index of this level.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Iterates over every level from coarsest to finest.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..LEVEL_COUNT).map(Self)
    }
}

impl fmt::Display for SimplificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
