//! Source locations.

use std::fmt;

/// Byte range `start..stop` in the source a node was parsed from.
///
/// Diagnostics report `(start, stop)` so file-in tools can highlight the
/// exact text that caused an error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub stop: u32,
}

impl Span {
    /// Span for nodes synthesized by the host rather than parsed.
    pub const DUMMY: Span = Span { start: 0, stop: 0 };

    #[inline]
    pub const fn new(start: u32, stop: u32) -> Self {
        Span { start, stop }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.stop.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    /// Smallest span covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            stop: self.stop.max(other.stop),
        }
    }

    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.stop)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.stop)
    }
}
