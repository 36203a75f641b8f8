//! Proof that an error was reported.

use std::fmt;

/// Zero-sized token that can only be obtained by reporting an error.
///
/// Phases return `Result<T, ErrorGuaranteed>` so a failure can never be
/// silent: whoever produced the `Err` has already told the sink why.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// A token if `count` errors were reported, for sinks that only count.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) reported")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_has_no_token() {
        assert!(ErrorGuaranteed::from_error_count(0).is_none());
        assert!(ErrorGuaranteed::from_error_count(2).is_some());
    }
}
