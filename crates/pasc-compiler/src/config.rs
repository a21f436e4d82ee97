//! Compiler configuration.

use pasc_core::{CastRank, TargetLayout};

/// Settings for one compilation.
///
/// ```
/// use pasc_compiler::CompilerConfig;
///
/// let config = CompilerConfig::default().with_word_size(4).deny_unintended(true);
/// assert_eq!(config.layout.word(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerConfig {
    /// Storage sizes of the target.
    pub layout: TargetLayout,
    /// Reject `Unintended` conversions instead of warning about them.
    pub deny_unintended: bool,
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a machine word of `word_size` bytes.
    pub fn with_word_size(mut self, word_size: u32) -> Self {
        self.layout = TargetLayout::new(word_size);
        self
    }

    pub fn deny_unintended(mut self, deny: bool) -> Self {
        self.deny_unintended = deny;
        self
    }

    /// Lowest rank accepted without a fatal error.
    pub fn min_rank(&self) -> CastRank {
        if self.deny_unintended {
            CastRank::Implicit
        } else {
            CastRank::Unintended
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CompilerConfig::new();
        assert_eq!(config.layout.word(), 8);
        assert!(!config.deny_unintended);
        assert_eq!(config.min_rank(), CastRank::Unintended);
    }

    #[test]
    fn deny_unintended_raises_minimum() {
        let config = CompilerConfig::new().deny_unintended(true);
        assert_eq!(config.min_rank(), CastRank::Implicit);
    }
}
