use crate::common::UInt;

/// Largest dice count accepted in a single `NdM` term unless configured otherwise.
pub const DEFAULT_MAX_DICE: UInt = 10_000;

/// Deepest expression tree, and deepest paren or call nesting, accepted unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Limits applied while parsing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    /// Largest `N` accepted in an `NdM` term.
    pub max_dice: UInt,
    /// Largest tree height, and largest nesting of parens and calls.
    ///
    /// Parsing, evaluation and tracing all recurse over the tree, so this bounds their stack use.
    pub max_depth: usize,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dice(mut self, max_dice: UInt) -> Self {
        self.max_dice = max_dice;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dice: DEFAULT_MAX_DICE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
