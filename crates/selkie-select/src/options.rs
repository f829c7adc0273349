//! Compile and match limits.

/// Limits applied while compiling a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximum nesting of functional pseudo-classes (`:is(:not(:has(...)))`).
    pub max_nesting: usize,
    /// Maximum depth of alias-to-alias references (`:link` → `:any-link` is 2).
    pub max_alias_depth: usize,
}

impl CompileOptions {
    /// Default nesting limit.
    pub const DEFAULT_MAX_NESTING: usize = 32;
    /// Default alias depth limit.
    pub const DEFAULT_MAX_ALIAS_DEPTH: usize = 16;

    /// Set the nesting limit.
    #[must_use]
    pub const fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Set the alias depth limit.
    #[must_use]
    pub const fn with_max_alias_depth(mut self, max_alias_depth: usize) -> Self {
        self.max_alias_depth = max_alias_depth;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_nesting: Self::DEFAULT_MAX_NESTING,
            max_alias_depth: Self::DEFAULT_MAX_ALIAS_DEPTH,
        }
    }
}

/// Limits applied while matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Maximum recursion depth across combinator steps and nested
    /// pseudo-class arguments.
    pub max_depth: usize,
}

impl MatchOptions {
    /// Default recursion limit.
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Set the recursion limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
