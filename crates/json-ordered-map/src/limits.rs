//! Decoder limits.
//!
//! Bounds on nesting depth and input size applied by the token reader, and
//! therefore by the duplicate scanner and both decode passes.

/// Default maximum nesting depth.
///
/// The token reader enforces the limit before the flat decode pass runs, and
/// that pass runs without serde_json's own recursion limit. Every decoder
/// stage recurses once per level, so very large limits need a large stack.
pub const DEFAULT_MAX_DEPTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of simultaneously open objects/arrays.
    pub max_depth: usize,
    /// Maximum input length in bytes. `None` means unlimited.
    pub max_input_len: Option<usize>,
}

impl Limits {
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: None,
        }
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = Some(max_input_len);
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(limits.max_input_len, None);
    }

    #[test]
    fn test_builders() {
        let limits = Limits::new().with_max_depth(4).with_max_input_len(1024);
        assert_eq!(limits.max_depth, 4);
        assert_eq!(limits.max_input_len, Some(1024));
    }
}
