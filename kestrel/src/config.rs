//! Run configuration shared by the CLI and library entry points

/// Default limit on nested user function calls
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Verbose output
    pub verbose: bool,
    /// Nested call depth at which evaluation fails with a stack overflow error
    pub max_depth: usize,
    /// Print the final result of a file run unless it is null
    pub print_result: bool,
}

impl RunConfig {
    pub fn new() -> Self {
        RunConfig {
            verbose: false,
            max_depth: DEFAULT_MAX_DEPTH,
            print_result: true,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn print_result(mut self, print: bool) -> Self {
        self.print_result = print;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert!(!config.verbose);
        assert!(config.print_result);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_builder_chain() {
        let config = RunConfig::new().verbose(true).max_depth(64).print_result(false);
        assert!(config.verbose);
        assert_eq!(config.max_depth, 64);
        assert!(!config.print_result);
    }
}
