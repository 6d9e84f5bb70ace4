//! Low-signal path rules shared by the `filtered` strategy and the scorer

use diffpress_core::{ConfigError, ConfigResult};
use regex::Regex;

/// Built-in patterns for generated output, build directories, lockfiles,
/// minified assets and test fixtures
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    // lockfiles
    r"(^|/)(Cargo\.lock|package-lock\.json|npm-shrinkwrap\.json|yarn\.lock|pnpm-lock\.yaml|bun\.lockb|poetry\.lock|Pipfile\.lock|uv\.lock|Gemfile\.lock|composer\.lock|go\.sum|flake\.lock|packages\.lock\.json)$",
    // minified assets and source maps
    r"\.min\.(js|css|mjs)$",
    r"\.(js|css)\.map$",
    // build and dependency directories
    r"(^|/)(dist|build|out|target|node_modules|vendor|\.next|\.nuxt|coverage|__pycache__|\.gradle)/",
    // generated sources
    r"(^|/)(generated|gen|__generated__)/",
    r"\.(generated|g)\.[A-Za-z0-9]+$",
    r"(_pb2\.py|_pb2_grpc\.py|\.pb\.go|\.pb\.rs)$",
    // test fixtures and snapshots
    r"(^|/)(fixtures|__fixtures__|testdata|__snapshots__)/",
    r"\.snap$",
];

/// A compiled set of path regexes. A path matches when any rule matches.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    patterns: Vec<Regex>,
}

impl ExclusionRules {
    /// Compile user patterns; an empty list selects the built-in rules
    pub fn new(patterns: &[String]) -> ConfigResult<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let compiled = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { patterns: compiled })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        let patterns = DEFAULT_EXCLUDE_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("built-in exclusion pattern"))
            .collect();
        Self { patterns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_match_low_signal_paths() {
        let rules = ExclusionRules::default();
        for path in [
            "Cargo.lock",
            "web/package-lock.json",
            "yarn.lock",
            "go.sum",
            "static/app.min.js",
            "static/app.js.map",
            "dist/bundle.js",
            "frontend/node_modules/left-pad/index.js",
            "target/debug/build.rs",
            "src/generated/api.rs",
            "proto/service_pb2.py",
            "tests/fixtures/big.json",
            "src/__snapshots__/view.snap",
        ] {
            assert!(rules.is_match(path), "{path} should match");
        }
    }

    #[test]
    fn test_default_rules_keep_source_paths() {
        let rules = ExclusionRules::default();
        for path in [
            "src/main.rs",
            "src/builder.rs",
            "lib/distance.py",
            "README.md",
            "tests/parser_test.rs",
            "docs/targeting.md",
        ] {
            assert!(!rules.is_match(path), "{path} should not match");
        }
    }

    #[test]
    fn test_custom_patterns_replace_defaults() {
        let rules = ExclusionRules::new(&[r"^docs/".to_string()]).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules.is_match("docs/intro.md"));
        assert!(!rules.is_match("Cargo.lock"));
    }

    #[test]
    fn test_invalid_pattern_is_a_config_error() {
        let err = ExclusionRules::new(&["(unclosed".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_list_uses_defaults() {
        let rules = ExclusionRules::new(&[]).unwrap();
        assert_eq!(rules.len(), DEFAULT_EXCLUDE_PATTERNS.len());
    }
}
