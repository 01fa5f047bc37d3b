//! Paths that bypass authentication.
//!
//! Patterns are either an exact path (`/health`) or a prefix ending in `*`
//! (`/docs/*`). The list is explicit configuration so operators can audit
//! exactly what is reachable without credentials.

/// Defaults: health check, API documentation, discovery metadata.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/openapi.json",
    "/docs",
    "/docs/*",
    "/.well-known/*",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Exact(String),
    Prefix(String),
}

impl Pattern {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_string()),
            None => Self::Exact(raw.to_string()),
        })
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Prefix(p) => path.starts_with(p.as_str()),
        }
    }
}

/// The public path allowlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPaths {
    raw: Vec<String>,
    patterns: Vec<Pattern>,
}

impl PublicPaths {
    /// Build from configured patterns. Blank entries are dropped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut raw = Vec::new();
        let mut parsed = Vec::new();
        for p in patterns {
            if let Some(pattern) = Pattern::parse(p.as_ref()) {
                raw.push(p.as_ref().trim().to_string());
                parsed.push(pattern);
            }
        }
        Self {
            raw,
            patterns: parsed,
        }
    }

    /// No path is public.
    pub fn none() -> Self {
        Self::new(std::iter::empty::<&str>())
    }

    /// Is `path` (without query string) public?
    pub fn is_public(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// The configured patterns, as given.
    pub fn patterns(&self) -> &[String] {
        &self.raw
    }
}

impl Default for PublicPaths {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let public = PublicPaths::default();
        assert!(public.is_public("/health"));
        assert!(public.is_public("/openapi.json"));
        assert!(public.is_public("/docs"));
        assert!(public.is_public("/docs/index.html"));
        assert!(public.is_public("/.well-known/security.txt"));

        assert!(!public.is_public("/entries"));
        assert!(!public.is_public("/health/deep"));
        assert!(!public.is_public("/healthz"));
        assert!(!public.is_public("/"));
    }

    #[test]
    fn test_patterns_enumerable() {
        let public = PublicPaths::new(["/health", "  ", "/status/*"]);
        assert_eq!(public.patterns(), &["/health".to_string(), "/status/*".to_string()]);
        assert!(public.is_public("/status/live"));
    }

    #[test]
    fn test_none_is_empty() {
        let public = PublicPaths::none();
        assert!(public.patterns().is_empty());
        assert!(!public.is_public("/health"));
    }
}
