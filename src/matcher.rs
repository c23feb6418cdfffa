/// Userscript-style match patterns (`https://*.feishu.cn/*`)
/// Stands in for the host runtime's `@match` filter: a launch is only
/// honored for pages that match at least one registered pattern.
use once_cell::sync::Lazy;
use thiserror::Error;
use url::Url;

/// Patterns registered by the original trigger
pub const DEFAULT_MATCH_PATTERNS: [&str; 2] =
    ["https://*.feishu.cn/*", "https://*.larksuite.com/*"];

static DEFAULT_FILTER: Lazy<PageFilter> = Lazy::new(|| {
    PageFilter::new(&DEFAULT_MATCH_PATTERNS).expect("default match patterns are well-formed")
});

#[derive(Debug, Error, PartialEq)]
pub enum PatternError {
    #[error("match pattern must be <scheme>://<host>/<path>: {0}")]
    Malformed(String),
    #[error("unsupported scheme in match pattern (http, https or *): {0}")]
    UnsupportedScheme(String),
    #[error("host wildcard is only allowed as a leading '*.' label: {0}")]
    HostWildcard(String),
}

/// One parsed `@match` pattern. `*.host` accepts the bare host and any
/// subdomain; the path may end in a single `*` for prefix matching.
/// Queries and fragments are not part of the match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPattern {
    scheme: String,
    host: String,
    any_subdomain: bool,
    path_prefix: String,
    path_exact: bool,
}

impl MatchPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let (scheme, rest) = pattern
            .split_once("://")
            .ok_or_else(|| PatternError::Malformed(pattern.to_string()))?;

        match scheme {
            "http" | "https" | "*" => {}
            _ => return Err(PatternError::UnsupportedScheme(pattern.to_string())),
        }

        let (host, path) = match rest.split_once('/') {
            Some((host, path)) => (host, format!("/{path}")),
            None => return Err(PatternError::Malformed(pattern.to_string())),
        };
        if host.is_empty() {
            return Err(PatternError::Malformed(pattern.to_string()));
        }

        let (any_subdomain, host) = if host == "*" {
            (true, String::new())
        } else if let Some(stripped) = host.strip_prefix("*.") {
            (true, stripped.to_ascii_lowercase())
        } else {
            (false, host.to_ascii_lowercase())
        };
        if host.contains('*') {
            return Err(PatternError::HostWildcard(pattern.to_string()));
        }

        let (path_prefix, path_exact) = match path.strip_suffix('*') {
            Some(prefix) => (prefix.to_string(), false),
            None => (path, true),
        };
        if path_prefix.contains('*') {
            // Only a single trailing wildcard is supported
            return Err(PatternError::Malformed(pattern.to_string()));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host,
            any_subdomain,
            path_prefix,
            path_exact,
        })
    }

    pub fn matches(&self, url: &Url) -> bool {
        self.scheme_matches(url) && self.host_matches(url) && self.path_matches(url)
    }

    fn scheme_matches(&self, url: &Url) -> bool {
        match self.scheme.as_str() {
            "*" => matches!(url.scheme(), "http" | "https"),
            scheme => url.scheme() == scheme,
        }
    }

    fn host_matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };

        if self.any_subdomain {
            if self.host.is_empty() {
                return true;
            }
            host == self.host || host.ends_with(&format!(".{}", self.host))
        } else {
            host == self.host
        }
    }

    fn path_matches(&self, url: &Url) -> bool {
        if self.path_exact {
            url.path() == self.path_prefix
        } else {
            url.path().starts_with(&self.path_prefix)
        }
    }
}

/// The registered pattern set for a launcher instance
#[derive(Debug, Clone)]
pub struct PageFilter {
    patterns: Vec<MatchPattern>,
}

impl PageFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|pattern| MatchPattern::parse(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn matches(&self, url: &Url) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(url))
    }
}

impl Default for PageFilter {
    fn default() -> Self {
        DEFAULT_FILTER.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_default_patterns_parse() {
        for pattern in DEFAULT_MATCH_PATTERNS {
            assert!(MatchPattern::parse(pattern).is_ok(), "{pattern}");
        }
    }

    #[test]
    fn test_subdomain_wildcard() {
        let pattern = MatchPattern::parse("https://*.feishu.cn/*").unwrap();

        assert!(pattern.matches(&url("https://abc.feishu.cn/docs/XYZ123")));
        assert!(pattern.matches(&url("https://feishu.cn/docs/XYZ123")));
        assert!(pattern.matches(&url("https://a.b.feishu.cn/wiki/T")));
        assert!(!pattern.matches(&url("https://evilfeishu.cn/docs/XYZ123")));
        assert!(!pattern.matches(&url("https://feishu.cn.evil.com/docs/XYZ123")));
    }

    #[test]
    fn test_scheme_must_match() {
        let pattern = MatchPattern::parse("https://*.feishu.cn/*").unwrap();
        assert!(!pattern.matches(&url("http://abc.feishu.cn/docs/X")));

        let any_scheme = MatchPattern::parse("*://*.feishu.cn/*").unwrap();
        assert!(any_scheme.matches(&url("http://abc.feishu.cn/docs/X")));
        assert!(any_scheme.matches(&url("https://abc.feishu.cn/docs/X")));
        assert!(!any_scheme.matches(&url("ftp://abc.feishu.cn/docs/X")));
    }

    #[test]
    fn test_path_prefix_and_exact() {
        let prefix = MatchPattern::parse("https://*.feishu.cn/docs/*").unwrap();
        assert!(prefix.matches(&url("https://abc.feishu.cn/docs/XYZ123")));
        assert!(!prefix.matches(&url("https://abc.feishu.cn/mail/inbox")));

        let exact = MatchPattern::parse("https://*.feishu.cn/drive").unwrap();
        assert!(exact.matches(&url("https://abc.feishu.cn/drive")));
        assert!(!exact.matches(&url("https://abc.feishu.cn/drive/folder")));
    }

    #[test]
    fn test_host_is_case_insensitive() {
        let pattern = MatchPattern::parse("https://*.Feishu.CN/*").unwrap();
        assert!(pattern.matches(&url("https://ABC.feishu.cn/docs/X")));
    }

    #[test]
    fn test_malformed_patterns() {
        assert!(matches!(
            MatchPattern::parse("feishu.cn/*"),
            Err(PatternError::Malformed(_))
        ));
        assert!(matches!(
            MatchPattern::parse("https://*.feishu.cn"),
            Err(PatternError::Malformed(_))
        ));
        assert!(matches!(
            MatchPattern::parse("ftp://*.feishu.cn/*"),
            Err(PatternError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            MatchPattern::parse("https://docs.*.cn/*"),
            Err(PatternError::HostWildcard(_))
        ));
        assert!(matches!(
            MatchPattern::parse("https://*.feishu.cn/*/edit"),
            Err(PatternError::Malformed(_))
        ));
    }

    #[test]
    fn test_default_filter_covers_both_hosts() {
        let filter = PageFilter::default();

        assert!(filter.matches(&url("https://abc.feishu.cn/docs/XYZ123")));
        assert!(filter.matches(&url("https://team.larksuite.com/wiki/W1")));
        assert!(!filter.matches(&url("https://github.com/some/repo")));
    }
}
