use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Default page patterns guarded by the access middleware
pub const DEFAULT_PATTERNS: [&str; 3] = ["/", "/dashboard/:path*", "/auth/:path*"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatcherError {
    #[error("pattern must start with '/': {0}")]
    MissingLeadingSlash(String),

    #[error("repeating parameter must be the last segment: {0}")]
    RepeatNotLast(String),

    #[error("empty parameter name in pattern: {0}")]
    EmptyParameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `:name` - exactly one segment
    Param,
    /// `:name*` - zero or more trailing segments
    ZeroOrMore,
    /// `:name+` - one or more trailing segments
    OneOrMore,
}

/// A single path pattern such as `/dashboard/:path*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, MatcherError> {
        let pattern = pattern.trim();
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| MatcherError::MissingLeadingSlash(pattern.to_string()))?;

        let raw: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());

        for (index, part) in raw.iter().enumerate() {
            let segment = match part.strip_prefix(':') {
                Some(param) => {
                    let (name, segment) = if let Some(name) = param.strip_suffix('*') {
                        (name, Segment::ZeroOrMore)
                    } else if let Some(name) = param.strip_suffix('+') {
                        (name, Segment::OneOrMore)
                    } else {
                        (param, Segment::Param)
                    };
                    if name.is_empty() {
                        return Err(MatcherError::EmptyParameter(pattern.to_string()));
                    }
                    segment
                }
                None => Segment::Literal(part.to_string()),
            };

            let repeating = matches!(segment, Segment::ZeroOrMore | Segment::OneOrMore);
            if repeating && index + 1 != raw.len() {
                return Err(MatcherError::RepeatNotLast(pattern.to_string()));
            }
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::ZeroOrMore => return true,
                Segment::OneOrMore => return parts.len() > index,
                Segment::Param => {
                    if parts.get(index).is_none() {
                        return false;
                    }
                }
                Segment::Literal(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return false;
                    }
                }
            }
        }

        parts.len() == self.segments.len()
    }
}

impl FromStr for RoutePattern {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The set of paths the access middleware runs for. Anything else is served
/// without consulting the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatcher {
    patterns: Vec<RoutePattern>,
}

impl RouteMatcher {
    pub fn new(patterns: Vec<RoutePattern>) -> Self {
        Self { patterns }
    }

    pub fn parse<I, S>(patterns: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .map(|p| RoutePattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    pub fn patterns(&self) -> &[RoutePattern] {
        &self.patterns
    }
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self::parse(DEFAULT_PATTERNS).unwrap_or_else(|_| Self::new(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matcher_scope() {
        let matcher = RouteMatcher::default();
        assert_eq!(matcher.patterns().len(), 3);

        assert!(matcher.matches("/"));
        assert!(matcher.matches("/dashboard"));
        assert!(matcher.matches("/dashboard/"));
        assert!(matcher.matches("/dashboard/settings/profile"));
        assert!(matcher.matches("/auth"));
        assert!(matcher.matches("/auth/login"));
        assert!(matcher.matches("/auth/verify-email"));

        assert!(!matcher.matches("/api/data"));
        assert!(!matcher.matches("/api/data/1"));
        assert!(!matcher.matches("/health"));
        assert!(!matcher.matches("/dashboards"));
        assert!(!matcher.matches("/authx/login"));
        assert!(!matcher.matches("/about"));
    }

    #[test]
    fn single_and_one_or_more_params() {
        let single = RoutePattern::parse("/users/:id").unwrap();
        assert!(single.matches("/users/7"));
        assert!(!single.matches("/users"));
        assert!(!single.matches("/users/7/edit"));

        let plus = RoutePattern::parse("/files/:path+").unwrap();
        assert!(!plus.matches("/files"));
        assert!(plus.matches("/files/a"));
        assert!(plus.matches("/files/a/b"));
    }

    #[test]
    fn invalid_patterns() {
        assert_eq!(
            RoutePattern::parse("dashboard"),
            Err(MatcherError::MissingLeadingSlash("dashboard".into()))
        );
        assert_eq!(
            RoutePattern::parse("/a/:rest*/b"),
            Err(MatcherError::RepeatNotLast("/a/:rest*/b".into()))
        );
        assert_eq!(
            RoutePattern::parse("/a/:"),
            Err(MatcherError::EmptyParameter("/a/:".into()))
        );
    }

    #[test]
    fn display_round_trips_source() {
        let pattern: RoutePattern = "/auth/:path*".parse().unwrap();
        assert_eq!(pattern.to_string(), "/auth/:path*");
        assert_eq!(pattern.as_str(), "/auth/:path*");
    }
}
