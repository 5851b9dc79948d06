//! Route Policy
//!
//! The single allow-list of routes reachable without a bearer token.
//! Both the request gate and the enablement guard consult the same value.
//!
//! Pattern segments:
//! - `literal` matches itself
//! - `*` or `{name}` matches exactly one non-empty segment
//! - `**` (last segment only) matches any remaining segments, including none

use axum::http::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
    Tail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// `None` matches every method
    method: Option<Method>,
    segments: Vec<Segment>,
}

impl RouteRule {
    pub fn new(method: Option<Method>, pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| match segment {
                "**" => Segment::Tail,
                "*" => Segment::Param,
                s if s.starts_with('{') && s.ends_with('}') => Segment::Param,
                s => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { method, segments }
    }

    pub fn get(pattern: &str) -> Self {
        Self::new(Some(Method::GET), pattern)
    }

    pub fn post(pattern: &str) -> Self {
        Self::new(Some(Method::POST), pattern)
    }

    pub fn any(pattern: &str) -> Self {
        Self::new(None, pattern)
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return false;
        }

        let mut parts = split_path(path);
        for segment in &self.segments {
            match segment {
                Segment::Tail => return true,
                Segment::Param => match parts.next() {
                    Some(part) if !part.is_empty() => {}
                    _ => return false,
                },
                Segment::Literal(literal) => match parts.next() {
                    Some(part) if part == literal => {}
                    _ => return false,
                },
            }
        }
        parts.next().is_none()
    }
}

/// Segments of an absolute path; a single trailing slash is ignored
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    (!trimmed.is_empty())
        .then(|| trimmed.split('/'))
        .into_iter()
        .flatten()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    public_routes: Vec<RouteRule>,
}

impl RoutePolicy {
    pub fn new(public_routes: Vec<RouteRule>) -> Self {
        Self { public_routes }
    }

    /// Every route requires a token
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// The club's unauthenticated routes
    pub fn club_default() -> Self {
        Self::new(vec![
            RouteRule::post("/api/auth/signup"),
            RouteRule::post("/api/auth/signin"),
            RouteRule::get("/api/countries/**"),
            RouteRule::get("/api/profiles/public/**"),
            RouteRule::post("/api/questions/one-time/{token}"),
            RouteRule::get("/api/members/{id}/lichess-auth"),
            RouteRule::post("/api/tournaments/{id}/participants"),
        ])
    }

    pub fn with_rule(mut self, rule: RouteRule) -> Self {
        self.public_routes.push(rule);
        self
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.public_routes
            .iter()
            .any(|rule| rule.matches(method, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_club_default_allows_listed_routes() {
        let policy = RoutePolicy::club_default();
        assert!(policy.is_public(&Method::POST, "/api/auth/signup"));
        assert!(policy.is_public(&Method::POST, "/api/auth/signin"));
        assert!(policy.is_public(&Method::GET, "/api/countries"));
        assert!(policy.is_public(&Method::GET, "/api/countries/ES/regions"));
        assert!(policy.is_public(&Method::GET, "/api/profiles/public/42"));
        assert!(policy.is_public(&Method::POST, "/api/questions/one-time/abc123"));
        assert!(policy.is_public(&Method::GET, "/api/members/7/lichess-auth"));
        assert!(policy.is_public(&Method::POST, "/api/tournaments/12/participants"));
    }

    #[test]
    fn test_method_restrictions() {
        let policy = RoutePolicy::club_default();
        assert!(!policy.is_public(&Method::GET, "/api/questions/one-time/abc123"));
        assert!(!policy.is_public(&Method::GET, "/api/auth/signin"));
        assert!(!policy.is_public(&Method::DELETE, "/api/countries/ES"));
        assert!(!policy.is_public(&Method::GET, "/api/tournaments/12/participants"));
    }

    #[test]
    fn test_everything_else_is_gated() {
        let policy = RoutePolicy::club_default();
        assert!(!policy.is_public(&Method::GET, "/api/auth/me"));
        assert!(!policy.is_public(&Method::GET, "/api/members"));
        assert!(!policy.is_public(&Method::GET, "/api/members/7"));
        assert!(!policy.is_public(&Method::GET, "/api/members/7/lichess-auth/extra"));
        assert!(!policy.is_public(&Method::GET, "/api/members//lichess-auth"));
        assert!(!policy.is_public(&Method::POST, "/api/questions/one-time"));
        assert!(!policy.is_public(&Method::POST, "/api/auth/signin/../../books"));
        assert!(!policy.is_public(&Method::GET, "/"));
    }

    #[test]
    fn test_trailing_slash() {
        let policy = RoutePolicy::club_default();
        assert!(policy.is_public(&Method::POST, "/api/auth/signin/"));
    }

    #[test]
    fn test_deny_all() {
        let policy = RoutePolicy::deny_all();
        assert!(!policy.is_public(&Method::POST, "/api/auth/signin"));
    }

    #[test]
    fn test_any_method_rule() {
        let policy = RoutePolicy::deny_all().with_rule(RouteRule::any("/health"));
        assert!(policy.is_public(&Method::GET, "/health"));
        assert!(policy.is_public(&Method::HEAD, "/health"));
        assert!(!policy.is_public(&Method::GET, "/healthz"));
    }
}
