//! Origin whitelist and the allow/block decision.
//!
//! # Design Decisions
//! - Exact, case-sensitive string match; no wildcards or subdomain matching
//! - Requests without an `Origin` header are allowed (non-browser clients)
//! - Immutable after construction, shared via Arc without locking

use thiserror::Error;

use crate::config::loader::split_list;
use crate::observability::metrics;

/// Outcome of checking a request origin against the whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsDecision {
    Allowed,
    Blocked,
}

impl CorsDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, CorsDecision::Allowed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("origin whitelist is empty")]
pub struct EmptyWhitelist;

/// Ordered set of origins permitted to make cross-origin requests.
#[derive(Debug, Clone)]
pub struct Whitelist {
    origins: Vec<String>,
}

impl Whitelist {
    /// Build from individual entries. Entries are trimmed, blanks and
    /// duplicates dropped; at least one entry must remain.
    pub fn new<I, S>(origins: I) -> Result<Self, EmptyWhitelist>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for origin in origins {
            let origin = origin.as_ref().trim();
            if !origin.is_empty() && !unique.iter().any(|o| o == origin) {
                unique.push(origin.to_string());
            }
        }

        if unique.is_empty() {
            return Err(EmptyWhitelist);
        }
        Ok(Self { origins: unique })
    }

    /// Parse a comma-separated list such as the `WHITELIST` variable.
    pub fn parse(raw: &str) -> Result<Self, EmptyWhitelist> {
        Self::new(split_list(raw))
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    /// Decide whether a request with the given `Origin` may proceed.
    pub fn decide(&self, origin: Option<&str>) -> CorsDecision {
        match origin {
            None => CorsDecision::Allowed,
            Some(origin) if self.contains(origin) => CorsDecision::Allowed,
            Some(origin) => {
                tracing::warn!(origin = %origin, "Blocked request from non-whitelisted origin");
                metrics::record_cors_blocked();
                CorsDecision::Blocked
            }
        }
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> Whitelist {
        Whitelist::parse("https://shop.example, https://admin.shop.example").unwrap()
    }

    #[test]
    fn test_parse_trims_and_dedups() {
        let list = Whitelist::parse(" https://a.example ,https://b.example, https://a.example ,").unwrap();
        assert_eq!(list.origins(), &["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Whitelist::parse("").unwrap_err(), EmptyWhitelist);
        assert_eq!(Whitelist::parse(" , ,").unwrap_err(), EmptyWhitelist);
        assert!(Whitelist::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_absent_origin_allowed() {
        assert_eq!(shop().decide(None), CorsDecision::Allowed);
    }

    #[test]
    fn test_exact_match_allowed() {
        assert_eq!(shop().decide(Some("https://shop.example")), CorsDecision::Allowed);
        assert_eq!(shop().decide(Some("https://admin.shop.example")), CorsDecision::Allowed);
    }

    #[test]
    fn test_non_member_blocked() {
        let list = shop();
        assert_eq!(list.decide(Some("https://evil.example")), CorsDecision::Blocked);
        // No case folding, no subdomain or trailing-slash tolerance
        assert_eq!(list.decide(Some("https://SHOP.example")), CorsDecision::Blocked);
        assert_eq!(list.decide(Some("https://sub.shop.example")), CorsDecision::Blocked);
        assert_eq!(list.decide(Some("https://shop.example/")), CorsDecision::Blocked);
        assert_eq!(list.decide(Some("")), CorsDecision::Blocked);
    }
}
