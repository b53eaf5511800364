//! Target URL validation: syntactic checks, SSRF guards, and spam rules.
//!
//! The spam checks are an ordered rule table; a URL is rejected by the first
//! matching rule. New rules are appended to [`SPAM_RULES`] without touching
//! existing ones.

use std::collections::HashSet;

use serde_json::json;
use url::{Host, Url};

use crate::error::AppError;
use crate::utils::net::is_private_ip;

/// Maximum accepted URL length in characters.
const MAX_URL_LENGTH: usize = 2048;

/// Hostname labels beyond this depth are treated as a spam signature.
const MAX_SUBDOMAIN_DEPTH: usize = 6;

/// Well-known URL shorteners; shortening an already-shortened URL is
/// rejected to prevent redirect chains.
const KNOWN_SHORTENERS: &[&str] = &[
    "bit.ly", "tinyurl.com", "t.co", "goo.gl", "is.gd", "ow.ly", "buff.ly", "rebrand.ly", "rb.gy",
    "cutt.ly",
];

/// Substrings that flag a URL as spam regardless of host.
const SPAM_KEYWORDS: &[&str] = &[
    "casino",
    "gambling",
    "viagra",
    "cialis",
    "lottery-prize",
    "free-money",
    "earn-money",
    "click-here",
];

/// Blocklist of target hosts, merged from configuration and the
/// `host_blacklist` table at startup. Read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct Blacklist {
    hosts: HashSet<String>,
}

impl Blacklist {
    pub fn new(hosts: impl IntoIterator<Item = String>) -> Self {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Matches a host exactly or as a subdomain of a blocked entry.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();

        if self.hosts.contains(&host) {
            return true;
        }

        self.hosts
            .iter()
            .any(|blocked| host.ends_with(&format!(".{}", blocked)))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

struct SpamRule {
    name: &'static str,
    matches: fn(&Url, &Blacklist) -> bool,
}

/// Ordered spam rule table; the first match rejects the URL.
const SPAM_RULES: &[SpamRule] = &[
    SpamRule {
        name: "blacklisted host",
        matches: rule_blacklisted_host,
    },
    SpamRule {
        name: "shortener chaining",
        matches: rule_shortener_chaining,
    },
    SpamRule {
        name: "excessive subdomain depth",
        matches: rule_subdomain_depth,
    },
    SpamRule {
        name: "spam keyword",
        matches: rule_spam_keyword,
    },
];

fn rule_blacklisted_host(url: &Url, blacklist: &Blacklist) -> bool {
    url.host_str().is_some_and(|host| blacklist.matches(host))
}

fn rule_shortener_chaining(url: &Url, _blacklist: &Blacklist) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        KNOWN_SHORTENERS
            .iter()
            .any(|s| host == *s || host.ends_with(&format!(".{}", s)))
    })
}

fn rule_subdomain_depth(url: &Url, _blacklist: &Blacklist) -> bool {
    matches!(url.host(), Some(Host::Domain(d)) if d.split('.').count() > MAX_SUBDOMAIN_DEPTH)
}

fn rule_spam_keyword(url: &Url, _blacklist: &Blacklist) -> bool {
    let lowered = url.as_str().to_ascii_lowercase();
    SPAM_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Validates a URL submitted for shortening.
///
/// # Checks, in order
///
/// 1. Length bound (2048 characters)
/// 2. Parses as an absolute HTTP/HTTPS URL with a host
/// 3. Host is not loopback, private, or link-local (open-redirect SSRF guard)
/// 4. Ordered spam rule table: blacklisted host, shortener chaining,
///    subdomain depth, spam keywords
///
/// # Errors
///
/// Returns [`AppError::Validation`] with a reason for the first failing check.
pub fn validate_target_url(input: &str, blacklist: &Blacklist) -> Result<Url, AppError> {
    if input.is_empty() {
        return Err(AppError::bad_request("URL cannot be empty", json!({})));
    }

    if input.len() > MAX_URL_LENGTH {
        return Err(AppError::bad_request(
            "URL is too long",
            json!({ "max_length": MAX_URL_LENGTH, "provided_length": input.len() }),
        ));
    }

    let url = Url::parse(input)
        .map_err(|e| AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() })))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "Only HTTP and HTTPS URLs are allowed",
            json!({ "scheme": url.scheme() }),
        ));
    }

    match url.host() {
        None => {
            return Err(AppError::bad_request(
                "URL must have a host",
                json!({}),
            ));
        }
        Some(host) if is_internal_host(&host) => {
            return Err(AppError::bad_request(
                "Internal and private network URLs are not allowed",
                json!({ "host": host.to_string() }),
            ));
        }
        Some(_) => {}
    }

    for rule in SPAM_RULES {
        if (rule.matches)(&url, blacklist) {
            return Err(AppError::bad_request(
                "URL was rejected by spam filtering",
                json!({ "rule": rule.name }),
            ));
        }
    }

    Ok(url)
}

/// Returns true for hosts that resolve into the service's own network:
/// loopback/private/link-local addresses and local hostnames.
fn is_internal_host(host: &Host<&str>) -> bool {
    match host {
        Host::Ipv4(addr) => is_private_ip(&(*addr).into()),
        Host::Ipv6(addr) => is_private_ip(&(*addr).into()),
        Host::Domain(domain) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost"
                || domain.ends_with(".localhost")
                || domain.ends_with(".local")
                || domain.ends_with(".internal")
        }
    }
}
