//! Syntactic sieve for candidate addresses.
//!
//! This is deliberately narrower than RFC 5322: DNS and SMTP are the real
//! arbiters, the pattern only filters out strings that cannot be addresses.

use std::sync::LazyLock;

use regex::Regex;

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("address pattern is a valid regex")
});

/// Local part and domain of an address that passed [`check_format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    local: String,
    domain: String,
}

impl ParsedAddress {
    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

/// Returns `true` when `address` matches the accepted grammar. Surrounding
/// whitespace is not trimmed and makes the address invalid.
pub fn check_format(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
}

/// Splits a well-formed address at its single `@`.
pub fn parse_address(address: &str) -> Option<ParsedAddress> {
    if !check_format(address) {
        return None;
    }
    let (local, domain) = address.split_once('@')?;
    Some(ParsedAddress {
        local: local.to_string(),
        domain: domain.to_string(),
    })
}
