//! Recover the failed recipient from a bounce body.
//!
//! Every mail platform words its bounces differently, so the patterns are
//! tried in order and the first one that matches exactly once wins. A
//! pattern matching several times is ambiguous and skipped.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::{trace, warn};

/// A vendor-specific way of spotting the recipient in a bounce body.
#[derive(Debug, Clone, Copy)]
pub struct AddressPattern {
    /// Platform the pattern was written for (for logs).
    pub name: &'static str,
    /// Regular expression with one capture group around the address.
    pub pattern: &'static str,
    /// `^` and `$` match at line boundaries.
    pub multi_line: bool,
}

/// Patterns in evaluation order.
pub const ADDRESS_PATTERNS: &[AddressPattern] = &[
    // "<bob@example.com>:" at the start of a line
    AddressPattern {
        name: "gmail",
        pattern: r"^<(.+)>:",
        multi_line: true,
    },
    // "<mailto:bob@example.com>" at the end of a line
    AddressPattern {
        name: "outlook",
        pattern: r"<mailto:(.+)>$",
        multi_line: true,
    },
];

static COMPILED: Lazy<Vec<(&'static AddressPattern, Regex)>> =
    Lazy::new(|| compile_patterns(ADDRESS_PATTERNS));

/// Compile a pattern table, dropping (and logging) any entry that fails to compile.
fn compile_patterns(
    patterns: &'static [AddressPattern],
) -> Vec<(&'static AddressPattern, Regex)> {
    patterns
        .iter()
        .filter_map(|p| {
            RegexBuilder::new(p.pattern)
                .multi_line(p.multi_line)
                .crlf(true)
                .build()
                .map(|re| (p, re))
                .map_err(|e| {
                    warn!(pattern = p.name, error = %e, "Invalid address pattern");
                })
                .ok()
        })
        .collect()
}

/// Extract the recipient address with the built-in pattern table.
pub fn extract_address(body: &str) -> Option<String> {
    extract_with(&COMPILED, body)
}

/// Extract the recipient address with an explicit, already compiled table.
///
/// Returns the capture of the first pattern that matches exactly once, or
/// `None` when each pattern matches zero or several times.
pub fn extract_with(patterns: &[(&AddressPattern, Regex)], body: &str) -> Option<String> {
    for (pattern, re) in patterns {
        let mut captures = re.captures_iter(body);
        let Some(first) = captures.next() else {
            continue;
        };
        if captures.next().is_some() {
            trace!(pattern = pattern.name, "Ambiguous address match, trying next pattern");
            continue;
        }
        if let Some(addr) = first.get(1) {
            trace!(pattern = pattern.name, address = addr.as_str(), "Recovered address");
            return Some(addr.as_str().to_string());
        }
    }
    None
}
