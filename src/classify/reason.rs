//! Map bounce body text to a [`FailureReason`].

use crate::model::bounce::FailureReason;

/// Trigger substrings for one reason. Matching is case-sensitive.
#[derive(Debug, Clone, Copy)]
pub struct ReasonRule {
    pub triggers: &'static [&'static str],
    pub reason: FailureReason,
}

impl ReasonRule {
    /// Whether the body contains any trigger.
    pub fn matches(&self, body: &str) -> bool {
        self.triggers.iter().any(|t| body.contains(t))
    }
}

/// Rules in precedence order; the first rule with a matching trigger wins.
pub const REASON_RULES: &[ReasonRule] = &[
    ReasonRule {
        triggers: &[
            "NoSuchUser",
            "mailbox not found",
            "User unknown",
            "user does not exist",
        ],
        reason: FailureReason::MailboxNotFound,
    },
    ReasonRule {
        triggers: &["over quota", "mailbox for user is full"],
        reason: FailureReason::MailboxOverQuota,
    },
    ReasonRule {
        triggers: &["DisabledUser", "mailbox is disabled"],
        reason: FailureReason::MailboxDisabled,
    },
    ReasonRule {
        triggers: &["Host or domain name"],
        reason: FailureReason::DomainNotFound,
    },
    ReasonRule {
        // S2017062302: Yahoo/AOL's code for a generic permanent failure
        triggers: &["S2017062302", "mailbox unavailable"],
        reason: FailureReason::MailboxUnavailableGeneric,
    },
];

/// Classify a body with the built-in rule table.
pub fn classify_reason(body: &str) -> FailureReason {
    classify_with(REASON_RULES, body)
}

/// Classify a body with an explicit rule table; `Unknown` when nothing matches.
pub fn classify_with(rules: &[ReasonRule], body: &str) -> FailureReason {
    rules
        .iter()
        .find(|rule| rule.matches(body))
        .map(|rule| rule.reason)
        .unwrap_or(FailureReason::Unknown)
}
