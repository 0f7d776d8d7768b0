//! Classification results.

use serde::Serialize;

/// Why a delivery failed, as far as the rule table can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FailureReason {
    MailboxNotFound,
    MailboxOverQuota,
    MailboxDisabled,
    DomainNotFound,
    MailboxUnavailableGeneric,
    Unknown,
}

impl FailureReason {
    /// Every category, in rule-table order with `Unknown` last.
    pub const ALL: [FailureReason; 6] = [
        Self::MailboxNotFound,
        Self::MailboxOverQuota,
        Self::MailboxDisabled,
        Self::DomainNotFound,
        Self::MailboxUnavailableGeneric,
        Self::Unknown,
    ];

    /// Human-readable label written to reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::MailboxNotFound => "Mailbox not found",
            Self::MailboxOverQuota => "Mailbox over quota",
            Self::MailboxDisabled => "Mailbox disabled",
            Self::DomainNotFound => "Domain doesn't exist",
            Self::MailboxUnavailableGeneric => "Mailbox unavailable (generic error)",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Context attached to records whose reason could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Labeled `SUBJECT`/`TO`/`FROM`/`DATE` block, one header per line.
    pub headers: String,
    /// The full decoded body text.
    pub body: String,
}

/// The classification of one bounce message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BounceRecord {
    /// Recipient the bounce refers to, when exactly one could be recovered.
    pub address: Option<String>,
    pub reason: FailureReason,
    /// Present only when `reason` is [`FailureReason::Unknown`].
    pub diagnostics: Option<Diagnostics>,
}

impl BounceRecord {
    /// A record for a recognized reason (no diagnostics).
    pub fn known(address: Option<String>, reason: FailureReason) -> Self {
        Self {
            address,
            reason,
            diagnostics: None,
        }
    }
}
