//! Peering state machine values
//!
//! The controller reports `status.netPeeringState` as a free-form string.
//! Known values are classified here; anything else is kept verbatim.

use std::fmt;

/// Observed `netPeeringState`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetPeeringState {
    /// Request created, waiting for the accepter side
    PendingAcceptance,
    /// Routes established on both sides
    Active,
    /// Peering removed
    Deleted,
    /// Accepter declined
    Rejected,
    /// Controller gave up
    Failed,
    /// Request not accepted in time
    Expired,
    /// Any other (transient or unknown) value
    Other(String),
}

impl NetPeeringState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingAcceptance => "pending-acceptance",
            Self::Active => "active",
            Self::Deleted => "deleted",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
            Self::Expired => "expired",
            Self::Other(s) => s,
        }
    }

    /// States from which a peering never becomes active
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::Deleted | Self::Rejected | Self::Failed | Self::Expired
        )
    }
}

impl From<&str> for NetPeeringState {
    fn from(value: &str) -> Self {
        match value {
            "pending-acceptance" => Self::PendingAcceptance,
            "active" => Self::Active,
            "deleted" => Self::Deleted,
            "rejected" => Self::Rejected,
            "failed" => Self::Failed,
            "expired" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for NetPeeringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
