//! Status registry: the single source of truth for entry lifecycle.
//!
//! Every entry stores a free-form status label; this module decides what
//! that label *means*: which lifecycle [`Phase`] the entry is in, which
//! follow-up status resolves it, and how it should be presented.
//!
//! ## Open-world tolerance
//!
//! The label set is not enforced. Labels written by older application
//! versions (or by hand) survive verbatim as [`Status::Unknown`] and
//! classify as pending with no follow-up. This is deliberate tolerant-input
//! policy, not an error path.
//!
//! ## Pairing rules
//!
//! The registry encodes which statuses pair as "opens with X, closes
//! with Y":
//!
//! | Status | Phase | Follow-up |
//! |---|---|---|
//! | Collected | pending | Given |
//! | Collected for Repairing | pending | Given |
//! | Standby Given | pending | Standby Collected |
//! | Standby Collected | closed | — |
//! | Given | closed | — |
//! | Delivered | closed | — |
//! | *anything else* | pending | — |

use serde::{Deserialize, Serialize};

/// Derived lifecycle bucket of an entry.
///
/// Phase is never stored; it is always computed from the stored status
/// label via [`Status::phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// The entry is open: a reciprocal action is still expected.
    Pending,
    /// The entry is resolved: nothing further is owed either way.
    Closed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Pending => write!(f, "pending"),
            Phase::Closed => write!(f, "closed"),
        }
    }
}

/// A status label drawn from the registry's key set.
///
/// Known labels get a dedicated variant; everything else is carried
/// verbatim in [`Status::Unknown`] so no data is lost round-tripping a
/// snapshot that predates (or postdates) this registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    /// Item collected from a party; returning it is still due.
    Collected,
    /// Item collected for repair; given back when the repair is done.
    CollectedForRepairing,
    /// Loaner item handed out; collecting it back is still due.
    StandbyGiven,
    /// Loaner item recovered.
    StandbyCollected,
    /// Item handed over; nothing further owed.
    Given,
    /// Item delivered (sale); nothing further owed.
    Delivered,
    /// Any label the registry does not recognize. Preserved verbatim.
    Unknown(String),
}

/// Classification record the registry returns for a status label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// Derived lifecycle phase
    pub phase: Phase,
    /// The status that resolves this one, if the registry defines a pair
    pub follow_up: Option<Status>,
    /// Short presentation hint for renderers
    pub display_hint: &'static str,
}

impl Status {
    /// The canonical labels, in the order a UI should offer them.
    pub const KNOWN: [Status; 6] = [
        Status::Collected,
        Status::CollectedForRepairing,
        Status::StandbyGiven,
        Status::StandbyCollected,
        Status::Given,
        Status::Delivered,
    ];

    /// Parse a label. Never fails: unrecognized labels become
    /// [`Status::Unknown`].
    pub fn parse(label: &str) -> Status {
        match label {
            "Collected" => Status::Collected,
            "Collected for Repairing" => Status::CollectedForRepairing,
            "Standby Given" => Status::StandbyGiven,
            "Standby Collected" => Status::StandbyCollected,
            "Given" => Status::Given,
            "Delivered" => Status::Delivered,
            other => Status::Unknown(other.to_string()),
        }
    }

    /// The human label, as stored in snapshots.
    pub fn label(&self) -> &str {
        match self {
            Status::Collected => "Collected",
            Status::CollectedForRepairing => "Collected for Repairing",
            Status::StandbyGiven => "Standby Given",
            Status::StandbyCollected => "Standby Collected",
            Status::Given => "Given",
            Status::Delivered => "Delivered",
            Status::Unknown(label) => label,
        }
    }

    /// Look up the classification record for this status.
    ///
    /// Unknown labels classify as pending with no follow-up (silent
    /// default; a debug event records the fallback).
    pub fn info(&self) -> StatusInfo {
        match self {
            Status::Collected => StatusInfo {
                phase: Phase::Pending,
                follow_up: Some(Status::Given),
                display_hint: "held from a party, return due",
            },
            Status::CollectedForRepairing => StatusInfo {
                phase: Phase::Pending,
                follow_up: Some(Status::Given),
                display_hint: "in for repair, hand back when done",
            },
            Status::StandbyGiven => StatusInfo {
                phase: Phase::Pending,
                follow_up: Some(Status::StandbyCollected),
                display_hint: "loaner out, collect it back",
            },
            Status::StandbyCollected => StatusInfo {
                phase: Phase::Closed,
                follow_up: None,
                display_hint: "loaner recovered",
            },
            Status::Given => StatusInfo {
                phase: Phase::Closed,
                follow_up: None,
                display_hint: "handed over",
            },
            Status::Delivered => StatusInfo {
                phase: Phase::Closed,
                follow_up: None,
                display_hint: "delivered",
            },
            Status::Unknown(label) => {
                tracing::debug!(label = %label, "unrecognized status, defaulting to pending");
                StatusInfo {
                    phase: Phase::Pending,
                    follow_up: None,
                    display_hint: "unrecognized status",
                }
            }
        }
    }

    /// Derived lifecycle phase. Shorthand for `self.info().phase`.
    pub fn phase(&self) -> Phase {
        self.info().phase
    }

    /// The status that resolves this one, if any.
    /// Shorthand for `self.info().follow_up`.
    pub fn follow_up(&self) -> Option<Status> {
        self.info().follow_up
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Status::parse(s))
    }
}

impl From<String> for Status {
    fn from(label: String) -> Self {
        Status::parse(&label)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.label().to_string()
    }
}
