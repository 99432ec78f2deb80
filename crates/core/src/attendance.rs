//! Check-in/check-out state machine and attendance helpers.
//!
//! A student's presence is never stored directly. It is derived from the
//! attendance ledger: a student with an open record (null `exit_time`) is
//! [`Presence::Inside`], otherwise [`Presence::Outside`]. Each card scan
//! applies exactly one [`Transition`] computed by [`next_transition`].
//!
//! There is no debounce window: two scans of the same card a second apart
//! produce a check-in followed by a check-out.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted length of a card identifier.
pub const MAX_CARD_ID_LENGTH: usize = 64;

/// Maximum length of the free-text reason attached to an attendance edit.
pub const MAX_EDIT_REASON_LENGTH: usize = 500;

/// Status label for a record with an exit time.
pub const STATUS_COMPLETED: &str = "Completed";

/// Status label for an open record.
pub const STATUS_IN_PROGRESS: &str = "In Progress";

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Derived presence of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Outside,
    Inside,
}

impl Presence {
    /// Derive presence from the entry time of the student's open record, if any.
    pub fn from_open_entry(open_entry: Option<Timestamp>) -> Self {
        match open_entry {
            Some(_) => Presence::Inside,
            None => Presence::Outside,
        }
    }
}

/// The kind of transition a scan produced, as reported to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanAction {
    Checkin,
    Checkout,
}

impl ScanAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanAction::Checkin => "checkin",
            ScanAction::Checkout => "checkout",
        }
    }
}

/// An open attendance record, as far as the state machine is concerned.
pub trait OpenRecord {
    fn entry_time(&self) -> Timestamp;
}

impl OpenRecord for Timestamp {
    fn entry_time(&self) -> Timestamp {
        *self
    }
}

/// The single state change a scan applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<R> {
    /// OUTSIDE -> INSIDE: open a new record at `entry_time`.
    Open { entry_time: Timestamp },
    /// INSIDE -> OUTSIDE: close `record` at `exit_time`.
    Close { record: R, exit_time: Timestamp },
}

impl<R> Transition<R> {
    pub fn action(&self) -> ScanAction {
        match self {
            Transition::Open { .. } => ScanAction::Checkin,
            Transition::Close { .. } => ScanAction::Checkout,
        }
    }

    /// Presence after the transition has been applied.
    pub fn resulting_presence(&self) -> Presence {
        match self {
            Transition::Open { .. } => Presence::Inside,
            Transition::Close { .. } => Presence::Outside,
        }
    }
}

/// Decide the transition for a scan at `now`.
///
/// `open` is the student's most recent open record, if any.
pub fn next_transition<R: OpenRecord>(open: Option<R>, now: Timestamp) -> Transition<R> {
    match open {
        Some(record) => {
            let exit_time = checkout_time(record.entry_time(), now);
            Transition::Close { record, exit_time }
        }
        None => Transition::Open { entry_time: now },
    }
}

/// Exit time for closing a record opened at `entry_time`.
///
/// Never earlier than the entry time, even if the clock moved backwards.
pub fn checkout_time(entry_time: Timestamp, now: Timestamp) -> Timestamp {
    now.max(entry_time)
}

// ---------------------------------------------------------------------------
// Record helpers
// ---------------------------------------------------------------------------

/// Human-readable status of a record.
pub fn status_label(exit_time: Option<Timestamp>) -> &'static str {
    if exit_time.is_some() {
        STATUS_COMPLETED
    } else {
        STATUS_IN_PROGRESS
    }
}

/// Whole minutes spent inside; open records are measured up to `now`.
pub fn duration_minutes(entry_time: Timestamp, exit_time: Option<Timestamp>, now: Timestamp) -> i64 {
    let end = exit_time.unwrap_or(now);
    (end - entry_time).num_minutes().max(0)
}

/// Trim and validate a raw card identifier from a reader.
pub fn normalize_card_id(raw: &str) -> Result<String, CoreError> {
    let card_id = raw.trim();
    if card_id.is_empty() {
        return Err(CoreError::Validation("Missing card ID".into()));
    }
    if card_id.chars().count() > MAX_CARD_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "Card ID must be at most {MAX_CARD_ID_LENGTH} characters"
        )));
    }
    if card_id.chars().any(char::is_control) {
        return Err(CoreError::Validation(
            "Card ID contains invalid characters".into(),
        ));
    }
    Ok(card_id.to_string())
}

/// Validate a teacher edit of a record's timestamps.
pub fn validate_edit(
    entry_time: Timestamp,
    exit_time: Option<Timestamp>,
    reason: &str,
) -> Result<(), CoreError> {
    if let Some(exit) = exit_time {
        if exit < entry_time {
            return Err(CoreError::Validation(
                "Exit time cannot be earlier than entry time".into(),
            ));
        }
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(CoreError::Validation("An edit reason is required".into()));
    }
    if reason.chars().count() > MAX_EDIT_REASON_LENGTH {
        return Err(CoreError::Validation(format!(
            "Edit reason must be at most {MAX_EDIT_REASON_LENGTH} characters"
        )));
    }
    Ok(())
}
