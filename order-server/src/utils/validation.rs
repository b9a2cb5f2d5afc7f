//! Input validation helpers
//!
//! Centralized length limits and reason validation used by the mutation
//! path. Limits mirror what the dashboard enforces client-side; the server
//! is the authority.

use crate::engine::error::{EngineError, EngineResult};
use shared::order::modification::{MAX_REASON_NOTES_LEN, ModificationReason};

/// Actor IDs and other short identifiers
pub const MAX_ACTOR_ID_LEN: usize = 100;

/// Validate the reason/notes pair attached to a modification or cancellation
///
/// Notes are optional except for `other`, where free text is the only
/// explanation the audit trail will have.
pub fn validate_reason(
    reason: ModificationReason,
    notes: &Option<String>,
) -> EngineResult<()> {
    if let Some(text) = notes
        && text.len() > MAX_REASON_NOTES_LEN
    {
        return Err(EngineError::InvalidReason(format!(
            "reason notes too long ({} chars, max {MAX_REASON_NOTES_LEN})",
            text.len()
        )));
    }
    if reason == ModificationReason::Other {
        match notes {
            Some(text) if !text.trim().is_empty() => {}
            _ => {
                return Err(EngineError::InvalidReason(
                    "reason notes are required when reason is 'other'".to_string(),
                ));
            }
        }
    }
    Ok(())
}
