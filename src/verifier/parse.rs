//! Defensive parsing of provider responses
//!
//! A missing or malformed field degrades to zero/false with a warning. Only
//! a body that is not JSON at all fails the call.

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::ProfileSnapshot;

fn count_at(data: &Value, pointer: &str) -> u64 {
    match data.pointer(pointer) {
        Some(value) => match value.as_u64() {
            Some(n) => n,
            None => {
                warn!(field = pointer, value = %value, "Count is not a non-negative integer, using 0");
                0
            }
        },
        None => {
            warn!(field = pointer, "Count missing from profile, using 0");
            0
        }
    }
}

/// Scan `team_showcase` for an entry whose `fq_name` equals `team`.
///
/// Stops at the first match; entries that are not objects or lack a string
/// name are skipped.
pub fn has_showcase(data: &Value, team: &str) -> bool {
    let Some(entries) = data.get("team_showcase") else {
        warn!("team_showcase missing from profile");
        return false;
    };
    let Some(entries) = entries.as_array() else {
        warn!("team_showcase is not an array");
        return false;
    };

    entries.iter().any(|entry| {
        if !entry.is_object() {
            debug!(entry = %entry, "Skipping non-object showcase entry");
            return false;
        }
        match entry.get("fq_name").and_then(Value::as_str) {
            Some(name) => {
                debug!(found = name, want = team, "Showcase entry");
                name == team
            }
            None => {
                debug!("Skipping showcase entry without fq_name");
                false
            }
        }
    })
}

/// Build a snapshot from a profile card response.
pub fn profile_snapshot(data: &Value, showcase_team: &str) -> ProfileSnapshot {
    ProfileSnapshot {
        num_followers: count_at(data, "/follow_summary/followers"),
        num_following: count_at(data, "/follow_summary/following"),
        has_required_showcase: has_showcase(data, showcase_team),
    }
}

/// Count entries under `them.proofs_summary.all`.
///
/// `them` may be a single object or a list of them (first used).
pub fn proof_count(data: &Value) -> u64 {
    let them = match data.get("them") {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    match them
        .and_then(|t| t.pointer("/proofs_summary/all"))
        .and_then(Value::as_array)
    {
        Some(all) => all.len() as u64,
        None => {
            warn!("proofs_summary.all missing or not an array, using 0");
            0
        }
    }
}
