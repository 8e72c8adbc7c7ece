//! Path templating — pure string formatting from seed fields.
//!
//! `{name}` substitutes the seed field's textual rendering; `{uid}` expands
//! to a process-unique identifier so callers can mint fresh paths without
//! supplying one.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::MapError;
use crate::value::Value;

static UID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a process-unique identifier.
pub fn unique_id() -> String {
    let id = UID_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", std::process::id(), id)
}

/// Render a path template against seed fields.
///
/// A placeholder naming a field that is not in the seed is a content error.
pub fn render(template: &str, seed: &[(String, Value)]) -> Result<String, MapError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            MapError::Content(format!("unclosed placeholder in path template '{}'", template))
        })?;
        let name = &after[..close];
        if name == "uid" {
            out.push_str(&unique_id());
        } else {
            let value = seed
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v)
                .ok_or_else(|| {
                    MapError::Content(format!(
                        "path template placeholder '{{{}}}' has no seed field",
                        name
                    ))
                })?;
            out.push_str(&value.to_text());
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
