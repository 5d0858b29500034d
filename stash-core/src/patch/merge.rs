//! Deep-Patch Merge
//!
//! Merges a partial update into a state object in place.
//!
//! # Rules
//!
//! For every key of the partial:
//!
//! - if both the target value and the partial value are objects, the merge
//!   recurses into them;
//! - otherwise the partial value replaces the target value wholesale. This
//!   includes arrays: `[9]` merged over `[1, 2, 3]` yields `[9]`, there is
//!   no element-wise merging.
//!
//! Keys absent from the partial are left untouched. The partial itself is
//! never modified.
//!
//! # Depth
//!
//! JSON trees cannot contain cycles, but a pathological partial can still
//! nest deep enough to exhaust the stack. Callers that accept untrusted
//! input run [`check_depth`] first; the store does so before every patch,
//! which keeps a rejected patch from leaving the state half-merged.

use serde_json::{Map, Value};

use super::KeyPath;
use crate::error::{Result, StoreError};

/// Merge `partial` into `target`, returning `target` for chaining.
pub fn merge<'a>(
    target: &'a mut Map<String, Value>,
    partial: &Map<String, Value>,
) -> &'a mut Map<String, Value> {
    for (key, sub_patch) in partial {
        let merged = match (target.get_mut(key), sub_patch) {
            (Some(Value::Object(target_value)), Value::Object(sub_patch)) => {
                merge(target_value, sub_patch);
                true
            }
            _ => false,
        };
        if !merged {
            target.insert(key.clone(), sub_patch.clone());
        }
    }
    target
}

/// Merge like [`merge`], recording the path of every value overwritten.
///
/// Only leaves are recorded: a key whose object value was merged into is
/// not itself listed, its overwritten descendants are. Paths appear in the
/// partial's key order.
pub fn merge_tracked<'a>(
    target: &'a mut Map<String, Value>,
    partial: &Map<String, Value>,
    changed: &mut Vec<KeyPath>,
) -> &'a mut Map<String, Value> {
    let mut path = KeyPath::root();
    merge_at(target, partial, &mut path, changed);
    target
}

fn merge_at(
    target: &mut Map<String, Value>,
    partial: &Map<String, Value>,
    path: &mut KeyPath,
    changed: &mut Vec<KeyPath>,
) {
    for (key, sub_patch) in partial {
        path.push(key.as_str());
        let merged = match (target.get_mut(key), sub_patch) {
            (Some(Value::Object(target_value)), Value::Object(sub_patch)) => {
                merge_at(target_value, sub_patch, path, changed);
                true
            }
            _ => false,
        };
        if !merged {
            target.insert(key.clone(), sub_patch.clone());
            changed.push(path.clone());
        }
        path.pop();
    }
}

/// Object nesting depth of `partial`, counting `partial` itself as 1.
///
/// Measurement stops once `cap` is exceeded, so the walk is bounded even
/// for absurdly deep input.
pub fn depth(partial: &Map<String, Value>, cap: usize) -> usize {
    fn walk(map: &Map<String, Value>, level: usize, cap: usize) -> usize {
        if level > cap {
            return level;
        }
        map.values()
            .filter_map(Value::as_object)
            .map(|child| walk(child, level + 1, cap))
            .max()
            .unwrap_or(level)
    }
    walk(partial, 1, cap)
}

/// Reject `partial` if it nests objects more than `limit` levels deep.
pub fn check_depth(partial: &Map<String, Value>, limit: usize) -> Result<()> {
    let depth = depth(partial, limit);
    if depth > limit {
        return Err(StoreError::PatchTooDeep { depth, limit });
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
