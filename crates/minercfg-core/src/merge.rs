//! Fragment composition
//!
//! Most vendors receive aspect fragments with disjoint top-level keys, so a
//! flat [`union`] is enough. When two aspects write into the same nested table
//! (fan mode and temperature both live under `temp_control` for BOSminer) the
//! fragments go through [`merge`] instead.

use serde_json::Value;

use crate::fragment::Fragment;

/// Recursively union `b` into a copy of `a`
///
/// Keys whose values are objects on both sides are merged key by key. Any
/// other collision takes `b`'s value. Neither argument is modified.
pub fn merge(a: &Fragment, b: &Fragment) -> Fragment {
    let mut result = a.clone();
    for (key, b_val) in b {
        let merged = match (result.get(key), b_val) {
            (Some(Value::Object(a_obj)), Value::Object(b_obj)) => Value::Object(merge(a_obj, b_obj)),
            _ => b_val.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}

/// Flat top-level union; later fragments win on collision
pub fn union<I>(fragments: I) -> Fragment
where
    I: IntoIterator<Item = Fragment>,
{
    fragments.into_iter().fold(Fragment::new(), |mut acc, frag| {
        acc.extend(frag);
        acc
    })
}

/// Deep merge of a sequence of fragments, left to right
pub fn merge_all<I>(fragments: I) -> Fragment
where
    I: IntoIterator<Item = Fragment>,
{
    fragments
        .into_iter()
        .fold(Fragment::new(), |acc, frag| merge(&acc, &frag))
}
