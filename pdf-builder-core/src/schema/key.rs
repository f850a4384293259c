//! Key derivation and uniquification
//!
//! Keys are derived from a component's label, placeholder or type and
//! camel-cased into identifier-safe form. Collisions against the whole form
//! are resolved by bumping a numeric suffix: `textField` becomes
//! `textField1`, `field9` becomes `field10`.

use super::ComponentNode;
use std::collections::HashSet;

/// Key used when nothing on the component yields an identifier
const FALLBACK_KEY: &str = "component";

/// Camel-case an arbitrary label: `"Text Field"` -> `"textField"`
///
/// Words are split on non-alphanumeric characters, lower-to-upper case
/// transitions, the end of an upper-case run followed by a lower-case
/// letter (`"XMLHttp"` -> `xml`, `http`) and letter/digit boundaries.
pub fn camel_case(input: &str) -> String {
    let words = split_words(input);
    let mut out = String::with_capacity(input.len());

    for (index, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    out
}

fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()))
                || (prev.is_numeric() != c.is_numeric());
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Initial key for a component: its label, else placeholder, else type
pub fn derive_key(node: &ComponentNode) -> String {
    [
        node.label.as_deref(),
        node.placeholder.as_deref(),
        Some(node.component_type.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(camel_case)
    .find(|key| !key.is_empty())
    .unwrap_or_else(|| FALLBACK_KEY.to_string())
}

/// Next candidate after `key`: increments a trailing number or appends `1`
pub fn iterate_key(key: &str) -> String {
    let stem = key.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &key[stem.len()..];

    match digits.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
        Some(next) => format!("{stem}{next}"),
        None => format!("{key}1"),
    }
}

/// First key derived from `base` that is not in `taken`
pub fn unique_key(taken: &HashSet<String>, base: &str) -> String {
    let mut key = base.to_string();
    while taken.contains(&key) {
        key = iterate_key(&key);
    }
    key
}

/// Make `node` and its descendants' keys unique against `taken`
///
/// Every key assigned is added to `taken`, so siblings inside `node` cannot
/// collide with each other either. Returns whether any key changed.
pub fn uniquify(taken: &mut HashSet<String>, node: &mut ComponentNode) -> bool {
    let mut changed = false;
    node.walk_mut(&mut |component| {
        if component.key.is_empty() {
            return;
        }
        let key = unique_key(taken, &component.key);
        if key != component.key {
            component.key = key.clone();
            changed = true;
        }
        taken.insert(key);
    });
    changed
}
