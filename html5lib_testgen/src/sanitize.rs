//! Turns free-text test descriptions into unique Rust test function names.
//!
//! Descriptions in the html5lib suite read like `"Start tag w/ attribute"` or
//! `"<!DOCTYPE> with > in double-quoted public identifier"`. Each one goes
//! through a fixed replacement table (markup and punctuation become words), is
//! collapsed to `[a-z0-9_]`, and is finally made unique against the
//! [`NameRegistry`] of the document being generated.

use std::collections::HashMap;

use thiserror::Error;

/// Ordered literal replacements applied before anything else.
///
/// `w//` has to run before any single-character entry that could split it.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("w//", "_with_"),
    (" ", "_"),
    ("<", "_lt_"),
    (">", "_gt_"),
    ("-", "_hyphen_"),
    (",", "_comma_"),
    (".", "_dot_"),
    ("[", "_opn_bracket_"),
    ("]", "_cls_bracket_"),
    ("+", "_plus_"),
    ("&", "_amp_"),
    ("?", "_qmark_"),
    ("@", "_at_mark_"),
    ("=", "_equals_"),
    ("\"", "_dbl_quote_"),
    ("'", "_apos1_"),
    ("%", "_percent_"),
    ("`", "_apos2_"),
    ("!", "_excl_mark_"),
];

/// Prefix for names that would otherwise start with a digit.
pub const DIGIT_PREFIX: &str = "num_";

/// Marker placed between a base name and its collision counter.
pub const COLLISION_TAG: &str = "_gen_";

/// Errors raised while deriving a test name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    /// Nothing identifier-safe was left once punctuation was stripped.
    #[error("description {description:?} does not contain any identifier characters")]
    Empty { description: String },
}

/// Names handed out so far while generating one document.
///
/// Keys are issued identifiers; values count how many times a base name has
/// been requested beyond its first use. A registry must not outlive the
/// document it was created for.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    counters: HashMap<String, u32>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers issued so far.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.counters.contains_key(name)
    }

    /// Claim `base`, or the next free `<base>_gen_<n>` if `base` is taken.
    ///
    /// The counter always lives under `base`, so repeated collisions keep
    /// counting upwards. Suffixed names are registered as well; a suffixed
    /// candidate that was already issued (because some description literally
    /// sanitized to it) is skipped.
    pub fn claim(&mut self, base: String) -> String {
        let Some(&seen) = self.counters.get(&base) else {
            self.counters.insert(base.clone(), 0);
            return base;
        };

        let mut count = seen;
        loop {
            count += 1;
            let candidate = format!("{base}{COLLISION_TAG}{count}");
            if !self.counters.contains_key(&candidate) {
                self.counters.insert(base, count);
                self.counters.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}

/// Reduce a description to its base identifier, without consulting a registry.
///
/// # Errors
/// Returns [`SanitizeError::Empty`] when the description has no letters or digits.
pub fn base_identifier(description: &str) -> Result<String, SanitizeError> {
    let mut replaced = description.to_string();
    for (from, to) in REPLACEMENTS {
        if replaced.contains(from) {
            replaced = replaced.replace(from, to);
        }
    }

    let mut collapsed = String::with_capacity(replaced.len());
    let mut in_run = false;
    for ch in replaced.chars() {
        if ch.is_ascii_alphanumeric() {
            collapsed.push(ch.to_ascii_lowercase());
            in_run = false;
        } else if !in_run {
            collapsed.push('_');
            in_run = true;
        }
    }

    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        return Err(SanitizeError::Empty {
            description: description.to_string(),
        });
    }

    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        Ok(format!("{DIGIT_PREFIX}{trimmed}"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Derive a unique test name for `description` and record it in `registry`.
///
/// # Errors
/// Returns [`SanitizeError::Empty`] for descriptions with nothing usable in them.
/// The registry is left untouched in that case.
pub fn sanitize(description: &str, registry: &mut NameRegistry) -> Result<String, SanitizeError> {
    let base = base_identifier(description)?;
    Ok(registry.claim(base))
}

/// True if `name` matches `[a-z_][a-z0-9_]*`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
