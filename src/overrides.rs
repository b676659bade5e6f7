//! Per-source path overrides.
//!
//! An ordered list of glob patterns, each mapping to a form or to
//! [`OverrideValue::Dismiss`]. The first pattern that matches wins; the
//! table is consulted before the registry fallback.
//!
//! Patterns are matched against the path relative to the scratch root,
//! anchored on the right: `201` matches `gold/201` and `*/201`, but not
//! `201-b`. `*` never crosses a `/`.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};

use crate::forms::{self, FormIdentity};
use crate::paths;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Target of an override rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideValue {
    Form(FormIdentity),
    /// Not a usable sprite; the file is deleted
    Dismiss,
}

/// Outcome of [`PathOverrideTable::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideLookup<'a> {
    Form(&'a FormIdentity),
    Dismiss,
    /// No rule matched, fall back to the registry
    Unresolved,
}

/// Registry lookup wrapped as an override target.
pub fn form(index: u32, name: &str) -> Result<OverrideValue> {
    Ok(OverrideValue::Form(forms::get_form(index, name)?))
}

pub fn normal(index: u32) -> Result<OverrideValue> {
    form(index, forms::NORMAL)
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    components: Vec<Pattern>,
    value: OverrideValue,
}

impl Rule {
    fn new(pattern: String, value: OverrideValue) -> Result<Self> {
        let components = pattern
            .split('/')
            .map(Pattern::new)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid override pattern: {}", pattern))?;
        Ok(Self {
            pattern,
            components,
            value,
        })
    }

    fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').collect();
        if self.components.len() > parts.len() {
            return false;
        }
        self.components
            .iter()
            .rev()
            .zip(parts.iter().rev())
            .all(|(pattern, part)| pattern.matches_with(part, MATCH_OPTIONS))
    }
}

/// Ordered override rules of one source.
#[derive(Debug, Clone, Default)]
pub struct PathOverrideTable {
    rules: Vec<Rule>,
}

impl PathOverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(pattern, value)` pairs in declaration order.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, OverrideValue)>,
        S: Into<String>,
    {
        Self::with_prefix("", entries)
    }

    /// Like [`from_entries`](Self::from_entries) with `prefix` prepended to
    /// every pattern.
    pub fn with_prefix<I, S>(prefix: &str, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, OverrideValue)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (pattern, value) in entries {
            table.insert(format!("{}{}", prefix, pattern.into()), value)?;
        }
        Ok(table)
    }

    /// Add a rule at the end, or replace the value of an identical
    /// pattern in place.
    pub fn insert(&mut self, pattern: impl Into<String>, value: OverrideValue) -> Result<()> {
        let pattern = pattern.into();
        if let Some(rule) = self.rules.iter_mut().find(|r| r.pattern == pattern) {
            rule.value = value;
        } else {
            self.rules.push(Rule::new(pattern, value)?);
        }
        Ok(())
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.rules.iter().any(|r| r.pattern == pattern)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve a slash-separated path relative to the scratch root.
    ///
    /// Each rule is tried against the full path, the path without its
    /// extension and that path without a trailing `-{frame}` segment, so
    /// `crystal-animated/201` still covers the split frame
    /// `crystal-animated/201-3.png`.
    pub fn lookup(&self, relative_path: &str) -> OverrideLookup<'_> {
        let candidates = lookup_candidates(relative_path);
        for rule in &self.rules {
            if candidates.iter().any(|c| rule.matches(c)) {
                return match &rule.value {
                    OverrideValue::Form(form) => OverrideLookup::Form(form),
                    OverrideValue::Dismiss => OverrideLookup::Dismiss,
                };
            }
        }
        OverrideLookup::Unresolved
    }
}

fn lookup_candidates(relative_path: &str) -> Vec<String> {
    let mut candidates = vec![relative_path.to_string()];

    let (dir, file_name) = match relative_path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, relative_path),
    };
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => return candidates,
    };
    let join = |stem: &str| match dir {
        Some(dir) => format!("{}/{}", dir, stem),
        None => stem.to_string(),
    };

    candidates.push(join(stem));
    if let Some((head, _)) = paths::split_frame_suffix(stem) {
        candidates.push(join(head));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_of(lookup: OverrideLookup<'_>) -> Option<String> {
        match lookup {
            OverrideLookup::Form(f) => Some(f.canonical_name()),
            _ => None,
        }
    }

    #[test]
    fn test_lookup_candidates() {
        assert_eq!(
            lookup_candidates("crystal-animated/201-3.png"),
            vec![
                "crystal-animated/201-3.png",
                "crystal-animated/201-3",
                "crystal-animated/201",
            ]
        );
        assert_eq!(lookup_candidates("icons/25.png"), vec!["icons/25.png", "icons/25"]);
        assert_eq!(lookup_candidates("egg"), vec!["egg"]);
    }

    #[test]
    fn test_right_anchored_match() -> Result<()> {
        let table = PathOverrideTable::from_entries([("201", form(201, "a")?)])?;
        assert_eq!(form_of(table.lookup("gold/201.png")).as_deref(), Some("201-a"));
        assert_eq!(table.lookup("gold/201-b.png"), OverrideLookup::Unresolved);
        assert_eq!(table.lookup("gold/1201.png"), OverrideLookup::Unresolved);
        Ok(())
    }

    #[test]
    fn test_star_does_not_cross_separator() -> Result<()> {
        let table = PathOverrideTable::from_entries([("icons/*", OverrideValue::Dismiss)])?;
        assert_eq!(table.lookup("icons/25.png"), OverrideLookup::Dismiss);
        assert_eq!(table.lookup("icons/female/25.png"), OverrideLookup::Unresolved);
        Ok(())
    }

    #[test]
    fn test_declaration_order_wins() -> Result<()> {
        let table = PathOverrideTable::from_entries([
            ("a/b/201", form(201, "u")?),
            ("a/*", OverrideValue::Dismiss),
        ])?;
        assert_eq!(form_of(table.lookup("a/b/201.png")).as_deref(), Some("201-u"));

        let reversed = PathOverrideTable::from_entries([
            ("b/*", OverrideValue::Dismiss),
            ("a/b/201", form(201, "u")?),
        ])?;
        assert_eq!(reversed.lookup("a/b/201.png"), OverrideLookup::Dismiss);
        Ok(())
    }

    #[test]
    fn test_dismiss_pattern_spares_normal() -> Result<()> {
        let table = PathOverrideTable::from_entries([("icons/493-*", OverrideValue::Dismiss)])?;
        assert_eq!(table.lookup("icons/493-bug.png"), OverrideLookup::Dismiss);
        assert_eq!(table.lookup("icons/493-water.png"), OverrideLookup::Dismiss);
        assert_eq!(table.lookup("icons/493.png"), OverrideLookup::Unresolved);
        Ok(())
    }

    #[test]
    fn test_frame_suffix_fallback() -> Result<()> {
        let table =
            PathOverrideTable::from_entries([("crystal-animated/201", form(201, "u")?)])?;
        assert_eq!(
            form_of(table.lookup("crystal-animated/201-0.png")).as_deref(),
            Some("201-u")
        );
        assert_eq!(table.lookup("crystal/201-0.png"), OverrideLookup::Unresolved);
        Ok(())
    }

    #[test]
    fn test_with_prefix_and_replace() -> Result<()> {
        let mut table = PathOverrideTable::with_prefix(
            "3d-battlers-animated/",
            [("710", normal(710)?), ("711", normal(711)?)],
        )?;
        table.insert("3d-battlers-animated/710", OverrideValue::Dismiss)?;

        assert_eq!(table.len(), 2);
        assert!(table.contains("3d-battlers-animated/711"));
        assert_eq!(
            table.lookup("3d-battlers-animated/710.png"),
            OverrideLookup::Dismiss
        );
        Ok(())
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PathOverrideTable::from_entries([("[", OverrideValue::Dismiss)]).is_err());
    }
}
