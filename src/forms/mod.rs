//! Entity/form registry.
//!
//! Maps every entity index to its ordered list of valid forms. The
//! registry is built once from [`table`] and is read-only afterwards.

mod table;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::DatasetError;
use crate::paths::{self, NAME_DELIMITER};

use table::Base;

pub const NORMAL: &str = "normal";
pub const FEMALE: &str = "female";
pub const MEGA: &str = "mega";
pub const MEGA_X: &str = "mega-x";
pub const MEGA_Y: &str = "mega-y";
pub const GIGANTAMAX: &str = "gigantamax";
pub const ALOLA: &str = "alola";
pub const GALAR: &str = "galar";
pub const HISUI: &str = "hisui";

/// One visual variant of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormIdentity {
    pub index: u32,
    pub name: String,
    /// Differs from the base form only by recolor
    pub color_only: bool,
}

impl FormIdentity {
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            color_only: false,
        }
    }

    pub fn normal(index: u32) -> Self {
        Self::new(index, NORMAL)
    }

    pub fn is_normal(&self) -> bool {
        self.name == NORMAL
    }

    /// Bare index for the normal form, `{index}-{name}` otherwise.
    pub fn canonical_name(&self) -> String {
        if self.is_normal() {
            self.index.to_string()
        } else {
            format!("{}{}{}", self.index, NAME_DELIMITER, self.name)
        }
    }
}

impl fmt::Display for FormIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// Ordered forms per entity index.
#[derive(Debug)]
pub struct Registry {
    forms: BTreeMap<u32, Vec<FormIdentity>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The built-in registry, built on first use.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::builtin)
}

/// Look up a form in the built-in registry.
///
/// Shorthand used by the source override tables.
pub fn get_form(index: u32, name: &str) -> Result<FormIdentity, DatasetError> {
    registry().lookup(index, name).cloned()
}

impl Registry {
    fn builtin() -> Self {
        let mut registry = Self::with_defaults(table::HIGHEST_INDEX);

        for &(index, base, names) in table::ENTRIES {
            registry.set_forms(index, base, names.iter().copied(), false);
        }
        for &(index, names) in table::COLOR_ONLY {
            registry.append_forms(index, names.iter().map(|n| n.to_string()), true);
        }

        let flavors = table::ALCREMIE_CREAMS.iter().flat_map(|cream| {
            table::ALCREMIE_SWEETS
                .iter()
                .map(move |sweet| format!("{}{}{}", cream, NAME_DELIMITER, sweet))
        });
        registry.append_forms(table::ALCREMIE_INDEX, flavors, true);

        registry
    }

    /// Registry where every index in `1..=highest` only has the normal form.
    pub fn with_defaults(highest: u32) -> Self {
        let forms = (1..=highest)
            .map(|index| (index, vec![FormIdentity::normal(index)]))
            .collect();
        Self { forms }
    }

    /// Replace the forms of `index`, inserting the normal form first unless
    /// the entry is marked no-normal.
    fn set_forms<'a>(
        &mut self,
        index: u32,
        base: Base,
        names: impl Iterator<Item = &'a str>,
        color_only: bool,
    ) {
        let mut forms = Vec::new();
        if base == Base::WithNormal {
            forms.push(FormIdentity::normal(index));
        }
        forms.extend(names.map(|name| FormIdentity {
            index,
            name: name.to_string(),
            color_only,
        }));
        self.forms.insert(index, forms);
    }

    fn append_forms(
        &mut self,
        index: u32,
        names: impl Iterator<Item = String>,
        color_only: bool,
    ) {
        let forms = self.forms.entry(index).or_default();
        forms.extend(names.map(|name| FormIdentity {
            index,
            name,
            color_only,
        }));
    }

    /// Forms of an entity in declaration order (empty for unknown indices).
    pub fn forms(&self, index: u32) -> &[FormIdentity] {
        self.forms.get(&index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.forms.contains_key(&index)
    }

    /// All forms, ordered by index then declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FormIdentity> {
        self.forms.values().flatten()
    }

    /// Find the form called `name`, if any.
    ///
    /// More than one match is an integrity error. Callers that have a
    /// fallback pass it via `unwrap_or` on the returned option.
    pub fn get(&self, index: u32, name: &str) -> Result<Option<&FormIdentity>, DatasetError> {
        let mut matches = self.forms(index).iter().filter(|f| f.name == name);
        let first = matches.next();
        let extra = matches.count();
        if extra > 0 {
            return Err(DatasetError::AmbiguousForm {
                name: format!("{}{}{}", index, NAME_DELIMITER, name),
                count: extra + 1,
            });
        }
        Ok(first)
    }

    /// Exactly one form called `name`, or an error.
    pub fn lookup(&self, index: u32, name: &str) -> Result<&FormIdentity, DatasetError> {
        self.get(index, name)?
            .ok_or_else(|| DatasetError::UnknownForm {
                index,
                form: name.to_string(),
            })
    }

    /// The single form whose canonical name equals `canonical`.
    ///
    /// `index` is passed separately because some sources spell the index
    /// differently in their file names (zero padding, other delimiters).
    pub fn by_canonical_name(
        &self,
        index: u32,
        canonical: &str,
    ) -> Result<&FormIdentity, DatasetError> {
        if !self.contains(index) {
            return Err(DatasetError::UnknownEntity(index));
        }
        let matches: Vec<_> = self
            .forms(index)
            .iter()
            .filter(|f| f.canonical_name() == canonical)
            .collect();
        match matches.as_slice() {
            [form] => Ok(form),
            _ => Err(DatasetError::AmbiguousForm {
                name: canonical.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Inverse of [`FormIdentity::canonical_name`].
    pub fn derive_form_from_canonical_name(
        &self,
        canonical: &str,
    ) -> Result<&FormIdentity, DatasetError> {
        let index = paths::parse_index(canonical).ok_or_else(|| DatasetError::AmbiguousForm {
            name: canonical.to_string(),
            count: 0,
        })?;
        self.by_canonical_name(index, canonical)
    }
}
