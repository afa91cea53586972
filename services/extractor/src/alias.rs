//! Canonical entity names.
//!
//! Source tables spell the same country several ways across years (historical
//! names, truncated labels, bilingual labels). Every spelling is normalized and
//! then looked up in a static alias table; anything not in the table passes
//! through unchanged.

use crate::text::normalize_text;
use std::collections::BTreeMap;

/// Known variant spellings, keyed by their cleaned uppercase form.
/// No canonical value may appear as a key, so resolution is a fixed point.
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("ZAMBIA(NORTHERN RHODESIA)", "ZAMBIA"),
    ("ZAMBIA (NORTHERN RHODESIA)", "ZAMBIA"),
    ("BOSNIA & HERZEGOVINA", "BOSNIA AND HERZEGOVINA"),
    ("SAINT VINCENT THE GRENADI", "SAINT VINCENT AND THE GRENADINES"),
    ("SOUTH AFRICA-ZUID AFRIKA", "SOUTH AFRICA"),
    ("LIBYA(LIBYAN ARAB JAMAHIR)", "LIBYA"),
    ("SLOVAKIA(SLOVAK REPUBLIC)", "SLOVAKIA"),
    ("YEMEN (YEMEN ARAB REPUBLIC)", "YEMEN"),
    ("CONGO, REPUBLIC OF.", "CONGO"),
    ("CONGO, REPUBLIC OF", "CONGO"),
    ("CONGO, THE DEMOCRATIC REPUBLIC", "CONGO"),
    ("CONGO, THE DEMOCRATIC REPUBLIC OF", "CONGO"),
];

/// Normalizes text, uppercases it and tidies stray spaces before commas.
fn clean_name(raw: &str) -> String {
    normalize_text(raw)
        .to_uppercase()
        .replace(" ,", ",")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a raw name against the built-in alias table.
pub fn normalize_country(raw: &str) -> String {
    let name = clean_name(raw);
    BUILTIN_ALIASES
        .iter()
        .find(|(variant, _)| *variant == name)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(name)
}

/// Alias lookup built from the static table plus optional configured entries.
#[derive(Debug, Clone)]
pub struct AliasTable {
    /// Ordered so chain collapsing visits keys the same way on every run
    entries: BTreeMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AliasTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN_ALIASES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { entries }
    }

    /// Adds extra entries on top of the built-in table. Keys and values are
    /// cleaned the same way lookups are. Chains (`A -> B`, `B -> C`) are
    /// collapsed so every key points at a value that is not itself a key.
    pub fn with_extra<I, K, V>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in extra {
            let key = clean_name(k.as_ref());
            let value = clean_name(v.as_ref());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            self.entries.insert(key, value);
        }
        self.collapse_chains();
        self
    }

    fn collapse_chains(&mut self) {
        let keys: Vec<String> = self.entries.keys().cloned().collect();
        for key in keys {
            let mut target = self.entries[&key].clone();
            // Bounded walk; a cycle resolves to wherever the walk stops.
            for _ in 0..self.entries.len() {
                match self.entries.get(&target) {
                    Some(next) if *next != target && *next != key => target = next.clone(),
                    _ => break,
                }
            }
            if target == key {
                self.entries.remove(&key);
            } else {
                self.entries.insert(key, target);
            }
        }
        // Break any remaining cycle by dropping keys whose value is also a key.
        let keys: Vec<String> = self.entries.keys().cloned().collect();
        for key in keys {
            if let Some(value) = self.entries.get(&key).cloned() {
                if self.entries.contains_key(&value) {
                    self.entries.remove(&key);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, raw: &str) -> String {
        let name = clean_name(raw);
        match self.entries.get(&name) {
            Some(canonical) => canonical.clone(),
            None => name,
        }
    }
}
