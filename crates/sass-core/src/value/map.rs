//! Sass maps: insertion-ordered `Value -> Value` associations. Keys use
//! the same structural equality as `==`, so `(1: a, 1.0: b)` has one entry.

use super::Value;

/// An insertion-ordered map. Stored as a `Vec` of pairs rather than a
/// hash map because [`Value`] keys compare by Sass equality (fuzzy number
/// equality, quote-insensitive strings), which does not map cleanly onto
/// `Hash`.
#[derive(Debug, Clone, Default)]
pub struct SassMap {
    entries: Vec<(Value, Value)>,
}

impl SassMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn has_key(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert or overwrite `key`'s value, preserving the original
    /// insertion position on overwrite (matching the teacher's general
    /// "assignment updates in place" convention for ordered structures).
    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    #[must_use]
    pub fn remove(&self, key: &Value) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        }
    }

    /// `map.merge()`: `other`'s entries overwrite `self`'s for shared
    /// keys; new keys from `other` are appended in `other`'s order.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (k, v) in &other.entries {
            result.insert(k.clone(), v.clone());
        }
        result
    }
}

impl PartialEq for SassMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k) == Some(v))
    }
}

impl FromIterator<(Value, Value)> for SassMap {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
