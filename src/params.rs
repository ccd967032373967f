//! Parameter storage shared by URL segments, snapshots and query strings.
//!
//! Matrix and positional parameters are small ordered string maps; most
//! routes carry no more than a handful, so the storage is stack-allocated
//! up to [`MAX_INLINE_PARAMS`] entries.

use smallvec::SmallVec;
use std::slice;

/// Maximum number of parameters before heap allocation.
/// Most route trees bind ≤4 positional/matrix params per segment.
pub const MAX_INLINE_PARAMS: usize = 8;

/// An insertion-ordered string→string map used for matrix parameters,
/// positional parameters and merged route params.
///
/// `insert` replaces the value of an existing key in place, so a key
/// occurs at most once and iteration order is first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: SmallVec<[(String, String); MAX_INLINE_PARAMS]>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from literal pairs. Test and config convenience.
    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let mut map = Self::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }

    /// Insert a parameter, replacing the value if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> slice::Iter<'_, (String, String)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay `other` on top of `self` (later keys win).
    pub fn extend_from(&mut self, other: &ParamMap) {
        for (k, v) in other.iter() {
            self.insert(k.clone(), v.clone());
        }
    }

    /// A copy of `self` with `other` overlaid.
    #[must_use]
    pub fn merged_with(&self, other: &ParamMap) -> ParamMap {
        let mut res = self.clone();
        res.extend_from(other);
        res
    }
}

impl FromIterator<(String, String)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'a> IntoIterator for &'a ParamMap {
    type Item = &'a (String, String);
    type IntoIter = slice::Iter<'a, (String, String)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Key-set equality: same keys mapped to the same values, in any order.
///
/// Used by the scheduler to decide whether a reused route's `params`
/// stream must be pushed, and by the guard machinery to decide whether
/// guards re-run.
#[must_use]
pub fn params_shallow_eq(a: &ParamMap, b: &ParamMap) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v.as_str()))
}

/// A query parameter value: a single string, or an accumulated list when
/// the key was repeated in the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    List(Vec<String>),
}

impl QueryValue {
    /// The first (or only) value.
    #[must_use]
    pub fn first(&self) -> &str {
        match self {
            QueryValue::Single(v) => v,
            QueryValue::List(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values, in insertion order.
    #[must_use]
    pub fn all(&self) -> &[String] {
        match self {
            QueryValue::Single(v) => slice::from_ref(v),
            QueryValue::List(vs) => vs,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Single(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Single(v)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(vs: Vec<String>) -> Self {
        QueryValue::List(vs)
    }
}

/// Insertion-ordered query parameters. Repeated keys accumulate into a
/// [`QueryValue::List`] in the order the values appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: SmallVec<[(String, QueryValue); MAX_INLINE_PARAMS]>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K: Into<String>, V: Into<QueryValue>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let mut map = Self::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }

    /// Insert a value, replacing any existing value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Append a value: a fresh key stores a single value, a repeated key
    /// upgrades to a list. This is the parser's accumulation rule.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            let upgraded = match &mut slot.1 {
                QueryValue::Single(prev) => {
                    QueryValue::List(vec![std::mem::take(prev), value])
                }
                QueryValue::List(vs) => {
                    vs.push(value);
                    return;
                }
            };
            slot.1 = upgraded;
        } else {
            self.entries.push((key, QueryValue::Single(value)));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.first())
    }

    #[must_use]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.all())
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> slice::Iter<'_, (String, QueryValue)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of `self` with `other` shallow-merged on top.
    #[must_use]
    pub fn merged_with(&self, other: &QueryParams) -> QueryParams {
        let mut res = self.clone();
        for (k, v) in other.iter() {
            res.insert(k.clone(), v.clone());
        }
        res
    }
}

/// Key-set equality for query params, order-insensitive.
#[must_use]
pub fn query_shallow_eq(a: &QueryParams, b: &QueryParams) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(k, v)| b.iter().any(|(bk, bv)| bk == k && bv == v))
}

/// Static and resolved route data. Values are arbitrary JSON.
pub type Data = serde_json::Map<String, serde_json::Value>;

/// Key-set equality for route data.
#[must_use]
pub fn data_shallow_eq(a: &Data, b: &Data) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut p = ParamMap::new();
        p.insert("a", "1");
        p.insert("b", "2");
        p.insert("a", "3");
        assert_eq!(p.get("a"), Some("3"));
        assert_eq!(p.len(), 2);
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_shallow_eq_ignores_order() {
        let a = ParamMap::from_pairs([("x", "1"), ("y", "2")]);
        let b = ParamMap::from_pairs([("y", "2"), ("x", "1")]);
        assert!(params_shallow_eq(&a, &b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_query_append_accumulates() {
        let mut q = QueryParams::new();
        q.append("k", "1");
        assert_eq!(q.get_all("k"), Some(&["1".to_string()][..]));
        q.append("k", "2");
        assert_eq!(
            q.get_all("k"),
            Some(&["1".to_string(), "2".to_string()][..])
        );
        assert_eq!(q.get("k"), Some("1"));
    }

    #[test]
    fn test_query_merge_replaces_whole_value() {
        let a = QueryParams::from_pairs([("k", "1"), ("keep", "x")]);
        let mut b = QueryParams::new();
        b.insert("k", QueryValue::List(vec!["2".into(), "3".into()]));
        let merged = a.merged_with(&b);
        assert_eq!(merged.get_all("k").unwrap().len(), 2);
        assert_eq!(merged.get("keep"), Some("x"));
    }
}
