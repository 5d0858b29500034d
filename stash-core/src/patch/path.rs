//! Key paths into a state tree.

use std::fmt;

use serde::{Serialize, Serializer};
use smallvec::SmallVec;

/// The sequence of object keys leading from the state root to a value.
///
/// Most state trees are shallow, so the segments live inline for up to
/// four levels. Displays (and serializes) as a JSON pointer, e.g. `/a/b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(SmallVec<[String; 4]>);

impl KeyPath {
    /// The empty path, pointing at the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Append a key segment.
    pub fn push(&mut self, key: impl Into<String>) {
        self.0.push(key.into());
    }

    /// Remove the last key segment.
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a JSON pointer usable with `serde_json::Value::pointer`.
    pub fn to_pointer(&self) -> String {
        self.to_string()
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            // RFC 6901 escaping
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_renders_empty() {
        assert_eq!(KeyPath::root().to_pointer(), "");
    }

    #[test]
    fn pointer_escapes_special_characters() {
        let path: KeyPath = ["a/b", "c~d"].into_iter().collect();
        assert_eq!(path.to_pointer(), "/a~1b/c~0d");
    }

    #[test]
    fn pointer_resolves_in_value() {
        let state = json!({"user": {"name/full": "Ada"}});
        let path: KeyPath = ["user", "name/full"].into_iter().collect();
        assert_eq!(state.pointer(&path.to_pointer()), Some(&json!("Ada")));
    }

    #[test]
    fn serializes_as_pointer_string() {
        let path: KeyPath = ["a", "b"].into_iter().collect();
        assert_eq!(serde_json::to_value(&path).unwrap(), json!("/a/b"));
    }
}
