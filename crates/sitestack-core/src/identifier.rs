//! Resource names backed by a string interner.
//!
//! Every node in a stack graph is addressed by its local name. Names are
//! compared and hashed constantly during graph construction and emission, so
//! they are interned once and passed around as a `Copy` symbol.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for resource names.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Interned local name of a resource node.
///
/// # Examples
///
/// ```
/// use sitestack_core::identifier::Id;
///
/// let bucket = Id::new("static_website");
/// let same = Id::new("static_website");
///
/// assert_eq!(bucket, same);
/// assert_eq!(bucket, "static_website");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The local name of the resource
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns the name as an owned string.
    pub fn to_name(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_name())
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("static_website");
        let id2 = Id::new("static_website");
        let id3 = Id::new("website_oac");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "static_website");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("website_distribution");
        assert_eq!(format!("{}", id), "website_distribution");
        assert_eq!(id.to_name(), "website_distribution");
    }

    #[test]
    fn test_from_trait() {
        let id1: Id = "enable_versioning".into();
        let id2 = Id::new("enable_versioning");

        assert_eq!(id1, id2);
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Id::new("block");
        let id2 = Id::new("block");
        let id3 = Id::new("allow_cloudfront_only");

        let mut map = HashMap::new();
        map.insert(id1, "access block");
        map.insert(id3, "policy");

        assert_eq!(map.get(&id2), Some(&"access block"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("static_website_index");

        assert!(id == "static_website_index");
        assert!(id != "static_website");

        let name = String::from("static_website_index");
        assert!(id == name.as_str());
    }

    #[test]
    fn test_serialize_as_string() {
        let id = Id::new("caller_identity");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"caller_identity\"");
    }
}
