//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type used for element names, annotation
//! names, module names and component names.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner. The
/// interner only ever grows, so identifiers stay valid across rounds.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Efficient identifier type using string interning
///
/// # Examples
///
/// ```
/// use bindery_core::identifier::Id;
///
/// let module = Id::new("com.example.NetworkModule");
/// assert_eq!(module, "com.example.NetworkModule");
/// assert_eq!(module.simple_name(), "NetworkModule");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns the last `.`-separated segment of a qualified name.
    ///
    /// ```
    /// use bindery_core::identifier::Id;
    ///
    /// assert_eq!(Id::new("dagger.Lazy").simple_name(), "Lazy");
    /// assert_eq!(Id::new("Plain").simple_name(), "Plain");
    /// ```
    pub fn simple_name(&self) -> String {
        let interner = interner();
        let full = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        full.rsplit('.').next().unwrap_or(full).to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let str_value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{}", str_value)
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
        let interner = interner();
        let self_str = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        self_str == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("dagger.Module");
        let id2 = Id::new("dagger.Module");
        let id3 = Id::new("dagger.Provides");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "dagger.Module");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("com.example.AppComponent");
        assert_eq!(format!("{}", id), "com.example.AppComponent");
    }

    #[test]
    fn test_from_trait() {
        let id1: Id = "SingletonComponent".into();
        let id2 = Id::new("SingletonComponent");

        assert_eq!(id1, id2);
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(Id::new("a.b.C").simple_name(), "C");
        assert_eq!(Id::new("C").simple_name(), "C");
        assert_eq!(Id::new("").simple_name(), "");
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(Id::new("key1"), "value1");
        map.insert(Id::new("key2"), "value2");

        assert_eq!(map.get(&Id::new("key1")), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("dagger.Lazy");

        assert!(id == "dagger.Lazy");
        assert!(id != "Lazy");

        let name = String::from("dagger.Lazy");
        assert!(id == name.as_str());
    }
}
