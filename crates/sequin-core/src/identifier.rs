//! Agent identifiers backed by a global string interner.
//!
//! Agent names are compared and hashed on every separation lookup, so they are
//! interned once and passed around as a copyable [`Id`].

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> &'static Mutex<DefaultStringInterner> {
    INTERNER.get_or_init(|| Mutex::new(DefaultStringInterner::new()))
}

/// Interned agent name.
///
/// # Examples
///
/// ```
/// use sequin_core::identifier::Id;
///
/// let alice = Id::new("Alice");
/// assert_eq!(alice, "Alice");
/// assert_eq!(alice, Id::new("Alice"));
/// assert_eq!(alice.to_string(), "Alice");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        let mut interner = interner()
            .lock()
            .expect("Failed to acquire interner lock");
        Self(interner.get_or_intern(name))
    }

    /// Returns the left boundary sentinel `[`.
    pub fn left_bound() -> Self {
        Self::new("[")
    }

    /// Returns the right boundary sentinel `]`.
    pub fn right_bound() -> Self {
        Self::new("]")
    }

    /// Returns `true` for the `[` and `]` sentinels.
    pub fn is_bound(self) -> bool {
        self == Self::left_bound() || self == Self::right_bound()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner()
            .lock()
            .expect("Failed to acquire interner lock");
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f.write_str(value)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        let interner = interner()
            .lock()
            .expect("Failed to acquire interner lock");
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_id() {
        assert_eq!(Id::new("Bob"), Id::new("Bob"));
        assert_ne!(Id::new("Bob"), Id::new("bob"));
    }

    #[test]
    fn test_display_round_trips_name() {
        let id = Id::new("agent with spaces");
        assert_eq!(id.to_string(), "agent with spaces");
    }

    #[test]
    fn test_bounds() {
        assert!(Id::new("[").is_bound());
        assert!(Id::new("]").is_bound());
        assert!(!Id::new("A").is_bound());
    }
}
