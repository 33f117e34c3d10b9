//! Interned diagram identifiers.
//!
//! D2 keys are compared constantly while compiling, ordering and laying out a
//! graph, so they are stored once in a process-wide interner and passed around
//! as the `Copy` handle [`Id`].

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Separator D2 uses between the segments of a nested key (`cloud.api.db`).
pub const KEY_SEPARATOR: char = '.';

static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Identifier of a diagram object.
///
/// # Examples
///
/// ```
/// use d2json_core::identifier::Id;
///
/// let cloud = Id::new("cloud");
/// let api = cloud.create_nested(Id::new("api"));
/// assert_eq!(api, "cloud.api");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates the identifier of `child_id` nested under this one, joined
    /// with [`KEY_SEPARATOR`].
    pub fn create_nested(&self, child_id: Id) -> Self {
        let mut interner = interner();
        let parent = interner.resolve(self.0).unwrap_or_default().to_owned();
        let child = interner.resolve(child_id.0).unwrap_or_default();
        let nested = format!("{parent}{KEY_SEPARATOR}{child}");
        Self(interner.get_or_intern(nested))
    }

    /// Runs `f` with the string this identifier stands for.
    ///
    /// Prefer this over `to_string()` on hot paths; it avoids an allocation.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        f(interner.resolve(self.0).unwrap_or_default())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
