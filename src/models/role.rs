//! Comment origin roles and their bitmask encoding.
//!
//! Every comment carries a [`CommentType`]: a set of atomic roles such as
//! `ISSUE`, `REVIEW` or `AUTHOR`. On the wire a type is written as the
//! atomic names joined with `_` (e.g. `PULL_AUTHOR`), and internally it is
//! the bitwise OR of each part's bit. Fixed relevance multipliers are keyed
//! by that combined value.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Separator between atomic role names in a compound role.
pub const ROLE_SEPARATOR: char = '_';

/// A single comment origin role.
///
/// Declaration order defines the bit assigned to each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AtomicRole {
    /// Posted on the issue itself.
    Issue,
    /// Posted on a linked pull request.
    Pull,
    /// Part of a pull request review.
    Review,
    /// The root specification (issue or pull request body).
    Specification,
    /// Written by the author of the issue or pull request.
    Author,
    /// Written by an assignee.
    Assignee,
    /// Written by a repository collaborator.
    Collaborator,
    /// Written by any other contributor.
    Contributor,
}

impl AtomicRole {
    /// The bit this role occupies in a [`CommentType`].
    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Encode a (possibly compound) role name into its bitmask.
///
/// Unknown atomic names contribute no bit, so `"ISSUE_BOGUS"` encodes the
/// same as `"ISSUE"` and a wholly unknown name encodes to `0`.
pub fn encode(role: &str) -> u32 {
    role.split(ROLE_SEPARATOR)
        .filter_map(|part| AtomicRole::from_str(part).ok())
        .fold(0, |acc, atomic| acc | atomic.bit())
}

/// Atomic names in `role` that [`encode`] silently ignores.
pub fn unknown_parts(role: &str) -> Vec<&str> {
    role.split(ROLE_SEPARATOR)
        .filter(|part| AtomicRole::from_str(part).is_err())
        .collect()
}

/// Set of atomic roles describing how a comment entered the thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentType(u32);

impl CommentType {
    /// Parse a compound role name. Never fails; see [`encode`].
    pub fn parse(role: &str) -> Self {
        Self(encode(role))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, role: AtomicRole) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Atomic roles present in this type, in declaration order.
    pub fn roles(self) -> impl Iterator<Item = AtomicRole> {
        AtomicRole::iter().filter(move |r| self.contains(*r))
    }
}

impl From<AtomicRole> for CommentType {
    fn from(role: AtomicRole) -> Self {
        Self(role.bit())
    }
}

impl BitOr for CommentType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<AtomicRole> for CommentType {
    type Output = Self;

    fn bitor(self, rhs: AtomicRole) -> Self {
        Self(self.0 | rhs.bit())
    }
}

impl BitOr for AtomicRole {
    type Output = CommentType;

    fn bitor(self, rhs: Self) -> CommentType {
        CommentType(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<AtomicRole> for CommentType {
    fn bitor_assign(&mut self, rhs: AtomicRole) {
        self.0 |= rhs.bit();
    }
}

impl fmt::Display for CommentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for role in self.roles() {
            if !first {
                write!(f, "{ROLE_SEPARATOR}")?;
            }
            f.write_str(role.name())?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for CommentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CommentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(CommentType::parse(&s))
    }
}
