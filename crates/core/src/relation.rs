//! Comparison and hierarchical relations between key names
//!
//! [`relation`] is the single source of truth. Every predicate below
//! is derived from it.

use std::cmp::Ordering;
use std::fmt;

use crate::name::KeyName;

/// Hierarchical relation of one name to another
///
/// The discriminants are the relation codes exchanged with hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Relation {
    /// Indirect ancestor (two or more levels up)
    Ancestor = -2,
    /// Direct parent
    DirectParent = -1,
    /// Same name
    Same = 0,
    /// Direct child
    DirectChild = 1,
    /// Indirect descendant (two or more levels down)
    Descendant = 2,
    /// Neither contains the other
    Unrelated = -3,
}

impl Relation {
    /// Integer relation code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Relation for a code, if the code is in the closed domain
    pub fn from_code(code: i32) -> Option<Relation> {
        match code {
            -3 => Some(Relation::Unrelated),
            -2 => Some(Relation::Ancestor),
            -1 => Some(Relation::DirectParent),
            0 => Some(Relation::Same),
            1 => Some(Relation::DirectChild),
            2 => Some(Relation::Descendant),
            _ => None,
        }
    }

    /// The relation seen from the other side
    pub fn inverse(self) -> Relation {
        match self {
            Relation::Ancestor => Relation::Descendant,
            Relation::DirectParent => Relation::DirectChild,
            Relation::Same => Relation::Same,
            Relation::DirectChild => Relation::DirectParent,
            Relation::Descendant => Relation::Ancestor,
            Relation::Unrelated => Relation::Unrelated,
        }
    }

    /// Whether the other name lies strictly below
    pub fn is_below(self) -> bool {
        matches!(self, Relation::DirectChild | Relation::Descendant)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Relation::Ancestor => "ancestor",
            Relation::DirectParent => "direct parent",
            Relation::Same => "same",
            Relation::DirectChild => "direct child",
            Relation::Descendant => "descendant",
            Relation::Unrelated => "unrelated",
        };
        f.write_str(label)
    }
}

/// Total order over names: `Less`, `Equal` or `Greater`
pub fn compare(a: &KeyName, b: &KeyName) -> Ordering {
    a.cmp(b)
}

/// Classify `b` relative to `a`
pub fn relation(a: &KeyName, b: &KeyName) -> Relation {
    let (a, b) = (a.segment_slice(), b.segment_slice());
    let shared = a.len().min(b.len());
    if a[..shared] != b[..shared] {
        return Relation::Unrelated;
    }
    match b.len() as isize - a.len() as isize {
        0 => Relation::Same,
        1 => Relation::DirectChild,
        d if d > 1 => Relation::Descendant,
        -1 => Relation::DirectParent,
        _ => Relation::Ancestor,
    }
}

/// `a` lies strictly inside `b`'s subtree
pub fn is_below(a: &KeyName, b: &KeyName) -> bool {
    relation(b, a).is_below()
}

/// `a` equals `b` or lies inside `b`'s subtree
pub fn is_below_or_same(a: &KeyName, b: &KeyName) -> bool {
    matches!(
        relation(b, a),
        Relation::Same | Relation::DirectChild | Relation::Descendant
    )
}

/// `a` lies exactly one level below `b`
pub fn is_direct_below(a: &KeyName, b: &KeyName) -> bool {
    relation(b, a) == Relation::DirectChild
}
