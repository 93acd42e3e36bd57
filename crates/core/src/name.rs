//! Hierarchical key names
//!
//! A key name is an ordered sequence of segments. The first segment is the
//! root marker: the empty string for cascading (namespace-less) names, or
//! the namespace name (`spec`, `proc`, `dir`, `user`, `system`).
//!
//! ## Wire form
//!
//! ```text
//! /key_test/1/key_name        cascading: ["", "key_test", "1", "key_name"]
//! user/app/colour             namespaced: ["user", "app", "colour"]
//! /a/b\/c                     ["", "a", "b/c"]
//! ```
//!
//! ## Escaping
//!
//! The escape character is `\`. Inside a segment `\/` is a literal
//! separator and `\\` a literal backslash. A whole segment `%` is the empty
//! segment; `\%`, `\.` and `\..` are the literal segments `%`, `.` and `..`.
//! Every other escape sequence is rejected.
//!
//! ## Canonicalization
//!
//! Repeated and trailing separators collapse, `.` segments are dropped and
//! `..` removes the preceding segment (never the root marker). The canonical
//! form re-parses to the same segments.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, NameError, Result};
use crate::limits::Limits;

/// Segment separator
pub const SEPARATOR: char = '/';

/// Escape character
pub const ESCAPE: char = '\\';

/// Escaped form of the empty segment
pub const EMPTY_SEGMENT: &str = "%";

type Segments = SmallVec<[String; 8]>;

/// Root of a key name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Namespace-independent name, written with a leading `/`
    Cascading,
    /// `spec` namespace
    Spec,
    /// `proc` namespace
    Proc,
    /// `dir` namespace
    Dir,
    /// `user` namespace
    User,
    /// `system` namespace
    System,
}

impl Namespace {
    /// All namespaces, cascading first
    pub const ALL: [Namespace; 6] = [
        Namespace::Cascading,
        Namespace::Spec,
        Namespace::Proc,
        Namespace::Dir,
        Namespace::User,
        Namespace::System,
    ];

    /// Root marker segment for this namespace
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Cascading => "",
            Namespace::Spec => "spec",
            Namespace::Proc => "proc",
            Namespace::Dir => "dir",
            Namespace::User => "user",
            Namespace::System => "system",
        }
    }

    /// Resolve a root marker segment
    pub fn from_root(root: &str) -> Option<Namespace> {
        Namespace::ALL.into_iter().find(|ns| ns.as_str() == root)
    }

    /// Whether this is the cascading root
    pub fn is_cascading(&self) -> bool {
        matches!(self, Namespace::Cascading)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Cascading => write!(f, "/"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// A canonical hierarchical key name
///
/// Equality, hashing and ordering follow the segments. The ordering is the
/// key set order: segment-wise comparison of the unescaped segments, with a
/// strict prefix ordering first.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyName {
    segments: Segments,
    canonical: String,
}

impl KeyName {
    /// Parse a raw name using default limits
    ///
    /// # Examples
    ///
    /// ```
    /// use keytree_core::KeyName;
    ///
    /// let name = KeyName::parse("/key_test//1/./key_name/").unwrap();
    /// assert_eq!(name.as_str(), "/key_test/1/key_name");
    /// assert!(KeyName::parse("key_test/1").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<KeyName> {
        Self::parse_with_limits(raw, &Limits::default())
    }

    /// Parse a raw name with custom limits
    pub fn parse_with_limits(raw: &str, limits: &Limits) -> Result<KeyName> {
        let fail = |reason| Error::invalid_name(raw, reason);

        if raw.is_empty() {
            return Err(fail(NameError::Empty));
        }
        limits.validate_name_length(raw).map_err(fail)?;

        let (namespace, rest, offset) = split_root(raw).ok_or_else(|| fail(NameError::MissingRoot))?;
        let mut segments = Segments::new();
        segments.push(namespace.as_str().to_string());
        push_relative(&mut segments, rest, offset).map_err(fail)?;
        limits.validate_depth(segments.len()).map_err(fail)?;

        Ok(Self::from_parts(segments))
    }

    /// Build a name from unescaped segments, root marker first
    pub fn from_segments<I, S>(segments: I) -> Result<KeyName>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Segments = segments.into_iter().map(Into::into).collect();
        let root_ok = segments
            .first()
            .is_some_and(|root| Namespace::from_root(root).is_some());
        if !root_ok {
            let shown = segments.join("/");
            return Err(Error::invalid_name(shown, NameError::MissingRoot));
        }
        let name = Self::from_parts(segments);
        let limits = Limits::default();
        limits
            .validate_name_length(&name.canonical)
            .and_then(|_| limits.validate_depth(name.depth()))
            .map_err(|reason| Error::invalid_name(name.canonical.clone(), reason))?;
        Ok(name)
    }

    /// The cascading root `/`
    pub fn cascading_root() -> KeyName {
        Self::namespace_root(Namespace::Cascading)
    }

    /// The root name of a namespace
    pub fn namespace_root(namespace: Namespace) -> KeyName {
        let mut segments = Segments::new();
        segments.push(namespace.as_str().to_string());
        Self::from_parts(segments)
    }

    fn from_parts(segments: Segments) -> KeyName {
        let canonical = render(&segments);
        KeyName {
            segments,
            canonical,
        }
    }

    /// Canonical escaped form
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Consume and return the canonical form
    pub fn into_string(self) -> String {
        self.canonical
    }

    /// Canonical length plus one terminator unit
    pub fn size(&self) -> usize {
        self.canonical.len() + 1
    }

    /// Namespace of this name
    pub fn namespace(&self) -> Namespace {
        // The root marker is validated on every construction path.
        Namespace::from_root(&self.segments[0]).unwrap_or(Namespace::Cascading)
    }

    /// Whether this name is cascading
    pub fn is_cascading(&self) -> bool {
        self.segments[0].is_empty()
    }

    /// Whether the name consists of the root marker only
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Number of segments, root marker included
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Unescaped segments, root marker first
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.segments.iter().map(String::as_str)
    }

    pub(crate) fn segment_slice(&self) -> &[String] {
        &self.segments
    }

    /// Unescaped last segment, or `""` for a root-only name
    pub fn base_name(&self) -> &str {
        if self.is_root() {
            ""
        } else {
            self.segments.last().map(String::as_str).unwrap_or("")
        }
    }

    /// Replace the last segment with `base`, taken literally
    ///
    /// Separator and escape characters in `base` become part of the
    /// segment. Fails on a root-only name; the name is unchanged on error.
    /// The result is checked against default limits; see
    /// [`KeyName::set_base_name_with_limits`].
    pub fn set_base_name(&mut self, base: &str) -> Result<()> {
        self.set_base_name_with_limits(base, &Limits::default())
    }

    /// [`KeyName::set_base_name`] with custom limits
    pub fn set_base_name_with_limits(&mut self, base: &str, limits: &Limits) -> Result<()> {
        if self.is_root() {
            return Err(Error::invalid_name(self.canonical.clone(), NameError::RootOnly));
        }
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            *last = base.to_string();
        }
        self.replace_checked(segments, limits)
    }

    /// Append the segments parsed from `relative`
    ///
    /// A multi-level argument adds one segment per level; the last one
    /// becomes the new base name. `.` and `..` are resolved as in
    /// [`KeyName::parse`]. The name is unchanged on error.
    ///
    /// A name parsed with [`KeyName::parse_with_limits`] does not remember
    /// its limits; use [`KeyName::add_base_name_with_limits`] to keep
    /// growing it under the same ones.
    pub fn add_base_name(&mut self, relative: &str) -> Result<()> {
        self.add_base_name_with_limits(relative, &Limits::default())
    }

    /// [`KeyName::add_base_name`] with custom limits
    pub fn add_base_name_with_limits(&mut self, relative: &str, limits: &Limits) -> Result<()> {
        let mut segments = self.segments.clone();
        push_relative(&mut segments, relative, 0)
            .map_err(|reason| Error::invalid_name(relative, reason))?;
        self.replace_checked(segments, limits)
    }

    fn replace_checked(&mut self, segments: Segments, limits: &Limits) -> Result<()> {
        let candidate = Self::from_parts(segments);
        limits
            .validate_name_length(&candidate.canonical)
            .and_then(|_| limits.validate_depth(candidate.depth()))
            .map_err(|reason| Error::invalid_name(candidate.canonical.clone(), reason))?;
        *self = candidate;
        Ok(())
    }
}

impl Ord for KeyName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.segments.iter().cmp(other.segments.iter())
    }
}

impl PartialOrd for KeyName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyName({:?})", self.canonical)
    }
}

impl AsRef<str> for KeyName {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

impl FromStr for KeyName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KeyName::parse(s)
    }
}

impl TryFrom<String> for KeyName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        KeyName::parse(&value)
    }
}

impl TryFrom<&str> for KeyName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        KeyName::parse(value)
    }
}

impl From<KeyName> for String {
    fn from(name: KeyName) -> Self {
        name.canonical
    }
}

impl IntoIterator for KeyName {
    type Item = String;
    type IntoIter = NameSegments;

    fn into_iter(self) -> NameSegments {
        NameSegments::new(self)
    }
}

/// Owning iterator over the unescaped segments of a name
///
/// Lazy and finite; [`NameSegments::restart`] walks the name again from the
/// root marker.
#[derive(Debug, Clone)]
pub struct NameSegments {
    name: KeyName,
    front: usize,
    back: usize,
}

impl NameSegments {
    fn new(name: KeyName) -> Self {
        let back = name.segments.len();
        NameSegments {
            name,
            front: 0,
            back,
        }
    }

    /// Reset to the root marker
    pub fn restart(&mut self) {
        self.front = 0;
        self.back = self.name.segments.len();
    }
}

impl Iterator for NameSegments {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.front >= self.back {
            return None;
        }
        let segment = self.name.segments[self.front].clone();
        self.front += 1;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for NameSegments {
    fn next_back(&mut self) -> Option<String> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.name.segments[self.back].clone())
    }
}

impl ExactSizeIterator for NameSegments {}

/// Parse a raw name into its unescaped segments, root marker first
pub fn parse(raw: &str) -> Result<Vec<String>> {
    Ok(KeyName::parse(raw)?.segments.into_vec())
}

/// Format unescaped segments (root marker first) into the canonical form
pub fn format<S: AsRef<str>>(segments: &[S]) -> Result<String> {
    KeyName::from_segments(segments.iter().map(|s| s.as_ref().to_string())).map(KeyName::into_string)
}

/// Escape a single segment so it can be embedded in a name
pub fn escape_segment(segment: &str) -> String {
    match segment {
        "" => return EMPTY_SEGMENT.to_string(),
        "%" | "." | ".." => return format!("{}{}", ESCAPE, segment),
        _ => {}
    }
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c == SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Unescape a single escaped segment
pub fn unescape_segment(escaped: &str) -> Result<String> {
    unescape_part(escaped, 0).map_err(|reason| Error::invalid_name(escaped, reason))
}

fn split_root(raw: &str) -> Option<(Namespace, &str, usize)> {
    if let Some(rest) = raw.strip_prefix(SEPARATOR) {
        return Some((Namespace::Cascading, rest, 1));
    }
    let (head, rest, offset) = match raw.find(SEPARATOR) {
        Some(i) => (&raw[..i], &raw[i + 1..], i + 1),
        None => (raw, "", raw.len()),
    };
    match Namespace::from_root(head) {
        Some(ns) if !ns.is_cascading() => Some((ns, rest, offset)),
        _ => None,
    }
}

fn push_relative(
    segments: &mut Segments,
    relative: &str,
    offset: usize,
) -> std::result::Result<(), NameError> {
    for (part, position) in split_parts(relative, offset)? {
        match part {
            "" | "." => {}
            ".." => {
                if segments.len() > 1 {
                    segments.pop();
                }
            }
            _ => segments.push(unescape_part(part, position)?),
        }
    }
    Ok(())
}

/// Split on unescaped separators, keeping each part's byte offset
fn split_parts(rest: &str, offset: usize) -> std::result::Result<Vec<(&str, usize)>, NameError> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            SEPARATOR => {
                parts.push((&rest[start..i], offset + start));
                start = i + 1;
            }
            _ => {}
        }
    }
    if escaped {
        return Err(NameError::DanglingEscape {
            position: offset + rest.len() - 1,
        });
    }
    parts.push((&rest[start..], offset + start));
    Ok(parts)
}

fn unescape_part(part: &str, position: usize) -> std::result::Result<String, NameError> {
    match part {
        EMPTY_SEGMENT => return Ok(String::new()),
        "\\%" => return Ok("%".to_string()),
        "\\." => return Ok(".".to_string()),
        "\\.." => return Ok("..".to_string()),
        _ => {}
    }
    let mut out = String::with_capacity(part.len());
    let mut chars = part.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, next @ (SEPARATOR | ESCAPE))) => out.push(next),
            Some(_) => {
                return Err(NameError::InvalidEscape {
                    position: position + i,
                })
            }
            None => {
                return Err(NameError::DanglingEscape {
                    position: position + i,
                })
            }
        }
    }
    Ok(out)
}

fn render(segments: &[String]) -> String {
    let mut out = String::new();
    let Some((root, rest)) = segments.split_first() else {
        return out;
    };
    if root.is_empty() {
        out.push(SEPARATOR);
    } else {
        out.push_str(root);
    }
    for (i, segment) in rest.iter().enumerate() {
        if i > 0 || !root.is_empty() {
            out.push(SEPARATOR);
        }
        out.push_str(&escape_segment(segment));
    }
    out
}
