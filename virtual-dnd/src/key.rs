use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::ResolveError;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type KeyMap<V> = HashMap<ItemKey, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<V> = BTreeMap<ItemKey, V>;

/// A stable identity for a list element.
///
/// Keys compare loosely: a string key equals an integer key when the string is the integer's
/// canonical decimal spelling, so `"3" == 3` while `"03" != 3`. `Hash` and `Ord` agree with this
/// equality, which keeps the relation transitive and makes `ItemKey` usable as a map key.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ItemKey {
    Int(i64),
    Str(String),
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Canonical<'a> {
    Int(i64),
    Str(&'a str),
}

impl ItemKey {
    fn canonical(&self) -> Canonical<'_> {
        match self {
            Self::Int(n) => Canonical::Int(*n),
            Self::Str(s) => match canonical_int(s) {
                Some(n) => Canonical::Int(n),
                None => Canonical::Str(s),
            },
        }
    }

    /// Returns the integer value of this key, including canonical integer strings.
    pub fn as_int(&self) -> Option<i64> {
        match self.canonical() {
            Canonical::Int(n) => Some(n),
            Canonical::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

/// Parses `s` only when it is the canonical decimal spelling of an `i64`.
fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if digits.len() != s.len() && digits == "0" {
        return None;
    }
    s.parse().ok()
}

impl PartialEq for ItemKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for ItemKey {}

impl Hash for ItemKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl PartialOrd for ItemKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ItemKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemKey {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ItemKey {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u32> for ItemKey {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<usize> for ItemKey {
    fn from(v: usize) -> Self {
        match i64::try_from(v) {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Str(v.to_string()),
        }
    }
}

impl From<&str> for ItemKey {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// A path from a list item to its key.
///
/// Parsed from dot/bracket notation (`a[0].b` is `["a", "0", "b"]`) or built from an explicit
/// list of property names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parses a dot/bracket path. Brackets are treated as dots; empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split(['.', '[', ']'])
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        Self { segments }
    }

    /// Builds a path from property names, used verbatim.
    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolves the key of `item`, or `None` when the path does not lead to a key.
    pub fn resolve<T: KeySource + ?Sized>(&self, item: &T) -> Option<ItemKey> {
        self.try_resolve(item).ok()
    }

    /// Like [`Self::resolve`], but reports where the walk failed.
    pub fn try_resolve<T: KeySource + ?Sized>(&self, item: &T) -> Result<ItemKey, ResolveError> {
        let (first, rest) = self.segments.split_first().ok_or(ResolveError::EmptyPath)?;
        let mut cur = item.child(first).ok_or_else(|| ResolveError::MissingSegment {
            segment: first.clone(),
            depth: 0,
        })?;
        for (i, segment) in rest.iter().enumerate() {
            cur = cur
                .child(segment)
                .ok_or_else(|| ResolveError::MissingSegment {
                    segment: segment.clone(),
                    depth: i + 1,
                })?;
        }
        cur.as_key().ok_or(ResolveError::NotAKey)
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for KeyPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&[&str]> for KeyPath {
    fn from(segments: &[&str]) -> Self {
        Self::from_segments(segments.iter().copied())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(s)?;
        }
        Ok(())
    }
}

/// Resolves the key of `item` along `path`.
///
/// A missing intermediate segment yields `None`; use [`KeyPath::try_resolve`] to learn why.
pub fn resolve<T: KeySource + ?Sized>(item: &T, path: &KeyPath) -> Option<ItemKey> {
    path.resolve(item)
}

/// A value that a [`KeyPath`] can walk.
///
/// Records expose their fields through [`KeySource::child`]; leaves that can act as a key
/// (strings, integers) return it from [`KeySource::as_key`].
///
/// ```
/// use virtual_dnd::{KeyPath, KeySource, ItemKey};
///
/// struct Row {
///     id: u32,
///     title: String,
/// }
///
/// impl KeySource for Row {
///     fn child(&self, segment: &str) -> Option<&dyn KeySource> {
///         match segment {
///             "id" => Some(&self.id),
///             "title" => Some(&self.title),
///             _ => None,
///         }
///     }
/// }
///
/// let row = Row { id: 7, title: "seven".into() };
/// assert_eq!(KeyPath::parse("id").resolve(&row), Some(ItemKey::Int(7)));
/// assert_eq!(KeyPath::parse("missing").resolve(&row), None);
/// ```
pub trait KeySource {
    fn child(&self, _segment: &str) -> Option<&dyn KeySource> {
        None
    }

    fn as_key(&self) -> Option<ItemKey> {
        None
    }
}

impl<T: KeySource + ?Sized> KeySource for &T {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        (**self).child(segment)
    }

    fn as_key(&self) -> Option<ItemKey> {
        (**self).as_key()
    }
}

impl<T: KeySource + ?Sized> KeySource for Box<T> {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        (**self).child(segment)
    }

    fn as_key(&self) -> Option<ItemKey> {
        (**self).as_key()
    }
}

impl<T: KeySource> KeySource for Option<T> {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        self.as_ref()?.child(segment)
    }

    fn as_key(&self) -> Option<ItemKey> {
        self.as_ref()?.as_key()
    }
}

impl KeySource for ItemKey {
    fn as_key(&self) -> Option<ItemKey> {
        Some(self.clone())
    }
}

impl KeySource for str {
    fn as_key(&self) -> Option<ItemKey> {
        Some(ItemKey::from(self))
    }
}

impl KeySource for String {
    fn as_key(&self) -> Option<ItemKey> {
        Some(ItemKey::Str(self.clone()))
    }
}

macro_rules! int_key_source {
    ($($t:ty),*) => {
        $(
            impl KeySource for $t {
                fn as_key(&self) -> Option<ItemKey> {
                    i64::try_from(*self).ok().map(ItemKey::Int)
                }
            }
        )*
    };
}

int_key_source!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: KeySource> KeySource for [T] {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        let index: usize = segment.parse().ok()?;
        self.get(index).map(|v| v as &dyn KeySource)
    }
}

impl<T: KeySource> KeySource for Vec<T> {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        self.as_slice().child(segment)
    }
}

#[cfg(feature = "std")]
impl<T: KeySource, S: core::hash::BuildHasher> KeySource for HashMap<String, T, S> {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        self.get(segment).map(|v| v as &dyn KeySource)
    }
}

impl<T: KeySource> KeySource for alloc::collections::BTreeMap<String, T> {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        self.get(segment).map(|v| v as &dyn KeySource)
    }
}

#[cfg(feature = "json")]
impl KeySource for serde_json::Value {
    fn child(&self, segment: &str) -> Option<&dyn KeySource> {
        match self {
            Self::Object(map) => map.get(segment).map(|v| v as &dyn KeySource),
            Self::Array(items) => items.as_slice().child(segment),
            _ => None,
        }
    }

    fn as_key(&self) -> Option<ItemKey> {
        match self {
            Self::String(s) => Some(ItemKey::Str(s.clone())),
            Self::Number(n) => n.as_i64().map(ItemKey::Int),
            _ => None,
        }
    }
}
