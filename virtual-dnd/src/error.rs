use alloc::string::String;

/// Why a [`crate::KeyPath`] failed to produce a key.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("key path is empty")]
    EmptyPath,
    #[error("key path segment `{segment}` (at depth {depth}) does not exist")]
    MissingSegment { segment: String, depth: usize },
    #[error("key path does not end at a string or integer value")]
    NotAKey,
}
