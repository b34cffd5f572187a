#![forbid(unsafe_code)]

//! Typed key paths into the store's value tree.
//!
//! A [`Path`] is a sequence of [`PathSeg`] segments: string keys into
//! objects and numeric indices into arrays. Paths are built
//! programmatically (`Path::root().key("schema").key("nodes")`) or parsed
//! from dot-delimited strings (`"schema.nodes.n3"`), where a segment made
//! entirely of ASCII digits parses as an index.
//!
//! The typed representation replaces ad-hoc string concatenation at call
//! sites: a path is constructed once and cannot be malformed afterwards.

use std::fmt;

/// One step into the value tree: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSeg {
    /// Key into an object.
    Key(String),
    /// Index into an array.
    Index(usize),
}

impl fmt::Display for PathSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSeg::Key(k) => f.write_str(k),
            PathSeg::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSeg {
    fn from(s: &str) -> Self {
        PathSeg::Key(s.to_string())
    }
}

impl From<String> for PathSeg {
    fn from(s: String) -> Self {
        PathSeg::Key(s)
    }
}

impl From<usize> for PathSeg {
    fn from(i: usize) -> Self {
        PathSeg::Index(i)
    }
}

/// A key path into the store.
///
/// The empty path addresses the root value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segs: Vec<PathSeg>,
}

impl Path {
    /// The empty path (addresses the root value).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dot-delimited path string.
    ///
    /// The empty string parses as the root path. Segments consisting
    /// entirely of ASCII digits become [`PathSeg::Index`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        let segs = text
            .split('.')
            .map(|seg| {
                if !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()) {
                    seg.parse::<usize>().map_or_else(
                        |_| PathSeg::Key(seg.to_string()),
                        PathSeg::Index,
                    )
                } else {
                    PathSeg::Key(seg.to_string())
                }
            })
            .collect();
        Self { segs }
    }

    /// Append an object key segment (builder form).
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segs.push(PathSeg::Key(key.into()));
        self
    }

    /// Append an array index segment (builder form).
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.segs.push(PathSeg::Index(index));
        self
    }

    /// Append a segment in place.
    pub fn push(&mut self, seg: impl Into<PathSeg>) {
        self.segs.push(seg.into());
    }

    /// The segments of this path, root first.
    #[must_use]
    pub fn segments(&self) -> &[PathSeg] {
        &self.segs
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// True for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segs.is_empty()
    }

    /// True for the root path (standard naming alias).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// The path addressing this path's parent, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.segs.split_last()?;
        Some(Path {
            segs: rest.to_vec(),
        })
    }

    /// True if `self` is a prefix of `other` (including equality).
    #[must_use]
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.segs.len() >= self.segs.len() && other.segs[..self.segs.len()] == self.segs[..]
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::parse(text)
    }
}

impl FromIterator<PathSeg> for Path {
    fn from_iter<I: IntoIterator<Item = PathSeg>>(iter: I) -> Self {
        Path {
            segs: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
