//! Path String Manipulation
//!
//! [`PathString`] is a path plus a configurable directory marker
//! character. All operations are plain string manipulation; nothing
//! here touches the filesystem.

use core::fmt;

/// Result type for path string operations
pub type PathStringResult<T> = Result<T, PathStringError>;

/// Path string errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStringError {
    /// The directory marker may not be NUL
    NulMarker,
    /// Suffix removal is ambiguous when the marker itself is a dot
    MarkerIsDot,
}

impl fmt::Display for PathStringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStringError::NulMarker => write!(f, "directory marker may not be NUL"),
            PathStringError::MarkerIsDot => {
                write!(f, "cannot remove suffix when the directory marker is '.'")
            }
        }
    }
}

impl std::error::Error for PathStringError {}

/// A path with a configurable directory marker (default `/`).
#[derive(Debug, Clone)]
pub struct PathString {
    path: String,
    marker: char,
}

impl PathString {
    /// Create a path using `/` as the directory marker
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            marker: '/',
        }
    }

    /// Create a path with a custom directory marker. NUL is rejected.
    pub fn with_marker<S: Into<String>>(path: S, marker: char) -> PathStringResult<Self> {
        if marker == '\0' {
            return Err(PathStringError::NulMarker);
        }
        Ok(Self {
            path: path.into(),
            marker,
        })
    }

    /// The path text
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// The directory marker
    pub fn marker(&self) -> char {
        self.marker
    }

    /// True if the path is empty
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// True unless the path starts with the marker. Empty paths are
    /// relative.
    pub fn is_relative(&self) -> bool {
        !self.starts_with_marker()
    }

    /// True if the first character is the marker
    pub fn starts_with_marker(&self) -> bool {
        self.path.chars().next() == Some(self.marker)
    }

    /// True if the last character is the marker
    pub fn ends_with_marker(&self) -> bool {
        self.path.chars().next_back() == Some(self.marker)
    }

    /// Append a trailing marker if one is not already there. An empty
    /// path becomes just the marker.
    pub fn append_marker(&mut self) {
        if !self.ends_with_marker() {
            self.path.push(self.marker);
        }
    }

    /// Remove a trailing marker if present
    pub fn remove_trailing_marker(&mut self) {
        if self.ends_with_marker() {
            self.path.pop();
        }
    }

    /// Prepend a component, adding or collapsing the marker between the
    /// two pieces as needed
    pub fn prepend(&mut self, component: &str) {
        if component.is_empty() {
            return;
        }
        if self.path.is_empty() {
            self.path = component.to_string();
            return;
        }

        if component.chars().next_back() == Some(self.marker) {
            if self.starts_with_marker() {
                self.path.remove(0);
            }
        } else if !self.starts_with_marker() {
            self.path.insert(0, self.marker);
        }
        self.path = format!("{}{}", component, self.path);
    }

    /// Append a component, adding or collapsing the marker between the
    /// two pieces as needed
    pub fn push(&mut self, component: &str) {
        if component.is_empty() {
            return;
        }
        if self.path.is_empty() {
            self.path = component.to_string();
            return;
        }

        if component.chars().next() == Some(self.marker) && self.ends_with_marker() {
            self.remove_trailing_marker();
        } else if component.chars().next() != Some(self.marker) {
            self.append_marker();
        }
        self.path.push_str(component);
    }

    /// Add a suffix after a dot:
    /// `/A/Path` + `txt` -> `/A/Path.txt`, `/A/Path.` -> `/A/Path.txt`.
    /// An empty path becomes `.suffix`.
    pub fn add_suffix(&mut self, suffix: &str) {
        if self.path.is_empty() {
            self.path = format!(".{}", suffix);
            return;
        }
        if self.path.chars().next_back() != Some('.') {
            self.path.push('.');
        }
        self.path.push_str(suffix);
    }

    /// Remove the suffix after the last dot, but only when that dot
    /// sits inside the final component:
    /// `/A/Path.txt` -> `/A/Path`, `/A/Path.txt/B` -> unchanged.
    pub fn remove_suffix(&mut self) -> PathStringResult<()> {
        if self.marker == '.' {
            return Err(PathStringError::MarkerIsDot);
        }
        let Some(dot) = self.path.rfind('.') else {
            return Ok(());
        };
        // A marker after the last dot means the dot is not in the
        // final component.
        if self.path[dot..].contains(self.marker) {
            return Ok(());
        }
        self.path.truncate(dot);
        Ok(())
    }

    /// Path components, markers and empty pieces excluded
    pub fn components(&self) -> Vec<&str> {
        self.path
            .split(self.marker)
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Number of components
    pub fn component_count(&self) -> usize {
        self.components().len()
    }

    /// Component at `idx`, or `None` out of range
    pub fn component(&self, idx: usize) -> Option<&str> {
        self.components().get(idx).copied()
    }

    /// The final component, or `None` for an empty path
    pub fn last_component(&self) -> Option<&str> {
        self.components().last().copied()
    }

    /// Remove everything from the last marker onward, the marker
    /// included. Without a marker the path becomes empty.
    pub fn remove_last_component(&mut self) {
        if self.path.is_empty() {
            return;
        }
        match self.path.rfind(self.marker) {
            Some(idx) => self.path.truncate(idx),
            None => self.path.clear(),
        }
    }

    /// Change the marker and rewrite existing markers in the path to
    /// the new one. Characters already equal to the new marker are left
    /// alone: `A/B/C:3/D` with `:` -> `A:B:C:3:D`.
    pub fn convert_markers(&mut self, marker: char) {
        if marker == self.marker {
            return;
        }
        self.path = self
            .path
            .chars()
            .map(|c| if c == self.marker { marker } else { c })
            .collect();
        self.marker = marker;
    }

    /// Change the marker, swapping occurrences of the old and new
    /// markers: `A/B/C:3/D` with `:` -> `A:B:C/3:D`.
    pub fn swap_markers(&mut self, marker: char) {
        if marker == self.marker {
            return;
        }
        let old = self.marker;
        self.path = self
            .path
            .chars()
            .map(|c| {
                if c == old {
                    marker
                } else if c == marker {
                    old
                } else {
                    c
                }
            })
            .collect();
        self.marker = marker;
    }

    /// Change the marker without touching the path text
    pub fn set_marker(&mut self, marker: char) -> PathStringResult<()> {
        if marker == '\0' {
            return Err(PathStringError::NulMarker);
        }
        self.marker = marker;
        Ok(())
    }
}

impl fmt::Display for PathString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

// Comparison is by path text alone; the marker does not participate.
impl PartialEq for PathString {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for PathString {}

impl PartialOrd for PathString {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathString {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.path.cmp(&other.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers() {
        let mut p = PathString::new("/a/b");
        assert!(!p.is_relative());
        assert!(!p.ends_with_marker());
        p.append_marker();
        assert_eq!(p.as_str(), "/a/b/");
        p.append_marker();
        assert_eq!(p.as_str(), "/a/b/");
        p.remove_trailing_marker();
        assert_eq!(p.as_str(), "/a/b");

        let mut empty = PathString::new("");
        assert!(empty.is_relative());
        empty.append_marker();
        assert_eq!(empty.as_str(), "/");
    }

    #[test]
    fn nul_marker_rejected() {
        assert_eq!(
            PathString::with_marker("x", '\0').unwrap_err(),
            PathStringError::NulMarker
        );
    }

    #[test]
    fn push_collapses_markers() {
        let mut p = PathString::new("/a/");
        p.push("/b");
        assert_eq!(p.as_str(), "/a/b");

        let mut p = PathString::new("/a");
        p.push("b");
        assert_eq!(p.as_str(), "/a/b");

        let mut p = PathString::new("");
        p.push("b");
        assert_eq!(p.as_str(), "b");
    }

    #[test]
    fn prepend_collapses_markers() {
        let mut p = PathString::new("/b");
        p.prepend("a/");
        assert_eq!(p.as_str(), "a/b");

        let mut p = PathString::new("b");
        p.prepend("a");
        assert_eq!(p.as_str(), "a/b");
    }

    #[test]
    fn suffixes() {
        let mut p = PathString::new("/A/Path");
        p.add_suffix("txt");
        assert_eq!(p.as_str(), "/A/Path.txt");

        let mut p = PathString::new("/A/Path.");
        p.add_suffix("txt");
        assert_eq!(p.as_str(), "/A/Path.txt");

        let mut p = PathString::new("");
        p.add_suffix("txt");
        assert_eq!(p.as_str(), ".txt");

        let mut p = PathString::new("/A/Path.txt");
        p.remove_suffix().unwrap();
        assert_eq!(p.as_str(), "/A/Path");

        // Dot belongs to an earlier component, nothing to remove.
        let mut p = PathString::new("/A/Path.txt/B");
        p.remove_suffix().unwrap();
        assert_eq!(p.as_str(), "/A/Path.txt/B");

        let mut p = PathString::with_marker("a.b", '.').unwrap();
        assert_eq!(p.remove_suffix().unwrap_err(), PathStringError::MarkerIsDot);
    }

    #[test]
    fn components() {
        let p = PathString::new("/a/b/c");
        assert_eq!(p.components(), vec!["a", "b", "c"]);
        assert_eq!(p.component(1), Some("b"));
        assert_eq!(p.component(3), None);
        assert_eq!(p.last_component(), Some("c"));

        let mut p = PathString::new("/a/b/c");
        p.remove_last_component();
        assert_eq!(p.as_str(), "/a/b");

        let mut p = PathString::new("abc");
        p.remove_last_component();
        assert_eq!(p.as_str(), "");
    }

    #[test]
    fn marker_rewrites() {
        let mut p = PathString::new("A/B/C:s:3/D");
        p.convert_markers(':');
        assert_eq!(p.as_str(), "A:B:C:s:3:D");
        assert_eq!(p.marker(), ':');

        let mut p = PathString::new("A/B/C:s:3/D");
        p.swap_markers(':');
        assert_eq!(p.as_str(), "A:B:C/s/3:D");

        let mut p = PathString::new("A/B");
        p.set_marker(':').unwrap();
        assert_eq!(p.as_str(), "A/B");
        assert_eq!(p.marker(), ':');
    }

    #[test]
    fn ordering_is_by_path_text() {
        assert!(PathString::new("/a") < PathString::new("/b"));
        assert_eq!(PathString::new("/a"), PathString::new("/a"));
    }
}
