//! Offset-anchored text markers.
//!
//! Markers are kept in a vector sorted by start offset together with a prefix maximum of their
//! end offsets. Since the prefix maximum is monotone, both ends of the candidate window of a
//! point or range query are found by binary search; the window is then filtered linearly.

use crate::change::DocumentChange;
use crate::error::{DocumentError, Result};
use crate::highlighting::Color;
use std::fmt;

/// Handle of a text marker. Handles are never reused within one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a marker is drawn by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkerKind {
    /// Not drawn (e.g. a pure read-only guard).
    #[default]
    Invisible,
    /// Solid background.
    SolidBlock,
    /// Straight underline.
    Underlined,
    /// Wavy underline (errors, warnings).
    WaveLine,
}

/// A styled or read-only annotation over `[offset, offset + length)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextMarker {
    /// Start offset.
    pub offset: usize,
    /// Length in characters.
    pub length: usize,
    /// Drawing style.
    pub kind: MarkerKind,
    /// Edits touching the marker are rejected by the document.
    pub read_only: bool,
    /// Marker color (background or underline).
    pub color: Option<Color>,
    /// Foreground color override.
    pub fore_color: Option<Color>,
    /// Tooltip text.
    pub tooltip: Option<String>,
    /// Text inserted exactly at the start joins the marker.
    pub grows_at_start: bool,
    /// Text inserted exactly at the end joins the marker.
    pub grows_at_end: bool,
}

impl TextMarker {
    /// A marker over `[offset, offset + length)`.
    pub fn new(offset: usize, length: usize, kind: MarkerKind) -> Self {
        Self {
            offset,
            length,
            kind,
            ..Self::default()
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Whether `offset` lies in `[start, end)`.
    pub fn contains(&self, offset: usize) -> bool {
        self.offset <= offset && offset < self.end()
    }

    /// Mark the range read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set the edge growth policy.
    pub fn growing(mut self, at_start: bool, at_end: bool) -> Self {
        self.grows_at_start = at_start;
        self.grows_at_end = at_end;
        self
    }
}

/// The marker collection of a document.
#[derive(Debug, Clone, Default)]
pub struct MarkerStrategy {
    markers: Vec<(MarkerId, TextMarker)>,
    /// `prefix_max_end[i] = max(markers[0..=i].end())`
    prefix_max_end: Vec<usize>,
    next_id: u64,
}

impl MarkerStrategy {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first marker among `markers[..before]` whose end can exceed `offset`.
    fn first_reaching(&self, before: usize, offset: usize) -> usize {
        self.prefix_max_end[..before].partition_point(|&end| end <= offset)
    }

    fn rebuild_prefix_max_end(&mut self) {
        let mut max_end = 0;
        self.prefix_max_end = self
            .markers
            .iter()
            .map(|(_, marker)| {
                max_end = max_end.max(marker.end());
                max_end
            })
            .collect();
    }

    /// Add a marker and return its handle.
    pub fn add_marker(&mut self, marker: TextMarker) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        let pos = self
            .markers
            .partition_point(|(_, m)| m.offset <= marker.offset);
        self.markers.insert(pos, (id, marker));
        self.rebuild_prefix_max_end();
        id
    }

    /// Remove one marker.
    pub fn remove_marker(&mut self, id: MarkerId) -> Result<TextMarker> {
        let pos = self
            .markers
            .iter()
            .position(|(marker_id, _)| *marker_id == id)
            .ok_or(DocumentError::UnknownMarker(id.0))?;
        let (_, marker) = self.markers.remove(pos);
        self.rebuild_prefix_max_end();
        Ok(marker)
    }

    /// Remove every marker matching `predicate`; returns the removed handles.
    pub fn remove_markers(&mut self, mut predicate: impl FnMut(&TextMarker) -> bool) -> Vec<MarkerId> {
        let mut removed = Vec::new();
        self.markers.retain(|(id, marker)| {
            let remove = predicate(marker);
            if remove {
                removed.push(*id);
            }
            !remove
        });
        if !removed.is_empty() {
            self.rebuild_prefix_max_end();
        }
        removed
    }

    /// Look up a marker.
    pub fn get(&self, id: MarkerId) -> Option<&TextMarker> {
        self.markers
            .iter()
            .find(|(marker_id, _)| *marker_id == id)
            .map(|(_, marker)| marker)
    }

    /// Markers with `offset` in `[start, end)`, in start order.
    pub fn get_markers(&self, offset: usize) -> Vec<(MarkerId, &TextMarker)> {
        let idx = self.markers.partition_point(|(_, m)| m.offset <= offset);
        let first = self.first_reaching(idx, offset);
        self.markers[first..idx]
            .iter()
            .filter(|(_, m)| m.contains(offset))
            .map(|(id, m)| (*id, m))
            .collect()
    }

    /// Markers intersecting `[offset, offset + length)`, in start order. A zero-length query
    /// behaves like [`get_markers`](Self::get_markers).
    pub fn get_markers_in_range(&self, offset: usize, length: usize) -> Vec<(MarkerId, &TextMarker)> {
        if length == 0 {
            return self.get_markers(offset);
        }
        let end = offset + length;
        let search_end = self.markers.partition_point(|(_, m)| m.offset < end);
        let starts_before = self
            .markers
            .partition_point(|(_, m)| m.offset < offset)
            .min(search_end);
        let scan_start = self.first_reaching(starts_before, offset);
        self.markers[scan_start..search_end]
            .iter()
            .filter(|(_, m)| m.end() > offset || (m.length == 0 && m.offset >= offset))
            .map(|(id, m)| (*id, m))
            .collect()
    }

    /// Whether an insertion at `offset` would land inside a read-only marker.
    pub fn is_read_only_at(&self, offset: usize) -> bool {
        self.get_markers(offset).iter().any(|(_, m)| m.read_only)
    }

    /// Whether removing `[offset, offset + length)` would touch a read-only marker.
    pub fn is_read_only_range(&self, offset: usize, length: usize) -> bool {
        if length == 0 {
            return self.is_read_only_at(offset);
        }
        self.get_markers_in_range(offset, length)
            .iter()
            .any(|(_, m)| m.read_only)
    }

    /// All markers in start order.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, &TextMarker)> {
        self.markers.iter().map(|(id, marker)| (*id, marker))
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether there are no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Remove all markers; returns their handles.
    pub fn clear(&mut self) -> Vec<MarkerId> {
        let removed = self.markers.iter().map(|(id, _)| *id).collect();
        self.markers.clear();
        self.prefix_max_end.clear();
        removed
    }

    /// Translate every marker through an applied edit; returns the handles of markers whose
    /// range was consumed by the removal.
    pub fn apply_change(&mut self, change: &DocumentChange) -> Vec<MarkerId> {
        let mut removed = Vec::new();
        self.markers.retain_mut(|(id, marker)| {
            match change.translate_range(
                marker.offset,
                marker.end(),
                marker.grows_at_start,
                marker.grows_at_end,
            ) {
                Some((start, end)) => {
                    marker.offset = start;
                    marker.length = end - start;
                    true
                }
                None => {
                    removed.push(*id);
                    false
                }
            }
        });
        self.markers.sort_by_key(|(_, m)| m.offset);
        self.rebuild_prefix_max_end();
        removed
    }
}
