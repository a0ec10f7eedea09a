//! Sibling-scoped grid layout index.
//!
//! # Responsibility
//! - Track one rectangular placement per sibling field on a 12-column grid.
//! - Compute default placements for new, synthesized, and resized entries.
//!
//! # Invariants
//! - At most one entry per field id.
//! - Removing an entry never repacks the remaining ones; gaps are allowed.
//! - Static entries (the submit control) are never user-movable.

use crate::model::field::{FieldId, FieldType};
use serde::{Deserialize, Serialize};

/// Number of grid columns at every nesting level.
pub const GRID_COLUMNS: u32 = 12;

/// Default width for newly placed fields: half the grid.
pub const DEFAULT_FIELD_WIDTH: u32 = GRID_COLUMNS / 2;

/// Height used when no type hint is available at placement time.
pub const FALLBACK_FIELD_HEIGHT: f64 = 6.0;

/// Height used for placements synthesized at render time.
pub const SYNTHESIZED_FIELD_HEIGHT: f64 = 8.0;

/// Base height of a section container with zero children.
pub const SECTION_BASE_HEIGHT: f64 = 6.0;

/// Additional section height per child field.
pub const SECTION_CHILD_HEIGHT: f64 = 7.3;

/// One rectangular placement in grid units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    #[serde(rename = "fieldId")]
    pub field_id: FieldId,
    pub x: u32,
    pub y: f64,
    pub w: u32,
    pub h: f64,
    /// Static entries (e.g. the submit control) ignore drag input.
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Ordered set of placements for one sibling list.
///
/// Overlaps are visually permitted and not reconciled here; only the editing
/// UI's drag operation resolves them, by replacing the whole index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutIndex {
    entries: Vec<LayoutEntry>,
}

impl LayoutIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<LayoutEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.iter()
    }

    /// Looks up the placement for one field id.
    pub fn entry(&self, field_id: FieldId) -> Option<&LayoutEntry> {
        self.entries.iter().find(|entry| entry.field_id == field_id)
    }

    pub fn contains(&self, field_id: FieldId) -> bool {
        self.entry(field_id).is_some()
    }

    /// Bottom edge of the lowest entry, in row units.
    pub fn max_extent_y(&self) -> f64 {
        self.entries
            .iter()
            .map(|entry| entry.y + entry.h)
            .fold(0.0, f64::max)
    }

    /// Assigns a default placement for a new sibling field.
    ///
    /// The x column cycles through `(count * 2) % 12`, y appends below all
    /// existing entries, width is half the grid, and height comes from the
    /// type table when a hint is given (fallback constant otherwise).
    ///
    /// Any prior entry for the same id is replaced.
    pub fn place(&mut self, field_id: FieldId, kind: Option<FieldType>) -> &LayoutEntry {
        self.remove(field_id);
        let entry = LayoutEntry {
            field_id,
            x: (self.entries.len() as u32 * 2) % GRID_COLUMNS,
            y: self.max_extent_y(),
            w: DEFAULT_FIELD_WIDTH,
            h: kind.map_or(FALLBACK_FIELD_HEIGHT, FieldType::grid_height),
            is_static: false,
        };
        self.entries.push(entry);
        self.entries
            .last()
            .unwrap_or_else(|| unreachable!("entry was just pushed"))
    }

    /// Computes a recovery placement for a field whose entry is missing,
    /// without mutating the index. Stale or absent layout must never block
    /// rendering.
    pub fn synthesized_entry(&self, field_id: FieldId) -> LayoutEntry {
        LayoutEntry {
            field_id,
            x: 0,
            y: self.max_extent_y(),
            w: DEFAULT_FIELD_WIDTH,
            h: SYNTHESIZED_FIELD_HEIGHT,
            is_static: false,
        }
    }

    /// Inserts one entry verbatim, replacing any prior entry for the id.
    pub fn insert(&mut self, entry: LayoutEntry) {
        self.remove(entry.field_id);
        self.entries.push(entry);
    }

    /// Deletes one entry. Remaining entries keep their positions.
    pub fn remove(&mut self, field_id: FieldId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.field_id != field_id);
        self.entries.len() != before
    }

    /// Moves one non-static entry to a new grid position.
    pub fn move_entry(&mut self, field_id: FieldId, x: u32, y: f64) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.field_id == field_id && !entry.is_static)
        {
            Some(entry) => {
                entry.x = x.min(GRID_COLUMNS.saturating_sub(entry.w));
                entry.y = y.max(0.0);
                true
            }
            None => false,
        }
    }

    /// Recomputes a section entry's height from its child count so the
    /// container grows and shrinks with its contents.
    pub fn resize_section_entry(&mut self, section_id: FieldId, child_count: usize) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.field_id == section_id)
        {
            Some(entry) => {
                entry.h = SECTION_BASE_HEIGHT + child_count as f64 * SECTION_CHILD_HEIGHT;
                true
            }
            None => false,
        }
    }

    /// Replaces every entry at once (the drag operation's result).
    pub fn replace(&mut self, entries: Vec<LayoutEntry>) {
        self.entries = entries;
    }

    /// Field ids in visual order: top to bottom, then left to right.
    ///
    /// The editing UI derives the id sequence it passes to reorder
    /// operations from this after a drag settles.
    pub fn visual_order(&self) -> Vec<FieldId> {
        let mut ordered: Vec<&LayoutEntry> =
            self.entries.iter().filter(|entry| !entry.is_static).collect();
        ordered.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.cmp(&b.x))
        });
        ordered.into_iter().map(|entry| entry.field_id).collect()
    }
}
