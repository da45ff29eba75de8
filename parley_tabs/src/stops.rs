// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tab stop definitions and the registry that holds them.

use smallvec::SmallVec;

/// How content following a tab is placed relative to its stop.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TabAlignment {
    /// Content starts at the stop.
    #[default]
    Left,
    /// Content is centered on the stop.
    Center,
    /// Content ends at the stop.
    Right,
}

impl TabAlignment {
    /// The next alignment in the ruler cycle: left → right → center → removed.
    pub const fn cycle(self) -> Option<Self> {
        match self {
            Self::Left => Some(Self::Right),
            Self::Right => Some(Self::Center),
            Self::Center => None,
        }
    }
}

/// A horizontal position, in pixels from the block start, that tabs snap to.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabStop {
    /// Distance from the start of the block.
    pub position: f32,
    /// Placement of the content after the tab.
    #[cfg_attr(feature = "serde", serde(default))]
    pub alignment: TabAlignment,
}

impl TabStop {
    /// A left aligned stop at `position`.
    pub const fn left(position: f32) -> Self {
        Self::new(position, TabAlignment::Left)
    }

    /// A stop at `position` with the given alignment.
    pub const fn new(position: f32, alignment: TabAlignment) -> Self {
        Self {
            position,
            alignment,
        }
    }

    fn is_valid(&self) -> bool {
        self.position.is_finite() && self.position >= 0.0
    }
}

/// The ordered list of tab stops.
///
/// Stops are kept sorted by ascending position, and no two stops share a
/// position. The registry is deliberately not part of any document's undo
/// history. Every mutation bumps the [generation](Self::generation) so that
/// dependents can notice changes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<TabStop>", into = "Vec<TabStop>")
)]
pub struct TabStopRegistry {
    stops: SmallVec<[TabStop; 8]>,
    generation: u64,
}

impl TabStopRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stops, sorted by position.
    pub fn stops(&self) -> &[TabStop] {
        &self.stops
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if there are no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Bumped by every mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Add a left aligned stop at `position`. See [`add_stop`](Self::add_stop).
    pub fn add(&mut self, position: f32) -> Option<usize> {
        self.add_stop(TabStop::left(position))
    }

    /// Insert `stop` in order and return its index.
    ///
    /// Returns the existing index without changes if a stop already sits at that
    /// position, and `None` for negative or non-finite positions.
    pub fn add_stop(&mut self, stop: TabStop) -> Option<usize> {
        if !stop.is_valid() {
            return None;
        }
        let index = self.stops.partition_point(|s| s.position < stop.position);
        if self
            .stops
            .get(index)
            .is_some_and(|s| s.position == stop.position)
        {
            return Some(index);
        }
        self.stops.insert(index, stop);
        self.generation += 1;
        Some(index)
    }

    /// Advance the alignment of the stop at `index` through the ruler cycle,
    /// removing it after center. Returns the new alignment, or `None` if the
    /// stop was removed or `index` is out of range.
    pub fn cycle(&mut self, index: usize) -> Option<TabAlignment> {
        let stop = self.stops.get_mut(index)?;
        self.generation += 1;
        match stop.alignment.cycle() {
            Some(alignment) => {
                stop.alignment = alignment;
                Some(alignment)
            }
            None => {
                self.stops.remove(index);
                None
            }
        }
    }

    /// Remove the stop at `index`.
    pub fn remove(&mut self, index: usize) -> Option<TabStop> {
        if index >= self.stops.len() {
            return None;
        }
        self.generation += 1;
        Some(self.stops.remove(index))
    }

    /// Remove every stop.
    pub fn clear(&mut self) {
        if !self.stops.is_empty() {
            self.stops.clear();
            self.generation += 1;
        }
    }

    /// The first stop at least `min_advance` pixels past `x`.
    pub fn first_after(&self, x: f32, min_advance: f32) -> Option<&TabStop> {
        self.stops.iter().find(|s| s.position - x >= min_advance)
    }

    /// Index of the stop closest to `x`, if one lies within `tolerance`.
    pub fn hit_test(&self, x: f32, tolerance: f32) -> Option<usize> {
        self.stops
            .iter()
            .enumerate()
            .map(|(index, s)| (index, (s.position - x).abs()))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// A click on the ruler at `x`: cycles the stop under the pointer, or adds
    /// a left stop when there is none.
    pub fn click(&mut self, x: f32, tolerance: f32) -> RulerEdit {
        match self.hit_test(x, tolerance) {
            Some(index) => match self.cycle(index) {
                Some(alignment) => RulerEdit::Changed { index, alignment },
                None => RulerEdit::Removed { index },
            },
            None => match self.add(x) {
                Some(index) => RulerEdit::Added { index },
                None => RulerEdit::Ignored,
            },
        }
    }
}

/// Outcome of [`TabStopRegistry::click`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RulerEdit {
    /// A new left stop was added.
    Added {
        /// Index of the new stop.
        index: usize,
    },
    /// An existing stop changed alignment.
    Changed {
        /// Index of the stop.
        index: usize,
        /// Its new alignment.
        alignment: TabAlignment,
    },
    /// An existing stop was removed.
    Removed {
        /// Index the stop had.
        index: usize,
    },
    /// The click did not change anything.
    Ignored,
}

impl From<Vec<TabStop>> for TabStopRegistry {
    /// Builds a registry from stops in any order, dropping invalid or duplicate positions.
    fn from(stops: Vec<TabStop>) -> Self {
        let mut registry = Self::new();
        for stop in stops {
            registry.add_stop(stop);
        }
        registry.generation = 0;
        registry
    }
}

impl From<TabStopRegistry> for Vec<TabStop> {
    fn from(registry: TabStopRegistry) -> Self {
        registry.stops.into_vec()
    }
}

impl FromIterator<TabStop> for TabStopRegistry {
    fn from_iter<I: IntoIterator<Item = TabStop>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(feature = "serde")]
impl TabStopRegistry {
    /// Serialize as an ordered JSON list of `{position, alignment}` pairs.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.stops())
    }

    /// Load from the JSON form written by [`to_json`](Self::to_json).
    ///
    /// Entries with invalid positions are dropped; syntax errors fail the load.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::{RulerEdit, TabAlignment, TabStop, TabStopRegistry};

    fn positions(registry: &TabStopRegistry) -> Vec<f32> {
        registry.stops().iter().map(|s| s.position).collect()
    }

    #[test]
    fn stays_sorted() {
        let mut registry = TabStopRegistry::new();
        assert_eq!(registry.add(200.0), Some(0));
        assert_eq!(registry.add(50.0), Some(0));
        assert_eq!(registry.add(120.0), Some(1));
        assert_eq!(positions(&registry), [50.0, 120.0, 200.0]);
        assert_eq!(registry.add(120.0), Some(1));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn rejects_invalid_positions() {
        let mut registry = TabStopRegistry::new();
        assert_eq!(registry.add(f32::NAN), None);
        assert_eq!(registry.add(-4.0), None);
        assert_eq!(registry.add(f32::INFINITY), None);
        assert!(registry.is_empty());
        assert_eq!(registry.generation(), 0);
    }

    #[test]
    fn cycle_order_ends_in_removal() {
        let mut registry = TabStopRegistry::new();
        registry.add(80.0);
        assert_eq!(registry.cycle(0), Some(TabAlignment::Right));
        assert_eq!(registry.cycle(0), Some(TabAlignment::Center));
        assert_eq!(registry.cycle(0), None);
        assert!(registry.is_empty());
        assert_eq!(registry.cycle(0), None);
    }

    #[test]
    fn every_mutation_bumps_generation() {
        let mut registry = TabStopRegistry::new();
        registry.add(10.0);
        registry.add(20.0);
        registry.cycle(1);
        registry.remove(0);
        assert_eq!(registry.generation(), 4);
        assert_eq!(registry.remove(5), None);
        registry.clear();
        registry.clear();
        assert_eq!(registry.generation(), 5);
    }

    #[test]
    fn first_after_respects_min_advance() {
        let registry: TabStopRegistry = [TabStop::left(100.0), TabStop::left(200.0)]
            .into_iter()
            .collect();
        assert_eq!(registry.first_after(0.0, 2.0).map(|s| s.position), Some(100.0));
        assert_eq!(registry.first_after(99.0, 2.0).map(|s| s.position), Some(200.0));
        assert_eq!(registry.first_after(98.0, 2.0).map(|s| s.position), Some(100.0));
        assert!(registry.first_after(199.0, 2.0).is_none());
    }

    #[test]
    fn ruler_clicks() {
        let mut registry = TabStopRegistry::new();
        assert_eq!(registry.click(100.0, 4.0), RulerEdit::Added { index: 0 });
        assert_eq!(
            registry.click(102.0, 4.0),
            RulerEdit::Changed {
                index: 0,
                alignment: TabAlignment::Right
            }
        );
        assert_eq!(registry.click(150.0, 4.0), RulerEdit::Added { index: 1 });
        registry.click(98.0, 4.0);
        assert_eq!(registry.click(99.0, 4.0), RulerEdit::Removed { index: 0 });
        assert_eq!(positions(&registry), [150.0]);
        assert_eq!(registry.click(-3.0, 1.0), RulerEdit::Ignored);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        let registry: TabStopRegistry = [
            TabStop::new(300.0, TabAlignment::Right),
            TabStop::left(100.0),
            TabStop::new(200.0, TabAlignment::Center),
        ]
        .into_iter()
        .collect();
        let json = registry.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"position":100.0,"alignment":"left"},{"position":200.0,"alignment":"center"},{"position":300.0,"alignment":"right"}]"#
        );
        assert_eq!(TabStopRegistry::from_json(&json).unwrap(), registry);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_load_drops_invalid_entries() {
        let registry =
            TabStopRegistry::from_json(r#"[{"position":-5},{"position":40},{"position":40}]"#)
                .unwrap();
        assert_eq!(positions(&registry), [40.0]);
        assert_eq!(registry.stops()[0].alignment, TabAlignment::Left);
        assert!(TabStopRegistry::from_json("[{").is_err());
        assert!(TabStopRegistry::from_json("[]").unwrap().is_empty());
    }
}
