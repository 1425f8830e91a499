//! Alignment snapping and guideline computation.
//!
//! Each axis is resolved on its own. Candidates come in two strengths:
//! element edges, element centers and the canvas center are strong;
//! equal-spacing guides inferred from pairs of elements are weak. Within the
//! threshold a strong candidate always wins over a weak one, and among equal
//! strengths the smallest absolute delta wins.
//!
//! ```text
//!   A          B                  equal spacing for a pair (A, B):
//! [###]  g   [###]                  a.end + g/2   any moving anchor
//!       ^ mid                        b.end + g     moving start edge
//!                                    a.start - g   moving end edge
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::SnapTuning;
use crate::element::ElementId;
use crate::geometry::{Axis, Bounds, Point};
use crate::store::SceneStore;
use crate::viewport::Viewport;

/// Color for element-edge guides.
pub const EDGE_GUIDE_COLOR: &str = "#F24822";
/// Color for element-center guides.
pub const CENTER_GUIDE_COLOR: &str = "#9747FF";
/// Color for canvas-center guides.
pub const CANVAS_GUIDE_COLOR: &str = "#0D99FF";
/// Color for equal-spacing guides.
pub const SPACING_GUIDE_COLOR: &str = "#FF24BD";

/// Tolerance for treating two deltas as the same snap.
const DELTA_EPSILON: f64 = 1e-6;

/// Direction of a guideline on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// A horizontal line at a fixed Y.
    Horizontal,
    /// A vertical line at a fixed X.
    Vertical,
}

impl Orientation {
    /// The line that marks a position along `axis`.
    #[must_use]
    pub const fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::Vertical,
            Axis::Y => Self::Horizontal,
        }
    }
}

/// What produced a guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuideSource {
    /// Another element's start or end edge.
    ElementEdge,
    /// Another element's center.
    ElementCenter,
    /// The nominal canvas center.
    CanvasCenter,
    /// A gap between two elements, replicated.
    EqualSpacing,
}

impl GuideSource {
    /// Strength this source snaps with.
    #[must_use]
    pub const fn strength(self) -> GuideStrength {
        match self {
            Self::EqualSpacing => GuideStrength::Weak,
            Self::ElementEdge | Self::ElementCenter | Self::CanvasCenter => GuideStrength::Strong,
        }
    }

    /// Display color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::ElementEdge => EDGE_GUIDE_COLOR,
            Self::ElementCenter => CENTER_GUIDE_COLOR,
            Self::CanvasCenter => CANVAS_GUIDE_COLOR,
            Self::EqualSpacing => SPACING_GUIDE_COLOR,
        }
    }
}

/// Tie-break priority. `Strong > Weak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideStrength {
    /// Inferred guides such as equal spacing.
    Weak,
    /// Exact alignment guides.
    Strong,
}

/// A transient alignment hint shown while manipulating an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    /// Line direction.
    pub orientation: Orientation,
    /// X for vertical lines, Y for horizontal lines, in world units.
    pub position: f64,
    /// What produced the guide.
    pub source: GuideSource,
    /// The element being manipulated.
    pub element_id: Option<ElementId>,
    /// The element the guide was derived from.
    pub target_element_id: Option<ElementId>,
    /// Tie-break strength.
    pub strength: GuideStrength,
    /// Display color.
    pub color: String,
}

/// A point along the moving element's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Left or top edge.
    Start,
    /// Center.
    Center,
    /// Right or bottom edge.
    End,
}

impl Anchor {
    const fn bit(self) -> u8 {
        match self {
            Self::Start => 0b001,
            Self::Center => 0b010,
            Self::End => 0b100,
        }
    }

    fn of(self, (start, end): (f64, f64)) -> f64 {
        match self {
            Self::Start => start,
            Self::Center => (start + end) / 2.0,
            Self::End => end,
        }
    }
}

/// Set of anchors a candidate may align with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorMask(u8);

impl AnchorMask {
    /// Every anchor.
    pub const ALL: Self = Self(0b111);

    /// Only `anchor`.
    #[must_use]
    pub const fn only(anchor: Anchor) -> Self {
        Self(anchor.bit())
    }

    /// Whether `anchor` is in the set.
    #[must_use]
    pub const fn allows(self, anchor: Anchor) -> bool {
        self.0 & anchor.bit() != 0
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// A position the moving element may snap to along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position in world units.
    pub position: f64,
    /// What produced it.
    pub source: GuideSource,
    /// Anchors allowed to align with it.
    pub anchors: AnchorMask,
    /// Element it was derived from.
    pub target: Option<ElementId>,
}

impl Candidate {
    fn strength(&self) -> GuideStrength {
        self.source.strength()
    }
}

/// What kind of manipulation is being snapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// The whole element moves; start, center and end may align.
    #[default]
    Move,
    /// One edge per axis is dragged; `None` leaves that axis unsnapped.
    Resize {
        /// Dragged horizontal edge.
        x: Option<Anchor>,
        /// Dragged vertical edge.
        y: Option<Anchor>,
    },
}

impl SnapMode {
    fn anchors(self, axis: Axis) -> Vec<Anchor> {
        match self {
            Self::Move => vec![Anchor::Start, Anchor::Center, Anchor::End],
            Self::Resize { x, y } => match axis {
                Axis::X => x.into_iter().collect(),
                Axis::Y => y.into_iter().collect(),
            },
        }
    }
}

/// Outcome of a snap query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    /// Adjustment to add to the proposed position (or dragged edge).
    pub delta: Point,
    /// Guides aligned by `delta`.
    pub guidelines: Vec<Guideline>,
    /// Whether the X axis snapped.
    pub snapped_x: bool,
    /// Whether the Y axis snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Whether either axis snapped.
    #[must_use]
    pub const fn snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }

    /// `proposed` adjusted by this result.
    #[must_use]
    pub fn apply(&self, proposed: Bounds, mode: SnapMode) -> Bounds {
        match mode {
            SnapMode::Move => proposed.translate(self.delta),
            SnapMode::Resize { x, y } => {
                let mut out = proposed;
                resize_edge(&mut out.x, &mut out.width, x, self.delta.x);
                resize_edge(&mut out.y, &mut out.height, y, self.delta.y);
                out
            }
        }
    }
}

fn resize_edge(start: &mut f64, length: &mut f64, anchor: Option<Anchor>, delta: f64) {
    match anchor {
        Some(Anchor::Start) => {
            *start += delta;
            *length -= delta;
        }
        Some(Anchor::End) => *length += delta,
        Some(Anchor::Center) => *start += delta,
        None => {}
    }
}

struct AxisMatch {
    candidate: usize,
    delta: f64,
}

/// Computes snapped deltas and guidelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapEngine {
    tuning: SnapTuning,
}

impl SnapEngine {
    /// Engine with the given tuning.
    #[must_use]
    pub const fn new(tuning: SnapTuning) -> Self {
        Self { tuning }
    }

    /// Snap `proposed` against `others`.
    ///
    /// `others` must already exclude the moving element and anything that
    /// should not attract it. `moving` is recorded on the guidelines.
    #[must_use]
    pub fn snap(
        &self,
        proposed: Bounds,
        mode: SnapMode,
        others: &[(ElementId, Bounds)],
        viewport: &Viewport,
        moving: Option<ElementId>,
    ) -> SnapResult {
        let mut result = SnapResult::default();
        if !viewport.snapping.enabled {
            return result;
        }
        let threshold = viewport.snap_threshold_world();

        for axis in [Axis::X, Axis::Y] {
            let candidates = self.candidates(axis, proposed, others, viewport);
            let span = proposed.span(axis);
            let anchors = mode.anchors(axis);
            let Some((delta, matched)) = resolve_axis(&candidates, span, &anchors, threshold) else {
                continue;
            };
            match axis {
                Axis::X => {
                    result.delta.x = delta;
                    result.snapped_x = true;
                }
                Axis::Y => {
                    result.delta.y = delta;
                    result.snapped_y = true;
                }
            }
            for index in matched {
                let c = &candidates[index];
                result.guidelines.push(Guideline {
                    orientation: Orientation::for_axis(axis),
                    position: c.position,
                    source: c.source,
                    element_id: moving,
                    target_element_id: c.target,
                    strength: c.strength(),
                    color: c.source.color().to_string(),
                });
            }
        }
        tracing::trace!(
            "snap delta=({}, {}) with {} guidelines",
            result.delta.x,
            result.delta.y,
            result.guidelines.len()
        );
        result
    }

    /// Snap the elements in `moving` as one unit whose proposed bounds are
    /// `proposed`, against everything else in `store`.
    ///
    /// Hidden elements, groups and descendants of moving groups never
    /// attract.
    #[must_use]
    pub fn snap_in_store(
        &self,
        store: &SceneStore,
        moving: &[ElementId],
        proposed: Bounds,
        mode: SnapMode,
    ) -> SnapResult {
        let mut excluded: HashSet<ElementId> = moving.iter().copied().collect();
        for id in moving {
            excluded.extend(store.descendants(*id));
        }
        let mut others: Vec<(ElementId, Bounds)> = store
            .elements()
            .filter(|e| !excluded.contains(&e.id) && e.is_visible() && e.children().is_none())
            .map(|e| (e.id, e.bounds()))
            .collect();
        others.sort_by_key(|(id, _)| *id);
        self.snap(proposed, mode, &others, store.viewport(), moving.first().copied())
    }

    /// Deduplicated candidates along `axis` for an element at `proposed`,
    /// sorted by position.
    #[must_use]
    pub fn candidates(
        &self,
        axis: Axis,
        proposed: Bounds,
        others: &[(ElementId, Bounds)],
        viewport: &Viewport,
    ) -> Vec<Candidate> {
        let config = &viewport.snapping;
        let mut raw = Vec::new();
        if !config.enabled {
            return raw;
        }
        if config.snap_to_elements {
            for (id, bounds) in others {
                let (start, end) = bounds.span(axis);
                let target = Some(*id);
                for (position, source) in [
                    (start, GuideSource::ElementEdge),
                    (end, GuideSource::ElementEdge),
                    ((start + end) / 2.0, GuideSource::ElementCenter),
                ] {
                    raw.push(Candidate {
                        position,
                        source,
                        anchors: AnchorMask::ALL,
                        target,
                    });
                }
            }
            spacing_candidates(axis, proposed, others, &mut raw);
        }
        if config.snap_to_canvas {
            raw.push(Candidate {
                position: axis.of(viewport.canvas_center()),
                source: GuideSource::CanvasCenter,
                anchors: AnchorMask::ALL,
                target: None,
            });
        }
        merge_candidates(raw, self.tuning.merge_epsilon)
    }
}

/// Equal-spacing guides for every ordered pair that shares a band on the
/// perpendicular axis with each other and with `proposed`.
fn spacing_candidates(
    axis: Axis,
    proposed: Bounds,
    others: &[(ElementId, Bounds)],
    out: &mut Vec<Candidate>,
) {
    let band_axis = axis.perpendicular();
    let band = proposed.span(band_axis);
    let in_band: Vec<&(ElementId, Bounds)> = others
        .iter()
        .filter(|(_, b)| spans_overlap(b.span(band_axis), band))
        .collect();
    for (a_id, a) in &in_band {
        let (a_start, a_end) = a.span(axis);
        let a_band = a.span(band_axis);
        for (b_id, b) in &in_band {
            if a_id == b_id || !spans_overlap(a_band, b.span(band_axis)) {
                continue;
            }
            let (b_start, b_end) = b.span(axis);
            let gap = b_start - a_end;
            if gap <= 0.0 {
                continue;
            }
            out.push(Candidate {
                position: a_end + gap / 2.0,
                source: GuideSource::EqualSpacing,
                anchors: AnchorMask::ALL,
                target: Some(*a_id),
            });
            out.push(Candidate {
                position: b_end + gap,
                source: GuideSource::EqualSpacing,
                anchors: AnchorMask::only(Anchor::Start),
                target: Some(*b_id),
            });
            out.push(Candidate {
                position: a_start - gap,
                source: GuideSource::EqualSpacing,
                anchors: AnchorMask::only(Anchor::End),
                target: Some(*a_id),
            });
        }
    }
}

fn spans_overlap((a_start, a_end): (f64, f64), (b_start, b_end): (f64, f64)) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Sort by position and fold together candidates closer than `epsilon`.
/// The stronger candidate survives a merge; the anchor sets are united.
fn merge_candidates(mut raw: Vec<Candidate>, epsilon: f64) -> Vec<Candidate> {
    raw.sort_by(|a, b| {
        a.position
            .total_cmp(&b.position)
            .then_with(|| b.strength().cmp(&a.strength()))
    });
    let mut merged: Vec<Candidate> = Vec::with_capacity(raw.len());
    for candidate in raw {
        match merged.last_mut() {
            Some(last) if (candidate.position - last.position).abs() <= epsilon => {
                let anchors = last.anchors.union(candidate.anchors);
                if candidate.strength() > last.strength() {
                    *last = candidate;
                }
                last.anchors = anchors;
            }
            _ => merged.push(candidate),
        }
    }
    merged
}

/// Best delta along one axis and the indices of every candidate it aligns.
fn resolve_axis(
    candidates: &[Candidate],
    span: (f64, f64),
    anchors: &[Anchor],
    threshold: f64,
) -> Option<(f64, Vec<usize>)> {
    let mut matches = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        for &anchor in anchors {
            if !candidate.anchors.allows(anchor) {
                continue;
            }
            let delta = candidate.position - anchor.of(span);
            if delta.abs() <= threshold {
                matches.push(AxisMatch {
                    candidate: index,
                    delta,
                });
            }
        }
    }

    let best = matches.iter().min_by(|a, b| {
        let sa = candidates[a.candidate].strength();
        let sb = candidates[b.candidate].strength();
        sb.cmp(&sa)
            .then_with(|| a.delta.abs().total_cmp(&b.delta.abs()))
    })?;
    let delta = best.delta;

    let mut aligned: Vec<usize> = matches
        .iter()
        .filter(|m| (m.delta - delta).abs() <= DELTA_EPSILON)
        .map(|m| m.candidate)
        .collect();
    aligned.sort_unstable();
    aligned.dedup();
    Some((delta, aligned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, Frame, Visibility};
    use crate::geometry::Size;
    use crate::viewport::ViewportPatch;

    fn pair() -> Vec<(ElementId, Bounds)> {
        vec![
            (ElementId::new(), Bounds::new(0.0, 0.0, 100.0, 100.0)),
            (ElementId::new(), Bounds::new(200.0, 0.0, 100.0, 100.0)),
        ]
    }

    fn vertical(result: &SnapResult) -> Vec<&Guideline> {
        result
            .guidelines
            .iter()
            .filter(|g| g.orientation == Orientation::Vertical)
            .collect()
    }

    #[test]
    fn test_equal_spacing_guide_between_pair() {
        let engine = SnapEngine::default();
        let viewport = Viewport::default();
        let proposed = Bounds::new(147.0, 0.0, 100.0, 100.0);

        let result = engine.snap(proposed, SnapMode::Move, &pair(), &viewport, None);

        assert!(result.snapped_x);
        assert!((result.delta.x - 3.0).abs() < 1e-9);
        let spacing: Vec<_> = vertical(&result)
            .into_iter()
            .filter(|g| g.source == GuideSource::EqualSpacing)
            .collect();
        assert_eq!(spacing.len(), 1);
        assert!((spacing[0].position - 150.0).abs() < 1e-9);
        assert_eq!(spacing[0].color, SPACING_GUIDE_COLOR);
        let snapped = result.apply(proposed, SnapMode::Move);
        assert!((snapped.x - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_weak_only_snaps_center_to_gap_midpoint() {
        let engine = SnapEngine::default();
        let viewport = Viewport::default();
        let proposed = Bounds::new(128.0, 0.0, 40.0, 40.0);

        let result = engine.snap(proposed, SnapMode::Move, &pair(), &viewport, None);

        assert!((result.delta.x - 2.0).abs() < 1e-9);
        let guides = vertical(&result);
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].strength, GuideStrength::Weak);
        assert!((guides[0].position - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_spacing_ignores_pairs_outside_moving_band() {
        let engine = SnapEngine::default();
        let viewport = Viewport::default();
        let below = Bounds::new(128.0, 400.0, 40.0, 40.0);

        let result = engine.snap(below, SnapMode::Move, &pair(), &viewport, None);
        assert!(!result.snapped_x);
        assert!(engine
            .candidates(Axis::X, below, &pair(), &viewport)
            .iter()
            .all(|c| c.source != GuideSource::EqualSpacing));
    }

    #[test]
    fn test_spacing_repeats_gap_outside_pair() {
        let engine = SnapEngine::default();
        let viewport = Viewport::default();
        let others = pair();

        // Start edge lands one gap past B.
        let after = Bounds::new(398.0, 0.0, 50.0, 100.0);
        let result = engine.snap(after, SnapMode::Move, &others, &viewport, None);
        assert!(result.snapped_x);
        assert!((result.delta.x - 2.0).abs() < 1e-9);
        let guides = vertical(&result);
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].source, GuideSource::EqualSpacing);
        assert!((guides[0].position - 400.0).abs() < 1e-9);
        assert_eq!(guides[0].target_element_id, Some(others[1].0));

        // End edge lands one gap before A.
        let before = Bounds::new(-148.0, 0.0, 50.0, 100.0);
        let result = engine.snap(before, SnapMode::Move, &others, &viewport, None);
        assert!(result.snapped_x);
        assert!((result.delta.x + 2.0).abs() < 1e-9);
        let guides = vertical(&result);
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].source, GuideSource::EqualSpacing);
        assert!((guides[0].position + 100.0).abs() < 1e-9);
        assert_eq!(guides[0].target_element_id, Some(others[0].0));
    }

    #[test]
    fn test_outer_spacing_guide_only_aligns_its_edge() {
        let engine = SnapEngine::default();
        let viewport = Viewport::default();

        // Center at 398 is near 400, but that guide only takes a start edge.
        let centred = Bounds::new(373.0, 0.0, 50.0, 100.0);
        let result = engine.snap(centred, SnapMode::Move, &pair(), &viewport, None);
        assert!(!result.snapped_x);
        assert!(vertical(&result).is_empty());
    }

    #[test]
    fn test_strong_beats_closer_weak() {
        let engine = SnapEngine::default();
        let mut viewport = Viewport::default();
        // Canvas center lands at x = 157.
        viewport.canvas_size = Size::new(314.0, 2000.0);
        let proposed = Bounds::new(149.0, 0.0, 10.0, 10.0);

        let result = engine.snap(proposed, SnapMode::Move, &pair(), &viewport, None);

        assert!((result.delta.x + 2.0).abs() < 1e-9);
        let guides = vertical(&result);
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].source, GuideSource::CanvasCenter);
        assert_eq!(guides[0].strength, GuideStrength::Strong);
    }

    #[test]
    fn test_threshold_scales_with_zoom() {
        let engine = SnapEngine::default();
        let others = pair();
        let proposed = Bounds::new(104.0, 400.0, 20.0, 20.0);
        let mut viewport = Viewport::default();
        viewport.snapping.snap_to_canvas = false;

        // 4 world units away: inside 5px at zoom 1, outside at zoom 2 (2.5 units).
        let at_one = engine.snap(proposed, SnapMode::Move, &others, &viewport, None);
        assert!(at_one.snapped_x);
        ViewportPatch::zoom(2.0).apply(&mut viewport);
        let at_two = engine.snap(proposed, SnapMode::Move, &others, &viewport, None);
        assert!(!at_two.snapped_x);
    }

    #[test]
    fn test_axes_resolve_independently() {
        let engine = SnapEngine::default();
        let a = ElementId::new();
        let b = ElementId::new();
        let others = vec![
            (a, Bounds::new(0.0, 0.0, 50.0, 50.0)),
            (b, Bounds::new(400.0, 300.0, 50.0, 50.0)),
        ];
        let mut viewport = Viewport::default();
        viewport.snapping.snap_to_canvas = false;
        let proposed = Bounds::new(52.0, 297.0, 20.0, 20.0);

        let result = engine.snap(proposed, SnapMode::Move, &others, &viewport, None);

        assert!((result.delta.x + 2.0).abs() < 1e-9);
        assert!((result.delta.y - 3.0).abs() < 1e-9);
        let x_target = result
            .guidelines
            .iter()
            .find(|g| g.orientation == Orientation::Vertical)
            .and_then(|g| g.target_element_id);
        let y_target = result
            .guidelines
            .iter()
            .find(|g| g.orientation == Orientation::Horizontal)
            .and_then(|g| g.target_element_id);
        assert_eq!(x_target, Some(a));
        assert_eq!(y_target, Some(b));
    }

    #[test]
    fn test_disabled_toggles_exclude_candidates() {
        let engine = SnapEngine::default();
        let others = pair();
        let band = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let mut viewport = Viewport::default();

        viewport.snapping.enabled = false;
        assert!(engine.candidates(Axis::X, band, &others, &viewport).is_empty());
        let proposed = Bounds::new(98.0, 0.0, 10.0, 10.0);
        let result = engine.snap(proposed, SnapMode::Move, &others, &viewport, None);
        assert!(!result.snapped());

        viewport.snapping.enabled = true;
        viewport.snapping.snap_to_elements = false;
        let candidates = engine.candidates(Axis::X, band, &others, &viewport);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source, GuideSource::CanvasCenter);

        viewport.snapping.snap_to_canvas = false;
        assert!(engine.candidates(Axis::X, band, &others, &viewport).is_empty());
    }

    #[test]
    fn test_merge_keeps_stronger_and_unions_anchors() {
        let weak = Candidate {
            position: 10.2,
            source: GuideSource::EqualSpacing,
            anchors: AnchorMask::only(Anchor::Start),
            target: None,
        };
        let strong = Candidate {
            position: 10.0,
            source: GuideSource::ElementEdge,
            anchors: AnchorMask::only(Anchor::End),
            target: None,
        };
        let far = Candidate {
            position: 20.0,
            ..weak
        };
        let merged = merge_candidates(vec![weak, far, strong], 0.5);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source, GuideSource::ElementEdge);
        assert!(merged[0].anchors.allows(Anchor::Start));
        assert!(merged[0].anchors.allows(Anchor::End));
        assert!(!merged[0].anchors.allows(Anchor::Center));
    }

    #[test]
    fn test_resize_snaps_only_dragged_edge() {
        let engine = SnapEngine::default();
        let mut viewport = Viewport::default();
        viewport.snapping.snap_to_canvas = false;
        let others = vec![(ElementId::new(), Bounds::new(300.0, 0.0, 50.0, 50.0))];
        // Left edge at 298 would snap on a move; only the right edge is dragged.
        let proposed = Bounds::new(298.0, 600.0, 49.0, 20.0);
        let mode = SnapMode::Resize {
            x: Some(Anchor::End),
            y: None,
        };

        let result = engine.snap(proposed, mode, &others, &viewport, None);

        assert!((result.delta.x - 3.0).abs() < 1e-9);
        assert!(!result.snapped_y);
        let resized = result.apply(proposed, mode);
        assert!((resized.x - 298.0).abs() < 1e-9);
        assert!((resized.right() - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_snap_in_store_skips_moving_hidden_and_groups() {
        let mut store = SceneStore::new();
        let moving = Element::rect(0.0, 500.0, 10.0, 10.0);
        let mut hidden = Element::rect(102.0, 0.0, 10.0, 10.0);
        hidden.visibility = Visibility::Hidden;
        let child = Element::rect(500.0, 500.0, 10.0, 10.0);
        let group = Element::group(vec![child.id]).with_frame(Frame::new(98.0, 0.0, 10.0, 10.0));
        let moving_id = moving.id;
        for e in [moving, hidden, child, group] {
            store.add_element(e).expect("add");
        }
        store.set_viewport(ViewportPatch {
            canvas_size: Some(Size::new(10_000.0, 10_000.0)),
            ..ViewportPatch::default()
        });

        let result = store_snap(&store, moving_id, Bounds::new(100.0, 800.0, 10.0, 10.0));
        assert!(!result.snapped_x);
    }

    fn store_snap(store: &SceneStore, id: ElementId, proposed: Bounds) -> SnapResult {
        SnapEngine::default().snap_in_store(store, &[id], proposed, SnapMode::Move)
    }
}
