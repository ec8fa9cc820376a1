use std::collections::BTreeSet;

use crate::coords::Vec2;
use crate::geometry::point_to_segment_distance;
use crate::ink::{InkPage, Stroke, StrokeId, StrokePoint};

/// A stroke the eraser path touched, with the pieces that survive.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitCandidate {
    pub original: Stroke,
    pub segments: Vec<Stroke>,
}

/// Indices of `stroke` samples within `radius` of the eraser path.
pub fn find_touched_indices(stroke: &Stroke, path: &[Vec2], radius: f32) -> BTreeSet<usize> {
    if path.is_empty() {
        return BTreeSet::new();
    }
    stroke
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| touched_by_path(p.pos(), path, radius))
        .map(|(i, _)| i)
        .collect()
}

fn touched_by_path(p: Vec2, path: &[Vec2], radius: f32) -> bool {
    match path {
        [only] => p.distance(*only) <= radius,
        _ => path
            .windows(2)
            .any(|w| point_to_segment_distance(p, w[0], w[1]) <= radius),
    }
}

/// Splits `stroke` into the runs of untouched samples.
///
/// No touched indices returns the stroke itself (same id). Touching every
/// index returns no segments. Each segment gets a fresh id and keeps the
/// original style, creation time and sequence number.
pub fn split_stroke(stroke: &Stroke, touched: &BTreeSet<usize>) -> Vec<Stroke> {
    if touched.is_empty() || stroke.is_empty() {
        return vec![stroke.clone()];
    }

    let mut segments = Vec::new();
    let mut run: Vec<StrokePoint> = Vec::new();
    for (i, p) in stroke.points.iter().enumerate() {
        if touched.contains(&i) {
            segments.extend(make_segment(stroke, std::mem::take(&mut run)));
        } else {
            run.push(*p);
        }
    }
    segments.extend(make_segment(stroke, run));
    segments
}

fn make_segment(original: &Stroke, points: Vec<StrokePoint>) -> Option<Stroke> {
    let segment = Stroke::from_points(
        StrokeId::new(),
        points,
        original.style,
        original.style.base_width,
        original.sequence,
    )?;
    Some(Stroke {
        created_at: original.created_at,
        ..segment
    })
}

/// Every stroke the path actually changes, with its replacement segments.
pub fn compute_split_candidates<'a, I>(strokes: I, path: &[Vec2], radius: f32) -> Vec<SplitCandidate>
where
    I: IntoIterator<Item = &'a Stroke>,
{
    if path.is_empty() {
        return Vec::new();
    }
    strokes
        .into_iter()
        .filter_map(|stroke| {
            let touched = find_touched_indices(stroke, path, radius);
            if touched.is_empty() {
                return None;
            }
            let segments = split_stroke(stroke, &touched);
            if let [only] = segments.as_slice() {
                if only.id == stroke.id {
                    return None;
                }
            }
            Some(SplitCandidate {
                original: stroke.clone(),
                segments,
            })
        })
        .collect()
}

/// Replaces `original` with `segments` at its position.
///
/// Returns the insertion index, or `None` when the original is not on the page.
pub fn apply_stroke_split(page: &mut InkPage, original: &Stroke, segments: &[Stroke]) -> Option<usize> {
    let index = page.position(original.id)?;
    page.remove(original.id);
    for (offset, segment) in segments.iter().enumerate() {
        page.insert(index + offset, segment.clone());
    }
    Some(index)
}

/// Removes `segments` and puts `original` back at `insertion_index`,
/// clamped to the page length.
pub fn restore_stroke_split(page: &mut InkPage, original: &Stroke, segments: &[Stroke], insertion_index: usize) {
    for segment in segments {
        page.remove(segment.id);
    }
    let at = insertion_index.min(page.len());
    page.insert(at, original.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::PageSize;
    use crate::ink::StrokeStyle;

    fn straight(n: usize) -> Stroke {
        let pts = (0..n).map(|i| StrokePoint::at(i as f32 * 10.0, 0.0, i as u64)).collect();
        Stroke::from_points(StrokeId::new(), pts, StrokeStyle::default(), 2.0, 7).unwrap()
    }

    fn xs(s: &Stroke) -> Vec<f32> {
        s.points.iter().map(|p| p.x).collect()
    }

    // ── split ───────────────────────────────────────────────────────────

    #[test]
    fn split_middle_yields_two_segments() {
        let s = straight(5);
        let segments = split_stroke(&s, &BTreeSet::from([2, 3]));
        assert_eq!(segments.len(), 2);
        assert_eq!(xs(&segments[0]), vec![0.0, 10.0]);
        assert_eq!(xs(&segments[1]), vec![40.0]);
        for seg in &segments {
            assert_ne!(seg.id, s.id);
            assert_eq!(seg.style, s.style);
            assert_eq!(seg.created_at, s.created_at);
            assert_eq!(seg.sequence, s.sequence);
        }
    }

    #[test]
    fn split_everything_yields_nothing() {
        let s = straight(5);
        assert!(split_stroke(&s, &(0..5).collect()).is_empty());
    }

    #[test]
    fn split_nothing_returns_original() {
        let s = straight(5);
        let segments = split_stroke(&s, &BTreeSet::new());
        assert_eq!(segments, vec![s]);
    }

    // ── touched indices ─────────────────────────────────────────────────

    #[test]
    fn touched_indices_follow_path() {
        let s = straight(5);
        let path = [Vec2::new(20.0, -20.0), Vec2::new(20.0, 20.0)];
        assert_eq!(find_touched_indices(&s, &path, 1.0), BTreeSet::from([2]));
        assert!(find_touched_indices(&s, &[], 1.0).is_empty());
    }

    #[test]
    fn candidates_skip_untouched_strokes() {
        let a = straight(5);
        let far = Stroke::from_points(
            StrokeId::new(),
            vec![StrokePoint::at(0.0, 500.0, 0)],
            StrokeStyle::default(),
            2.0,
            1,
        )
        .unwrap();
        let path = [Vec2::new(20.0, 0.0)];
        let c = compute_split_candidates([&a, &far], &path, 1.0);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].original.id, a.id);
        assert_eq!(c[0].segments.len(), 2);
    }

    // ── apply / restore ─────────────────────────────────────────────────

    #[test]
    fn apply_then_restore_is_lossless() {
        let mut page = InkPage::new(PageSize::new(100.0, 100.0));
        let before = straight(2);
        let target = straight(5);
        let after = straight(3);
        page.add(before.clone());
        page.add(target.clone());
        page.add(after.clone());
        let original: Vec<Stroke> = page.strokes().to_vec();

        let segments = split_stroke(&target, &BTreeSet::from([2]));
        let index = apply_stroke_split(&mut page, &target, &segments).unwrap();
        assert_eq!(index, 1);
        assert_eq!(page.len(), 4);
        assert_eq!(page.strokes()[1].id, segments[0].id);
        assert_eq!(page.strokes()[2].id, segments[1].id);
        assert!(page.index().contains(&segments[1].id));
        assert!(!page.index().contains(&target.id));

        restore_stroke_split(&mut page, &target, &segments, index);
        assert_eq!(page.strokes(), original.as_slice());
    }

    #[test]
    fn apply_missing_original_is_none() {
        let mut page = InkPage::new(PageSize::new(100.0, 100.0));
        let s = straight(3);
        assert!(apply_stroke_split(&mut page, &s, &[]).is_none());
    }
}
