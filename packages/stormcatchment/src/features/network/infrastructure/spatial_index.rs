//! Uniform-grid spatial index over structure locations
//!
//! Points are bucketed by `floor(coord / bucket_size)`. Box queries visit the
//! covered buckets; nearest-neighbour queries visit the buckets within the
//! search radius. Results are sorted by slot for determinism.

use rustc_hash::FxHashMap;

use crate::shared::{BBox, Point};

/// Bucketed point index; items are dense slots `0..len`
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    bucket_size: f64,
    buckets: FxHashMap<(i64, i64), Vec<usize>>,
    points: Vec<Point>,
}

impl SpatialIndex {
    /// `bucket_size` is clamped to a small positive minimum
    pub fn new(bucket_size: f64) -> Self {
        let bucket_size = if bucket_size.is_finite() && bucket_size > 1e-9 {
            bucket_size
        } else {
            1.0
        };
        Self {
            bucket_size,
            buckets: FxHashMap::default(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Insert the next slot; returns its index
    pub fn insert(&mut self, p: Point) -> usize {
        let slot = self.points.len();
        self.points.push(p);
        self.buckets.entry(self.key(&p)).or_default().push(slot);
        slot
    }

    pub fn point(&self, slot: usize) -> Option<Point> {
        self.points.get(slot).copied()
    }

    /// Slots whose point lies inside `bbox` (inclusive), sorted
    pub fn query(&self, bbox: &BBox) -> Vec<usize> {
        let (x0, y0) = self.key(&Point::new(bbox.min_x, bbox.min_y));
        let (x1, y1) = self.key(&Point::new(bbox.max_x, bbox.max_y));

        let mut out = Vec::new();
        // Huge boxes: scanning the point list beats walking empty buckets
        let span = (x1 - x0 + 1).saturating_mul(y1 - y0 + 1);
        if span < 0 || span as usize > self.buckets.len().max(1) * 4 {
            out.extend(
                self.points
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| bbox.contains(p))
                    .map(|(slot, _)| slot),
            );
            return out;
        }

        for bx in x0..=x1 {
            for by in y0..=y1 {
                if let Some(slots) = self.buckets.get(&(bx, by)) {
                    out.extend(
                        slots
                            .iter()
                            .copied()
                            .filter(|&slot| bbox.contains(&self.points[slot])),
                    );
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Closest slot within `radius` of `p`; ties go to the lower slot
    pub fn nearest_within(&self, p: &Point, radius: f64) -> Option<usize> {
        self.query(&BBox::around(*p, radius))
            .into_iter()
            .map(|slot| (slot, self.points[slot].distance(p)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(slot, _)| slot)
    }

    fn key(&self, p: &Point) -> (i64, i64) {
        (
            (p.x / self.bucket_size).floor() as i64,
            (p.y / self.bucket_size).floor() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SpatialIndex {
        let mut idx = SpatialIndex::new(10.0);
        idx.insert(Point::new(0.0, 0.0));
        idx.insert(Point::new(5.0, 5.0));
        idx.insert(Point::new(25.0, -3.0));
        idx.insert(Point::new(5.0, 5.0));
        idx
    }

    #[test]
    fn test_query_box() {
        let idx = index();
        assert_eq!(idx.query(&BBox::new(-1.0, -1.0, 6.0, 6.0)), vec![0, 1, 3]);
        assert_eq!(idx.query(&BBox::new(20.0, -5.0, 30.0, 0.0)), vec![2]);
        assert!(idx.query(&BBox::new(100.0, 100.0, 101.0, 101.0)).is_empty());
    }

    #[test]
    fn test_query_huge_box_falls_back_to_scan() {
        let idx = index();
        let all = idx.query(&BBox::new(-1e9, -1e9, 1e9, 1e9));
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_nearest_within() {
        let idx = index();
        assert_eq!(idx.nearest_within(&Point::new(4.0, 4.0), 2.0), Some(1));
        // Coincident points: lower slot wins
        assert_eq!(idx.nearest_within(&Point::new(5.0, 5.0), 0.0), Some(1));
        assert_eq!(idx.nearest_within(&Point::new(15.0, 15.0), 3.0), None);
        // Across a bucket boundary
        assert_eq!(idx.nearest_within(&Point::new(-1.0, 0.5), 1.5), Some(0));
    }
}
