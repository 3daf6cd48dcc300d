//! Precomputed per-record geometry for arcs and spikes.
//!
//! Shapes are built once when a dataset loads and indexed by dataset index;
//! `None` marks a record that has no visual of that kind.

use foundation::math::{
    CubicBezier3, LatLon, Vec3, great_circle_midpoint, map_range, project_latlon,
};

use crate::EntityKind;
use crate::density::{DENSITY_RADIUS, spike_densities};

/// Pairs at or below this chord distance get no arc.
pub const MIN_ARC_DISTANCE: f64 = 1.5;
pub const MIN_ARC_SEGMENTS: u32 = 20;
/// Clearance between a spike tip and its particle.
pub const SPIKE_TIP_OFFSET: f64 = 0.25;

/// Geometry the animator needs to time an entity.
pub trait EntityShape {
    const KIND: EntityKind;

    /// Amount of geometry revealed while entering, in the animator's draw units.
    fn draw_units(&self) -> f64;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcShape {
    pub curve: CubicBezier3,
    /// Tube segments along the curve; longer arcs get more.
    pub segments: u32,
    /// Landing marker position at the merge end.
    pub landing: Vec3,
}

impl EntityShape for ArcShape {
    const KIND: EntityKind = EntityKind::Arc;

    fn draw_units(&self) -> f64 {
        self.segments as f64
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpikeShape {
    pub base: Vec3,
    pub height: f64,
    pub tip: Vec3,
    pub density: u32,
}

impl EntityShape for SpikeShape {
    const KIND: EntityKind = EntityKind::Spike;

    fn draw_units(&self) -> f64 {
        1.0
    }
}

/// Cubic Bézier from `open` to `merge`, lifted off the surface by an amount
/// that grows with the chord distance.
pub fn build_arc(open: LatLon, merge: LatLon, radius: f64) -> Option<ArcShape> {
    if !open.is_valid() || !merge.is_valid() {
        return None;
    }
    let start = project_latlon(open, radius);
    let end = project_latlon(merge, radius);
    let dist = start.distance(end);
    if dist <= MIN_ARC_DISTANCE {
        return None;
    }

    let lift_max = if dist > radius * 1.85 {
        3.25
    } else if dist > radius * 1.4 {
        2.3
    } else {
        1.5
    };
    let lift = map_range(dist, 0.0, radius * 2.0, 1.0, lift_max);
    let mid = project_latlon(great_circle_midpoint(open, merge), radius * lift);
    let guide = CubicBezier3::new(start, mid, mid, end);

    let t1 = map_range(dist, 10.0, 30.0, 0.2, 0.15);
    let t2 = map_range(dist, 10.0, 30.0, 0.8, 0.85);
    let scale = map_range(dist, 0.0, radius * 2.0, 1.0, 1.7);
    let curve = CubicBezier3::new(start, guide.point(t1) * scale, guide.point(t2) * scale, end);

    Some(ArcShape {
        curve,
        segments: MIN_ARC_SEGMENTS + curve.length().floor() as u32,
        landing: end,
    })
}

pub fn build_arcs(pairs: &[(LatLon, LatLon)], radius: f64) -> Vec<Option<ArcShape>> {
    pairs
        .iter()
        .map(|&(open, merge)| build_arc(open, merge, radius))
        .collect()
}

/// Spikes at each open location, height scaled by local density into
/// `[0.05 r, 0.2 r]`.
pub fn build_spikes(opens: &[LatLon], radius: f64) -> Vec<Option<SpikeShape>> {
    let bases: Vec<Option<Vec3>> = opens
        .iter()
        .map(|p| p.is_valid().then(|| project_latlon(*p, radius)))
        .collect();
    let densities = spike_densities(&bases, DENSITY_RADIUS);

    opens
        .iter()
        .zip(bases.iter().zip(&densities.values))
        .map(|(open, (base, density))| {
            let (base, density) = ((*base)?, (*density)?);
            let height = map_range(
                density as f64,
                densities.min as f64,
                densities.max as f64,
                radius * 0.05,
                radius * 0.2,
            );
            Some(SpikeShape {
                base,
                height,
                tip: project_latlon(*open, radius + height + SPIKE_TIP_OFFSET),
                density,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{EntityShape, MIN_ARC_SEGMENTS, build_arc, build_arcs, build_spikes};
    use foundation::math::{LatLon, project_latlon};

    const R: f64 = 25.0;

    #[test]
    fn arc_spans_open_to_merge_above_the_surface() {
        let open = LatLon::new(0.0, 0.0);
        let merge = LatLon::new(0.0, 90.0);
        let arc = build_arc(open, merge, R).expect("arc");

        assert_eq!(arc.curve.p0, project_latlon(open, R));
        assert_eq!(arc.curve.p3, project_latlon(merge, R));
        assert_eq!(arc.landing, arc.curve.p3);
        assert!(arc.curve.point(0.5).length() > R);
        assert!(arc.segments >= MIN_ARC_SEGMENTS + arc.curve.p0.distance(arc.curve.p3) as u32);
        assert_eq!(arc.draw_units(), arc.segments as f64);
    }

    #[test]
    fn far_pairs_rise_higher() {
        let open = LatLon::new(10.0, 0.0);
        let near = build_arc(open, LatLon::new(10.0, 30.0), R).expect("near");
        let far = build_arc(open, LatLon::new(-10.0, 170.0), R).expect("far");
        assert!(far.curve.point(0.5).length() > near.curve.point(0.5).length());
        assert!(far.segments > near.segments);
    }

    #[test]
    fn close_or_invalid_pairs_get_no_arc() {
        let open = LatLon::new(0.0, 0.0);
        assert!(build_arc(open, LatLon::new(0.0, 1.0), R).is_none());
        assert!(build_arc(open, open, R).is_none());
        assert!(build_arc(open, LatLon::new(999.0, 0.0), R).is_none());

        let arcs = build_arcs(&[(open, LatLon::new(0.0, 90.0)), (open, open)], R);
        assert!(arcs[0].is_some() && arcs[1].is_none());
    }

    #[test]
    fn spike_height_follows_density() {
        let opens = [
            LatLon::new(0.0, 0.0),
            LatLon::new(0.0, 1.0),
            LatLon::new(0.0, 120.0),
            LatLon::new(f64::NAN, 0.0),
        ];
        let spikes = build_spikes(&opens, R);
        let dense = spikes[0].expect("dense");
        let sparse = spikes[2].expect("sparse");

        assert!(spikes[3].is_none());
        assert_eq!(dense.density, 1);
        assert_eq!(sparse.density, 0);
        assert!((dense.height - R * 0.2).abs() < 1e-9);
        assert!((sparse.height - R * 0.05).abs() < 1e-9);
        assert!((dense.tip.length() - (R + dense.height + 0.25)).abs() < 1e-9);
        assert!((dense.base.length() - R).abs() < 1e-9);
    }
}
