use foundation::math::Vec3;

/// Distance, in world units, under which two spikes count as neighbours.
pub const DENSITY_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Densities {
    /// Neighbour count per input slot; `None` where the slot had no position.
    pub values: Vec<Option<u32>>,
    pub min: u32,
    pub max: u32,
}

/// Counts, for every present point, how many other points lie within `radius`.
///
/// All-pairs, O(n²). Runs once per dataset load.
pub fn spike_densities(points: &[Option<Vec3>], radius: f64) -> Densities {
    let present: Vec<(usize, Vec3)> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.map(|p| (i, p)))
        .collect();

    let mut values = vec![None; points.len()];
    let mut min = u32::MAX;
    let mut max = 0;

    for &(i, a) in &present {
        let count = present
            .iter()
            .filter(|&&(j, b)| i != j && a.distance(b) <= radius)
            .count() as u32;
        values[i] = Some(count);
        if count < min {
            min = count;
        }
        if count > max {
            max = count;
        }
    }

    if present.is_empty() {
        min = 0;
    }
    Densities { values, min, max }
}
