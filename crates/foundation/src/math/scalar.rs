use core::cmp::Ordering;

/// Position of `value` inside `[min, max]` as a fraction; 0 when the range is degenerate.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let n = (value - min) / (max - min);
    if n.is_finite() { n } else { 0.0 }
}

pub fn lerp(norm: f64, min: f64, max: f64) -> f64 {
    (max - min) * norm + min
}

/// Linear remap from `[src_min, src_max]` to `[dst_min, dst_max]`, unclamped.
pub fn map_range(value: f64, src_min: f64, src_max: f64, dst_min: f64, dst_max: f64) -> f64 {
    lerp(normalize(value, src_min, src_max), dst_min, dst_max)
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Deterministic total ordering for floats (`-0.0 == 0.0`, all NaNs equal).
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp, map_range, normalize, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn map_range_is_linear_and_unclamped() {
        assert_eq!(map_range(5.0, 0.0, 10.0, 1.0, 3.0), 2.0);
        assert_eq!(map_range(20.0, 0.0, 10.0, 0.0, 1.0), 2.0);
        assert_eq!(map_range(10.0, 10.0, 30.0, 0.2, 0.15), 0.2);
    }

    #[test]
    fn degenerate_range_maps_to_destination_min() {
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.0);
        assert_eq!(map_range(3.0, 3.0, 3.0, 1.25, 5.0), 1.25);
    }

    #[test]
    fn clamp_and_ordering() {
        assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
    }
}
