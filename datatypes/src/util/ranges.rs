pub fn value_in_range_inclusive<T>(value: T, min: T, max: T) -> bool
where
    T: PartialOrd,
{
    (value >= min) && (value <= max)
}

/// Computes the inclusive overlap of two inclusive ranges. Returns `None` if they do not overlap.
pub fn overlap_inclusive<T>(a: (T, T), b: (T, T)) -> Option<(T, T)>
where
    T: PartialOrd + Copy,
{
    let (a_min, a_max) = a;
    let (b_min, b_max) = b;

    if a_min > b_max || b_min > a_max {
        return None;
    }

    let min = if a_min >= b_min { a_min } else { b_min };
    let max = if a_max <= b_max { a_max } else { b_max };

    Some((min, max))
}
