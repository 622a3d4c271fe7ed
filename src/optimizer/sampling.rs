use fastrand::Rng;

/// Draws an index with probability proportional to its weight.
///
/// Weights need not be normalised. Returns `None` when there is nothing to
/// draw: an empty slice, a negative or non-finite weight, or a zero total.
pub fn sample_weighted(weights: &[f64], rng: &mut Rng) -> Option<usize> {
    let mut total = 0.0;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if !w.is_finite() || w < 0.0 {
            return None;
        }
        if w > 0.0 {
            total += w;
            last_positive = Some(i);
        }
    }
    if total <= 0.0 {
        return None;
    }

    let target = rng.f64() * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w == 0.0 {
            continue;
        }
        cumulative += w;
        if target < cumulative {
            return Some(i);
        }
    }

    // Rounding can leave target just above the final cumulative sum
    last_positive
}
