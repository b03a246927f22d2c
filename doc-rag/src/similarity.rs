//! Vector helpers: cosine similarity and mean vector.

/// Cosine similarity of two vectors.
///
/// Returns 0 for empty or dimension-mismatched inputs and for zero vectors.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let sim = dot / (na.sqrt() * nb.sqrt());
    if sim.is_finite() { sim } else { 0.0 }
}

/// Element-wise mean of the non-empty vectors sharing the majority dimension.
///
/// `None` when every vector is empty.
pub fn mean_vector(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let mut dims: Vec<(usize, usize)> = Vec::new();
    for v in vectors.iter().filter(|v| !v.is_empty()) {
        match dims.iter_mut().find(|(d, _)| *d == v.len()) {
            Some((_, n)) => *n += 1,
            None => dims.push((v.len(), 1)),
        }
    }
    // First-seen dimension wins ties.
    let (dim, count) = dims
        .iter()
        .copied()
        .fold(None, |best: Option<(usize, usize)>, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        })?;

    let mut acc = vec![0.0f32; dim];
    for v in vectors.iter().filter(|v| v.len() == dim) {
        for (a, x) in acc.iter_mut().zip(v) {
            *a += x;
        }
    }
    let n = count as f32;
    acc.iter_mut().for_each(|a| *a /= n);
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cosine_edge_cases() {
        assert_eq!(cosine(&[], &[]), 0.0);
        assert_eq!(cosine(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert!((cosine(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn mean_ignores_empty_and_minority_dims() {
        let vs = vec![vec![], vec![1.0, 3.0], vec![3.0, 5.0], vec![9.0]];
        assert_eq!(mean_vector(&vs), Some(vec![2.0, 4.0]));
        assert_eq!(mean_vector(&[vec![], vec![]]), None);
        assert_eq!(mean_vector(&[]), None);
    }

    proptest! {
        #[test]
        fn cosine_is_symmetric(
            pair in (1usize..16).prop_flat_map(|n| (
                prop::collection::vec(-100.0f32..100.0, n),
                prop::collection::vec(-100.0f32..100.0, n),
            ))
        ) {
            let (a, b) = pair;
            prop_assert_eq!(cosine(&a, &b), cosine(&b, &a));
        }

        #[test]
        fn cosine_is_bounded(
            pair in (1usize..16).prop_flat_map(|n| (
                prop::collection::vec(-100.0f32..100.0, n),
                prop::collection::vec(-100.0f32..100.0, n),
            ))
        ) {
            let (a, b) = pair;
            let c = cosine(&a, &b);
            prop_assert!((-1.0001..=1.0001).contains(&c));
        }
    }
}
