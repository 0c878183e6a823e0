use crate::index::SparseVector;
use crate::Position;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub position: Position,
    pub score: f32,
}

/// Cosine similarity of two rows. Rows are unit length or zero, so this is the dot product;
/// a zero row scores 0 against everything, itself included.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f32 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }
    a.dot(b).clamp(0.0, 1.0)
}

/// Scores every corpus row against `query`, skips `exclude`, and returns the best `k`
/// ordered by score descending then position ascending.
pub fn rank(query: &SparseVector, corpus: &[SparseVector], exclude: Position, k: usize) -> Vec<Scored> {
    let mut scored: Vec<Scored> = corpus
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != exclude)
        .map(|(position, row)| Scored { position, score: cosine(query, row) })
        .collect();

    let by_rank = |a: &Scored, b: &Scored| -> Ordering {
        b.score.total_cmp(&a.score).then(a.position.cmp(&b.position))
    };
    if k < scored.len() {
        scored.select_nth_unstable_by(k, by_rank);
        scored.truncate(k);
    }
    scored.sort_by(by_rank);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(entries: &[(u32, f32)]) -> SparseVector {
        SparseVector::from_entries(entries.to_vec())
    }

    #[test]
    fn excludes_query_row() {
        let corpus = vec![v(&[(0, 1.0)]), v(&[(0, 1.0)]), v(&[(1, 1.0)])];
        let out = rank(&corpus[0], &corpus, 0, 5);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|s| s.position != 0));
        assert_eq!(out[0], Scored { position: 1, score: 1.0 });
    }

    #[test]
    fn ties_break_by_position() {
        let corpus = vec![v(&[(0, 1.0)]), v(&[(1, 1.0)]), v(&[(2, 1.0)]), v(&[(3, 1.0)])];
        let out = rank(&corpus[0], &corpus, 0, 2);
        let positions: Vec<_> = out.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn truncates_to_k() {
        let corpus: Vec<_> = (0..10).map(|i| v(&[(0, 0.6), (i + 1, 0.8)])).collect();
        let out = rank(&corpus[3], &corpus, 3, 5);
        assert_eq!(out.len(), 5);
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn zero_vector_scores_zero() {
        let zero = SparseVector::default();
        assert_eq!(cosine(&zero, &zero), 0.0);
        assert_eq!(cosine(&zero, &v(&[(0, 1.0)])), 0.0);
    }
}
