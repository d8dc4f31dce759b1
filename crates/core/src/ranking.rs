use crate::models::{Chunk, ScoredChunk};

/// Cosine similarity. A zero-norm vector on either side, mismatched lengths
/// and non-finite results all score 0.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    let (dot, left_norm, right_norm) = left.iter().zip(right).fold(
        (0f64, 0f64, 0f64),
        |(dot, left_norm, right_norm), (l, r)| {
            let (l, r) = (f64::from(*l), f64::from(*r));
            (dot + l * r, left_norm + l * l, right_norm + r * r)
        },
    );

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }

    let score = dot / (left_norm.sqrt() * right_norm.sqrt());
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Chunks ordered by descending score. Equal scores keep generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList {
    entries: Vec<ScoredChunk>,
}

impl RankedList {
    /// The first `min(k, len)` entries. Never pads.
    pub fn into_top_k(mut self, k: usize) -> Vec<ScoredChunk> {
        self.entries.truncate(k);
        self.entries
    }
}

/// Scores every chunk against the query. `chunk_vectors[i]` belongs to
/// `chunks[i]`; the caller guarantees equal lengths.
pub fn rank_chunks(query_vector: &[f32], chunks: Vec<Chunk>, chunk_vectors: &[Vec<f32>]) -> RankedList {
    let mut entries: Vec<ScoredChunk> = chunks
        .into_iter()
        .zip(chunk_vectors)
        .map(|(chunk, vector)| ScoredChunk {
            score: cosine_similarity(query_vector, vector),
            chunk,
        })
        .collect();

    // `sort_by` is stable, so ties stay in generation order.
    entries.sort_by(|left, right| right.score.total_cmp(&left.score));

    RankedList { entries }
}
