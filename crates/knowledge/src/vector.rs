//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and ranking of embedded passages.

use docbot_core::retriever::Document;

/// A documentation passage with its embedding.
#[derive(Debug, Clone)]
pub struct Passage {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if the vectors differ in length, are empty, or either is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |acc, (x, y)| {
        let (x, y) = (*x as f64, *y as f64);
        (acc.0 + x * y, acc.1 + x * x, acc.2 + y * y)
    });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank passages by cosine similarity to `query`.
///
/// Returns at most `limit` documents, best first, each with `score` set to its
/// similarity. Passages scoring below `min_score` are dropped.
pub fn rank_passages(
    passages: &[Passage],
    query: &[f32],
    limit: usize,
    min_score: f32,
) -> Vec<Document> {
    let mut scored: Vec<Document> = passages
        .iter()
        .filter_map(|passage| {
            let score = cosine_similarity(&passage.embedding, query);
            (score >= min_score).then(|| Document {
                score,
                ..passage.document.clone()
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
