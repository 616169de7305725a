//! Pairwise user similarity from shared movie ratings.
//!
//! Two users are compared only over the movies both of them rated. The
//! matched score pairs feed the Pearson correlation; a user pair with no
//! overlap never reaches the correlation function at all, so disjoint
//! rating histories have no division-by-zero path to hit.

use crate::correlation::pearson;
use ratings_store::{MovieId, Rating, Score};
use std::collections::HashMap;

/// Collect the matched score pairs for the movies both users rated.
///
/// Builds a movie -> score map from `a`'s history, then walks `b`'s history
/// emitting one `(score_a, score_b)` pair per movie found in the map. If `a`
/// somehow rated a movie twice, the last score seen wins; that is a data
/// anomaly upstream, not something this layer corrects.
pub fn shared_score_pairs(a: &[Rating], b: &[Rating]) -> Vec<(f64, f64)> {
    let mut scores_a: HashMap<MovieId, Score> = HashMap::with_capacity(a.len());
    for rating in a {
        scores_a.insert(rating.movie_id, rating.score);
    }

    b.iter()
        .filter_map(|rating| {
            scores_a
                .get(&rating.movie_id)
                .map(|&score_a| (f64::from(score_a), f64::from(rating.score)))
        })
        .collect()
}

/// Similarity between two users' rating histories.
///
/// Returns the Pearson correlation over the movies both rated, or `None`
/// when it is undefined: no shared movies, or no variance among the shared
/// scores. Symmetric up to floating-point rounding.
pub fn similarity(a: &[Rating], b: &[Rating]) -> Option<f64> {
    let pairs = shared_score_pairs(a, b);
    if pairs.is_empty() {
        return None;
    }
    pearson(&pairs)
}
