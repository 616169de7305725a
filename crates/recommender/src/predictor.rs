//! Rating prediction from correlated users.
//!
//! ## Algorithm
//! 1. Correlate the target user against every other user in the store
//! 2. Keep only the users with a defined correlation
//! 3. Join them against the set of users who rated the target movie
//! 4. Predict with the correlation-weighted average of their scores
//!
//! Every step that could divide by zero (no overlap, no variance, empty
//! or cancelled-out weight set) comes back as `None` instead, and the
//! caller decides what to show.

use crate::correlation::pearson;
use crate::similarity::shared_score_pairs;
use ratings_store::{MovieId, Rating, RatingsStore, Score, UserId};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Another user together with their correlation to the target user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub user_id: UserId,
    pub correlation: f64,
}

/// Predicts unseen ratings from a shared, read-only store snapshot.
///
/// The predictor holds no mutable state, so one instance can serve any
/// number of concurrent predictions as long as the snapshot it was built
/// over is not mutated underneath it.
pub struct RatingPredictor {
    /// Shared reference to the store (read-only, so no Mutex needed)
    store: Arc<RatingsStore>,

    /// Minimum number of shared movies before a correlation counts
    min_overlap: usize,
}

impl RatingPredictor {
    /// Create a new predictor over a loaded store
    pub fn new(store: Arc<RatingsStore>) -> Self {
        Self {
            store,
            // Any overlap at all is considered computable. A single
            // shared movie still yields `None` because one pair has no
            // variance.
            min_overlap: 1,
        }
    }

    /// Require at least `min` shared movies before correlating (default: 1)
    pub fn with_min_overlap(mut self, min: usize) -> Self {
        self.min_overlap = min;
        self
    }

    /// Correlation between two users' histories, honoring `min_overlap`
    pub fn similarity_between(&self, a: UserId, b: UserId) -> Option<f64> {
        self.correlate(self.store.user_ratings(a), self.store.user_ratings(b))
    }

    fn correlate(&self, a: &[Rating], b: &[Rating]) -> Option<f64> {
        let pairs = shared_score_pairs(a, b);
        if pairs.is_empty() || pairs.len() < self.min_overlap {
            return None;
        }
        pearson(&pairs)
    }

    /// Correlate the target user against every other user in the store.
    ///
    /// The target user is excluded from its own comparison set: self
    /// similarity is trivially 1.0 and would dominate the prediction
    /// weights. Users with an undefined correlation are dropped. The
    /// result is sorted strongest-first, ties broken by user id so the
    /// ordering is deterministic.
    #[instrument(skip(self))]
    pub fn rank_neighbors(&self, user_id: UserId) -> Vec<Neighbor> {
        let target = self.store.user_ratings(user_id);
        let user_ids = self.store.user_ids();

        let mut neighbors: Vec<Neighbor> = user_ids
            .par_iter()
            .filter_map(|&other| {
                if other == user_id {
                    return None;
                }
                let correlation = self.correlate(target, self.store.user_ratings(other))?;
                Some(Neighbor {
                    user_id: other,
                    correlation,
                })
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.correlation
                .partial_cmp(&a.correlation)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        debug!(
            "Found {} correlated neighbors for user {}",
            neighbors.len(),
            user_id
        );
        neighbors
    }

    /// Predict the target user's score for a movie they haven't rated.
    ///
    /// Returns the correlation-weighted average of the scores given by
    /// correlated users who rated the movie, or `None` when no such user
    /// exists or the correlation weights sum to zero. The result is a real
    /// number on no particular grid; callers round or clamp for display.
    #[instrument(skip(self))]
    pub fn predict(&self, user_id: UserId, movie_id: MovieId) -> Option<f64> {
        let neighbors = self.rank_neighbors(user_id);

        // Who actually rated this movie
        let scores: HashMap<UserId, Score> = self
            .store
            .movie_ratings(movie_id)
            .iter()
            .map(|r| (r.user_id, r.score))
            .collect();

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        let mut matched = 0usize;

        for neighbor in &neighbors {
            if let Some(&score) = scores.get(&neighbor.user_id) {
                weighted_sum += neighbor.correlation * f64::from(score);
                weight_total += neighbor.correlation;
                matched += 1;
            }
        }

        debug!(
            "{} of {} neighbors rated movie {}",
            matched,
            neighbors.len(),
            movie_id
        );

        if matched == 0 || weight_total == 0.0 {
            return None;
        }

        Some(weighted_sum / weight_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratings_store::{Movie, User};

    fn insert_user(store: &mut RatingsStore, id: UserId) {
        store.insert_user(User {
            id,
            email: None,
            age: None,
            zipcode: None,
        });
    }

    fn insert_movie(store: &mut RatingsStore, id: MovieId) {
        store.insert_movie(Movie {
            id,
            title: format!("Movie {}", id),
            year: Some(1996),
            imdb_url: None,
        });
    }

    fn rate(store: &mut RatingsStore, user_id: UserId, movie_id: MovieId, score: Score) {
        store.insert_rating(Rating {
            user_id,
            movie_id,
            score,
        });
    }

    /// U1 rates M1=5, M2=3; U2 rates M1=5, M2=3, M3=4; U3 rates M1=5, M2=3.
    /// U3's history matches both perfectly, but only U2 has seen M3.
    fn create_test_store() -> RatingsStore {
        let mut store = RatingsStore::new();
        for user_id in 1..=3 {
            insert_user(&mut store, user_id);
        }
        for movie_id in 1..=3 {
            insert_movie(&mut store, movie_id);
        }

        rate(&mut store, 1, 1, 5);
        rate(&mut store, 1, 2, 3);

        rate(&mut store, 2, 1, 5);
        rate(&mut store, 2, 2, 3);
        rate(&mut store, 2, 3, 4);

        rate(&mut store, 3, 1, 5);
        rate(&mut store, 3, 2, 3);

        store
    }

    #[test]
    fn test_similarity_between_perfect_match() {
        let predictor = RatingPredictor::new(Arc::new(create_test_store()));

        let r = predictor.similarity_between(3, 2).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_similarity_between_unknown_user_is_undefined() {
        let predictor = RatingPredictor::new(Arc::new(create_test_store()));

        assert_eq!(predictor.similarity_between(3, 999), None);
    }

    #[test]
    fn test_rank_neighbors_excludes_self() {
        let predictor = RatingPredictor::new(Arc::new(create_test_store()));

        let neighbors = predictor.rank_neighbors(3);
        assert!(neighbors.iter().all(|n| n.user_id != 3));
        assert_eq!(neighbors.len(), 2);
    }

    #[test]
    fn test_rank_neighbors_sorted_descending() {
        let mut store = create_test_store();
        // User 4 disagrees with user 3 on movies 1 and 2
        insert_user(&mut store, 4);
        rate(&mut store, 4, 1, 3);
        rate(&mut store, 4, 2, 5);

        let predictor = RatingPredictor::new(Arc::new(store));
        let neighbors = predictor.rank_neighbors(3);

        assert_eq!(neighbors.len(), 3);
        for pair in neighbors.windows(2) {
            assert!(pair[0].correlation >= pair[1].correlation);
        }
        // Users 1 and 2 correlate at 1.0, user 4 at -1.0
        assert_eq!(neighbors[2].user_id, 4);
        assert!(neighbors[2].correlation < 0.0);
    }

    #[test]
    fn test_min_overlap_filters_thin_evidence() {
        let mut store = create_test_store();
        insert_movie(&mut store, 4);
        insert_user(&mut store, 4);
        // User 4 shares only movies 1 and 2 with user 3
        rate(&mut store, 4, 1, 5);
        rate(&mut store, 4, 2, 1);

        let store = Arc::new(store);
        let lenient = RatingPredictor::new(Arc::clone(&store));
        assert!(lenient.similarity_between(3, 4).is_some());

        let strict = RatingPredictor::new(store).with_min_overlap(3);
        assert_eq!(strict.similarity_between(3, 4), None);
    }

    #[test]
    fn test_predict_weighted_by_perfect_neighbor() {
        let predictor = RatingPredictor::new(Arc::new(create_test_store()));

        // Only U2 rated M3; sim(U3, U2) = 1.0, so the prediction is
        // (1.0 * 4) / 1.0 = 4.0
        let predicted = predictor.predict(3, 3).unwrap();
        assert!((predicted - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_no_rater_means_no_basis() {
        let mut store = create_test_store();
        insert_movie(&mut store, 9);

        let predictor = RatingPredictor::new(Arc::new(store));
        assert_eq!(predictor.predict(3, 9), None);
    }

    #[test]
    fn test_predict_no_correlated_user_means_no_basis() {
        let mut store = create_test_store();
        // User 5 shares no movies with anyone, so every similarity is
        // undefined, even though others rated movie 1
        insert_user(&mut store, 5);
        insert_movie(&mut store, 7);
        rate(&mut store, 5, 7, 4);

        let predictor = RatingPredictor::new(Arc::new(store));
        assert_eq!(predictor.predict(5, 1), None);
    }

    #[test]
    fn test_predict_cancelled_weights_mean_no_basis() {
        let mut store = RatingsStore::new();
        for user_id in 1..=3 {
            insert_user(&mut store, user_id);
        }
        for movie_id in 1..=4 {
            insert_movie(&mut store, movie_id);
        }

        // Target user 1
        rate(&mut store, 1, 1, 5);
        rate(&mut store, 1, 2, 3);
        // User 2 agrees exactly (correlation +1) and rated movie 4
        rate(&mut store, 2, 1, 5);
        rate(&mut store, 2, 2, 3);
        rate(&mut store, 2, 4, 4);
        // User 3 disagrees exactly (correlation -1) and rated movie 4
        rate(&mut store, 3, 1, 3);
        rate(&mut store, 3, 2, 5);
        rate(&mut store, 3, 4, 2);

        let predictor = RatingPredictor::new(Arc::new(store));
        // Weights +1 and -1 sum to zero; dividing would be the old crash
        assert_eq!(predictor.predict(1, 4), None);
    }

    #[test]
    fn test_predict_is_idempotent() {
        let predictor = RatingPredictor::new(Arc::new(create_test_store()));

        let first = predictor.predict(3, 3);
        let second = predictor.predict(3, 3);
        assert_eq!(first, second);
    }
}
