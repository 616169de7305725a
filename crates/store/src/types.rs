//! Core domain types for the ratings application.
//!
//! This module defines the entities the recommender consumes and the
//! in-memory `RatingsStore` that answers queries over them. The store owns
//! all data; query methods hand out references and slices, never copies.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// A rating score on the 1-5 integer scale
pub type Score = u8;

// =============================================================================
// Entities
// =============================================================================

/// A user of the ratings application.
///
/// Users seeded from the MovieLens files carry age and zipcode; users who
/// registered through the web front end carry an email instead. All three
/// are optional so either population fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub age: Option<u8>,
    pub zipcode: Option<String>,
}

/// A movie that can be rated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Release year, when the source data carries one
    pub year: Option<u16>,
    pub imdb_url: Option<String>,
}

/// A single score one user gave one movie.
///
/// Unique per (user, movie) pair in practice. The loader does not enforce
/// uniqueness; interactive writes go through [`RatingsStore::add_score`],
/// which does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub score: Score,
}

// =============================================================================
// RatingsStore - The In-Memory Persistence Layer
// =============================================================================

/// Holds all users, movies, and ratings, indexed for the queries the
/// recommender needs: "all of a user's ratings" and "all ratings for a movie".
///
/// Queries are explicit read-only operations rather than ORM-style
/// relationship navigation, so there is no lazy loading and no cyclic
/// object graph to reason about.
#[derive(Debug, Default)]
pub struct RatingsStore {
    // Primary data stores
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) movies: HashMap<MovieId, Movie>,

    // Rating indices for fast lookups
    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,
}

impl RatingsStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    // Getters - these return references into the store, not owned values

    /// Get a user by ID
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if the user has no ratings
    pub fn user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings recorded for a movie
    pub fn movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All user IDs, sorted ascending.
    ///
    /// Sorted so that callers iterating the population (similarity ranking,
    /// benchmarks) see a deterministic order regardless of hash state.
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All movie IDs, sorted ascending
    pub fn movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.movies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get counts for logging/validation: (users, movies, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.users.len(), self.movies.len(), total_ratings)
    }

    // Mutators - used during loading and by the score-submission path

    /// Insert a user into the store
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert a movie into the store
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a rating and update both indices.
    ///
    /// Bulk-load path: does not check for an existing (user, movie) entry.
    pub fn insert_rating(&mut self, rating: Rating) {
        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(rating);

        self.movie_ratings
            .entry(rating.movie_id)
            .or_default()
            .push(rating);
    }

    /// Record a score from an interactive submission.
    ///
    /// If the user already rated this movie, their old score is replaced in
    /// both indices; otherwise a new rating is inserted. Returns `true` when
    /// an existing score was replaced.
    pub fn add_score(&mut self, user_id: UserId, movie_id: MovieId, score: Score) -> bool {
        let rating = Rating {
            user_id,
            movie_id,
            score,
        };

        let existing = self
            .user_ratings
            .get_mut(&user_id)
            .and_then(|ratings| ratings.iter_mut().find(|r| r.movie_id == movie_id));

        match existing {
            Some(slot) => {
                *slot = rating;
                // Keep the per-movie index in sync
                if let Some(by_movie) = self.movie_ratings.get_mut(&movie_id) {
                    if let Some(slot) = by_movie.iter_mut().find(|r| r.user_id == user_id) {
                        *slot = rating;
                    }
                }
                true
            }
            None => {
                self.insert_rating(rating);
                false
            }
        }
    }
}
