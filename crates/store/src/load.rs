//! Loading and validating the dataset.
//!
//! Builds a `RatingsStore` from the three seed files, then checks the
//! referential integrity the recommender assumes: every rating points at a
//! known user and movie, and every score is on the 1-5 scale.

use crate::error::{Result, StoreError};
use crate::parser;
use crate::types::RatingsStore;
use std::path::Path;

/// Lowest score a user can give
pub const MIN_SCORE: u8 = 1;
/// Highest score a user can give
pub const MAX_SCORE: u8 = 5;

impl RatingsStore {
    /// Load the dataset from a directory containing `u.user`, `u.item`,
    /// and `u.data`.
    ///
    /// Steps:
    /// 1. Parse all three files in parallel
    /// 2. Build the primary maps and rating indices
    /// 3. Validate referential integrity and score range
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        let users_path = data_dir.join("u.user");
        let movies_path = data_dir.join("u.item");
        let ratings_path = data_dir.join("u.data");

        // Nested joins give three-way parallel parsing
        let ((users, movies), ratings) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_movies(&movies_path),
                )
            },
            || parser::parse_ratings(&ratings_path),
        );

        let users = users?;
        let movies = movies?;
        let ratings = ratings?;

        let mut store = RatingsStore::new();

        for user in users {
            store.insert_user(user);
        }
        for movie in movies {
            store.insert_movie(movie);
        }
        for rating in ratings {
            store.insert_rating(rating);
        }

        store.validate()?;

        Ok(store)
    }

    /// Validate the loaded data.
    ///
    /// Checks that:
    /// - every rating's user exists
    /// - every rating's movie exists
    /// - every score is within 1-5
    pub fn validate(&self) -> Result<()> {
        for ratings in self.user_ratings.values() {
            for rating in ratings {
                if !self.users.contains_key(&rating.user_id) {
                    return Err(StoreError::MissingReference {
                        entity: "User".to_string(),
                        id: rating.user_id,
                    });
                }
                if !self.movies.contains_key(&rating.movie_id) {
                    return Err(StoreError::MissingReference {
                        entity: "Movie".to_string(),
                        id: rating.movie_id,
                    });
                }
                if rating.score < MIN_SCORE || rating.score > MAX_SCORE {
                    return Err(StoreError::InvalidValue {
                        field: "score".to_string(),
                        value: rating.score.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
