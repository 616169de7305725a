//! # Ratings Store Crate
//!
//! In-memory persistence layer for the ratings application.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (User, Movie, Rating, RatingsStore)
//! - **parser**: Parse the MovieLens 100k seed files into Rust structs
//! - **load**: Build and validate a store from a data directory
//! - **error**: Error types for loading and validation
//!
//! ## Example Usage
//!
//! ```ignore
//! use ratings_store::RatingsStore;
//! use std::path::Path;
//!
//! // Load the entire dataset
//! let store = RatingsStore::load_from_files(Path::new("data/ml-100k"))?;
//!
//! // Query data
//! let user = store.get_user(1).unwrap();
//! let their_ratings = store.user_ratings(1);
//! let movie_ratings = store.movie_ratings(50);
//!
//! println!("User {} rated {} movies", user.id, their_ratings.len());
//! ```
//!
//! The store is read-only once loaded; the recommender treats each loaded
//! store as an immutable snapshot and can be shared behind `Arc`.

// Public modules
pub mod error;
pub mod load;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
pub use load::{MAX_SCORE, MIN_SCORE};
pub use types::{Movie, MovieId, Rating, RatingsStore, Score, User, UserId};
