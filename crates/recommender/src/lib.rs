//! # Recommender Crate
//!
//! Item-anonymous collaborative filtering over the ratings store.
//!
//! ## Components
//!
//! ### Correlation
//! The Pearson product-moment coefficient over paired observations, with
//! `None` for the undefined cases instead of a division-by-zero fault.
//!
//! ### Similarity
//! Matches two users' histories on the movies both rated and correlates
//! the paired scores.
//!
//! ### Predictor
//! Correlates a target user against the whole population and predicts an
//! unseen movie's score as the correlation-weighted average of the scores
//! given by users who rated it.
//!
//! ## Example Usage
//!
//! ```ignore
//! use ratings_store::RatingsStore;
//! use recommender::RatingPredictor;
//! use std::sync::Arc;
//!
//! let store = Arc::new(RatingsStore::load_from_files("data/ml-100k".as_ref())?);
//! let predictor = RatingPredictor::new(store);
//!
//! match predictor.predict(13, 50) {
//!     Some(score) => println!("Predicted score: {:.2}", score),
//!     None => println!("No basis for a prediction"),
//! }
//! ```
//!
//! All three layers are pure and re-entrant: any number of predictions may
//! run concurrently over one immutable store snapshot.

// Public modules
pub mod correlation;
pub mod predictor;
pub mod similarity;

// Re-export commonly used items
pub use correlation::pearson;
pub use predictor::{Neighbor, RatingPredictor};
pub use similarity::{shared_score_pairs, similarity};
