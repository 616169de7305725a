//! Benchmarks for the recommendation core
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a synthetic population of a few hundred users so the benchmark
//! needs no dataset on disk, matching the scale the predictor targets.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ratings_store::{Movie, Rating, RatingsStore, User};
use recommender::{similarity, RatingPredictor};
use std::sync::Arc;

const USERS: u32 = 300;
const MOVIES: u32 = 120;

/// Build a deterministic population: each user rates a sliding window of
/// movies with scores that vary by (user, movie), so histories overlap and
/// correlations are well defined.
fn build_synthetic_store() -> Arc<RatingsStore> {
    let mut store = RatingsStore::new();

    for user_id in 1..=USERS {
        store.insert_user(User {
            id: user_id,
            email: None,
            age: Some((20 + user_id % 50) as u8),
            zipcode: None,
        });
    }

    for movie_id in 1..=MOVIES {
        store.insert_movie(Movie {
            id: movie_id,
            title: format!("Movie {}", movie_id),
            year: Some(1990 + (movie_id % 10) as u16),
            imdb_url: None,
        });
    }

    for user_id in 1..=USERS {
        // 40 movies per user, offset by user id so histories overlap
        for step in 0..40 {
            let movie_id = (user_id + step * 3) % MOVIES + 1;
            let score = ((user_id + movie_id + step) % 5 + 1) as u8;
            store.insert_rating(Rating {
                user_id,
                movie_id,
                score,
            });
        }
    }

    Arc::new(store)
}

fn bench_pairwise_similarity(c: &mut Criterion) {
    let store = build_synthetic_store();
    let a = store.user_ratings(1);
    let b = store.user_ratings(2);

    c.bench_function("pairwise_similarity", |bencher| {
        bencher.iter(|| black_box(similarity(black_box(a), black_box(b))))
    });
}

fn bench_rank_neighbors(c: &mut Criterion) {
    let store = build_synthetic_store();
    let predictor = RatingPredictor::new(store);

    c.bench_function("rank_neighbors", |bencher| {
        bencher.iter(|| {
            let neighbors = predictor.rank_neighbors(black_box(1));
            black_box(neighbors)
        })
    });
}

fn bench_predict(c: &mut Criterion) {
    let store = build_synthetic_store();
    let predictor = RatingPredictor::new(store);

    c.bench_function("predict", |bencher| {
        bencher.iter(|| black_box(predictor.predict(black_box(1), black_box(77))))
    });
}

criterion_group!(
    benches,
    bench_pairwise_similarity,
    bench_rank_neighbors,
    bench_predict
);
criterion_main!(benches);
