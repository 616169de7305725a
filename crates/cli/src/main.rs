use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ratings_store::{MovieId, RatingsStore, Score, UserId, MAX_SCORE, MIN_SCORE};
use recommender::RatingPredictor;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// ReelRatings - collaborative-filtering rating explorer
#[derive(Parser)]
#[command(name = "reel-ratings")]
#[command(about = "Explore user similarity and rating predictions", long_about = None)]
struct Cli {
    /// Path to the MovieLens 100k dataset directory
    #[arg(short, long, default_value = "data/ml-100k")]
    data_dir: PathBuf,

    /// Emit machine-readable JSON where a command supports it
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pearson correlation between two users' rating histories
    Similarity {
        /// First user ID
        #[arg(long)]
        user_a: UserId,

        /// Second user ID
        #[arg(long)]
        user_b: UserId,
    },

    /// Rank every other user by correlation with the given user
    Neighbors {
        /// User ID to rank neighbors for
        #[arg(long)]
        user_id: UserId,

        /// Number of neighbors to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Predict a user's score for a movie they haven't rated
    Predict {
        /// User ID to predict for
        #[arg(long)]
        user_id: UserId,

        /// Movie ID to predict
        #[arg(long)]
        movie_id: MovieId,
    },

    /// Show a user's profile and rating history
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Show a movie's details and rating summary
    Movie {
        /// Movie ID to display
        #[arg(long)]
        movie_id: MovieId,

        /// Show this user's score, or a prediction if they haven't rated it
        #[arg(long)]
        viewer: Option<UserId>,
    },

    /// Record a score for a movie (in-memory only; the store is not written back)
    Rate {
        /// User submitting the score
        #[arg(long)]
        user_id: UserId,

        /// Movie being scored
        #[arg(long)]
        movie_id: MovieId,

        /// Score on the 1-5 scale
        #[arg(long)]
        score: Score,
    },

    /// Run concurrent predictions to test performance
    Benchmark {
        /// Number of predictions to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent predictions
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load the store (this may take a moment)
    println!("Loading ratings dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let mut store =
        RatingsStore::load_from_files(&cli.data_dir).context("Failed to load ratings dataset")?;
    let (users, movies, ratings) = store.counts();
    println!(
        "{} Loaded {} users, {} movies, {} ratings in {:?}",
        "✓".green(),
        users,
        movies,
        ratings,
        start.elapsed()
    );

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Similarity { user_a, user_b } => {
            handle_similarity(Arc::new(store), user_a, user_b, cli.json)?
        }
        Commands::Neighbors { user_id, limit } => {
            handle_neighbors(Arc::new(store), user_id, limit, cli.json)?
        }
        Commands::Predict { user_id, movie_id } => {
            handle_predict(Arc::new(store), user_id, movie_id, cli.json)?
        }
        Commands::User { user_id } => handle_user(Arc::new(store), user_id)?,
        Commands::Movie { movie_id, viewer } => handle_movie(Arc::new(store), movie_id, viewer)?,
        Commands::Rate {
            user_id,
            movie_id,
            score,
        } => handle_rate(&mut store, user_id, movie_id, score)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(Arc::new(store), requests, concurrent).await?,
    }

    Ok(())
}

/// Look up a user or fail with a readable error
fn require_user(store: &RatingsStore, user_id: UserId) -> Result<()> {
    store
        .get_user(user_id)
        .map(|_| ())
        .ok_or_else(|| anyhow!("User {} not found", user_id))
}

/// Round a raw prediction onto the display scale
fn display_score(prediction: f64) -> f64 {
    let clamped = prediction.clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE));
    (clamped * 10.0).round() / 10.0
}

/// Average score for a movie, if anyone has rated it
fn average_score(store: &RatingsStore, movie_id: MovieId) -> Option<f64> {
    let ratings = store.movie_ratings(movie_id);
    if ratings.is_empty() {
        return None;
    }
    let total: u32 = ratings.iter().map(|r| u32::from(r.score)).sum();
    Some(f64::from(total) / ratings.len() as f64)
}

/// Handle the 'similarity' command
fn handle_similarity(
    store: Arc<RatingsStore>,
    user_a: UserId,
    user_b: UserId,
    json: bool,
) -> Result<()> {
    require_user(&store, user_a)?;
    require_user(&store, user_b)?;

    let predictor = RatingPredictor::new(store);
    let correlation = predictor.similarity_between(user_a, user_b);

    if json {
        println!(
            "{}",
            json!({
                "user_a": user_a,
                "user_b": user_b,
                "correlation": correlation,
            })
        );
        return Ok(());
    }

    match correlation {
        Some(r) => println!(
            "Correlation between user {} and user {}: {}",
            user_a,
            user_b,
            format!("{:+.4}", r).bold()
        ),
        None => println!(
            "Users {} and {} have no overlapping ratings to compare",
            user_a, user_b
        ),
    }
    Ok(())
}

/// Handle the 'neighbors' command
fn handle_neighbors(
    store: Arc<RatingsStore>,
    user_id: UserId,
    limit: usize,
    json: bool,
) -> Result<()> {
    require_user(&store, user_id)?;

    let predictor = RatingPredictor::new(store);
    let mut neighbors = predictor.rank_neighbors(user_id);
    neighbors.truncate(limit);

    if json {
        let entries: Vec<_> = neighbors
            .iter()
            .map(|n| json!({"user_id": n.user_id, "correlation": n.correlation}))
            .collect();
        println!("{}", json!({"user_id": user_id, "neighbors": entries}));
        return Ok(());
    }

    if neighbors.is_empty() {
        println!("User {} has no correlated neighbors", user_id);
        return Ok(());
    }

    println!(
        "{}",
        format!("Closest neighbors of user {}:", user_id).bold().blue()
    );
    for (rank, neighbor) in neighbors.iter().enumerate() {
        println!(
            "{}. user {} ({})",
            (rank + 1).to_string().green(),
            neighbor.user_id,
            format!("{:+.4}", neighbor.correlation)
        );
    }
    Ok(())
}

/// Handle the 'predict' command
fn handle_predict(
    store: Arc<RatingsStore>,
    user_id: UserId,
    movie_id: MovieId,
    json: bool,
) -> Result<()> {
    require_user(&store, user_id)?;
    let title = store
        .get_movie(movie_id)
        .map(|m| m.title.clone())
        .ok_or_else(|| anyhow!("Movie {} not found", movie_id))?;

    let predictor = RatingPredictor::new(store);
    let prediction = predictor.predict(user_id, movie_id);

    if json {
        println!(
            "{}",
            json!({
                "user_id": user_id,
                "movie_id": movie_id,
                "title": title,
                "predicted": prediction,
                "display": prediction.map(display_score),
            })
        );
        return Ok(());
    }

    match prediction {
        Some(raw) => println!(
            "Predicted score for user {} on {}: {} (raw {:.4})",
            user_id,
            title.bold(),
            display_score(raw).to_string().green().bold(),
            raw
        ),
        None => println!(
            "No basis to predict a score for user {} on {} (nobody similar has rated it)",
            user_id,
            title.bold()
        ),
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(store: Arc<RatingsStore>, user_id: UserId) -> Result<()> {
    let user = store
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;
    let ratings = store.user_ratings(user_id);

    print!("{}", format!("User {}\n", user_id).bold().blue());
    if let Some(email) = &user.email {
        println!("{}Email: {}", "• ".green(), email);
    }
    if let Some(age) = user.age {
        println!("{}Age: {}", "• ".green(), age);
    }
    if let Some(zipcode) = &user.zipcode {
        println!("{}Zipcode: {}", "• ".green(), zipcode);
    }

    let num_ratings = ratings.len();
    let avg_score = if num_ratings > 0 {
        let total: u32 = ratings.iter().map(|r| u32::from(r.score)).sum();
        f64::from(total) / num_ratings as f64
    } else {
        0.0
    };
    println!("{}Number of ratings: {}", "• ".cyan(), num_ratings);
    println!("{}Average score: {:.2}", "• ".cyan(), avg_score);

    // Rated movies, best first
    let mut rated: Vec<_> = ratings.iter().collect();
    rated.sort_by(|a, b| b.score.cmp(&a.score));

    const SHOWN: usize = 15;
    println!("Rated movies:");
    for rating in rated.iter().take(SHOWN) {
        if let Some(movie) = store.get_movie(rating.movie_id) {
            println!("  - {} (score: {})", movie.title, rating.score);
        }
    }
    if rated.len() > SHOWN {
        println!("  ... and {} more", rated.len() - SHOWN);
    }
    Ok(())
}

/// Handle the 'movie' command
///
/// With --viewer, the viewer sees their own score if they rated the movie,
/// and a prediction otherwise.
fn handle_movie(store: Arc<RatingsStore>, movie_id: MovieId, viewer: Option<UserId>) -> Result<()> {
    let movie = store
        .get_movie(movie_id)
        .ok_or_else(|| anyhow!("Movie {} not found", movie_id))?
        .clone();
    let ratings = store.movie_ratings(movie_id);

    print!("{}", format!("{}\n", movie.title).bold().blue());
    if let Some(year) = movie.year {
        println!("{}Released: {}", "• ".green(), year);
    }
    if let Some(url) = &movie.imdb_url {
        println!("{}IMDb: {}", "• ".green(), url);
    }
    println!("{}Ratings: {}", "• ".cyan(), ratings.len());
    if let Some(avg) = average_score(&store, movie_id) {
        println!("{}Average score: {:.2}", "• ".cyan(), avg);
    }

    if let Some(viewer_id) = viewer {
        require_user(&store, viewer_id)?;

        let own_score = store
            .user_ratings(viewer_id)
            .iter()
            .find(|r| r.movie_id == movie_id)
            .map(|r| r.score);

        match own_score {
            Some(score) => println!("User {} rated this movie: {}", viewer_id, score),
            None => {
                let predictor = RatingPredictor::new(Arc::clone(&store));
                match predictor.predict(viewer_id, movie_id) {
                    Some(raw) => println!(
                        "Predicted score for user {}: {} (raw {:.4})",
                        viewer_id,
                        display_score(raw).to_string().green().bold(),
                        raw
                    ),
                    None => println!(
                        "Not enough shared rating history to predict a score for user {}",
                        viewer_id
                    ),
                }
            }
        }
    }
    Ok(())
}

/// Handle the 'rate' command
fn handle_rate(
    store: &mut RatingsStore,
    user_id: UserId,
    movie_id: MovieId,
    score: Score,
) -> Result<()> {
    require_user(store, user_id)?;
    if store.get_movie(movie_id).is_none() {
        return Err(anyhow!("Movie {} not found", movie_id));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(anyhow!(
            "Score {} is outside the {}-{} scale",
            score,
            MIN_SCORE,
            MAX_SCORE
        ));
    }

    let replaced = store.add_score(user_id, movie_id, score);

    if replaced {
        println!(
            "{} Updated user {}'s score for movie {} to {}",
            "✓".green(),
            user_id,
            movie_id,
            score
        );
    } else {
        println!(
            "{} Recorded score {} from user {} for movie {}",
            "✓".green(),
            score,
            user_id,
            movie_id
        );
    }
    if let Some(avg) = average_score(store, movie_id) {
        println!(
            "New average for movie {}: {:.2} over {} ratings",
            movie_id,
            avg,
            store.movie_ratings(movie_id).len()
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    store: Arc<RatingsStore>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("Nothing to benchmark with --requests 0"));
    }
    let user_ids = store.user_ids();
    let movie_ids = store.movie_ids();
    if user_ids.is_empty() || movie_ids.is_empty() {
        return Err(anyhow!("Dataset has no users or no movies"));
    }

    let predictor = Arc::new(RatingPredictor::new(store));
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrent.max(1)));

    info!(
        "Running {} predictions with concurrency {}",
        requests, concurrent
    );
    let wall_start = Instant::now();

    // Random (user, movie) pairs; predictions run on blocking threads since
    // the core is CPU-bound
    let mut handles = vec![];
    for _ in 0..requests {
        let user_id = user_ids[rand::random::<u32>() as usize % user_ids.len()];
        let movie_id = movie_ids[rand::random::<u32>() as usize % movie_ids.len()];
        let predictor = Arc::clone(&predictor);
        let semaphore = Arc::clone(&semaphore);

        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            tokio::task::spawn_blocking(move || predictor.predict(user_id, movie_id))
                .await
                .context("Prediction task panicked")?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }

    let total_time = wall_start.elapsed();
    let sum: std::time::Duration = timings.iter().sum();
    let avg_latency = sum / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[((timings.len() as f32 * 0.95) as usize).min(timings.len() - 1)];
    let p99 = timings[((timings.len() as f32 * 0.99) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} predictions/second", throughput);

    Ok(())
}
