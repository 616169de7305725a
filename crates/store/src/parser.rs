//! Parsers for the MovieLens 100k data files the application seeds from:
//! - `u.user`: userId|age|gender|occupation|zipcode
//! - `u.item`: movieId|title|release date|video release date|IMDb URL|genre flags...
//! - `u.data`: userId <tab> movieId <tab> score <tab> timestamp
//!
//! Each file is line-oriented. Per-line parse failures are reported with the
//! file name and line number so bad seed data is easy to track down.

use crate::error::{Result, StoreError};
use crate::types::{Movie, Rating, User};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a file with ISO-8859-1 encoding (Latin-1).
///
/// The MovieLens dataset is not UTF-8; movie titles contain accented Latin-1
/// bytes. Each Latin-1 byte maps directly to the same Unicode code point, so
/// a per-byte char conversion is a faithful decode.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Pull the next field out of a split line, with parse-error context
fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| StoreError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {}", name),
    })
}

/// Parse a numeric field, reporting the field name on failure
fn parse_number<T: std::str::FromStr>(
    value: &str,
    file: &str,
    line: usize,
    name: &str,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| StoreError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", name, e),
    })
}

// =============================================================================
// u.user
// =============================================================================

/// Parse one `u.user` line: userId|age|gender|occupation|zipcode
///
/// Gender and occupation are demographic noise as far as this application is
/// concerned and are skipped; age and zipcode survive because the user
/// details view shows them.
fn parse_user_line(line: &str, line_no: usize) -> Result<User> {
    const FILE: &str = "u.user";
    let mut parts = line.split('|');

    let user_id = next_field(&mut parts, FILE, line_no, "userId")?;
    let age = next_field(&mut parts, FILE, line_no, "age")?;
    let _gender = next_field(&mut parts, FILE, line_no, "gender")?;
    let _occupation = next_field(&mut parts, FILE, line_no, "occupation")?;
    let zipcode = next_field(&mut parts, FILE, line_no, "zipcode")?;

    Ok(User {
        id: parse_number(user_id, FILE, line_no, "userId")?,
        email: None,
        age: Some(parse_number(age, FILE, line_no, "age")?),
        zipcode: Some(zipcode.to_string()),
    })
}

/// Parse the `u.user` file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    let lines = read_lines_latin1(path)?;
    let mut users = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        users.push(parse_user_line(trimmed, line_no)?);
    }

    Ok(users)
}

// =============================================================================
// u.item
// =============================================================================

/// Parse one `u.item` line: movieId|title|release date|video date|IMDb URL|...
///
/// The trailing genre flag columns are ignored. Release dates look like
/// "01-Jan-1995"; only the year matters for display.
fn parse_movie_line(line: &str, line_no: usize) -> Result<Movie> {
    const FILE: &str = "u.item";
    let mut parts = line.split('|');

    let movie_id = next_field(&mut parts, FILE, line_no, "movieId")?;
    let title = next_field(&mut parts, FILE, line_no, "title")?;
    let release_date = next_field(&mut parts, FILE, line_no, "release date")?;
    let _video_date = next_field(&mut parts, FILE, line_no, "video release date")?;
    let imdb_url = next_field(&mut parts, FILE, line_no, "IMDb URL")?;

    Ok(Movie {
        id: parse_number(movie_id, FILE, line_no, "movieId")?,
        title: title.to_string(),
        year: extract_release_year(release_date),
        imdb_url: if imdb_url.is_empty() {
            None
        } else {
            Some(imdb_url.to_string())
        },
    })
}

/// Parse the `u.item` file
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let lines = read_lines_latin1(path)?;
    let mut movies = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        movies.push(parse_movie_line(trimmed, line_no)?);
    }

    Ok(movies)
}

/// Extract the year from a "01-Jan-1995" release date
///
/// A handful of entries have an empty date; those get `None`.
fn extract_release_year(date: &str) -> Option<u16> {
    let year_str = date.rsplit('-').next()?;
    year_str.parse::<u16>().ok()
}

// =============================================================================
// u.data
// =============================================================================

/// Parse one `u.data` line: userId <tab> movieId <tab> score <tab> timestamp
///
/// The timestamp is when the rating was entered; nothing downstream uses it,
/// so it is parsed for shape but dropped.
fn parse_rating_line(line: &str, line_no: usize) -> Result<Rating> {
    const FILE: &str = "u.data";
    let mut parts = line.split('\t');

    let user_id = next_field(&mut parts, FILE, line_no, "userId")?;
    let movie_id = next_field(&mut parts, FILE, line_no, "movieId")?;
    let score = next_field(&mut parts, FILE, line_no, "score")?;
    let timestamp = next_field(&mut parts, FILE, line_no, "timestamp")?;
    let _: i64 = parse_number(timestamp, FILE, line_no, "timestamp")?;

    Ok(Rating {
        user_id: parse_number(user_id, FILE, line_no, "userId")?,
        movie_id: parse_number(movie_id, FILE, line_no, "movieId")?,
        score: parse_number(score, FILE, line_no, "score")?,
    })
}

/// Parse the `u.data` file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let lines = read_lines_latin1(path)?;
    let mut ratings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        ratings.push(parse_rating_line(trimmed, line_no)?);
    }

    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_line() {
        let user = parse_user_line("1|24|M|technician|85711", 1).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.age, Some(24));
        assert_eq!(user.zipcode.as_deref(), Some("85711"));
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_parse_user_line_missing_field() {
        let err = parse_user_line("1|24|M", 7).unwrap_err();
        match err {
            StoreError::ParseError { file, line, .. } => {
                assert_eq!(file, "u.user");
                assert_eq!(line, 7);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_movie_line() {
        let line = "1|Toy Story (1995)|01-Jan-1995||http://us.imdb.com/M/title-exact?Toy%20Story%20(1995)|0|0|0|1|1";
        let movie = parse_movie_line(line, 1).unwrap();
        assert_eq!(movie.id, 1);
        assert_eq!(movie.title, "Toy Story (1995)");
        assert_eq!(movie.year, Some(1995));
        assert!(movie.imdb_url.unwrap().contains("imdb.com"));
    }

    #[test]
    fn test_parse_movie_line_empty_date() {
        let line = "267|unknown||||0|0|0|0";
        let movie = parse_movie_line(line, 1).unwrap();
        assert_eq!(movie.year, None);
        assert_eq!(movie.imdb_url, None);
    }

    #[test]
    fn test_parse_rating_line() {
        let rating = parse_rating_line("196\t242\t3\t881250949", 1).unwrap();
        assert_eq!(rating.user_id, 196);
        assert_eq!(rating.movie_id, 242);
        assert_eq!(rating.score, 3);
    }

    #[test]
    fn test_parse_rating_line_bad_score() {
        let err = parse_rating_line("196\t242\tthree\t881250949", 3).unwrap_err();
        assert!(matches!(err, StoreError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_extract_release_year() {
        assert_eq!(extract_release_year("01-Jan-1995"), Some(1995));
        assert_eq!(extract_release_year(""), None);
    }
}
