//! Game records read from the steam games CSV export.
//!
//! A record only needs `Hash + Eq` to live in a [`ChainTable`](crate::ChainTable); the ranking
//! used to produce sorted and reversed inputs is a separate comparator, [`Game::rank_cmp`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::BufRead;
use std::str::FromStr;

use log::{debug, warn};

use crate::error::RecordError;

/// Number of comma separated columns in a data line.
pub const FIELD_COUNT: usize = 10;

/// One row of the dataset.
#[derive(Debug, Clone)]
pub struct Game {
    pub steam_appid: i32,
    pub name: String,
    pub n_achievements: i32,
    pub release_date: String,
    pub total_reviews: i32,
    pub total_positive: i32,
    pub total_negative: i32,
    pub review_score: i32,
    pub metacritic: i32,
    pub price_initial: f64,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            steam_appid: -1,
            name: "{Untitled}".to_string(),
            n_achievements: -1,
            release_date: "(Undated)".to_string(),
            total_reviews: -1,
            total_positive: -1,
            total_negative: -1,
            review_score: -1,
            metacritic: -1,
            price_initial: -1.0,
        }
    }
}

impl Game {
    /// Ranking used for the sorted and reversed inputs: price, then metacritic score, then
    /// name ignoring case.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.price_initial
            .total_cmp(&other.price_initial)
            .then(self.metacritic.cmp(&other.metacritic))
            .then_with(|| {
                self.name
                    .to_lowercase()
                    .cmp(&other.name.to_lowercase())
            })
    }
}

/// Bit pattern used to compare and hash prices. `-0.0` folds into `0.0`; NaN stays equal to
/// an identical NaN so equality remains reflexive and agrees with `Hash`.
fn price_bits(price: f64) -> u64 {
    if price == 0.0 {
        0.0f64.to_bits()
    } else {
        price.to_bits()
    }
}

impl PartialEq for Game {
    fn eq(&self, other: &Self) -> bool {
        self.steam_appid == other.steam_appid
            && self.name == other.name
            && self.n_achievements == other.n_achievements
            && self.release_date == other.release_date
            && self.total_reviews == other.total_reviews
            && self.total_positive == other.total_positive
            && self.total_negative == other.total_negative
            && self.review_score == other.review_score
            && self.metacritic == other.metacritic
            && price_bits(self.price_initial) == price_bits(other.price_initial)
    }
}

impl Eq for Game {}

impl Hash for Game {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.steam_appid.hash(state);
        self.name.hash(state);
        self.n_achievements.hash(state);
        self.release_date.hash(state);
        self.total_reviews.hash(state);
        self.total_positive.hash(state);
        self.total_negative.hash(state);
        self.review_score.hash(state);
        self.metacritic.hash(state);
        price_bits(self.price_initial).hash(state);
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, ${:.2} | Metacritic: {} | Released: {} | {} achievements | Reviews: {} ({} +, {} -), Score: {}",
            self.steam_appid,
            self.name,
            self.price_initial,
            self.metacritic,
            self.release_date,
            self.n_achievements,
            self.total_reviews,
            self.total_positive,
            self.total_negative,
            self.review_score,
        )
    }
}

fn parse_field<N: FromStr>(field: &'static str, raw: &str) -> Result<N, RecordError> {
    raw.trim().parse().map_err(|_| RecordError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

impl FromStr for Game {
    type Err = RecordError;

    /// Parse one data line. Fields are split on every comma, so quoted names containing
    /// commas are rejected rather than guessed at.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < FIELD_COUNT {
            return Err(RecordError::MissingField {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        Ok(Game {
            steam_appid: parse_field("steam_appid", fields[0])?,
            name: fields[1].to_string(),
            n_achievements: parse_field("n_achievements", fields[2])?,
            release_date: fields[3].to_string(),
            total_reviews: parse_field("total_reviews", fields[4])?,
            total_positive: parse_field("total_positive", fields[5])?,
            total_negative: parse_field("total_negative", fields[6])?,
            review_score: parse_field("review_score", fields[7])?,
            metacritic: parse_field("metacritic", fields[8])?,
            price_initial: parse_field("price_initial", fields[9])?,
        })
    }
}

/// Outcome of reading a CSV export.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub records: Vec<Game>,
    /// Non-empty lines that failed to parse.
    pub skipped: usize,
}

/// Read at most `limit` non-empty data lines after the header and parse them.
///
/// Malformed lines are logged and dropped; only IO errors abort the load.
pub fn load_games<R: BufRead>(reader: R, limit: usize) -> std::io::Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    let mut taken = 0usize;

    for line in reader.lines().skip(1) {
        if taken >= limit {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        taken += 1;

        match line.parse::<Game>() {
            Ok(game) => summary.records.push(game),
            Err(err) => {
                warn!("Error with parsing line: {} ({})", line, err);
                summary.skipped += 1;
            }
        }
    }

    debug!(
        "loaded {} records, skipped {} malformed lines",
        summary.records.len(),
        summary.skipped
    );
    Ok(summary)
}
