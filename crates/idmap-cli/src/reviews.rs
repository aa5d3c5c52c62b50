//! Review store commands.

use std::collections::BTreeMap;
use std::path::Path;

use clap::Subcommand;
use idmap_core::{GeoPoint, NewReview, ReviewFilter, ReviewLocation};
use idmap_store::ReviewStore;

#[derive(Debug, Subcommand)]
pub enum ReviewsCommands {
    /// Print stored reviews, optionally filtered
    List {
        /// Case-insensitive substring of the review's city
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// Matches the place name or the review's category
        #[arg(long)]
        category: Option<String>,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a review for a place
    Add {
        #[arg(long)]
        place: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        country: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        state: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        comments: String,
        /// Challenge rating as NAME=RATING, or NAME alone for "not rated"; repeatable
        #[arg(long = "challenge", value_parser = parse_challenge)]
        challenges: Vec<(String, Option<i64>)>,
        #[arg(long)]
        category: Option<String>,
    },
}

pub(crate) fn parse_challenge(raw: &str) -> Result<(String, Option<i64>), String> {
    let (name, rating) = match raw.split_once('=') {
        Some((name, rating)) => (name.trim(), rating.trim()),
        None => (raw.trim(), ""),
    };
    if name.is_empty() {
        return Err(format!("challenge name missing in '{raw}'"));
    }
    let rating = if rating.is_empty() {
        None
    } else {
        Some(
            rating
                .parse::<i64>()
                .map_err(|e| format!("invalid rating '{rating}' for {name}: {e}"))?,
        )
    };
    Ok((name.to_string(), rating))
}

/// # Errors
///
/// Returns an error if the store cannot be read or written, or the review is
/// invalid.
pub(crate) async fn run_reviews(path: &Path, command: ReviewsCommands) -> anyhow::Result<()> {
    let store = ReviewStore::open(path).await?;

    match command {
        ReviewsCommands::List {
            city,
            state,
            country,
            category,
            json,
        } => {
            let filter = ReviewFilter {
                city,
                state,
                country,
                category,
            };
            let reviews = store.list_filtered(&filter).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&reviews)?);
                return Ok(());
            }
            if reviews.is_empty() {
                if filter.is_empty() {
                    println!("no reviews in {}", path.display());
                } else {
                    println!("no reviews match the filter");
                }
            }
            for review in reviews {
                let body = &review.body;
                println!(
                    "{}  {}  {}",
                    review.timestamp.format("%Y-%m-%d %H:%M"),
                    body.place_name,
                    [&body.location.city, &body.location.state, &body.location.country]
                        .into_iter()
                        .filter(|s| !s.is_empty())
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                for (name, rating) in &body.challenges {
                    match rating {
                        Some(r) => println!("    {name}: {r}"),
                        None => println!("    {name}: not rated"),
                    }
                }
                if !body.comments.is_empty() {
                    println!("    \"{}\"", body.comments);
                }
            }
        }
        ReviewsCommands::Add {
            place,
            lat,
            lon,
            country,
            city,
            state,
            address,
            comments,
            challenges,
            category,
        } => {
            let review = store
                .append(NewReview {
                    coords: GeoPoint::new(lat, lon),
                    place_name: place,
                    location: ReviewLocation {
                        city,
                        state,
                        country,
                        address,
                    },
                    comments,
                    challenges: challenges.into_iter().collect::<BTreeMap<_, _>>(),
                    category,
                    extra: serde_json::Map::new(),
                })
                .await?;
            println!("saved review {}", review.id);
        }
    }

    Ok(())
}
