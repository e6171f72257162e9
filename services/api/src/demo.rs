use clap::{Args, Subcommand};
use laptop_advisor::catalog::LaptopId;
use laptop_advisor::config::DEFAULT_DATA_PATH;
use laptop_advisor::error::AppError;
use laptop_advisor::recommend::{
    Recommendation, RecommendationService, DEFAULT_SIMILAR_LIMIT, DEFAULT_TRENDING_LIMIT,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Laptop dataset CSV to rank
    #[arg(long, global = true, default_value = DEFAULT_DATA_PATH)]
    pub(crate) data: PathBuf,
    #[command(subcommand)]
    pub(crate) command: RecommendCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum RecommendCommand {
    /// Most popular laptops by rating and review volume
    Trending {
        #[arg(long, default_value_t = DEFAULT_TRENDING_LIMIT)]
        limit: usize,
    },
    /// Laptops most similar to the given laptop id
    Similar {
        laptop_id: usize,
        #[arg(long, default_value_t = DEFAULT_SIMILAR_LIMIT)]
        limit: usize,
    },
    /// Best value laptops at or under a price
    Budget { max_price: f64 },
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs { data, command } = args;
    let service = RecommendationService::from_path(&data)?;
    let laptops = service.snapshot().catalog().len();
    println!("Loaded {} laptops from {}", laptops, data.display());

    match command {
        RecommendCommand::Trending { limit } => {
            render_recommendations("Trending laptops", &service.trending(limit));
        }
        RecommendCommand::Similar { laptop_id, limit } => {
            let similar = service.similar_to(LaptopId(laptop_id), limit)?;
            render_recommendations(&format!("Laptops similar to #{laptop_id}"), &similar);
        }
        RecommendCommand::Budget { max_price } => {
            if !max_price.is_finite() || max_price <= 0.0 {
                return Err(AppError::BadRequest(format!(
                    "max_price must be a positive number, got {max_price}"
                )));
            }
            render_recommendations(
                &format!("Best value under ${max_price:.0}"),
                &service.budget(max_price),
            );
        }
    }

    Ok(())
}

pub(crate) fn render_recommendations(title: &str, recommendations: &[Recommendation]) {
    println!("\n{title}");
    if recommendations.is_empty() {
        println!("- none");
        return;
    }

    for (rank, view) in recommendations.iter().enumerate() {
        println!("{}", recommendation_line(rank + 1, view));
        for reason in view.match_reasons.iter().flatten() {
            println!("    {reason}");
        }
    }
}

fn recommendation_line(rank: usize, view: &Recommendation) -> String {
    let price = view
        .price_details
        .get("Current Price")
        .and_then(|value| value.as_str())
        .unwrap_or("price n/a");
    let score = view
        .primary_score()
        .map(|score| format!(", score {score:.3}"))
        .unwrap_or_default();
    format!(
        "{rank}. #{} {} {} ({}{})",
        view.laptop_id, view.brand, view.model, price, score
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use laptop_advisor::catalog::{LaptopCatalog, LaptopRecord};
    use serde_json::json;

    #[test]
    fn line_shows_rank_price_and_score() {
        let mut record = LaptopRecord::new(LaptopId(0), "Lenovo", "ThinkPad E14");
        record.price_details = json!({"Current Price": "$900"})
            .as_object()
            .cloned()
            .expect("object");
        record.review_details = json!({"Overall Rating": "4.5/5 (50 reviews)"})
            .as_object()
            .cloned()
            .expect("object");
        let service = RecommendationService::new(LaptopCatalog::from_records(vec![record]));

        let trending = service.trending(1);
        let line = recommendation_line(1, &trending[0]);
        assert!(line.starts_with("1. #0 Lenovo ThinkPad E14 ($900, score 17.693"));
    }
}
