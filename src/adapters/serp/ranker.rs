//! Rating-based ordering for online results.

use std::cmp::Ordering;

use crate::domain::listing::OnlineListing;
use crate::ports::OnlineResultRanker;

/// Ranks online results by rating descending (unrated last), breaking ties
/// on review count descending; the same order local tiers use.
pub struct RatingRanker;

impl OnlineResultRanker for RatingRanker {
    fn rank(&self, mut results: Vec<OnlineListing>) -> Vec<OnlineListing> {
        results.sort_by(|a, b| match (a.rating, b.rating) {
            (Some(ra), Some(rb)) => rb
                .partial_cmp(&ra)
                .unwrap_or(Ordering::Equal)
                .then(b.reviews.unwrap_or(0).cmp(&a.reviews.unwrap_or(0))),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.reviews.unwrap_or(0).cmp(&a.reviews.unwrap_or(0)),
        });
        results
    }
}
