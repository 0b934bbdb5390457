//! Weighted-average fusion of category scores

use super::{FusionFunction, ObjectAggregation};
use crate::models::{
    CategoryScores, ContainerId, MediaObjectScoreContainer, SegmentScoreContainer, UNSCORED,
    WeightedFeatureCategory, is_unscored,
};

/// Scores each segment on its own as the weighted average of its category scores.
///
/// When a segment carries scores from several query containers, the container
/// with the highest weighted score is used; ties keep the lowest container id.
/// The object score aggregates visible segments as configured (max by default).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFusionFunction {
    aggregation: ObjectAggregation,
}

impl DefaultFusionFunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aggregation(aggregation: ObjectAggregation) -> Self {
        Self { aggregation }
    }

    pub fn aggregation(&self) -> ObjectAggregation {
        self.aggregation
    }

    /// Weighted average of one container's category scores
    ///
    /// Only categories with a positive weight and a score in `scores` count
    /// towards the denominator. Returns `0.0` when none contribute.
    pub fn container_score(categories: &[WeightedFeatureCategory], scores: &CategoryScores) -> f64 {
        let (weighted, total) = categories
            .iter()
            .filter(|category| !category.is_excluded())
            .filter_map(|category| {
                scores
                    .get(&category.id)
                    .map(|score| (score * category.weight, category.weight))
            })
            .fold((0.0, 0.0), |(weighted, total), (score, weight)| {
                (weighted + score, total + weight)
            });

        if total > 0.0 { weighted / total } else { 0.0 }
    }

    /// The container used to score `segment` and its weighted score
    pub fn best_container(
        categories: &[WeightedFeatureCategory],
        segment: &SegmentScoreContainer,
    ) -> Option<(ContainerId, f64)> {
        let mut best: Option<(ContainerId, f64)> = None;
        for (&container_id, scores) in segment.scores() {
            let score = Self::container_score(categories, scores);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((container_id, score)),
            }
        }
        best
    }

    fn segment_score(categories: &[WeightedFeatureCategory], segment: &SegmentScoreContainer) -> f64 {
        Self::best_container(categories, segment)
            .map(|(_, score)| score)
            .unwrap_or(UNSCORED)
    }
}

impl FusionFunction for DefaultFusionFunction {
    fn score_for_object(
        &self,
        categories: &[WeightedFeatureCategory],
        object: &MediaObjectScoreContainer,
    ) -> f64 {
        let scores: Vec<f64> = object
            .segments()
            .iter()
            .filter(|segment| segment.is_visible())
            .map(|segment| Self::segment_score(categories, segment))
            .collect();

        if scores.is_empty() {
            return 0.0;
        }

        match self.aggregation {
            ObjectAggregation::Max => scores.into_iter().fold(UNSCORED, f64::max),
            ObjectAggregation::Average => {
                let scored: Vec<f64> = scores.into_iter().filter(|s| !is_unscored(*s)).collect();
                if scored.is_empty() {
                    UNSCORED
                } else {
                    scored.iter().sum::<f64>() / scored.len() as f64
                }
            }
        }
    }

    fn score_for_segment(
        &self,
        categories: &[WeightedFeatureCategory],
        _object: &MediaObjectScoreContainer,
        segment: &SegmentScoreContainer,
    ) -> f64 {
        Self::segment_score(categories, segment)
    }
}
