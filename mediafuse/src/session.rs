//! Query session lifecycle
//!
//! A [`QuerySession`] holds everything one retrieval query needs: the ordered
//! query containers, the weighted feature categories, the accumulated results
//! and the active fusion function. Starting a new query with
//! [`QuerySession::begin`] invalidates the results and the temporal cache.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::MediaFuseConfig;
use crate::fusion::temporal::validate_query_container_ids;
use crate::fusion::{
    DefaultFusionFunction, FusionFunction, FusionStrategy, PathMatch, TemporalFusionFunction,
};
use crate::models::{
    ContainerId, MediaObjectScoreContainer, SegmentScoreContainer, WeightedFeatureCategory,
};
use crate::ranking::{self, RankedObject, RankedSegment, RankingOptions};
use crate::results::{IngestOutcome, ResultSet, ScoreUpdate};
use crate::Result;

/// The fusion function driving a session
#[derive(Debug)]
enum ActiveFusion {
    Default(DefaultFusionFunction),
    Temporal(TemporalFusionFunction),
}

/// One query's scoring state
#[derive(Debug)]
pub struct QuerySession {
    query_container_ids: Vec<ContainerId>,
    categories: Vec<WeightedFeatureCategory>,
    default_category_weight: f64,
    results: ResultSet,
    fusion: ActiveFusion,
    ranking: RankingOptions,
}

impl QuerySession {
    /// Create a session for a query with the given ordered containers
    pub fn new(config: &MediaFuseConfig, query_container_ids: Vec<ContainerId>) -> Result<Self> {
        let settings = &config.fusion;
        let segment_fusion = DefaultFusionFunction::with_aggregation(settings.object_aggregation);

        let fusion = match settings.strategy {
            FusionStrategy::Default => {
                validate_query_container_ids(&query_container_ids)?;
                ActiveFusion::Default(segment_fusion)
            }
            FusionStrategy::Temporal => ActiveFusion::Temporal(
                TemporalFusionFunction::with_segment_fusion(
                    query_container_ids.clone(),
                    Arc::new(segment_fusion),
                )?
                .with_distance_cap(settings.temporal_distance_cap_secs)?,
            ),
        };

        info!(
            strategy = %settings.strategy,
            containers = ?query_container_ids,
            "Created query session"
        );

        Ok(Self {
            query_container_ids,
            categories: Vec::new(),
            default_category_weight: settings.default_category_weight,
            results: ResultSet::new(),
            fusion,
            ranking: config.ranking.clone(),
        })
    }

    /// Start a new query: drop all results and reset the temporal cache
    ///
    /// Category weights are kept. On error the session is left unchanged.
    pub fn begin(&mut self, query_container_ids: Vec<ContainerId>) -> Result<()> {
        match &mut self.fusion {
            ActiveFusion::Temporal(temporal) => {
                temporal.set_query_container_ids(query_container_ids.clone())?
            }
            ActiveFusion::Default(_) => validate_query_container_ids(&query_container_ids)?,
        }

        info!(
            containers = ?query_container_ids,
            discarded_objects = self.results.len(),
            "Starting new query"
        );
        self.results.clear();
        self.query_container_ids = query_container_ids;
        Ok(())
    }

    /// Ingest one streamed score, registering categories seen for the first time
    pub fn apply_score(&mut self, update: ScoreUpdate) -> Result<IngestOutcome> {
        let category = update.category.clone();
        let outcome = self.results.apply_score(update)?;

        if !self.categories.iter().any(|c| c.id == category) {
            let registered = WeightedFeatureCategory::try_new(category, self.default_category_weight)?;
            debug!(category = %registered, "Registered feature category");
            self.categories.push(registered);
        }

        Ok(outcome)
    }

    /// Set the weight of a category, registering it if unknown
    ///
    /// The temporal best-score cache keeps its entries; only [`begin`](Self::begin)
    /// resets it.
    pub fn set_weight(&mut self, category: &str, weight: f64) -> Result<()> {
        match self.categories.iter_mut().find(|c| c.id == category) {
            Some(existing) => existing.set_weight(weight)?,
            None => self
                .categories
                .push(WeightedFeatureCategory::try_new(category, weight)?),
        }

        debug!(category, weight, "Updated category weight");
        Ok(())
    }

    /// Show or hide one segment in segment rankings and object aggregation
    ///
    /// Returns `false` if the object or segment is unknown.
    pub fn set_segment_visible(&mut self, object_id: &str, segment_id: &str, visible: bool) -> bool {
        let Some(segment) = self
            .results
            .object_mut(object_id)
            .and_then(|object| object.segment_mut(segment_id))
        else {
            return false;
        };
        segment.set_visible(visible);
        debug!(object_id, segment_id, visible, "Changed segment visibility");
        true
    }

    pub fn query_container_ids(&self) -> &[ContainerId] {
        &self.query_container_ids
    }

    pub fn strategy(&self) -> FusionStrategy {
        match self.fusion {
            ActiveFusion::Default(_) => FusionStrategy::Default,
            ActiveFusion::Temporal(_) => FusionStrategy::Temporal,
        }
    }

    pub fn categories(&self) -> &[WeightedFeatureCategory] {
        &self.categories
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn ranking_options(&self) -> &RankingOptions {
        &self.ranking
    }

    pub fn set_ranking_options(&mut self, options: RankingOptions) {
        self.ranking = options;
    }

    /// The active fusion function
    pub fn fusion(&self) -> &dyn FusionFunction {
        match &self.fusion {
            ActiveFusion::Default(fusion) => fusion,
            ActiveFusion::Temporal(fusion) => fusion,
        }
    }

    /// The temporal fusion function, if it is the active strategy
    pub fn temporal(&self) -> Option<&TemporalFusionFunction> {
        match &self.fusion {
            ActiveFusion::Temporal(fusion) => Some(fusion),
            ActiveFusion::Default(_) => None,
        }
    }

    /// Fused score of one object, `None` if the object is unknown
    pub fn score_object(&self, object_id: &str) -> Option<f64> {
        self.results
            .object(object_id)
            .map(|object| self.fusion().score_for_object(&self.categories, object))
    }

    /// Best temporal path of an object (temporal strategy only)
    pub fn optimal_path(&self, object_id: &str) -> Option<PathMatch> {
        let temporal = self.temporal()?;
        let object = self.results.object(object_id)?;
        temporal.optimal_path(&self.categories, object)
    }

    /// Rank the objects accepted by `visible`
    pub fn rank_objects<F>(&self, visible: F) -> Vec<RankedObject>
    where
        F: Fn(&MediaObjectScoreContainer) -> bool,
    {
        ranking::rank_objects(
            self.fusion(),
            &self.categories,
            self.results.objects(),
            visible,
            &self.ranking,
        )
    }

    /// Rank the segments accepted by `visible`
    pub fn rank_segments<F>(&self, visible: F) -> Vec<RankedSegment>
    where
        F: Fn(&SegmentScoreContainer) -> bool,
    {
        ranking::rank_segments(
            self.fusion(),
            &self.categories,
            self.results.objects(),
            visible,
            &self.ranking,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::FusionError;
    use crate::fusion::CachedScore;

    fn temporal_session(ids: Vec<ContainerId>) -> QuerySession {
        QuerySession::new(&ConfigBuilder::testing().build().unwrap(), ids).unwrap()
    }

    fn score(object: &str, segment: &str, container: ContainerId, value: f64, start: f64) -> ScoreUpdate {
        ScoreUpdate::new(object, segment, container, "color", value, start, start + 1.0)
    }

    #[test]
    fn test_new_session_validates_containers() {
        let config = ConfigBuilder::testing().build().unwrap();
        assert!(QuerySession::new(&config, vec![]).is_err());
        assert!(QuerySession::new(&config, vec![2, 1]).is_err());

        let default = ConfigBuilder::testing()
            .with_strategy(FusionStrategy::Default)
            .build()
            .unwrap();
        assert!(matches!(
            QuerySession::new(&default, vec![1, 1]),
            Err(FusionError::UnorderedQueryContainers { .. })
        ));
        let session = QuerySession::new(&default, vec![1]).unwrap();
        assert_eq!(session.strategy(), FusionStrategy::Default);
        assert!(session.temporal().is_none());
    }

    #[test]
    fn test_categories_registered_with_default_weight() {
        let config = ConfigBuilder::testing()
            .with_default_category_weight(0.5)
            .build()
            .unwrap();
        let mut session = QuerySession::new(&config, vec![1]).unwrap();
        session.apply_score(score("v1", "s1", 1, 0.4, 0.0)).unwrap();
        session.apply_score(score("v1", "s2", 1, 0.4, 2.0)).unwrap();

        assert_eq!(session.categories().len(), 1);
        assert_eq!(session.categories()[0].weight, 0.5);
    }

    #[test]
    fn test_rejected_score_registers_nothing() {
        let mut session = temporal_session(vec![1]);
        assert!(session.apply_score(score("v1", "s1", 1, f64::NAN, 0.0)).is_err());
        assert!(session.categories().is_empty());
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_temporal_ranking() {
        let mut session = temporal_session(vec![1, 2]);
        session.apply_score(score("full", "f1", 1, 1.0, 0.0)).unwrap();
        session.apply_score(score("full", "f2", 2, 1.0, 5.0)).unwrap();
        session.apply_score(score("half", "h1", 1, 1.0, 0.0)).unwrap();

        let ranked = session.rank_objects(|_| true);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].object_id, "full");
        assert!((ranked[0].score - 1.0).abs() < 1e-12);
        assert!((ranked[1].score - 0.5).abs() < 1e-12);

        let segments = session.rank_segments(|_| true);
        assert_eq!(segments[0].segment_id, "f1");
        assert_eq!(segments[2].segment_id, "h1");

        let path = session.optimal_path("full").unwrap();
        assert_eq!(path.steps.len(), 2);
    }

    #[test]
    fn test_begin_resets_results_and_cache() {
        let mut session = temporal_session(vec![1, 2]);
        session.apply_score(score("v1", "s1", 1, 0.8, 0.0)).unwrap();
        session.rank_objects(|_| true);
        let temporal = session.temporal().unwrap();
        assert!(matches!(temporal.cached_score("s1"), Some(CachedScore::Scored(_))));

        assert!(session.begin(vec![]).is_err());
        assert_eq!(session.results().len(), 1);

        session.begin(vec![3, 4, 5]).unwrap();
        assert!(session.results().is_empty());
        assert!(session.temporal().unwrap().cache().is_empty());
        assert_eq!(session.query_container_ids(), &[3, 4, 5]);
        assert_eq!(session.categories().len(), 1);
    }

    #[test]
    fn test_hidden_segments_and_ranking_options() {
        let mut session = temporal_session(vec![1]);
        session.apply_score(score("v1", "s1", 1, 0.9, 0.0)).unwrap();
        session.apply_score(score("v1", "s2", 1, 0.3, 5.0)).unwrap();
        session.apply_score(score("v2", "t1", 1, 0.5, 0.0)).unwrap();

        assert!(session.set_segment_visible("v1", "s1", false));
        assert!(!session.set_segment_visible("v1", "missing", false));
        assert!(!session.set_segment_visible("missing", "s1", false));
        let segments = session.rank_segments(|_| true);
        let ids: Vec<&str> = segments.iter().map(|s| s.segment_id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "s2"]);

        session.set_ranking_options(RankingOptions {
            limit: Some(1),
            include_unscored: false,
        });
        assert_eq!(session.ranking_options().limit, Some(1));
        assert_eq!(session.rank_segments(|_| true).len(), 1);
    }

    #[test]
    fn test_set_weight_keeps_temporal_cache() {
        let mut session = temporal_session(vec![1]);
        session.apply_score(score("v1", "s1", 1, 0.2, 0.0)).unwrap();
        session
            .apply_score(ScoreUpdate::new("v1", "s1", 1, "edge", 0.8, 0.0, 1.0))
            .unwrap();
        session.rank_segments(|_| true);
        let before = session.temporal().unwrap().cache().snapshot();
        assert_eq!(before.get("s1"), Some(&CachedScore::Scored(0.5)));

        session.set_weight("edge", 0.0).unwrap();
        session.rank_objects(|_| true);
        session.rank_segments(|_| true);

        let after = session.temporal().unwrap().cache().snapshot();
        for (segment_id, earlier) in &before {
            let now = after.get(segment_id).expect("cache entry dropped within session");
            assert!(now.value() >= earlier.value(), "cache decreased for {}", segment_id);
        }
    }

    #[test]
    fn test_set_weight_changes_scores() {
        let config = ConfigBuilder::testing()
            .with_strategy(FusionStrategy::Default)
            .build()
            .unwrap();
        let mut session = QuerySession::new(&config, vec![1]).unwrap();
        session.apply_score(score("v1", "s1", 1, 0.2, 0.0)).unwrap();
        session
            .apply_score(ScoreUpdate::new("v1", "s1", 1, "edge", 0.8, 0.0, 1.0))
            .unwrap();
        assert!((session.score_object("v1").unwrap() - 0.5).abs() < 1e-12);

        session.set_weight("color", 0.0).unwrap();
        assert!((session.score_object("v1").unwrap() - 0.8).abs() < 1e-12);

        assert!(session.set_weight("edge", -2.0).is_err());
        assert!(session.score_object("missing").is_none());
    }
}
