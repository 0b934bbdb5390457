//! Temporal fusion over multi-part queries
//!
//! A temporal query consists of an ordered list of query containers (e.g. the
//! frames of a sketch sequence). For every candidate object this module searches
//! the best-scoring *temporal path*: an ordered selection of the object's
//! segments, each matched to a query container, such that
//!
//! - every step uses a strictly larger container id than its predecessor, and
//! - every step starts at most [`TEMPORAL_DISTANCE_CAP_SECS`] after its
//!   predecessor ends.
//!
//! Paths may skip containers and segments. A path's score is the sum of its
//! segments' individual scores divided by the total number of query
//! containers, so partial matches are penalized against a full-length match.
//!
//! The search is a depth-first enumeration over paths. It runs on an explicit
//! frame stack instead of the call stack, visiting candidates in the same order
//! as the recursive formulation:
//!
//! ```text
//! temporal_path(seeker, container, path):
//!     best = path
//!     if container is the last query container: return path
//!     for candidate in segments after seeker (by start time):
//!         for candidate_container in candidate's containers (ascending):
//!             skip unless is_logical_successor(...)
//!             extended = path + (candidate_container -> candidate)
//!             keep extended if score(extended) >= score(best)
//!             if candidate is not the last segment:
//!                 found = temporal_path(candidate, candidate_container, extended)
//!                 keep found if score(found) >= score(best)
//!     return best
//! ```
//!
//! Ties use `>=`: among equally scored paths the one discovered later (longer
//! or later explored) wins. This policy decides which path callers observe and
//! is kept as is.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::cache::{BestScoreCache, CachedScore};
use super::{DefaultFusionFunction, FusionFunction};
use crate::models::{
    ContainerId, MediaObjectScoreContainer, SegmentScoreContainer, UNSCORED,
    WeightedFeatureCategory,
};
use crate::{FusionError, Result};

/// Maximum gap in seconds between the end of a path step and the start of the next
pub const TEMPORAL_DISTANCE_CAP_SECS: f64 = 30.0;

/// One step of a matched temporal path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub container_id: ContainerId,
    pub segment_id: String,
    pub startabs: f64,
    pub endabs: f64,
    /// Individual (non-temporal) score of the segment
    pub score: f64,
}

/// The optimal temporal path found for an object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathMatch {
    pub object_id: String,
    /// Normalized path score, identical to `score_for_object`
    pub score: f64,
    /// Steps in container order
    pub steps: Vec<PathStep>,
}

/// Temporal path search with a per-segment best score cache.
///
/// Segment base scores come from an injected [`FusionFunction`]
/// ([`DefaultFusionFunction`] unless configured otherwise).
pub struct TemporalFusionFunction {
    segment_fusion: Arc<dyn FusionFunction>,
    query_container_ids: Vec<ContainerId>,
    distance_cap_secs: f64,
    cache: BestScoreCache,
}

impl std::fmt::Debug for TemporalFusionFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalFusionFunction")
            .field("query_container_ids", &self.query_container_ids)
            .field("distance_cap_secs", &self.distance_cap_secs)
            .field("cached_segments", &self.cache.len())
            .finish()
    }
}

impl TemporalFusionFunction {
    /// Create a temporal fusion function for the given ordered query containers
    pub fn new(query_container_ids: Vec<ContainerId>) -> Result<Self> {
        Self::with_segment_fusion(query_container_ids, Arc::new(DefaultFusionFunction::new()))
    }

    /// Create a temporal fusion function with a custom per-segment base strategy
    pub fn with_segment_fusion(
        query_container_ids: Vec<ContainerId>,
        segment_fusion: Arc<dyn FusionFunction>,
    ) -> Result<Self> {
        validate_query_container_ids(&query_container_ids)?;
        Ok(Self {
            segment_fusion,
            query_container_ids,
            distance_cap_secs: TEMPORAL_DISTANCE_CAP_SECS,
            cache: BestScoreCache::new(),
        })
    }

    /// Override the successor gap cap (seconds, must be finite and > 0)
    pub fn with_distance_cap(mut self, distance_cap_secs: f64) -> Result<Self> {
        if !distance_cap_secs.is_finite() || distance_cap_secs <= 0.0 {
            return Err(FusionError::Configuration(format!(
                "temporal distance cap must be finite and > 0, got {}",
                distance_cap_secs
            )));
        }
        self.distance_cap_secs = distance_cap_secs;
        Ok(self)
    }

    /// Start a new query: replace the container sequence and clear the cache
    pub fn set_query_container_ids(&mut self, query_container_ids: Vec<ContainerId>) -> Result<()> {
        validate_query_container_ids(&query_container_ids)?;
        debug!(
            containers = ?query_container_ids,
            "Resetting temporal fusion for new query"
        );
        self.query_container_ids = query_container_ids;
        self.cache.clear();
        Ok(())
    }

    pub fn query_container_ids(&self) -> &[ContainerId] {
        &self.query_container_ids
    }

    pub fn distance_cap_secs(&self) -> f64 {
        self.distance_cap_secs
    }

    /// Id of the last query container; no path step can follow it
    pub fn last_container_id(&self) -> ContainerId {
        // Validation guarantees a non-empty list
        self.query_container_ids[self.query_container_ids.len() - 1]
    }

    pub fn cache(&self) -> &BestScoreCache {
        &self.cache
    }

    pub fn cached_score(&self, segment_id: &str) -> Option<CachedScore> {
        self.cache.get(segment_id)
    }

    /// Whether `successor` matched to `container_id` may follow `predecessor`
    /// matched to `predecessor_container_id` on a path
    pub fn is_logical_successor(
        &self,
        predecessor: &SegmentScoreContainer,
        predecessor_container_id: ContainerId,
        successor: &SegmentScoreContainer,
        container_id: ContainerId,
    ) -> bool {
        successor.startabs() - predecessor.endabs() <= self.distance_cap_secs
            && predecessor_container_id < container_id
    }

    /// Non-temporal score of one segment, or [`UNSCORED`] if it has no scores
    pub fn individual_score_for_segment(
        &self,
        categories: &[WeightedFeatureCategory],
        object: &MediaObjectScoreContainer,
        segment: &SegmentScoreContainer,
    ) -> f64 {
        if !segment.is_scored() {
            trace!(
                segment_id = segment.segment_id(),
                "Segment has no score elements yet"
            );
            return UNSCORED;
        }
        self.segment_fusion
            .score_for_segment(categories, object, segment)
    }

    /// Normalized score of a path given as `(container id, segment)` pairs
    pub fn temporal_score<'a>(
        &self,
        categories: &[WeightedFeatureCategory],
        object: &MediaObjectScoreContainer,
        path: impl IntoIterator<Item = (ContainerId, &'a SegmentScoreContainer)>,
    ) -> f64 {
        let sum: f64 = path
            .into_iter()
            .map(|(_, segment)| self.individual_score_for_segment(categories, object, segment))
            .sum();
        sum / self.query_container_ids.len() as f64
    }

    /// Best temporal path of `object`, or `None` if no segment is scored
    ///
    /// Updates the cache exactly like [`FusionFunction::score_for_object`].
    pub fn optimal_path(
        &self,
        categories: &[WeightedFeatureCategory],
        object: &MediaObjectScoreContainer,
    ) -> Option<PathMatch> {
        let search = PathSearch::new(self, categories, object);
        let (score, best) = self.evaluate(&search);
        best.map(|path| search.to_match(score, &path))
    }

    /// Score all start candidates of an object and return the best one
    fn evaluate(&self, search: &PathSearch<'_>) -> (f64, Option<TemporalPath>) {
        let mut score = 0.0;
        let mut optimal = None;

        trace!(
            object_id = search.object_id,
            segments = search.ordered.len(),
            "Scoring object"
        );

        for (index, segment) in search.ordered.iter().enumerate() {
            self.cache
                .update(segment.segment_id(), search.individual[index]);

            for &container_id in &search.containers[index] {
                let start = TemporalPath::start(container_id, index);
                let found = self.temporal_path(search, index, container_id, start);
                let found_score = search.score(&found);

                self.cache.update(segment.segment_id(), found_score);
                for step in &found.steps {
                    self.cache
                        .update(search.ordered[step.segment].segment_id(), found_score);
                }

                trace!(
                    object_id = search.object_id,
                    segment_id = segment.segment_id(),
                    container_id,
                    found_score,
                    best_score = score,
                    "Evaluated path start"
                );

                if found_score > score {
                    score = found_score;
                    optimal = Some(found);
                }
            }
        }

        debug!(object_id = search.object_id, score, "Scored object");
        (score, optimal)
    }

    /// Best path extending `path`, whose last step is `seeker` matched to `seeker_container`
    ///
    /// Never returns a path scoring below `path`.
    fn temporal_path(
        &self,
        search: &PathSearch<'_>,
        seeker: usize,
        seeker_container: ContainerId,
        path: TemporalPath,
    ) -> TemporalPath {
        let last_container = self.last_container_id();
        let root_score = search.score(&path);
        let mut found = path.clone();
        let mut stack = vec![Frame::new(seeker, seeker_container, path, root_score, last_container)];

        while let Some(frame) = stack.last_mut() {
            match frame.next_candidate(self, search) {
                Some((candidate, candidate_container)) => {
                    let extended = frame.path.extended(candidate_container, candidate);
                    let extended_score = search.score(&extended);
                    if extended_score >= frame.best_score {
                        trace!(
                            segment_id = search.ordered[candidate].segment_id(),
                            container_id = candidate_container,
                            score = extended_score,
                            "Accepted path extension"
                        );
                        frame.best = extended.clone();
                        frame.best_score = extended_score;
                    }

                    if candidate + 1 < search.ordered.len() {
                        stack.push(Frame::new(
                            candidate,
                            candidate_container,
                            extended,
                            extended_score,
                            last_container,
                        ));
                    }
                }
                None => {
                    let Some(done) = stack.pop() else { break };
                    match stack.last_mut() {
                        Some(parent) => {
                            if done.best_score >= parent.best_score {
                                parent.best = done.best;
                                parent.best_score = done.best_score;
                            }
                        }
                        None => found = done.best,
                    }
                }
            }
        }

        found
    }
}

impl FusionFunction for TemporalFusionFunction {
    /// Score of the best temporal path over the object's segments, `0.0` if none exists
    fn score_for_object(
        &self,
        categories: &[WeightedFeatureCategory],
        object: &MediaObjectScoreContainer,
    ) -> f64 {
        let search = PathSearch::new(self, categories, object);
        self.evaluate(&search).0
    }

    /// Best path score seen for the segment, recomputing the owner if unknown
    fn score_for_segment(
        &self,
        categories: &[WeightedFeatureCategory],
        object: &MediaObjectScoreContainer,
        segment: &SegmentScoreContainer,
    ) -> f64 {
        if let Some(CachedScore::Scored(score)) = self.cache.get(segment.segment_id()) {
            return score;
        }

        // Segments are streamed independently of when they are first ranked
        trace!(
            segment_id = segment.segment_id(),
            object_id = object.object_id(),
            "Segment score not cached, rescoring owning object"
        );
        self.score_for_object(categories, object);

        match self.cache.get(segment.segment_id()) {
            Some(cached) => cached.value(),
            None => {
                warn!(
                    segment_id = segment.segment_id(),
                    object_id = object.object_id(),
                    "Segment is not part of the given object"
                );
                UNSCORED
            }
        }
    }
}

/// Reject an empty or not strictly increasing container sequence
pub(crate) fn validate_query_container_ids(ids: &[ContainerId]) -> Result<()> {
    if ids.is_empty() {
        return Err(FusionError::EmptyQueryContainers);
    }
    for pair in ids.windows(2) {
        if pair[1] <= pair[0] {
            return Err(FusionError::UnorderedQueryContainers {
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

/// Path as `(container id, index into the start-ordered segments)` steps.
///
/// Extending copies the path, so search branches never share mutable state.
#[derive(Debug, Clone, PartialEq)]
struct TemporalPath {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    container: ContainerId,
    segment: usize,
}

impl TemporalPath {
    fn start(container: ContainerId, segment: usize) -> Self {
        Self {
            steps: vec![Step { container, segment }],
        }
    }

    /// Copy of this path with `container` mapped to `segment`, replacing any
    /// earlier mapping of the same container in place
    fn extended(&self, container: ContainerId, segment: usize) -> Self {
        let mut steps = self.steps.clone();
        match steps.iter_mut().find(|step| step.container == container) {
            Some(step) => step.segment = segment,
            None => steps.push(Step { container, segment }),
        }
        Self { steps }
    }
}

/// Per-object search state shared by all frames of one evaluation
struct PathSearch<'a> {
    object: &'a MediaObjectScoreContainer,
    object_id: &'a str,
    ordered: Vec<&'a SegmentScoreContainer>,
    containers: Vec<Vec<ContainerId>>,
    /// Individual segment scores, computed once per evaluation
    individual: Vec<f64>,
    normalizer: f64,
}

impl<'a> PathSearch<'a> {
    fn new(
        fusion: &TemporalFusionFunction,
        categories: &[WeightedFeatureCategory],
        object: &'a MediaObjectScoreContainer,
    ) -> Self {
        let ordered = object.segments_by_start();
        let containers = ordered
            .iter()
            .map(|segment| segment.container_ids().collect())
            .collect();
        let individual = ordered
            .iter()
            .map(|segment| fusion.individual_score_for_segment(categories, object, segment))
            .collect();

        Self {
            object,
            object_id: object.object_id(),
            ordered,
            containers,
            individual,
            normalizer: fusion.query_container_ids.len() as f64,
        }
    }

    fn score(&self, path: &TemporalPath) -> f64 {
        let sum: f64 = path
            .steps
            .iter()
            .map(|step| self.individual[step.segment])
            .sum();
        sum / self.normalizer
    }

    fn to_match(&self, score: f64, path: &TemporalPath) -> PathMatch {
        PathMatch {
            object_id: self.object.object_id().to_string(),
            score,
            steps: path
                .steps
                .iter()
                .map(|step| {
                    let segment = self.ordered[step.segment];
                    PathStep {
                        container_id: step.container,
                        segment_id: segment.segment_id().to_string(),
                        startabs: segment.startabs(),
                        endabs: segment.endabs(),
                        score: self.individual[step.segment],
                    }
                })
                .collect(),
        }
    }
}

/// One level of the depth-first path search
struct Frame {
    seeker: usize,
    seeker_container: ContainerId,
    path: TemporalPath,
    best: TemporalPath,
    best_score: f64,
    /// Next candidate segment (index into the ordered segments)
    next_segment: usize,
    /// Next container of the candidate segment
    next_container: usize,
    exhausted: bool,
}

impl Frame {
    fn new(
        seeker: usize,
        seeker_container: ContainerId,
        path: TemporalPath,
        score: f64,
        last_container: ContainerId,
    ) -> Self {
        Self {
            seeker,
            seeker_container,
            best: path.clone(),
            path,
            best_score: score,
            next_segment: seeker + 1,
            next_container: 0,
            // Nothing can follow the last query container
            exhausted: seeker_container == last_container,
        }
    }

    /// Advance to the next `(segment, container)` pair that may follow the seeker
    fn next_candidate(
        &mut self,
        fusion: &TemporalFusionFunction,
        search: &PathSearch<'_>,
    ) -> Option<(usize, ContainerId)> {
        if self.exhausted {
            return None;
        }

        let seeker = search.ordered[self.seeker];
        while self.next_segment < search.ordered.len() {
            let candidate = self.next_segment;
            let containers = &search.containers[candidate];

            while self.next_container < containers.len() {
                let container = containers[self.next_container];
                self.next_container += 1;
                if fusion.is_logical_successor(
                    seeker,
                    self.seeker_container,
                    search.ordered[candidate],
                    container,
                ) {
                    return Some((candidate, container));
                }
            }

            self.next_segment += 1;
            self.next_container = 0;
        }

        self.exhausted = true;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<WeightedFeatureCategory> {
        vec![WeightedFeatureCategory::new("color", 1.0)]
    }

    fn object(segments: &[(&str, ContainerId, f64, f64, f64)]) -> MediaObjectScoreContainer {
        let mut object = MediaObjectScoreContainer::new("v1").unwrap();
        for (id, container, start, end, score) in segments {
            let mut segment = SegmentScoreContainer::new(*id, "v1", *start, *end).unwrap();
            segment.set_score(*container, "color", *score).unwrap();
            object.add_segment(segment).unwrap();
        }
        object
    }

    fn path_ids(path: &PathMatch) -> Vec<(ContainerId, &str)> {
        path.steps
            .iter()
            .map(|step| (step.container_id, step.segment_id.as_str()))
            .collect()
    }

    #[test]
    fn test_rejects_empty_or_unordered_containers() {
        assert!(matches!(
            TemporalFusionFunction::new(vec![]),
            Err(FusionError::EmptyQueryContainers)
        ));
        assert!(matches!(
            TemporalFusionFunction::new(vec![1, 3, 2]),
            Err(FusionError::UnorderedQueryContainers { previous: 3, next: 2 })
        ));
        assert!(TemporalFusionFunction::new(vec![1, 1]).is_err());
        assert!(TemporalFusionFunction::new(vec![4]).is_ok());
    }

    #[test]
    fn test_distance_cap_validation() {
        let fusion = TemporalFusionFunction::new(vec![1]).unwrap();
        assert_eq!(fusion.distance_cap_secs(), TEMPORAL_DISTANCE_CAP_SECS);
        let fusion = fusion.with_distance_cap(5.0).unwrap();
        assert_eq!(fusion.distance_cap_secs(), 5.0);
        assert!(fusion.with_distance_cap(0.0).is_err());
    }

    #[test]
    fn test_logical_successor() {
        let fusion = TemporalFusionFunction::new(vec![1, 2, 3]).unwrap();
        let a = SegmentScoreContainer::new("a", "v1", 0.0, 10.0).unwrap();
        let near = SegmentScoreContainer::new("b", "v1", 40.0, 41.0).unwrap();
        let far = SegmentScoreContainer::new("c", "v1", 40.5, 41.0).unwrap();

        assert!(fusion.is_logical_successor(&a, 1, &near, 2));
        assert!(!fusion.is_logical_successor(&a, 1, &far, 2));
        assert!(!fusion.is_logical_successor(&a, 2, &near, 2));
        assert!(!fusion.is_logical_successor(&a, 3, &near, 2));
    }

    #[test]
    fn test_single_segment_normalized_by_container_count() {
        let fusion = TemporalFusionFunction::new(vec![1, 2, 3, 4]).unwrap();
        let obj = object(&[("a", 2, 0.0, 1.0, 0.8)]);
        let score = fusion.score_for_object(&categories(), &obj);
        assert!((score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_temporal_score_of_full_path_is_one() {
        let fusion = TemporalFusionFunction::new(vec![1, 2]).unwrap();
        let obj = object(&[("a", 1, 0.0, 1.0, 1.0), ("b", 2, 2.0, 3.0, 1.0)]);
        let path = vec![
            (1, obj.segment("a").unwrap()),
            (2, obj.segment("b").unwrap()),
        ];
        assert_eq!(fusion.temporal_score(&categories(), &obj, path), 1.0);
    }

    #[test]
    fn test_tie_prefers_later_explored_path() {
        // Two segments for container 2 with equal scores: the later one wins
        let fusion = TemporalFusionFunction::new(vec![1, 2]).unwrap();
        let obj = object(&[
            ("a", 1, 0.0, 1.0, 0.5),
            ("b1", 2, 2.0, 3.0, 0.5),
            ("b2", 2, 4.0, 5.0, 0.5),
        ]);
        let path = fusion.optimal_path(&categories(), &obj).unwrap();
        assert_eq!(path_ids(&path), vec![(1, "a"), (2, "b2")]);
        assert!((path.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_first_start_wins_object_level_ties() {
        // Both starts reach the same score; the earlier start is reported
        let fusion = TemporalFusionFunction::new(vec![1]).unwrap();
        let obj = object(&[("a", 1, 0.0, 1.0, 0.6), ("b", 1, 100.0, 101.0, 0.6)]);
        let path = fusion.optimal_path(&categories(), &obj).unwrap();
        assert_eq!(path_ids(&path), vec![(1, "a")]);
    }

    #[test]
    fn test_last_container_stops_search() {
        let fusion = TemporalFusionFunction::new(vec![1, 2]).unwrap();
        let mut obj = object(&[("a", 2, 0.0, 1.0, 0.4)]);
        let mut later = SegmentScoreContainer::new("b", "v1", 2.0, 3.0).unwrap();
        later.set_score(3, "color", 1.0).unwrap();
        obj.add_segment(later).unwrap();

        // Container 3 is not a query container, but it is larger than the last
        // one; a path ending at container 2 must not extend past it
        let path = fusion.optimal_path(&categories(), &obj).unwrap();
        assert_eq!(path_ids(&path), vec![(3, "b")]);
        assert!((path.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cache_covers_every_evaluated_path() {
        let fusion = TemporalFusionFunction::new(vec![1, 2, 3]).unwrap();
        let obj = object(&[
            ("a", 1, 0.0, 1.0, 0.9),
            ("b", 2, 5.0, 6.0, 0.3),
            ("c", 3, 100.0, 101.0, 0.6),
        ]);
        fusion.score_for_object(&categories(), &obj);

        // "c" is unreachable from "a"/"b" but keeps its own individual score
        assert_eq!(fusion.cached_score("c"), Some(CachedScore::Scored(0.6)));
        assert_eq!(fusion.cached_score("a"), Some(CachedScore::Scored(0.9)));
        let b = fusion.cached_score("b").unwrap().value();
        assert!((b - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_score_for_segment_recomputes_missing_entries() {
        let fusion = TemporalFusionFunction::new(vec![1, 2]).unwrap();
        let obj = object(&[("a", 1, 0.0, 1.0, 0.4), ("b", 2, 2.0, 3.0, 0.8)]);
        assert!(fusion.cache().is_empty());

        let score = fusion.score_for_segment(&categories(), &obj, obj.segment("b").unwrap());
        assert!((score - 0.8).abs() < 1e-12);
        assert_eq!(fusion.cache().len(), 2);
    }

    #[test]
    fn test_set_query_container_ids_clears_cache() {
        let mut fusion = TemporalFusionFunction::new(vec![1, 2]).unwrap();
        let obj = object(&[("a", 1, 0.0, 1.0, 0.4)]);
        fusion.score_for_object(&categories(), &obj);
        assert!(!fusion.cache().is_empty());

        fusion.set_query_container_ids(vec![1, 2, 3]).unwrap();
        assert!(fusion.cache().is_empty());
        assert_eq!(fusion.last_container_id(), 3);

        assert!(fusion.set_query_container_ids(vec![]).is_err());
        assert_eq!(fusion.query_container_ids(), &[1, 2, 3]);
    }
}
