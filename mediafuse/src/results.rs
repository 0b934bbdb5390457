//! Ingestion of streamed partial results
//!
//! Retrieval backends report scores one `(segment, query container, category)`
//! triple at a time. A [`ResultSet`] accumulates them into the score model,
//! creating objects and segments on first sight and merging later results.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

use crate::models::{ContainerId, MediaObjectScoreContainer, SegmentScoreContainer};
use crate::models::segment::{validate_bounds, validate_score};
use crate::{FusionError, Result};

/// One streamed partial result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreUpdate {
    pub object_id: String,
    pub segment_id: String,
    pub container_id: ContainerId,
    pub category: String,
    pub value: f64,
    pub startabs: f64,
    pub endabs: f64,
}

impl ScoreUpdate {
    pub fn new(
        object_id: impl Into<String>,
        segment_id: impl Into<String>,
        container_id: ContainerId,
        category: impl Into<String>,
        value: f64,
        startabs: f64,
        endabs: f64,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            segment_id: segment_id.into(),
            container_id,
            category: category.into(),
            value,
            startabs,
            endabs,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.object_id.trim().is_empty() {
            return Err(FusionError::InvalidIdentifier("object id".to_string()));
        }
        if self.segment_id.trim().is_empty() {
            return Err(FusionError::InvalidIdentifier("segment id".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(FusionError::InvalidIdentifier(format!(
                "category of segment '{}'",
                self.segment_id
            )));
        }
        validate_score(&self.segment_id, self.value)?;
        validate_bounds(&self.segment_id, self.startabs, self.endabs)
    }
}

/// What applying a [`ScoreUpdate`] changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// First result for the object (and its segment)
    NewObject,

    /// First result for a segment of a known object
    NewSegment,

    /// New container/category score for a known segment
    Merged,

    /// Replaced an earlier value for the same container and category
    Refined,
}

/// All objects seen for the current query
#[derive(Debug, Default)]
pub struct ResultSet {
    objects: Vec<MediaObjectScoreContainer>,
    object_index: HashMap<String, usize>,
    /// Owning object of every known segment
    segment_owner: HashMap<String, String>,
    categories: BTreeSet<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one partial result into the score model
    ///
    /// Fails without modifying the set if the update is malformed or
    /// contradicts what is already known about its segment.
    pub fn apply_score(&mut self, update: ScoreUpdate) -> Result<IngestOutcome> {
        update.validate()?;

        if let Some(owner) = self.segment_owner.get(&update.segment_id) {
            if *owner != update.object_id {
                return Err(FusionError::InconsistentSegment {
                    segment_id: update.segment_id,
                    reason: format!(
                        "already registered under object '{}', got '{}'",
                        owner, update.object_id
                    ),
                });
            }
        }

        let outcome = match self.object_index.get(&update.object_id).copied() {
            Some(index) => {
                let object = &mut self.objects[index];
                match object.segment_mut(&update.segment_id) {
                    Some(segment) => Self::merge(segment, &update)?,
                    None => {
                        object.add_segment(Self::new_segment(&update)?)?;
                        IngestOutcome::NewSegment
                    }
                }
            }
            None => {
                let mut object = MediaObjectScoreContainer::new(update.object_id.clone())?;
                object.add_segment(Self::new_segment(&update)?)?;
                self.object_index
                    .insert(update.object_id.clone(), self.objects.len());
                self.objects.push(object);
                IngestOutcome::NewObject
            }
        };

        if matches!(outcome, IngestOutcome::NewObject | IngestOutcome::NewSegment) {
            self.segment_owner
                .insert(update.segment_id.clone(), update.object_id.clone());
        }
        if !self.categories.contains(&update.category) {
            debug!(category = %update.category, "New feature category in result stream");
            self.categories.insert(update.category.clone());
        }

        trace!(
            object_id = %update.object_id,
            segment_id = %update.segment_id,
            container_id = update.container_id,
            category = %update.category,
            value = update.value,
            ?outcome,
            "Applied score"
        );
        Ok(outcome)
    }

    fn new_segment(update: &ScoreUpdate) -> Result<SegmentScoreContainer> {
        let mut segment = SegmentScoreContainer::new(
            update.segment_id.clone(),
            update.object_id.clone(),
            update.startabs,
            update.endabs,
        )?;
        segment.set_score(update.container_id, update.category.clone(), update.value)?;
        Ok(segment)
    }

    fn merge(segment: &mut SegmentScoreContainer, update: &ScoreUpdate) -> Result<IngestOutcome> {
        if !segment.has_bounds(update.startabs, update.endabs) {
            return Err(FusionError::InconsistentSegment {
                segment_id: update.segment_id.clone(),
                reason: format!(
                    "time bounds changed from [{}, {}] to [{}, {}]",
                    segment.startabs(),
                    segment.endabs(),
                    update.startabs,
                    update.endabs
                ),
            });
        }

        let previous = segment.set_score(update.container_id, update.category.clone(), update.value)?;
        Ok(match previous {
            Some(_) => IngestOutcome::Refined,
            None => IngestOutcome::Merged,
        })
    }

    pub fn object(&self, object_id: &str) -> Option<&MediaObjectScoreContainer> {
        self.object_index.get(object_id).map(|&i| &self.objects[i])
    }

    pub fn object_mut(&mut self, object_id: &str) -> Option<&mut MediaObjectScoreContainer> {
        match self.object_index.get(object_id) {
            Some(&i) => Some(&mut self.objects[i]),
            None => None,
        }
    }

    /// Objects in order of first appearance
    pub fn objects(&self) -> &[MediaObjectScoreContainer] {
        &self.objects
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of segments over all objects
    pub fn segment_count(&self) -> usize {
        self.segment_owner.len()
    }

    /// Every category id seen in the stream, sorted
    pub fn categories_seen(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Drop all results
    pub fn clear(&mut self) {
        self.objects.clear();
        self.object_index.clear();
        self.segment_owner.clear();
        self.categories.clear();
    }
}
