//! Segment score containers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ContainerId;
use crate::{FusionError, Result};

/// Raw scores of one query container, keyed by feature category id
pub type CategoryScores = BTreeMap<String, f64>;

/// A retrievable temporal sub-unit of a media object and its raw scores.
///
/// The owning [`MediaObjectScoreContainer`](super::MediaObjectScoreContainer) is
/// referenced by id only; objects own their segments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentScoreContainer {
    segment_id: String,
    object_id: String,
    startabs: f64,
    endabs: f64,
    scores: BTreeMap<ContainerId, CategoryScores>,
    visible: bool,
}

impl SegmentScoreContainer {
    /// Create an unscored segment with absolute time bounds in seconds
    pub fn new(
        segment_id: impl Into<String>,
        object_id: impl Into<String>,
        startabs: f64,
        endabs: f64,
    ) -> Result<Self> {
        let segment_id = segment_id.into();
        let object_id = object_id.into();

        if segment_id.trim().is_empty() {
            return Err(FusionError::InvalidIdentifier("segment id".to_string()));
        }
        if object_id.trim().is_empty() {
            return Err(FusionError::InvalidIdentifier(format!(
                "object id of segment '{}'",
                segment_id
            )));
        }
        validate_bounds(&segment_id, startabs, endabs)?;

        Ok(Self {
            segment_id,
            object_id,
            startabs,
            endabs,
            scores: BTreeMap::new(),
            visible: true,
        })
    }

    pub fn segment_id(&self) -> &str {
        &self.segment_id
    }

    /// Id of the owning media object
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn startabs(&self) -> f64 {
        self.startabs
    }

    pub fn endabs(&self) -> f64 {
        self.endabs
    }

    /// Raw scores keyed by query container id
    pub fn scores(&self) -> &BTreeMap<ContainerId, CategoryScores> {
        &self.scores
    }

    /// Query containers that produced scores for this segment, ascending
    pub fn container_ids(&self) -> impl Iterator<Item = ContainerId> + '_ {
        self.scores.keys().copied()
    }

    pub fn category_scores(&self, container_id: ContainerId) -> Option<&CategoryScores> {
        self.scores.get(&container_id)
    }

    /// Whether any score arrived for this segment yet
    pub fn is_scored(&self) -> bool {
        !self.scores.is_empty()
    }

    /// Record a raw category score, returning the value it replaced
    ///
    /// Raw scores must be finite and non-negative.
    pub fn set_score(
        &mut self,
        container_id: ContainerId,
        category: impl Into<String>,
        value: f64,
    ) -> Result<Option<f64>> {
        validate_score(&self.segment_id, value)?;
        let category = category.into();
        if category.trim().is_empty() {
            return Err(FusionError::InvalidIdentifier(format!(
                "category of segment '{}'",
                self.segment_id
            )));
        }

        Ok(self
            .scores
            .entry(container_id)
            .or_default()
            .insert(category, value))
    }

    /// Whether presentation layers show this segment
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether these bounds match the segment's known bounds
    pub fn has_bounds(&self, startabs: f64, endabs: f64) -> bool {
        self.startabs == startabs && self.endabs == endabs
    }
}

pub(crate) fn validate_score(segment_id: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FusionError::InvalidScore {
            segment_id: segment_id.to_string(),
            field: "score",
            value,
        });
    }
    Ok(())
}

pub(crate) fn validate_bounds(segment_id: &str, startabs: f64, endabs: f64) -> Result<()> {
    if !startabs.is_finite() {
        return Err(FusionError::InvalidScore {
            segment_id: segment_id.to_string(),
            field: "startabs",
            value: startabs,
        });
    }
    if !endabs.is_finite() {
        return Err(FusionError::InvalidScore {
            segment_id: segment_id.to_string(),
            field: "endabs",
            value: endabs,
        });
    }
    if endabs < startabs {
        return Err(FusionError::InvalidSegmentBounds {
            segment_id: segment_id.to_string(),
            startabs,
            endabs,
        });
    }
    Ok(())
}
