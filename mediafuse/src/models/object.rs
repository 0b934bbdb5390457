//! Media object score containers

use std::collections::HashMap;

use super::SegmentScoreContainer;
use crate::{FusionError, Result};

/// A candidate media object and the segments scored for it so far.
///
/// Segments are unique by id and kept in insertion order.
#[derive(Debug, Clone)]
pub struct MediaObjectScoreContainer {
    object_id: String,
    segments: Vec<SegmentScoreContainer>,
    index: HashMap<String, usize>,
}

impl MediaObjectScoreContainer {
    pub fn new(object_id: impl Into<String>) -> Result<Self> {
        let object_id = object_id.into();
        if object_id.trim().is_empty() {
            return Err(FusionError::InvalidIdentifier("object id".to_string()));
        }
        Ok(Self {
            object_id,
            segments: Vec::new(),
            index: HashMap::new(),
        })
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Segments in insertion order
    pub fn segments(&self) -> &[SegmentScoreContainer] {
        &self.segments
    }

    pub fn segment(&self, segment_id: &str) -> Option<&SegmentScoreContainer> {
        self.index.get(segment_id).map(|&i| &self.segments[i])
    }

    pub fn segment_mut(&mut self, segment_id: &str) -> Option<&mut SegmentScoreContainer> {
        match self.index.get(segment_id) {
            Some(&i) => Some(&mut self.segments[i]),
            None => None,
        }
    }

    pub fn contains_segment(&self, segment_id: &str) -> bool {
        self.index.contains_key(segment_id)
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Add a new segment owned by this object
    pub fn add_segment(&mut self, segment: SegmentScoreContainer) -> Result<()> {
        if segment.object_id() != self.object_id {
            return Err(FusionError::InconsistentSegment {
                segment_id: segment.segment_id().to_string(),
                reason: format!(
                    "belongs to object '{}', not '{}'",
                    segment.object_id(),
                    self.object_id
                ),
            });
        }
        if self.index.contains_key(segment.segment_id()) {
            return Err(FusionError::InconsistentSegment {
                segment_id: segment.segment_id().to_string(),
                reason: format!("duplicate segment in object '{}'", self.object_id),
            });
        }

        self.index
            .insert(segment.segment_id().to_string(), self.segments.len());
        self.segments.push(segment);
        Ok(())
    }

    /// Segments sorted by start time; equal start times keep insertion order
    pub fn segments_by_start(&self) -> Vec<&SegmentScoreContainer> {
        let mut ordered: Vec<&SegmentScoreContainer> = self.segments.iter().collect();
        ordered.sort_by(|a, b| a.startabs().total_cmp(&b.startabs()));
        ordered
    }

    /// Whether any segment of this object has score data
    pub fn is_scored(&self) -> bool {
        self.segments.iter().any(SegmentScoreContainer::is_scored)
    }
}
