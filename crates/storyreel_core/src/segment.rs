//! Segments and their generated media.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyreel_error::{PipelineError, PipelineErrorKind};

use crate::{MediaRef, ProjectId, SegmentId};

/// A segment to be persisted, before it has an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSegment {
    /// Owning project
    pub project_id: ProjectId,
    /// Submission attempt that produced the segment
    pub attempt: u32,
    /// Zero-based position within the attempt
    pub sequence_order: usize,
    /// Segment text
    pub content: String,
}

/// Generation results written onto a persisted segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMediaUpdate {
    /// Estimated playback duration in seconds
    pub duration_seconds: f64,
    /// Visual media reference
    pub media_ref: MediaRef,
    /// Narration audio reference, when audio is enabled
    pub narration_ref: Option<MediaRef>,
}

/// A persisted chunk of story text.
///
/// Created in a batch with contiguous sequence orders, then populated at most
/// once by its generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Segment {
    /// Segment identifier
    id: SegmentId,
    /// Owning project
    project_id: ProjectId,
    /// Submission attempt that produced the segment
    attempt: u32,
    /// Zero-based position within the attempt
    sequence_order: usize,
    /// Segment text
    content: String,
    /// Estimated duration in seconds, set by generation
    duration_seconds: Option<f64>,
    /// Visual media reference, set by generation
    media_ref: Option<MediaRef>,
    /// Narration audio reference, set by generation when audio is enabled
    narration_ref: Option<MediaRef>,
    /// Creation time
    created_at: DateTime<Utc>,
}

impl Segment {
    /// Materialize a new segment with a fresh identifier.
    pub fn create(new: NewSegment) -> Self {
        Self {
            id: SegmentId::new(),
            project_id: new.project_id,
            attempt: new.attempt,
            sequence_order: new.sequence_order,
            content: new.content,
            duration_seconds: None,
            media_ref: None,
            narration_ref: None,
            created_at: Utc::now(),
        }
    }

    /// Whether generation results have been written.
    pub fn has_media(&self) -> bool {
        self.media_ref.is_some()
    }

    /// Write generation results onto the segment.
    pub fn apply_media(&mut self, update: SegmentMediaUpdate) {
        self.duration_seconds = Some(update.duration_seconds);
        self.media_ref = Some(update.media_ref);
        self.narration_ref = update.narration_ref;
    }
}

/// Media produced for one segment by the generator.
///
/// # Examples
///
/// ```
/// use storyreel_core::{MediaRef, SegmentMedia};
///
/// let media = SegmentMedia {
///     sequence_index: 0,
///     content: "A dragon wants friends".to_string(),
///     duration_seconds: 3.0,
///     media_ref: MediaRef::new("fake://visual/abc"),
///     narration_ref: None,
/// };
/// assert_eq!(media.to_update().duration_seconds, 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMedia {
    /// Position of the segment
    pub sequence_index: usize,
    /// Segment text
    pub content: String,
    /// Estimated playback duration in seconds
    pub duration_seconds: f64,
    /// Visual media reference
    pub media_ref: MediaRef,
    /// Narration audio reference
    pub narration_ref: Option<MediaRef>,
}

impl SegmentMedia {
    /// The persistence update carrying these results.
    pub fn to_update(&self) -> SegmentMediaUpdate {
        SegmentMediaUpdate {
            duration_seconds: self.duration_seconds,
            media_ref: self.media_ref.clone(),
            narration_ref: self.narration_ref.clone(),
        }
    }
}

impl TryFrom<&Segment> for SegmentMedia {
    type Error = PipelineError;

    /// Fails with `IncompleteInput` when the segment has no media or duration.
    fn try_from(segment: &Segment) -> Result<Self, Self::Error> {
        match (&segment.media_ref, segment.duration_seconds) {
            (Some(media_ref), Some(duration_seconds)) => Ok(Self {
                sequence_index: segment.sequence_order,
                content: segment.content.clone(),
                duration_seconds,
                media_ref: media_ref.clone(),
                narration_ref: segment.narration_ref.clone(),
            }),
            _ => Err(PipelineError::new(PipelineErrorKind::IncompleteInput {
                sequence_indices: vec![segment.sequence_order],
            })),
        }
    }
}
