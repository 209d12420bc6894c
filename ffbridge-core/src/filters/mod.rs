//! Filters contribute argument fragments to a transcode.
//!
//! Filters are registered on a media as a [`MediaFilter`], which records the
//! modality the filter applies to. Audio media accept only
//! [`MediaFilter::Audio`]; the fragments of registered filters are emitted
//! in registration order.

mod audio;
mod video;

pub use audio::{AudioFilter, AudioFilters, ClipFilter, MetadataFilter, ResampleFilter, SimpleFilter};
pub use video::{CustomVideoFilter, VideoFilter};

use std::fmt;

/// A filter tagged with the modality it applies to.
pub enum MediaFilter {
    Audio(Box<dyn AudioFilter>),
    Video(Box<dyn VideoFilter>),
}

impl MediaFilter {
    pub fn audio(filter: impl AudioFilter + 'static) -> Self {
        MediaFilter::Audio(Box::new(filter))
    }

    pub fn video(filter: impl VideoFilter + 'static) -> Self {
        MediaFilter::Video(Box::new(filter))
    }

    pub fn modality(&self) -> &'static str {
        match self {
            MediaFilter::Audio(_) => "audio",
            MediaFilter::Video(_) => "video",
        }
    }
}

impl fmt::Debug for MediaFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFilter::Audio(filter) => write!(f, "Audio({})", filter.name()),
            MediaFilter::Video(filter) => write!(f, "Video({})", filter.name()),
        }
    }
}

/// The ordered filters registered on a media.
#[derive(Debug, Default)]
pub struct FilterCollection {
    filters: Vec<MediaFilter>,
}

impl FilterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, filter: MediaFilter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaFilter> {
        self.filters.iter()
    }
}

impl<'a> IntoIterator for &'a FilterCollection {
    type Item = &'a MediaFilter;
    type IntoIter = std::slice::Iter<'a, MediaFilter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}
