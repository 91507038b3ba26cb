//! Published station state and the rendering sink seam.

use serde::Serialize;

use crate::domain::{LatLon, RenderableFeature};
use crate::gbfs::FeedMetadata;
use crate::project::ColorStops;

/// The feature set produced by one completed refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    /// Refresh that produced this set; 0 before the first publish.
    pub generation: u64,
    /// Viewport center the stations were filtered around.
    pub center: Option<LatLon>,
    pub features: Vec<RenderableFeature>,
    pub information: Option<FeedMetadata>,
    pub status: Option<FeedMetadata>,
}

impl FeatureSet {
    /// The set observers see before anything has been published.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            center: None,
            features: Vec::new(),
            information: None,
            status: None,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Something that draws station markers, e.g. a map layer.
///
/// Called once per published feature set, in publish order, while the
/// orchestrator holds its publish lock. Implementations should hand the data
/// off rather than block.
pub trait RenderSink: Send + Sync {
    fn render(&self, features: &FeatureSet, stops: &ColorStops);
}
