//! Refresh-cycle orchestration.
//!
//! A refresh fetches and decodes both feeds concurrently, joins them,
//! narrows to the viewport and projects features. Only the most recently
//! started refresh may publish; anything it supersedes is cancelled and
//! never reaches observers or rendering sinks.

mod center;
mod error;
mod events;
mod orchestrator;
mod state;

pub use center::ViewCenter;
pub use error::SyncError;
pub use events::{MapEvent, run_events};
pub use orchestrator::{SyncConfig, SyncOrchestrator};
pub use state::{FeatureSet, RenderSink};
