pub mod config;
pub mod error;
pub mod fields;
pub mod handle;
pub mod traits;
pub mod workspace;

pub use config::Config;
pub use error::WorkspaceError;
pub use fields::{EvidenceAggregate, SignalFields, SourceVideo, SupportingComment};
pub use traits::StrategyBackend;
pub use workspace::{ChannelQuery, Workspace, WorkspaceResult, MAX_COMMENTS_PER_VIDEO};
