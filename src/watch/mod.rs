pub mod backfill;
pub mod dispatch;
pub mod enrich;
pub mod filter;
pub mod monitor;
pub mod pumpfun;

pub use backfill::BackfillReconciler;
pub use dispatch::{AlertSink, Dispatcher};
pub use enrich::MetadataEnricher;
pub use monitor::{EventPipeline, MonitorConfig, MonitorState, MonitorStats, TokenMonitor};
pub use pumpfun::{CandidateEvent, PumpCreateEvent};
