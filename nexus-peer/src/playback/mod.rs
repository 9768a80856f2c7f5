//! Session, resource lifecycle, and tick scheduling

pub mod admission;
pub mod engine;
pub mod queue;
pub mod resource;
pub mod router;
pub mod session;
pub mod spatial;
pub mod table;

pub use admission::{Admission, AdmissionController, CapacityLimits};
pub use engine::{EngineHandle, EngineMessage, PlaybackEngine};
pub use queue::{PlaybackQueue, PlaybackRequest};
pub use resource::{FetchStatus, PlaybackResource};
pub use router::{AuthorityCheck, CommandRouter, ConfiguredAuthority, RouteOutcome};
pub use session::{AudioSession, SessionContext, SessionSettings, SessionSnapshot};
pub use spatial::{EntityDirectory, SharedEntityDirectory};
pub use table::ResourceTable;
