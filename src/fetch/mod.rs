//! Fetch Module - backend retrieval with per-collection state
//!
//! - `transport`: the injectable request seam and its HTTP implementation
//! - `state`: Idle/Loading/Success/Error slots that drop stale results
//! - `orchestrator`: the per-view session that drives both

pub mod orchestrator;
pub mod state;
pub mod transport;

pub use orchestrator::{ViewSession, ViewSnapshot};
pub use state::{Completion, FetchSlot, FetchState, Liveness, Ticket};
pub use transport::{
    record_from_envelope, records_from_envelope, HttpTransport, Method, Transport, UploadFile,
    UploadForm,
};
