//! Live scan lifecycle.
//!
//! A scan session moves through the states in
//! [`ScanState`](tagsight_model::ScanState): permission prompt, streaming,
//! then exactly one terminal outcome. [`LiveDecodeLoop`] drives a single
//! session; [`ScanSupervisor`] keeps at most one session running at a time.

mod events;
mod live_loop;
mod session;
mod supervisor;

#[cfg(test)]
pub(crate) mod testkit;

pub use events::ScanEvent;
pub use live_loop::{LiveDecodeLoop, LoopTuning, ScanHandle};
pub use session::ScanSession;
pub use supervisor::{ScanSupervisor, ScanTicket};
