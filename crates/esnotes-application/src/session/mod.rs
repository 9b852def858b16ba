//! Session use cases.

mod merger;
mod recorder;
mod timer;

pub use merger::SessionMerger;
pub use recorder::SessionRecorder;
pub use timer::SessionTimer;
