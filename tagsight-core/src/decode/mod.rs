//! Visual code decoding: the engine port and the still-image path.

mod engine;
mod still;

pub use engine::{DecodeAttempt, DecodeEngine, EngineError};
pub use still::{StillDecoder, StillOutcome};
