//! Protocol-level utilities for JSON-LD/Hydra and Mercure.

pub mod constants;
pub mod hydra;
pub mod link;
pub mod sse;
pub mod violations;

pub use constants::*;
pub use hydra::*;
pub use link::*;
pub use sse::{ParseState, SseEvent, SseParser};
pub use violations::*;
