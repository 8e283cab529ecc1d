pub mod engine;
pub mod ticker;

pub use engine::{FinishedSession, TimerEngine};
pub use ticker::Ticker;
