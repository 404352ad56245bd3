//! Audio intake: frames, aggregation, materialization, and capture sources.

pub mod aggregator;
#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod frame;
pub mod materializer;
pub mod recorder;
pub mod wav;
