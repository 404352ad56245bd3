//! Session transcript: accumulation, derived views, and export.

pub mod accumulator;
pub mod export;
