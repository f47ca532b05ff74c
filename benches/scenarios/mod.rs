//! Real-world scenario benchmarks.
//!
//! Complete voices as a host would run them, alone and stacked.

mod mix;
mod voice;

pub use mix::bench_mix;
pub use voice::bench_voice;
