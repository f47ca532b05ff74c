//! Benchmarks for low-level DSP primitives.

mod decimator;
mod envlfo;
mod generator;
mod wavetable;

pub use decimator::bench_decimator;
pub use envlfo::bench_envlfo;
pub use generator::bench_generator;
pub use wavetable::bench_wavetable;
