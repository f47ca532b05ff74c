//! ppgwave - play the wavetable voice from the terminal
//!
//! Run with: cargo run --bin ppgwave
//!
//! Log output goes to stderr and is filtered with RUST_LOG, e.g.
//! `RUST_LOG=ppg_wave=debug cargo run 2> ppgwave.log`.

mod app;
mod ui;

use app::PpgWave;
use ppg_wave::{dsp::Oversampling, synth::ModulationRate, Param};
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // A slow envelope sweep through the first wavetable
    PpgWave::new()
        .oversampling(Oversampling::X2)
        .modulation_rate(ModulationRate::PerBlock)
        .param(Param::Wavetable, 0)
        .param(Param::EnvAttack, 40)
        .param(Param::EnvDecay, 45)
        .param(Param::EnvAmount, 60)
        .param(Param::LfoRate, 35)
        .param(Param::LfoAmount, 20)
        .run()
}
