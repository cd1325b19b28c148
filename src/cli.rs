use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "barviz", about = "Plays an audio file with a live frequency-bar visualization")]
pub struct Cli {
    /// Audio file to play (MP3, FLAC, OGG, WAV)
    pub input: Option<PathBuf>,

    /// TOML config file (defaults to ./barviz.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Initial playback volume (0.0-1.0)
    #[arg(long)]
    pub volume: Option<f32>,

    /// Analyser window size, a power of two between 32 and 32768
    #[arg(long)]
    pub fft_size: Option<usize>,

    /// Stop at the end of the file instead of looping
    #[arg(long)]
    pub no_loop: bool,
}
