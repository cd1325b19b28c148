pub mod analyser;
pub mod decode;
pub mod graph;
pub mod playback;

pub use analyser::Analyser;
pub use graph::{AnalysisGraph, GraphSlot};
pub use playback::Playback;

/// Anything that can report the current magnitude spectrum as bytes.
pub trait FrequencySource {
    fn frequency_bin_count(&self) -> usize;
    fn get_byte_frequency_data(&mut self, out: &mut [u8]);
}
