use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Host, SampleFormat, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::{Arc, Mutex, Weak};

use super::{Analyser, FrequencySource, Playback};
use crate::config::{AnalyserConfig, TAP_CAPACITY};
use crate::error::{Result, VizError};

/// Slot for a resource that is built on first use and then kept for the
/// rest of the session.
pub struct GraphSlot<G> {
    graph: Option<G>,
}

impl<G> Default for GraphSlot<G> {
    fn default() -> Self {
        Self { graph: None }
    }
}

impl<G> GraphSlot<G> {
    pub fn get_mut(&mut self) -> Option<&mut G> {
        self.graph.as_mut()
    }

    /// Runs `init` only while the slot is empty. A failed `init` leaves it
    /// empty.
    pub fn get_or_try_init<E>(
        &mut self,
        init: impl FnOnce() -> std::result::Result<G, E>,
    ) -> std::result::Result<&mut G, E> {
        let graph = match self.graph.take() {
            Some(graph) => graph,
            None => init()?,
        };
        Ok(self.graph.insert(graph))
    }
}

/// source -> analyser -> destination. The output stream pulls from the
/// playback and feeds what it plays into the analyser tap.
pub struct AnalysisGraph {
    _stream: Stream,
    analyser: Analyser,
    tap: HeapCons<f32>,
    scratch: Vec<f32>,
}

impl AnalysisGraph {
    pub fn connect(
        host: &Host,
        playback: &Arc<Mutex<Playback>>,
        config: &AnalyserConfig,
    ) -> Result<Self> {
        let analyser = Analyser::new(config)?;

        let device = host
            .default_output_device()
            .ok_or(VizError::NoOutputDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| VizError::Stream(format!("Failed to get output config: {}", e)))?;

        if supported.sample_format() != SampleFormat::F32 {
            return Err(VizError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        let stream_config = create_stream_config(supported.channels(), supported.sample_rate());
        let (producer, tap) = HeapRb::<f32>::new(TAP_CAPACITY).split();

        let stream = create_output_stream(&device, &stream_config, Arc::downgrade(playback), producer)?;
        stream
            .play()
            .map_err(|e| VizError::Stream(format!("Failed to start output stream: {}", e)))?;

        log::info!(
            "Audio graph connected: {} ({} ch, {}Hz), fft size {}",
            device.name().unwrap_or_else(|_| "unknown device".into()),
            stream_config.channels,
            stream_config.sample_rate.0,
            analyser.fft_size()
        );

        Ok(Self {
            _stream: stream,
            scratch: vec![0.0; TAP_CAPACITY],
            analyser,
            tap,
        })
    }

    fn drain_tap(&mut self) {
        loop {
            let n = self.tap.pop_slice(&mut self.scratch);
            if n == 0 {
                break;
            }
            self.analyser.push_samples(&self.scratch[..n]);
        }
    }
}

impl FrequencySource for AnalysisGraph {
    fn frequency_bin_count(&self) -> usize {
        self.analyser.frequency_bin_count()
    }

    fn get_byte_frequency_data(&mut self, out: &mut [u8]) {
        self.drain_tap();
        self.analyser.get_byte_frequency_data(out);
    }
}

pub fn create_stream_config(channels: u16, sample_rate: cpal::SampleRate) -> StreamConfig {
    StreamConfig {
        channels,
        sample_rate,
        buffer_size: BufferSize::Default,
    }
}

fn create_output_stream(
    device: &cpal::Device,
    stream_config: &StreamConfig,
    playback_weak: Weak<Mutex<Playback>>,
    mut producer: HeapProd<f32>,
) -> Result<Stream> {
    let channels = stream_config.channels as usize;
    let sample_rate = stream_config.sample_rate.0;

    device
        .build_output_stream(
            stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let rendered = playback_weak
                    .upgrade()
                    .and_then(|playback| {
                        let mut guard = playback.lock().ok()?;
                        guard.render(data, channels, sample_rate, |s| {
                            // Dropped when the UI falls behind; the analyser only needs the tail.
                            let _ = producer.try_push(s);
                        });
                        Some(())
                    })
                    .is_some();

                if !rendered {
                    data.fill(0.0);
                }
            },
            |err| log::error!("Output stream error: {}", err),
            None,
        )
        .map_err(|e| VizError::Stream(format!("Failed to build output stream: {}", e)))
}
