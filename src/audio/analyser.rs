use apodize::cosine_iter;
use rustfft::{Fft, FftPlanner, num_complex::Complex32};
use std::sync::Arc;

use crate::config::AnalyserConfig;
use crate::error::Result;

/// Frequency-analysis node: windowed FFT over the most recent `fft_size`
/// samples, smoothed over time and scaled to bytes between the decibel bounds.
pub struct Analyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
    window: Vec<f32>,
    time_domain: Vec<f32>,
    write_pos: usize,
    fft_buffer: Vec<Complex32>,
    smoothed: Vec<f32>,
}

impl Analyser {
    pub fn new(config: &AnalyserConfig) -> Result<Self> {
        config.validate()?;

        let fft_size = config.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Ok(Self {
            fft,
            fft_size,
            smoothing: config.smoothing,
            min_decibels: config.min_decibels,
            max_decibels: config.max_decibels,
            // Classic Blackman, alpha = 0.16
            window: cosine_iter(0.42, 0.5, 0.08, 0.0, fft_size)
                .map(|x| x as f32)
                .collect(),
            time_domain: vec![0.0; fft_size],
            write_pos: 0,
            fft_buffer: vec![Complex32::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Appends mono samples, keeping only the last `fft_size`.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let skip = samples.len().saturating_sub(self.fft_size);
        for &sample in &samples[skip..] {
            self.time_domain[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.fft_size;
        }
    }

    fn update_spectrum(&mut self) {
        // Oldest sample sits at write_pos.
        for i in 0..self.fft_size {
            let sample = self.time_domain[(self.write_pos + i) % self.fft_size];
            self.fft_buffer[i] = Complex32::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let scale = 1.0 / self.fft_size as f32;
        let tau = self.smoothing;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() * scale;
            let value = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if value.is_finite() { value } else { 0.0 };
        }
    }

    /// Fills `out` with the current spectrum as bytes. Writes at most
    /// `frequency_bin_count` values.
    pub fn get_byte_frequency_data(&mut self, out: &mut [u8]) {
        self.update_spectrum();

        let range_scale = 255.0 / (self.max_decibels - self.min_decibels);
        for (byte, &magnitude) in out.iter_mut().zip(self.smoothed.iter()) {
            let db = 20.0 * magnitude.log10();
            let scaled = range_scale * (db - self.min_decibels);
            // -inf for silence lands on 0 here
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn config(fft_size: usize, smoothing: f32) -> AnalyserConfig {
        AnalyserConfig {
            fft_size,
            smoothing,
            ..AnalyserConfig::default()
        }
    }

    fn sine(bin: usize, fft_size: usize, amplitude: f32) -> Vec<f32> {
        (0..fft_size)
            .map(|n| amplitude * (2.0 * PI * bin as f32 * n as f32 / fft_size as f32).sin())
            .collect()
    }

    fn argmax(data: &[u8]) -> usize {
        let mut best = 0;
        for (i, &v) in data.iter().enumerate() {
            if v > data[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn bin_count_is_half_window() {
        let analyser = Analyser::new(&config(256, 0.8)).unwrap();
        assert_eq!(analyser.fft_size(), 256);
        assert_eq!(analyser.frequency_bin_count(), 128);
    }

    #[test]
    fn rejects_invalid_window() {
        assert!(Analyser::new(&config(100, 0.8)).is_err());
    }

    #[test]
    fn silence_is_all_zero() {
        let mut analyser = Analyser::new(&config(256, 0.8)).unwrap();
        analyser.push_samples(&[0.0; 256]);
        let mut data = vec![7u8; 128];
        analyser.get_byte_frequency_data(&mut data);
        assert!(data.iter().all(|&v| v == 0));
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let mut analyser = Analyser::new(&config(256, 0.0)).unwrap();
        analyser.push_samples(&sine(20, 256, 0.001));
        let mut data = vec![0u8; 128];
        analyser.get_byte_frequency_data(&mut data);

        assert_eq!(argmax(&data), 20);
        assert!(data[20] > 0);
        assert_eq!(data[40], 0);
        assert_eq!(data[2], 0);
    }

    #[test]
    fn smoothing_decays_instead_of_dropping() {
        let mut analyser = Analyser::new(&config(256, 0.8)).unwrap();
        analyser.push_samples(&sine(10, 256, 0.001));
        let mut data = vec![0u8; 128];
        for _ in 0..60 {
            analyser.get_byte_frequency_data(&mut data);
        }
        let loud = data[10];
        assert!(loud > 0);

        analyser.push_samples(&[0.0; 256]);
        analyser.get_byte_frequency_data(&mut data);
        assert!(data[10] < loud);
        assert!(data[10] > 0);
    }

    #[test]
    fn keeps_only_latest_window() {
        let mut analyser = Analyser::new(&config(256, 0.0)).unwrap();
        let mut samples = sine(30, 256, 0.5);
        samples.extend(std::iter::repeat(0.0).take(256));
        analyser.push_samples(&samples);

        let mut data = vec![0u8; 128];
        analyser.get_byte_frequency_data(&mut data);
        assert!(data.iter().all(|&v| v == 0));
    }

    #[test]
    fn short_output_gets_leading_bins() {
        let mut analyser = Analyser::new(&config(256, 0.0)).unwrap();
        analyser.push_samples(&sine(3, 256, 0.001));
        let mut data = vec![0u8; 8];
        analyser.get_byte_frequency_data(&mut data);
        assert_eq!(argmax(&data), 3);
    }
}
