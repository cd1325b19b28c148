use super::decode::DecodedAudio;

/// The media element: owns the decoded PCM and the transport state the
/// controls mutate. The output stream renders from it on the audio thread.
pub struct Playback {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
    position: f64,
    playing: bool,
    pub looping: bool,
    pub volume: f32,
}

impl Playback {
    pub fn new(audio: DecodedAudio, looping: bool, volume: f32) -> Self {
        Self {
            samples: audio.samples,
            channels: audio.channels.max(1),
            sample_rate: audio.sample_rate,
            position: 0.0,
            playing: false,
            looping,
            volume,
        }
    }

    fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate.max(1) as f64
    }

    pub fn position_secs(&self) -> f64 {
        self.position / self.sample_rate.max(1) as f64
    }

    pub fn play(&mut self) {
        if self.position >= self.frames() as f64 {
            self.position = 0.0;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn seek(&mut self, secs: f64) {
        let secs = secs.clamp(0.0, self.duration_secs());
        self.position = secs * self.sample_rate as f64;
    }

    fn sample_at(&self, frame: usize, channel: usize) -> f32 {
        self.samples
            .get(frame * self.channels + channel)
            .copied()
            .unwrap_or(0.0)
    }

    /// Linear interpolation between neighbouring source frames.
    fn source_sample(&self, channel: usize) -> f32 {
        let frame = self.position.floor() as usize;
        let frac = (self.position - frame as f64) as f32;
        let a = self.sample_at(frame, channel);
        let b = if frame + 1 < self.frames() {
            self.sample_at(frame + 1, channel)
        } else if self.looping {
            self.sample_at(0, channel)
        } else {
            a
        };
        a + (b - a) * frac
    }

    fn device_sample(&self, out_channel: usize, out_channels: usize) -> f32 {
        if out_channels == 1 {
            let sum: f32 = (0..self.channels).map(|c| self.source_sample(c)).sum();
            sum / self.channels as f32
        } else {
            self.source_sample(out_channel % self.channels)
        }
    }

    fn advance(&mut self, step: f64) {
        self.position += step;
        let frames = self.frames() as f64;
        if self.position >= frames {
            if self.looping && frames > 0.0 {
                self.position %= frames;
            } else {
                self.position = frames;
                self.playing = false;
            }
        }
    }

    /// Fills one device buffer and hands each frame's mono mix to `tap`.
    /// Paused playback renders, and taps, silence.
    pub fn render(
        &mut self,
        out: &mut [f32],
        out_channels: usize,
        out_rate: u32,
        mut tap: impl FnMut(f32),
    ) {
        let out_channels = out_channels.max(1);
        let step = self.sample_rate as f64 / out_rate.max(1) as f64;

        for frame in out.chunks_mut(out_channels) {
            if !self.playing {
                frame.fill(0.0);
                tap(0.0);
                continue;
            }

            let mut mix = 0.0;
            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = self.device_sample(c, out_channels) * self.volume;
                mix += *sample;
            }
            tap(mix / frame.len() as f32);

            self.advance(step);
        }
    }
}
