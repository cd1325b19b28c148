use eframe::egui;

use super::bars::{Surface, draw_bars};
use crate::audio::FrequencySource;

/// Frame-driven draw loop. The host calls `frame` once per display refresh
/// and schedules another refresh only while it returns `true`.
#[derive(Default)]
pub struct RenderLoop {
    active: bool,
    buffer: Vec<u8>,
    surface_size: Option<egui::Vec2>,
}

impl RenderLoop {
    /// Allocates a fresh sample buffer and fixes the surface size until the
    /// next start.
    pub fn start(&mut self, bin_count: usize, surface_size: egui::Vec2) {
        self.buffer = vec![0; bin_count];
        self.surface_size = Some(surface_size);
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn surface_size(&self) -> Option<egui::Vec2> {
        self.surface_size
    }

    pub fn frame(&mut self, source: &mut impl FrequencySource, surface: &mut impl Surface) -> bool {
        if !self.active {
            return false;
        }

        source.get_byte_frequency_data(&mut self.buffer);
        draw_bars(surface, &self.buffer);

        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::bars::testing::RecordingSurface;

    struct FixedSource {
        data: Vec<u8>,
        reads: usize,
    }

    impl FrequencySource for FixedSource {
        fn frequency_bin_count(&self) -> usize {
            self.data.len()
        }

        fn get_byte_frequency_data(&mut self, out: &mut [u8]) {
            self.reads += 1;
            for (o, d) in out.iter_mut().zip(&self.data) {
                *o = *d;
            }
        }
    }

    fn source() -> FixedSource {
        FixedSource {
            data: vec![10, 20, 30, 40],
            reads: 0,
        }
    }

    #[test]
    fn idle_loop_draws_nothing() {
        let mut render_loop = RenderLoop::default();
        let mut surface = RecordingSurface::new(100.0, 100.0);
        assert!(!render_loop.frame(&mut source(), &mut surface));
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn active_loop_samples_and_reschedules() {
        let mut render_loop = RenderLoop::default();
        let mut src = source();
        render_loop.start(src.frequency_bin_count(), egui::vec2(100.0, 100.0));

        let mut surface = RecordingSurface::new(100.0, 100.0);
        assert!(render_loop.frame(&mut src, &mut surface));
        assert!(render_loop.frame(&mut src, &mut surface));

        assert_eq!(src.reads, 2);
        let heights: Vec<f32> = surface.calls[2..9].iter().step_by(2).map(|c| c.height).collect();
        assert_eq!(heights, vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(surface.calls.len(), 2 * (1 + 4 * 2));
    }

    #[test]
    fn no_draws_after_cancel() {
        let mut render_loop = RenderLoop::default();
        let mut src = source();
        render_loop.start(4, egui::vec2(100.0, 100.0));

        let mut surface = RecordingSurface::new(100.0, 100.0);
        render_loop.frame(&mut src, &mut surface);
        let drawn = surface.calls.len();

        render_loop.cancel();
        for _ in 0..3 {
            assert!(!render_loop.frame(&mut src, &mut surface));
        }
        assert_eq!(surface.calls.len(), drawn);
        assert_eq!(src.reads, 1);
    }

    #[test]
    fn restart_reallocates_buffer_and_keeps_size_fixed() {
        let mut render_loop = RenderLoop::default();
        render_loop.start(128, egui::vec2(800.0, 600.0));
        assert_eq!(render_loop.buffer.len(), 128);
        assert_eq!(render_loop.surface_size(), Some(egui::vec2(800.0, 600.0)));

        render_loop.cancel();
        render_loop.start(64, egui::vec2(1024.0, 768.0));
        assert!(render_loop.is_active());
        assert_eq!(render_loop.buffer.len(), 64);
        assert_eq!(render_loop.surface_size(), Some(egui::vec2(1024.0, 768.0)));
    }
}
