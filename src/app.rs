use cpal::Host;
use eframe::{App, CreationContext, egui};
use std::sync::{Arc, Mutex};

use crate::audio::decode::DecodedAudio;
use crate::audio::{AnalysisGraph, FrequencySource, GraphSlot, Playback};
use crate::config::{AnalyserConfig, BACKGROUND, Config};
use crate::ui::{ControlsView, PainterSurface, PlayerAction, RenderLoop, draw_player_controls};

pub struct BarVisualizer {
    host: Host,
    playback: Arc<Mutex<Playback>>,
    graph: GraphSlot<AnalysisGraph>,
    analyser_config: AnalyserConfig,
    volume: f32,
    render_loop: RenderLoop,
}

impl BarVisualizer {
    pub fn new(_cc: &CreationContext, audio: DecodedAudio, config: &Config) -> Self {
        let playback = Playback::new(audio, config.player.looping, config.player.volume);

        Self {
            host: cpal::default_host(),
            playback: Arc::new(Mutex::new(playback)),
            graph: GraphSlot::default(),
            analyser_config: config.analyser,
            volume: config.player.volume,
            render_loop: RenderLoop::default(),
        }
    }

    /// Play handler: builds the audio graph on first use, applies the
    /// remembered volume and (re)starts drawing at the current viewport size.
    fn start_playback(&mut self, viewport: egui::Vec2) {
        let graph = match self.graph.get_or_try_init(|| {
            AnalysisGraph::connect(&self.host, &self.playback, &self.analyser_config)
        }) {
            Ok(graph) => graph,
            Err(e) => {
                log::error!("Failed to build audio graph: {}", e);
                return;
            }
        };
        let bin_count = graph.frequency_bin_count();

        if let Ok(mut playback) = self.playback.lock() {
            playback.volume = self.volume;
            playback.play();
            log::debug!("Play at {:.2}s", playback.position_secs());
        }

        self.render_loop.start(bin_count, viewport);
    }

    fn apply(&mut self, action: PlayerAction, viewport: egui::Vec2) {
        match action {
            PlayerAction::Play => self.start_playback(viewport),
            PlayerAction::Pause => {
                if let Ok(mut playback) = self.playback.lock() {
                    playback.pause();
                    log::debug!("Pause at {:.2}s", playback.position_secs());
                }
            }
            PlayerAction::Seek(secs) => {
                if let Ok(mut playback) = self.playback.lock() {
                    playback.seek(secs);
                    log::debug!("Seek to {:.2}s", secs);
                }
            }
            PlayerAction::Volume(volume) => {
                self.volume = volume;
                if let Ok(mut playback) = self.playback.lock() {
                    playback.volume = volume;
                }
            }
            PlayerAction::Looping(looping) => {
                if let Ok(mut playback) = self.playback.lock() {
                    playback.looping = looping;
                }
            }
        }
    }

    fn controls_view(&self) -> Option<ControlsView> {
        let playback = self.playback.lock().ok()?;
        Some(ControlsView {
            playing: playback.is_playing(),
            position: playback.position_secs(),
            duration: playback.duration_secs(),
            volume: self.volume,
            looping: playback.looping,
        })
    }

    fn teardown(&mut self) {
        if self.render_loop.is_active() {
            self.render_loop.cancel();
            log::info!("Render loop stopped");
        }
    }
}

impl App for BarVisualizer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let viewport = ctx.screen_rect().size();
        let background = egui::Color32::from_rgb(BACKGROUND[0], BACKGROUND[1], BACKGROUND[2]);

        let mut reschedule = false;
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(background))
            .show(ctx, |ui| {
                let Some(size) = self.render_loop.surface_size() else {
                    return;
                };
                let Some(graph) = self.graph.get_mut() else {
                    return;
                };
                let mut surface = PainterSurface::new(ui.painter(), ui.max_rect().min, size);
                reschedule = self.render_loop.frame(graph, &mut surface);
            });

        let Some(view) = self.controls_view() else {
            return;
        };

        let actions = draw_player_controls(ctx, view);
        let acted = !actions.is_empty();
        for action in actions {
            self.apply(action, viewport);
        }

        if reschedule || acted || view.playing {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.teardown();
    }
}
