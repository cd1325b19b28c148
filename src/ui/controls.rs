use eframe::egui;

use crate::config::CONTROLS_MARGIN;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAction {
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    Looping(bool),
}

/// Transport state shown by the controls.
#[derive(Debug, Clone, Copy)]
pub struct ControlsView {
    pub playing: bool,
    pub position: f64,
    pub duration: f64,
    pub volume: f32,
    pub looping: bool,
}

pub fn format_time(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Media-element style controls floating at the bottom of the window.
pub fn draw_player_controls(ctx: &egui::Context, view: ControlsView) -> Vec<PlayerAction> {
    let mut actions = Vec::new();

    egui::Area::new(egui::Id::new("player_controls"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -CONTROLS_MARGIN))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let label = if view.playing { "⏸" } else { "▶" };
                    if ui.button(label).clicked() {
                        actions.push(if view.playing {
                            PlayerAction::Pause
                        } else {
                            PlayerAction::Play
                        });
                    }

                    let mut position = view.position;
                    let seek = ui.add(
                        egui::Slider::new(&mut position, 0.0..=view.duration.max(0.0))
                            .show_value(false),
                    );
                    if seek.changed() {
                        actions.push(PlayerAction::Seek(position));
                    }

                    ui.label(format!(
                        "{} / {}",
                        format_time(view.position),
                        format_time(view.duration)
                    ));

                    ui.separator();

                    let mut volume = view.volume;
                    if ui
                        .add(egui::Slider::new(&mut volume, 0.0..=1.0).text("🔊"))
                        .changed()
                    {
                        actions.push(PlayerAction::Volume(volume));
                    }

                    let mut looping = view.looping;
                    if ui.checkbox(&mut looping, "Loop").changed() {
                        actions.push(PlayerAction::Looping(looping));
                    }
                });
            });
        });

    actions
}
