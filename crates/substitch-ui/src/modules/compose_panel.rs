// crates/substitch-ui/src/modules/compose_panel.rs
//
// Right-panel UI for the composition parameters and the export flow.
//
// State machine (driven by SequenceState fields, set by AppContext):
//
//   Idle       -> user clicks "Compose preview"
//                -> app.rs stamps compose_job and posts the worker job
//
//   Composing  -> compose_job is Some; spinner shown, button disabled
//
//   Done       -> Composed result ingested; composed texture + PNG cached,
//                 Download enabled
//
//   Error      -> compose_error is Some; banner names the failing capture,
//                 stays until dismissed, previous preview kept
//
// Slider changes never recompose on their own: the preview refreshes on
// sequence mutations and on an explicit Compose click, so dragging a
// slider stays cheap no matter how large the sequence is.

use super::SequencePanel;
use crate::context::TextureCaches;
use crate::helpers::format::{format_bytes, format_dims};
use crate::theme::{BG_2, ERR_RED, OK_GREEN, TEXT_DIM};
use egui::{Id, RichText, Stroke, Ui};

use substitch_core::commands::SequenceCommand;
use substitch_core::state::{SequenceState, RATIO_MAX, RATIO_MIN, SPACING_MAX};

pub struct ComposePanel;

impl SequencePanel for ComposePanel {
    fn name(&self) -> &str {
        "Stitch"
    }

    fn ui(
        &mut self,
        ui:    &mut Ui,
        state: &SequenceState,
        cache: &mut TextureCaches,
        cmd:   &mut Vec<SequenceCommand>,
    ) {
        ui.vertical(|ui| {
            // ── Header ───────────────────────────────────────────────────────
            egui::Frame::new()
                .fill(BG_2)
                .inner_margin(egui::Margin { left: 8, right: 8, top: 6, bottom: 6 })
                .show(ui, |ui| {
                    ui.label(RichText::new(self.name()).size(12.0).strong());
                });

            ui.add_space(8.0);

            // ── Parameters ───────────────────────────────────────────────────
            ui.label(RichText::new("Spacing").size(11.0).color(TEXT_DIM));
            let mut spacing = state.spacing;
            if ui
                .add(egui::Slider::new(&mut spacing, 0..=SPACING_MAX).suffix(" px"))
                .changed()
            {
                cmd.push(SequenceCommand::SetSpacing(spacing));
            }

            ui.add_space(6.0);

            ui.label(RichText::new("Subtitle band").size(11.0).color(TEXT_DIM));
            let mut band_pct = (state.subtitle_ratio * 100.0).round() as u32;
            let pct_range = (RATIO_MIN * 100.0) as u32..=(RATIO_MAX * 100.0) as u32;
            if ui
                .add(egui::Slider::new(&mut band_pct, pct_range).suffix(" %"))
                .changed()
            {
                cmd.push(SequenceCommand::SetSubtitleRatio(band_pct as f32 / 100.0));
            }
            ui.label(
                RichText::new("Bottom share kept from every capture after the first.")
                    .size(9.0)
                    .color(TEXT_DIM),
            );

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(4.0);

            // ── Compose ──────────────────────────────────────────────────────
            let composing = state.compose_job.is_some();
            if ui
                .add_enabled(
                    !state.is_empty() && !composing,
                    egui::Button::new("\u{1f5bc} Compose preview")
                        .min_size(egui::vec2(ui.available_width(), 28.0)),
                )
                .on_disabled_hover_text("Add captures first")
                .clicked()
            {
                cmd.push(SequenceCommand::RequestCompose);
            }
            if composing {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new().size(14.0));
                    ui.label(RichText::new("Composing\u{2026}").size(10.0).color(TEXT_DIM));
                });
                ui.ctx().request_repaint();
            }

            // ── Error banner ─────────────────────────────────────────────────
            if let Some(err) = &state.compose_error {
                ui.add_space(6.0);
                egui::Frame::new()
                    .fill(ERR_RED.linear_multiply(0.12))
                    .stroke(Stroke::new(1.0, ERR_RED))
                    .corner_radius(egui::CornerRadius::same(4))
                    .inner_margin(egui::Margin::same(6))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(format!("\u{2715} {err}"))
                                .size(10.0)
                                .color(ERR_RED),
                        );
                        if ui.button(RichText::new("Dismiss").size(10.0)).clicked() {
                            cmd.push(SequenceCommand::DismissComposeError);
                        }
                    });
            }

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(4.0);

            // ── Export ───────────────────────────────────────────────────────
            if let Some(composed) = &cache.composed {
                ui.label(
                    RichText::new(format!(
                        "{} \u{00b7} {} PNG",
                        format_dims(composed.width, composed.height),
                        format_bytes(composed.png.len()),
                    ))
                    .size(10.0)
                    .color(TEXT_DIM)
                    .monospace(),
                );
            }
            if ui
                .add_enabled(
                    cache.composed.is_some(),
                    egui::Button::new("\u{2b07} Download PNG")
                        .min_size(egui::vec2(ui.available_width(), 28.0)),
                )
                .on_disabled_hover_text("Compose a preview first")
                .clicked()
            {
                cmd.push(SequenceCommand::SaveComposed);
            }

            // ── Save status (auto-clears after 3 s) ──────────────────────────
            if let Some(msg) = &state.save_status {
                ui.add_space(6.0);
                let failed = msg.starts_with("Save failed");
                let color  = if failed { ERR_RED } else { OK_GREEN };
                ui.label(RichText::new(msg).size(10.0).color(color));

                let t = ui.input(|i| i.time);
                ui.memory_mut(|mem| {
                    let key = Id::new("save_status_time");
                    let start = mem.data.get_temp_mut_or_insert_with(key, || t);
                    if t - *start > 3.0 {
                        cmd.push(SequenceCommand::ClearSaveStatus);
                        mem.data.remove::<f64>(key);
                    }
                });
                ui.ctx().request_repaint();
            } else {
                ui.memory_mut(|mem| mem.data.remove::<f64>(Id::new("save_status_time")));
            }

            // ── Footnote ─────────────────────────────────────────────────────
            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.add_space(6.0);
                ui.label(
                    RichText::new(
                        "The first capture is stitched in full; every later one \
                         contributes only its subtitle band.",
                    )
                    .size(9.0)
                    .color(TEXT_DIM),
                );
            });
        });
    }
}
