// crates/substitch-ui/src/modules/preview.rs
//
// The composed preview: a compact reorder list mirroring the sequence,
// then the stitched image itself. Rows here reorder with the insert-before
// rule (first unmoved row whose midpoint lies below the pointer), so a
// drop between two rows lands between them regardless of row heights.

use super::SequencePanel;
use crate::context::TextureCaches;
use crate::helpers::format::truncate;
use crate::theme::{ACCENT, BG_2, BG_3, BG_4, BORDER, ERR_RED, TEXT_DIM};
use egui::{Color32, FontId, Id, Rect, RichText, Sense, Stroke, Ui};

use substitch_core::commands::SequenceCommand;
use substitch_core::reorder;
use substitch_core::state::SequenceState;

const ROW_THUMB: egui::Vec2 = egui::Vec2::new(38.0, 22.0);

fn drag_origin_key() -> Id {
    Id::new("preview_drag_origin")
}

pub struct PreviewModule;

impl SequencePanel for PreviewModule {
    fn name(&self) -> &str {
        "Preview"
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
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(self.name()).size(12.0).strong());
                        if let Some(composed) = &cache.composed {
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    ui.label(
                                        RichText::new(crate::helpers::format::format_dims(
                                            composed.width,
                                            composed.height,
                                        ))
                                        .size(10.0)
                                        .color(TEXT_DIM)
                                        .monospace(),
                                    );
                                },
                            );
                        }
                    });
                });

            ui.add_space(4.0);

            if cache.composed.is_none() && state.compose_job.is_none() {
                ui.add_space(60.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("\u{1f4fa}").size(32.0));
                    ui.add_space(6.0);
                    let hint = if state.is_empty() {
                        "Add captures, then press Compose"
                    } else {
                        "Press Compose to stitch the sequence"
                    };
                    ui.label(RichText::new(hint).size(11.0).color(TEXT_DIM));
                });
                return;
            }

            egui::ScrollArea::vertical().id_salt("preview_scroll").show(ui, |ui| {
                // ── Reorder rows ─────────────────────────────────────────────
                let drag_origin: Option<usize> =
                    ui.memory(|m| m.data.get_temp(drag_origin_key()));

                let mut row_rects: Vec<Rect> = Vec::with_capacity(state.len());

                for (index, entry) in state.entries.iter().enumerate() {
                    let row_id           = Id::new("preview_row").with(entry.id);
                    let is_being_dragged = ui.ctx().is_being_dragged(row_id);

                    let row_resp = egui::Frame::new()
                        .fill(if is_being_dragged { BG_4 } else { BG_3 })
                        .stroke(Stroke::new(
                            1.0,
                            if is_being_dragged { ACCENT } else { BORDER },
                        ))
                        .corner_radius(egui::CornerRadius::same(4))
                        .inner_margin(egui::Margin::same(4))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width().max(160.0));
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(format!("{}", index + 1))
                                        .size(10.0)
                                        .monospace()
                                        .color(ACCENT),
                                );
                                if let Some(texture) = cache.thumbs.get(&entry.id) {
                                    ui.add(
                                        egui::Image::new((texture.id(), ROW_THUMB))
                                            .corner_radius(egui::CornerRadius::same(2)),
                                    );
                                } else {
                                    let (ph, _) =
                                        ui.allocate_exact_size(ROW_THUMB, Sense::hover());
                                    ui.painter().rect_filled(
                                        ph,
                                        2.0,
                                        Color32::from_rgb(17, 18, 22),
                                    );
                                }
                                ui.add(
                                    egui::Label::new(
                                        RichText::new(truncate(&entry.name, 32)).size(10.0),
                                    )
                                    .truncate(),
                                );
                            });
                        })
                        .response;

                    let rect = row_resp.rect;
                    row_rects.push(rect);

                    let interact = ui.interact(rect, row_id, Sense::click_and_drag());
                    if interact.drag_started() {
                        ui.memory_mut(|mem| mem.data.insert_temp(drag_origin_key(), index));
                    }
                    if interact.dragged() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                    } else if interact.hovered() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                    }
                    if interact.double_clicked() {
                        cmd.push(SequenceCommand::OpenLightbox(entry.id));
                    }

                    // Row remove. Painted only; the interact is registered
                    // after the row interact so it wins the hit-test.
                    let x_rect = Rect::from_center_size(
                        egui::pos2(rect.max.x - 13.0, rect.center().y),
                        egui::vec2(14.0, 14.0),
                    );
                    let x_resp = ui.interact(
                        x_rect,
                        Id::new(("preview_row_remove", entry.id)),
                        Sense::click(),
                    );
                    if x_resp.hovered() || interact.hovered() {
                        ui.painter().rect_filled(
                            x_rect,
                            7.0,
                            if x_resp.hovered() { ERR_RED } else { BG_2 },
                        );
                        ui.painter().text(
                            x_rect.center(),
                            egui::Align2::CENTER_CENTER,
                            "\u{2715}",
                            FontId::proportional(8.0),
                            Color32::WHITE,
                        );
                    }
                    if x_resp.clicked() {
                        cmd.push(SequenceCommand::RemoveEntry(index));
                    }
                }

                // ── Insertion indicator + drop ───────────────────────────────
                let released = ui.input(|i| i.pointer.any_released());
                if let Some(origin) = drag_origin {
                    let pointer = ui.input(|i| i.pointer.interact_pos());
                    if let Some(p) = pointer {
                        // Midpoints of the unmoved rows, display order: the
                        // resolved index is already post-removal.
                        let unmoved: Vec<Rect> = row_rects
                            .iter()
                            .enumerate()
                            .filter(|&(i, _)| i != origin)
                            .map(|(_, r)| *r)
                            .collect();
                        let midpoints: Vec<f32> =
                            unmoved.iter().map(|r| r.center().y).collect();
                        let insert_at = reorder::insert_index(p.y, &midpoints);

                        if let Some(line_y) = insertion_line_y(&unmoved, insert_at) {
                            let x0 = row_rects[0].min.x;
                            let x1 = row_rects[0].max.x;
                            ui.painter().line_segment(
                                [egui::pos2(x0, line_y), egui::pos2(x1, line_y)],
                                Stroke::new(2.0, ACCENT),
                            );
                        }

                        if released {
                            if insert_at != origin {
                                cmd.push(SequenceCommand::MoveEntry {
                                    from: origin,
                                    to:   insert_at,
                                });
                            }
                            ui.memory_mut(|mem| {
                                mem.data.remove::<usize>(drag_origin_key());
                            });
                        }
                    }
                    if !released && !ui.input(|i| i.pointer.any_down()) {
                        ui.memory_mut(|mem| mem.data.remove::<usize>(drag_origin_key()));
                    }
                }

                ui.add_space(8.0);

                // ── Composed image ───────────────────────────────────────────
                if let Some(composed) = &cache.composed {
                    let avail = ui.available_width().max(40.0);
                    let scale = (avail / composed.width.max(1) as f32).min(1.0);
                    let size  = egui::vec2(
                        composed.width as f32 * scale,
                        composed.height as f32 * scale,
                    );
                    let resp = ui.add(
                        egui::Image::new((composed.texture.id(), size))
                            .corner_radius(egui::CornerRadius::same(3)),
                    );
                    ui.painter().rect_stroke(
                        resp.rect,
                        egui::CornerRadius::same(3),
                        Stroke::new(1.0, BORDER),
                        egui::StrokeKind::Outside,
                    );
                }

                // ── Resync-in-flight spinner ─────────────────────────────────
                if state.compose_job.is_some() {
                    ui.add_space(10.0);
                    let (bar, _) = ui.allocate_exact_size(
                        egui::vec2(ui.available_width(), 36.0),
                        Sense::hover(),
                    );
                    let t  = ui.input(|i| i.time) as f32;
                    let cx = bar.center() - egui::vec2(46.0, 0.0);
                    let r  = 10.0_f32;
                    ui.painter()
                        .circle_stroke(cx, r, Stroke::new(1.5, Color32::from_gray(45)));
                    let a = t * 3.5;
                    ui.painter().line_segment(
                        [cx, cx + egui::vec2(a.cos() * r, a.sin() * r)],
                        Stroke::new(2.0, ACCENT),
                    );
                    ui.painter().text(
                        cx + egui::vec2(18.0, 0.0),
                        egui::Align2::LEFT_CENTER,
                        "Composing\u{2026}",
                        FontId::proportional(11.0),
                        TEXT_DIM,
                    );
                    ui.ctx().request_repaint();
                }

                if state.compose_error.is_some() && cache.composed.is_some() {
                    ui.add_space(6.0);
                    ui.label(
                        RichText::new("Last compose failed; showing the previous result.")
                            .size(9.0)
                            .color(ERR_RED),
                    );
                }

                ui.add_space(8.0);
            });
        });
    }
}

/// Screen y of the insertion boundary: the top of the row the dragged entry
/// would land before, or the bottom edge after the last row.
fn insertion_line_y(unmoved: &[Rect], insert_at: usize) -> Option<f32> {
    if unmoved.is_empty() {
        return None;
    }
    Some(if insert_at >= unmoved.len() {
        unmoved[unmoved.len() - 1].max.y + 2.0
    } else {
        unmoved[insert_at].min.y - 2.0
    })
}
