// crates/substitch-ui/src/modules/strip.rs
//
// The capture strip: every uploaded capture as a card, in stacking order.
// Reordering happens here with two gestures, both resolved by the pure
// rules in substitch_core::reorder:
//   - pointer drag released over another card  -> pointer_drop rule
//   - drag released anywhere else              -> touch displacement rule
// Geometry (card rects, item heights) is measured in this file only; the
// core sees indices and distances, never pixels.

use super::SequencePanel;
use crate::context::TextureCaches;
use crate::helpers::format::{format_bytes, format_dims, truncate};
use crate::theme::{ACCENT, BG_2, BG_3, BG_4, BORDER, ERR_RED, TEXT_DIM};
use egui::{
    Align, Color32, FontId, Id, Layout, LayerId, Order, Rect, RichText, Sense, Stroke, Ui,
};
use rfd::FileDialog;

use substitch_core::commands::SequenceCommand;
use substitch_core::reorder;
use substitch_core::state::SequenceState;

const THUMB_SIZE: egui::Vec2 = egui::Vec2::new(74.0, 44.0);

fn drag_origin_key() -> Id {
    Id::new("strip_drag_origin")
}

fn drag_start_y_key() -> Id {
    Id::new("strip_drag_start_y")
}

pub struct StripModule;

impl SequencePanel for StripModule {
    fn name(&self) -> &str {
        "Captures"
    }

    fn ui(
        &mut self,
        ui:    &mut Ui,
        state: &SequenceState,
        cache: &mut TextureCaches,
        cmd:   &mut Vec<SequenceCommand>,
    ) {
        // ── Hotkeys ──────────────────────────────────────────────────────────
        if ui.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            if let Some(idx) = state.selected.and_then(|id| state.entry_index(id)) {
                cmd.push(SequenceCommand::RemoveEntry(idx));
            }
        }

        ui.vertical(|ui| {
            // ── Header ───────────────────────────────────────────────────────
            egui::Frame::new()
                .fill(BG_2)
                .inner_margin(egui::Margin { left: 8, right: 8, top: 6, bottom: 6 })
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(self.name()).size(12.0).strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.button(RichText::new("\u{ff0b} Add").size(11.0)).clicked() {
                                if let Some(paths) = FileDialog::new()
                                    .add_filter(
                                        "Images",
                                        &["png", "jpg", "jpeg", "bmp", "webp", "gif", "tif", "tiff"],
                                    )
                                    .pick_files()
                                {
                                    cmd.push(SequenceCommand::ImportFiles(paths));
                                }
                            }
                        });
                    });
                });

            ui.separator();

            if !state.is_empty() {
                ui.horizontal(|ui| {
                    ui.add_space(6.0);
                    ui.label(
                        RichText::new(format!("{} captures", state.len()))
                            .size(10.0)
                            .color(TEXT_DIM),
                    );
                    if state.selected.is_some() {
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            ui.add_space(6.0);
                            ui.label(RichText::new("Del to remove").size(9.0).color(TEXT_DIM));
                        });
                    }
                });
            }

            // ── Cards ────────────────────────────────────────────────────────
            egui::ScrollArea::vertical().id_salt("strip_scroll").show(ui, |ui| {
                ui.add_space(4.0);

                if state.is_empty() {
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new("\u{1f5bc}").size(32.0));
                        ui.add_space(6.0);
                        ui.label(
                            RichText::new("Drop captures here\nor use Add")
                                .size(11.0)
                                .color(TEXT_DIM),
                        );
                    });
                    return;
                }

                let drag_origin: Option<usize> =
                    ui.memory(|m| m.data.get_temp(drag_origin_key()));
                let hover_pos = ui.input(|i| i.pointer.hover_pos());

                let mut card_rects: Vec<Rect> = Vec::with_capacity(state.len());

                for (index, entry) in state.entries.iter().enumerate() {
                    let item_id          = Id::new("capture_card").with(entry.id);
                    let is_selected      = state.selected == Some(entry.id);
                    let is_being_dragged = ui.ctx().is_being_dragged(item_id);

                    // ── Drag ghost ───────────────────────────────────────────
                    if is_being_dragged {
                        if let Some(ptr) = ui.ctx().pointer_interact_pos() {
                            let ghost_rect = Rect::from_center_size(
                                ptr,
                                egui::vec2(110.0, 52.0),
                            );
                            let gp = ui.ctx().layer_painter(
                                LayerId::new(Order::Tooltip, Id::new("strip_drag_ghost")),
                            );
                            gp.rect_filled(
                                ghost_rect,
                                egui::CornerRadius::same(4),
                                Color32::from_rgba_unmultiplied(40, 85, 122, 185),
                            );
                            gp.rect_stroke(
                                ghost_rect,
                                egui::CornerRadius::same(4),
                                Stroke::new(1.5, ACCENT),
                                egui::StrokeKind::Outside,
                            );
                            if let Some(texture) = cache.thumbs.get(&entry.id) {
                                gp.image(
                                    texture.id(),
                                    ghost_rect.shrink(3.0),
                                    Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0)),
                                    Color32::from_rgba_unmultiplied(255, 255, 255, 210),
                                );
                            }
                            gp.text(
                                ghost_rect.center_bottom() + egui::vec2(0.0, 4.0),
                                egui::Align2::CENTER_TOP,
                                format!("  {}  ", truncate(&entry.name, 18)),
                                FontId::proportional(10.0),
                                Color32::from_rgba_unmultiplied(222, 224, 232, 210),
                            );
                        }
                    }

                    // ── Card ─────────────────────────────────────────────────
                    let highlight = is_selected || is_being_dragged;
                    let dragging_other = drag_origin.is_some_and(|origin| origin != index);

                    let card_resp = egui::Frame::new()
                        .fill(if highlight { BG_4 } else { BG_3 })
                        .stroke(Stroke::new(
                            if highlight { 1.5 } else { 1.0 },
                            if highlight { ACCENT } else { BORDER },
                        ))
                        .corner_radius(egui::CornerRadius::same(5))
                        .inner_margin(egui::Margin::same(6))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width().max(170.0));
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(format!("{}", index + 1))
                                        .size(12.0)
                                        .monospace()
                                        .color(ACCENT),
                                );

                                if let Some(texture) = cache.thumbs.get(&entry.id) {
                                    ui.add(
                                        egui::Image::new((texture.id(), THUMB_SIZE))
                                            .corner_radius(egui::CornerRadius::same(3)),
                                    );
                                } else {
                                    let (ph_rect, _) =
                                        ui.allocate_exact_size(THUMB_SIZE, Sense::hover());
                                    ui.painter().rect_filled(
                                        ph_rect,
                                        3.0,
                                        Color32::from_rgb(17, 18, 22),
                                    );
                                    let (icon, color) = if entry.probe_failed {
                                        ("\u{26a0}", ERR_RED)
                                    } else {
                                        ("\u{2026}", Color32::from_gray(80))
                                    };
                                    ui.painter().text(
                                        ph_rect.center(),
                                        egui::Align2::CENTER_CENTER,
                                        icon,
                                        FontId::proportional(16.0),
                                        color,
                                    );
                                }

                                ui.vertical(|ui| {
                                    ui.add(
                                        egui::Label::new(
                                            RichText::new(entry.name.as_str()).size(10.0),
                                        )
                                        .truncate(),
                                    );
                                    let detail = match entry.natural_size {
                                        Some((w, h)) => format!(
                                            "{} \u{00b7} {}",
                                            format_dims(w, h),
                                            format_bytes(entry.source.len()),
                                        ),
                                        None if entry.probe_failed => "unreadable".into(),
                                        None => "probing\u{2026}".into(),
                                    };
                                    ui.label(
                                        RichText::new(detail).size(9.0).color(TEXT_DIM).monospace(),
                                    );
                                });
                            });
                        })
                        .response;

                    let rect = card_resp.rect;
                    card_rects.push(rect);

                    // Drop-target cue while another card is being dragged.
                    if dragging_other && hover_pos.is_some_and(|p| rect.contains(p)) {
                        ui.painter().rect_stroke(
                            rect,
                            egui::CornerRadius::same(5),
                            Stroke::new(2.0, ACCENT),
                            egui::StrokeKind::Outside,
                        );
                    }

                    // ── Interact ─────────────────────────────────────────────
                    let interact = ui.interact(rect, item_id, Sense::click_and_drag());

                    if interact.clicked() {
                        cmd.push(SequenceCommand::SelectEntry(Some(entry.id)));
                    }
                    if interact.double_clicked() {
                        cmd.push(SequenceCommand::OpenLightbox(entry.id));
                    }
                    if interact.drag_started() {
                        cmd.push(SequenceCommand::SelectEntry(Some(entry.id)));
                        let start_y = ui
                            .ctx()
                            .pointer_interact_pos()
                            .map(|p| p.y)
                            .unwrap_or(rect.center().y);
                        ui.memory_mut(|mem| {
                            mem.data.insert_temp(drag_origin_key(), index);
                            mem.data.insert_temp(drag_start_y_key(), start_y);
                        });
                    }
                    if interact.dragged() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                    } else if interact.hovered() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                    }

                    // ── Right-click context menu ─────────────────────────────
                    interact.context_menu(|ui| {
                        ui.set_min_width(150.0);
                        if ui.button("\u{1f50d}  Enlarge").clicked() {
                            cmd.push(SequenceCommand::OpenLightbox(entry.id));
                            ui.close();
                        }
                        if ui.button("\u{1f5d1}  Delete capture").clicked() {
                            cmd.push(SequenceCommand::RemoveEntry(index));
                            ui.close();
                        }
                        ui.separator();
                        ui.label(
                            RichText::new(truncate(&entry.name, 24))
                                .size(10.0)
                                .color(TEXT_DIM),
                        );
                        if let Some((w, h)) = entry.natural_size {
                            ui.label(
                                RichText::new(format_dims(w, h)).size(10.0).color(TEXT_DIM),
                            );
                        }
                    });

                    // ── Corner remove button ─────────────────────────────────
                    // Registered after the card interact so it wins the
                    // hit-test on its little square.
                    let x_rect = Rect::from_center_size(
                        egui::pos2(rect.max.x - 11.0, rect.min.y + 11.0),
                        egui::vec2(15.0, 15.0),
                    );
                    let x_resp =
                        ui.interact(x_rect, Id::new(("card_remove", entry.id)), Sense::click());
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
                            FontId::proportional(9.0),
                            Color32::WHITE,
                        );
                    }
                    if x_resp.clicked() {
                        cmd.push(SequenceCommand::RemoveEntry(index));
                    }
                }

                // ── Drop resolution ──────────────────────────────────────────
                // One MoveEntry per completed gesture, emitted only on the
                // release frame.
                let released = ui.input(|i| i.pointer.any_released());
                if released {
                    if let Some(origin) = drag_origin {
                        let pointer = ui.input(|i| i.pointer.interact_pos());
                        let request = pointer.and_then(|p| {
                            match card_rects.iter().position(|r| r.contains(p)) {
                                Some(target) => reorder::pointer_drop(origin, target),
                                None => {
                                    // Released off the cards: resolve by the
                                    // vertical displacement of the gesture.
                                    let start_y: Option<f32> =
                                        ui.memory(|m| m.data.get_temp(drag_start_y_key()));
                                    let avg = average_item_height(ui, &card_rects);
                                    start_y.and_then(|sy| {
                                        reorder::touch_drop(origin, p.y - sy, avg, state.len())
                                    })
                                }
                            }
                        });
                        if let Some(req) = request {
                            cmd.push(SequenceCommand::MoveEntry { from: req.from, to: req.to });
                        }
                        clear_drag_memory(ui);
                    }
                } else if drag_origin.is_some() && !ui.input(|i| i.pointer.any_down()) {
                    // Drag ended without a release event reaching us (focus
                    // loss, window switch): forget the gesture.
                    clear_drag_memory(ui);
                }

                ui.add_space(8.0);
            });
        });
    }
}

/// Mean card pitch: card height plus the list's vertical spacing, the
/// per-row distance a displacement gesture moves across.
fn average_item_height(ui: &Ui, rects: &[Rect]) -> f32 {
    if rects.is_empty() {
        return 0.0;
    }
    let total: f32 = rects.iter().map(|r| r.height()).sum();
    total / rects.len() as f32 + ui.spacing().item_spacing.y
}

fn clear_drag_memory(ui: &Ui) {
    ui.memory_mut(|mem| {
        mem.data.remove::<usize>(drag_origin_key());
        mem.data.remove::<f32>(drag_start_y_key());
    });
}
