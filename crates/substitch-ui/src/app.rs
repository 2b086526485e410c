// crates/substitch-ui/src/app.rs
use std::sync::Arc;

use eframe::egui;
use rfd::FileDialog;
use uuid::Uuid;

use substitch_core::commands::SequenceCommand;
use substitch_core::state::{NewCapture, SequenceState};
use substitch_compose::{ComposeEntry, ComposeJob, ComposeWorker};

use crate::context::AppContext;
use crate::modules::{
    compose_panel::ComposePanel, preview::PreviewModule, strip::StripModule, SequencePanel,
};
use crate::substitch_log;
use crate::theme::{self, configure_style};

/// Fixed default name for the exported file.
const DEFAULT_EXPORT_NAME: &str = "stitched_subtitles.png";

// ── App ───────────────────────────────────────────────────────────────────────

pub struct SubStitchApp {
    state:   SequenceState,
    context: AppContext,
    // Panel modules as concrete types; typos become compile errors instead
    // of a silently blank panel.
    strip:   StripModule,
    preview: PreviewModule,
    compose: ComposePanel,
    /// Commands emitted by panels each frame, processed after the UI pass.
    pending_cmds: Vec<SequenceCommand>,
}

impl SubStitchApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        configure_style(&cc.egui_ctx);
        // Pin to dark mode; an OS light/dark change must not overwrite the
        // configured theme mid-session.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        // The sequence is deliberately in-memory only: no session restore,
        // a fresh launch always starts empty.
        Self {
            state:        SequenceState::default(),
            context:      AppContext::new(ComposeWorker::new()),
            strip:        StripModule,
            preview:      PreviewModule,
            compose:      ComposePanel,
            pending_cmds: Vec::new(),
        }
    }

    // ── Reducer ───────────────────────────────────────────────────────────────

    /// The single mutation entry point. Every state change flows through
    /// here, so the sequence is never observed mid-mutation and the
    /// preview-resync rule lives in exactly one place.
    fn process_command(&mut self, cmd: SequenceCommand) {
        match cmd {
            // ── Captures ─────────────────────────────────────────────────────
            SequenceCommand::ImportFiles(paths) => {
                let mut batch = Vec::with_capacity(paths.len());
                for path in paths {
                    match std::fs::read(&path) {
                        Ok(bytes) => {
                            let name = path
                                .file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_else(|| path.display().to_string());
                            batch.push(NewCapture { name, bytes });
                        }
                        Err(e) => {
                            eprintln!("[import] {}: {e}", path.display());
                            substitch_log!("[import] {}: {e}", path.display());
                        }
                    }
                }
                if batch.is_empty() {
                    return;
                }
                eprintln!("[import] {} captures added", batch.len());
                let ids = self.state.append_batch(batch);
                for id in ids {
                    if let Some(entry) = self.state.entry(id) {
                        self.context
                            .worker
                            .probe_source(id, entry.name.clone(), entry.source.clone());
                    }
                }
                self.resync_preview();
            }

            SequenceCommand::MoveEntry { from, to } => {
                match self.state.move_entry(from, to) {
                    Ok(true)  => self.resync_preview(),
                    // Dropping onto itself: order unchanged, no re-compose.
                    Ok(false) => {}
                    Err(e)    => eprintln!("[sequence] move rejected: {e}"),
                }
            }

            SequenceCommand::RemoveEntry(index) => {
                match self.state.remove_entry(index) {
                    Ok(entry) => {
                        self.context.textures.thumbs.remove(&entry.id);
                        if matches!(&self.context.textures.lightbox_full,
                            Some((lid, _)) if *lid == entry.id)
                        {
                            self.context.textures.lightbox_full = None;
                        }
                        // Last sequence-side handle to the source bytes.
                        drop(entry);
                        if self.state.is_empty() {
                            // remove_entry already cleared the preview flags;
                            // drop the composed artifact with them.
                            self.context.textures.composed = None;
                        } else {
                            self.resync_preview();
                        }
                    }
                    Err(e) => eprintln!("[sequence] remove rejected: {e}"),
                }
            }

            SequenceCommand::SelectEntry(id) => {
                self.state.selected = id;
            }

            // ── Overlay ──────────────────────────────────────────────────────
            SequenceCommand::OpenLightbox(id) => {
                self.state.lightbox = Some(id);
                let cached = matches!(&self.context.textures.lightbox_full,
                    Some((lid, _)) if *lid == id);
                if !cached {
                    self.context.textures.lightbox_full = None;
                    if let Some(entry) = self.state.entry(id) {
                        self.context
                            .worker
                            .decode_full(id, entry.name.clone(), entry.source.clone());
                    }
                }
            }
            SequenceCommand::CloseLightbox => {
                self.state.lightbox = None;
                self.context.textures.lightbox_full = None;
            }

            // ── Parameters ───────────────────────────────────────────────────
            // Slider changes do not auto-refresh an active preview; the
            // user re-composes when they want the new look applied.
            SequenceCommand::SetSpacing(v) => self.state.set_spacing(v),
            SequenceCommand::SetSubtitleRatio(v) => self.state.set_subtitle_ratio(v),

            // ── Composition ──────────────────────────────────────────────────
            SequenceCommand::RequestCompose => self.request_compose(),

            SequenceCommand::SaveComposed => {
                if let Some(composed) = &self.context.textures.composed {
                    if let Some(dest) = FileDialog::new()
                        .set_file_name(DEFAULT_EXPORT_NAME)
                        .add_filter("PNG", &["png"])
                        .save_file()
                    {
                        self.context
                            .worker
                            .save_composed(Arc::clone(&composed.png), dest);
                    }
                }
            }

            SequenceCommand::DismissComposeError => {
                self.state.compose_error = None;
            }
            SequenceCommand::ClearSaveStatus => {
                self.state.save_status = None;
            }
        }
    }

    /// Re-issue the compose after a sequence mutation, but only while a
    /// preview is on screen (or one is already being built). Commands
    /// arrive once per completed gesture, so this is one regeneration per
    /// discrete user action, never one per drag frame.
    fn resync_preview(&mut self) {
        if self.state.preview_shown || self.state.compose_job.is_some() {
            self.request_compose();
        }
    }

    /// Snapshot the sequence and post a stamped compose job. An empty
    /// sequence composes to nothing: the preview clears instead.
    fn request_compose(&mut self) {
        if self.state.is_empty() {
            self.state.preview_shown = false;
            self.state.compose_job   = None;
            self.context.textures.composed = None;
            return;
        }
        let job_id = Uuid::new_v4();
        self.state.compose_job   = Some(job_id);
        self.state.compose_error = None;
        let entries: Vec<ComposeEntry> = self
            .state
            .entries
            .iter()
            .map(|e| ComposeEntry {
                name:  e.name.clone(),
                bytes: e.source.clone(),
            })
            .collect();
        self.context.worker.request_compose(ComposeJob {
            job_id,
            entries,
            spacing:        self.state.spacing,
            subtitle_ratio: self.state.subtitle_ratio,
        });
    }

    // ── Window-level input ────────────────────────────────────────────────────

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let files = ctx.input(|i| i.raw.dropped_files.clone());
        let paths: Vec<_> = files.into_iter().filter_map(|f| f.path).collect();
        if !paths.is_empty() {
            self.pending_cmds.push(SequenceCommand::ImportFiles(paths));
        }
    }

    fn show_lightbox(&mut self, ctx: &egui::Context) {
        let Some(id) = self.state.lightbox else { return };
        let Some(entry) = self.state.entry(id) else { return };

        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new("lightbox"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let backdrop = ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(210));

                // Full-resolution texture once decoded, thumbnail until then.
                let tex = self
                    .context
                    .textures
                    .lightbox_full
                    .as_ref()
                    .filter(|(lid, _)| *lid == id)
                    .map(|(_, t)| t)
                    .or_else(|| self.context.textures.thumbs.get(&id));

                if let Some(tex) = tex {
                    let tex_size = tex.size_vec2();
                    let max   = screen.size() * 0.9;
                    let scale = (max.x / tex_size.x).min(max.y / tex_size.y).min(1.0);
                    let rect  = egui::Rect::from_center_size(screen.center(), tex_size * scale);
                    ui.painter().image(
                        tex.id(),
                        rect,
                        egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                    // Registered after the backdrop so clicks on the image
                    // itself don't close the overlay.
                    let _keep = ui.interact(
                        rect,
                        egui::Id::new("lightbox_image"),
                        egui::Sense::click(),
                    );
                    ui.painter().text(
                        rect.center_bottom() + egui::vec2(0.0, 10.0),
                        egui::Align2::CENTER_TOP,
                        &entry.name,
                        egui::FontId::proportional(12.0),
                        theme::TEXT_DIM,
                    );
                } else {
                    ui.painter().text(
                        screen.center(),
                        egui::Align2::CENTER_CENTER,
                        "Loading full resolution\u{2026}",
                        egui::FontId::proportional(13.0),
                        theme::TEXT_DIM,
                    );
                    ui.ctx().request_repaint();
                }

                // Close button, top right.
                let close_rect = egui::Rect::from_center_size(
                    egui::pos2(screen.max.x - 28.0, screen.min.y + 28.0),
                    egui::vec2(26.0, 26.0),
                );
                let close = ui.interact(
                    close_rect,
                    egui::Id::new("lightbox_close"),
                    egui::Sense::click(),
                );
                ui.painter().rect_filled(
                    close_rect,
                    13.0,
                    if close.hovered() { theme::BG_4 } else { theme::BG_3 },
                );
                ui.painter().text(
                    close_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "\u{2715}",
                    egui::FontId::proportional(13.0),
                    theme::TEXT,
                );

                let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
                if backdrop.clicked() || close.clicked() || escape {
                    self.pending_cmds.push(SequenceCommand::CloseLightbox);
                }
            });
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for SubStitchApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.context.worker.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.context.ingest_worker_results(&mut self.state, ctx);

        egui::TopBottomPanel::top("top_panel")
            .exact_height(36.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("SubStitch")
                            .strong()
                            .size(15.0)
                            .color(theme::ACCENT),
                    );
                    ui.separator();
                    ui.label(
                        egui::RichText::new("Drop subtitle captures to add them")
                            .size(12.0)
                            .weak(),
                    );
                });
            });

        egui::SidePanel::left("strip_panel")
            .resizable(true)
            .default_width(260.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                self.strip
                    .ui(ui, &self.state, &mut self.context.textures, &mut self.pending_cmds);
            });

        egui::SidePanel::right("stitch_panel")
            .resizable(true)
            .default_width(235.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                self.compose
                    .ui(ui, &self.state, &mut self.context.textures, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.preview
                .ui(ui, &self.state, &mut self.context.textures, &mut self.pending_cmds);
        });

        self.show_lightbox(ctx);

        // ── Process commands emitted by panels this frame ─────────────────────
        let cmds: Vec<SequenceCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }
    }
}
