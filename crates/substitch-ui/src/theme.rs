// src/theme.rs
use egui::{Color32, Context, Stroke, Style, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:       Color32 = Color32::from_rgb( 80, 170, 245);
pub const ACCENT_DIM:   Color32 = Color32::from_rgb( 40, 105, 170);
pub const ACCENT_HOVER: Color32 = Color32::from_rgb(125, 195, 255);

pub const BG_0: Color32 = Color32::from_rgb( 15,  16,  19);
pub const BG_1: Color32 = Color32::from_rgb( 21,  22,  27);
pub const BG_2: Color32 = Color32::from_rgb( 29,  31,  38);
pub const BG_3: Color32 = Color32::from_rgb( 39,  42,  51);
pub const BG_4: Color32 = Color32::from_rgb( 52,  56,  68);

pub const TEXT:     Color32 = Color32::from_rgb(222, 224, 232);
pub const TEXT_DIM: Color32 = Color32::from_rgb(122, 126, 142);
pub const BORDER:   Color32 = Color32::from_rgb( 56,  60,  74);

/// Success banners (export confirmations).
pub const OK_GREEN: Color32 = Color32::from_rgb( 85, 190, 125);
/// Error banners (decode failures).
pub const ERR_RED:  Color32 = Color32::from_rgb(205,  85,  85);

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();

    style.spacing.item_spacing     = egui::vec2(6.0, 5.0);
    style.spacing.window_margin    = egui::Margin::same(10);
    style.spacing.button_padding   = egui::vec2(10.0, 5.0);
    style.spacing.scroll.bar_width = 8.0;

    let cr = egui::CornerRadius::same(4);

    let mut v = Visuals::dark();
    v.panel_fill       = BG_1;
    v.window_fill      = BG_2;
    v.faint_bg_color   = BG_0;
    v.extreme_bg_color = BG_0;
    v.window_stroke    = Stroke::new(1.0, BORDER);

    v.selection.bg_fill = ACCENT;
    v.selection.stroke  = Stroke::new(1.0, Color32::BLACK);
    v.hyperlink_color   = ACCENT_HOVER;

    v.widgets.noninteractive.bg_fill       = BG_2;
    v.widgets.noninteractive.bg_stroke     = Stroke::new(1.0, BORDER);
    v.widgets.noninteractive.fg_stroke     = Stroke::new(1.0, TEXT_DIM);
    v.widgets.noninteractive.corner_radius = cr;

    v.widgets.inactive.bg_fill       = BG_3;
    v.widgets.inactive.bg_stroke     = Stroke::new(1.0, BORDER);
    v.widgets.inactive.fg_stroke     = Stroke::new(1.0, TEXT);
    v.widgets.inactive.corner_radius = cr;

    v.widgets.hovered.bg_fill       = BG_4;
    v.widgets.hovered.bg_stroke     = Stroke::new(1.0, ACCENT_DIM);
    v.widgets.hovered.fg_stroke     = Stroke::new(1.5, ACCENT_HOVER);
    v.widgets.hovered.corner_radius = cr;

    v.widgets.active.bg_fill       = ACCENT_DIM;
    v.widgets.active.bg_stroke     = Stroke::new(1.0, ACCENT);
    v.widgets.active.fg_stroke     = Stroke::new(2.0, Color32::WHITE);
    v.widgets.active.corner_radius = cr;

    v.widgets.open.bg_fill       = BG_4;
    v.widgets.open.bg_stroke     = Stroke::new(1.0, ACCENT_DIM);
    v.widgets.open.fg_stroke     = Stroke::new(1.5, ACCENT_HOVER);
    v.widgets.open.corner_radius = cr;

    v.override_text_color = Some(TEXT);

    ctx.set_visuals(v);
    ctx.set_style(style);

    ctx.style_mut(|s| {
        s.visuals.window_corner_radius = cr;
        s.visuals.menu_corner_radius   = cr;
    });
}
