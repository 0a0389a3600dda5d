//! Scene drawing.
//!
//! Layering is fixed: background, boss (caption, health bar, mirrored
//! sprite), then heroes. Drawing only reads [`SceneState`]; it never touches
//! the snapshot or the network.

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::Layout;
use crate::reconcile::SceneState;
use crate::sprite::{LoadState, SpriteImage, WebImage};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    fn inset(self, by: f64) -> Self {
        Self::new(self.x + by, self.y + by, self.w - 2.0 * by, self.h - 2.0 * by)
    }
}

/// Minimal 2d drawing target. Text is drawn horizontally centred on `x`.
pub trait Surface {
    type Image;

    fn size(&self) -> (f64, f64);
    fn clear(&mut self);
    fn draw_image(&mut self, image: &Self::Image, src: Rect, dst: Rect, mirrored: bool);
    fn fill_rect(&mut self, rect: Rect, color: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthColor {
    Green,
    Gold,
    Orange,
    Red,
}

impl HealthColor {
    /// Strict `>` on each threshold: exactly 0.63 is already gold.
    pub fn for_fraction(fraction: f64) -> Self {
        if fraction > 0.63 {
            HealthColor::Green
        } else if fraction > 0.37 {
            HealthColor::Gold
        } else if fraction > 0.13 {
            HealthColor::Orange
        } else {
            HealthColor::Red
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            HealthColor::Green => "green",
            HealthColor::Gold => "gold",
            HealthColor::Orange => "orange",
            HealthColor::Red => "red",
        }
    }
}

const BAR_OUTLINE: &str = "#000000";
const BAR_TRACK: &str = "#3a3a3a";
const BAR_BORDER: f64 = 2.0;
const CAPTION_LINE: f64 = 22.0;

/// Source rectangle of frame `frame` in a single-row sheet.
pub fn frame_rect(frame: u32, layout: &Layout) -> Rect {
    Rect::new(
        frame as f64 * layout.frame_width,
        0.0,
        layout.frame_width,
        layout.frame_height,
    )
}

/// `name`, or `name (power)` when the backend reports a power.
pub fn hero_label(name: &str, power: Option<i64>) -> String {
    match power {
        Some(p) => format!("{name} ({p})"),
        None => name.to_string(),
    }
}

pub fn draw_scene<S>(surface: &mut S, scene: &SceneState<S::Image>, layout: &Layout)
where
    S: Surface,
    S::Image: SpriteImage,
{
    surface.clear();
    draw_environment(surface, scene);
    draw_boss(surface, scene, layout);
    draw_heroes(surface, scene, layout);
}

fn draw_environment<S>(surface: &mut S, scene: &SceneState<S::Image>)
where
    S: Surface,
    S::Image: SpriteImage,
{
    let Some(bg) = scene.level().and_then(|l| l.background.as_ref()) else {
        return;
    };
    if let LoadState::Ready { width, height } = bg.load_state() {
        let (cw, ch) = surface.size();
        let src = Rect::new(0.0, 0.0, width as f64, height as f64);
        surface.draw_image(bg, src, Rect::new(0.0, 0.0, cw, ch), false);
    }
}

fn draw_boss<S>(surface: &mut S, scene: &SceneState<S::Image>, layout: &Layout)
where
    S: Surface,
    S::Image: SpriteImage,
{
    let Some(boss) = scene.boss() else {
        return;
    };
    let (ox, oy) = layout.boss_origin;
    let (bw, bh) = layout.boss_size();
    let cx = ox + bw / 2.0;

    let info = &boss.info;
    let color = layout.text_color.as_str();
    surface.fill_text(&info.name, cx, oy + CAPTION_LINE, &layout.title_font, color);
    surface.fill_text(&info.attribute, cx, oy + 2.0 * CAPTION_LINE, &layout.font, color);

    let bar = Rect::new(
        cx - layout.health_bar_width / 2.0,
        oy + 2.5 * CAPTION_LINE,
        layout.health_bar_width,
        layout.health_bar_height,
    );
    let fraction = info.health_fraction();
    surface.fill_rect(bar, BAR_OUTLINE);
    let track = bar.inset(BAR_BORDER);
    surface.fill_rect(track, BAR_TRACK);
    if fraction > 0.0 {
        let fill = Rect::new(track.x, track.y, track.w * fraction, track.h);
        surface.fill_rect(fill, HealthColor::for_fraction(fraction).css());
    }

    let sprite_top = bar.y + bar.h + CAPTION_LINE / 2.0;
    if let Some(e) = boss.slot.entity() {
        let dst = Rect::new(ox, sprite_top, bw, bh);
        surface.draw_image(&e.image, frame_rect(e.frame(), layout), dst, true);
    }
    if info.finished() {
        surface.fill_text(
            "DEFEATED",
            cx,
            sprite_top + bh / 2.0,
            &layout.title_font,
            HealthColor::Red.css(),
        );
    }
}

fn draw_heroes<S>(surface: &mut S, scene: &SceneState<S::Image>, layout: &Layout)
where
    S: Surface,
    S::Image: SpriteImage,
{
    let (hw, hh) = layout.hero_size();
    let mut drawn = 0;
    for (hero, e) in scene.registered_heroes() {
        let (x, y) = layout.hero_slot(e.position);
        let dst = Rect::new(x, y, hw, hh);
        surface.draw_image(&e.image, frame_rect(e.frame(), layout), dst, false);
        let label = hero_label(&hero.name, hero.power);
        surface.fill_text(&label, x + hw / 2.0, y + hh, &layout.font, &layout.text_color);
        drawn += 1;
    }
    if drawn == 0 {
        let (x, y) = layout.hero_origin;
        let width = layout.hero_columns.max(1) as f64 * layout.hero_spacing.0;
        surface.fill_text(
            &layout.placeholder,
            x + width / 2.0,
            y + hh / 2.0,
            &layout.font,
            &layout.text_color,
        );
    }
}

/// `<canvas>` 2d context. Canvas call failures are ignored; a missed blit
/// only costs one frame.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        // Pixel art: keep sprite edges hard when scaled.
        ctx.set_image_smoothing_enabled(false);
        ctx.set_text_align("center");
        Self { canvas, ctx }
    }
}

impl Surface for CanvasSurface {
    type Image = WebImage;

    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn draw_image(&mut self, image: &WebImage, src: Rect, dst: Rect, mirrored: bool) {
        let ctx = &self.ctx;
        if mirrored {
            ctx.save();
            ctx.translate(dst.x + dst.w, dst.y).ok();
            ctx.scale(-1.0, 1.0).ok();
        }
        let (dx, dy) = if mirrored { (0.0, 0.0) } else { (dst.x, dst.y) };
        ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            &image.0, src.x, src.y, src.w, src.h, dx, dy, dst.w, dst.h,
        )
        .ok();
        if mirrored {
            ctx.restore();
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: &str) {
        self.ctx.set_font(font);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_text(text, x, y).ok();
    }
}
