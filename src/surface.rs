use anyhow::{Context, Result};
use eframe::egui;
use image::DynamicImage;
use std::path::Path;

/// The decoded image plus how it is currently placed on the canvas.
pub struct ImageSurface {
    raw_image: DynamicImage,
    texture: Option<egui::TextureHandle>,
    image_size: (f32, f32),

    // pan & zoom
    pan: egui::Vec2,
    zoom: f32,
    fitted: bool,
}

impl ImageSurface {
    pub fn open(path: &Path) -> Result<Self> {
        let raw_image = image::open(path)
            .with_context(|| format!("failed to decode image {}", path.display()))?;
        log::info!(
            "loaded {} ({}x{})",
            path.display(),
            raw_image.width(),
            raw_image.height()
        );
        Ok(Self::from_image(raw_image))
    }

    pub fn from_image(raw_image: DynamicImage) -> Self {
        let image_size = (raw_image.width() as f32, raw_image.height() as f32);
        Self {
            raw_image,
            texture: None,
            image_size,
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            fitted: false,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.raw_image.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
    }

    /// Scales the image down (never up) so it fits the canvas on first show.
    fn fit_once(&mut self, canvas_rect: egui::Rect) {
        if self.fitted || canvas_rect.width() <= 0.0 || canvas_rect.height() <= 0.0 {
            return;
        }
        let fit = (canvas_rect.width() / self.image_size.0)
            .min(canvas_rect.height() / self.image_size.1);
        self.zoom = fit.min(1.0);
        self.pan = egui::Vec2::ZERO;
        self.fitted = true;
    }

    /// Paints the untouched image; overlays are drawn on top each frame.
    pub fn paint(&mut self, ctx: &egui::Context, painter: &egui::Painter, canvas_rect: egui::Rect) {
        self.ensure_texture(ctx);
        self.fit_once(canvas_rect);
        if let Some(ref tex) = self.texture {
            painter.image(
                tex.id(),
                self.image_rect_on_screen(canvas_rect),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
    }

    /// Convert image-space coords to screen-space
    pub fn image_to_screen(&self, canvas_rect: egui::Rect, img_pos: egui::Pos2) -> egui::Pos2 {
        let center = canvas_rect.center();
        center
            + self.pan
            + (img_pos.to_vec2() - egui::vec2(self.image_size.0, self.image_size.1) * 0.5)
                * self.zoom
    }

    /// Convert screen-space coords to image-space
    pub fn screen_to_image(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> egui::Pos2 {
        let center = canvas_rect.center();
        let rel = screen_pos - center - self.pan;
        egui::pos2(
            rel.x / self.zoom + self.image_size.0 * 0.5,
            rel.y / self.zoom + self.image_size.1 * 0.5,
        )
    }

    /// Nearest pixel, or `None` outside the image.
    pub fn pixel_at(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> Option<(i32, i32)> {
        let p = self.screen_to_image(canvas_rect, screen_pos);
        let inside = p.x >= 0.0 && p.y >= 0.0 && p.x < self.image_size.0 && p.y < self.image_size.1;
        inside.then(|| (p.x.floor() as i32, p.y.floor() as i32))
    }

    /// Nearest pixel, clamped to the image bounds.
    pub fn clamped_pixel_at(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> (i32, i32) {
        let p = self.screen_to_image(canvas_rect, screen_pos);
        let max_x = (self.image_size.0 - 1.0).max(0.0);
        let max_y = (self.image_size.1 - 1.0).max(0.0);
        (
            p.x.floor().clamp(0.0, max_x) as i32,
            p.y.floor().clamp(0.0, max_y) as i32,
        )
    }

    pub fn pixel_to_screen(&self, canvas_rect: egui::Rect, x: i32, y: i32) -> egui::Pos2 {
        // pixel centers, so a point sits where it was clicked at any zoom
        self.image_to_screen(canvas_rect, egui::pos2(x as f32 + 0.5, y as f32 + 0.5))
    }

    fn image_rect_on_screen(&self, canvas_rect: egui::Rect) -> egui::Rect {
        let top_left = self.image_to_screen(canvas_rect, egui::Pos2::ZERO);
        let bot_right =
            self.image_to_screen(canvas_rect, egui::pos2(self.image_size.0, self.image_size.1));
        egui::Rect::from_min_max(top_left, bot_right)
    }

    pub fn pan_by(&mut self, delta: egui::Vec2) {
        self.pan += delta;
    }

    /// Zooms around `cursor`, keeping the pixel under it in place.
    pub fn zoom_by(&mut self, canvas_rect: egui::Rect, scroll_delta: f32, cursor: Option<egui::Pos2>) {
        let zoom_factor = 1.0 + scroll_delta * 0.002;
        let new_zoom = (self.zoom * zoom_factor).clamp(0.1, 10.0);
        if let Some(cursor) = cursor {
            let center = canvas_rect.center();
            let cursor_rel = cursor - center - self.pan;
            self.pan -= cursor_rel * (new_zoom / self.zoom - 1.0);
        }
        self.zoom = new_zoom;
    }
}
