use eframe::egui;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::Config;
use crate::model::{Point, Quad};
use crate::prompt::LabelPrompt;
use crate::session::Session;
use crate::surface::ImageSurface;

const POINT_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 0, 0);
const OUTLINE_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 0, 0);
const SELECTED_OUTLINE_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 0, 255);
const PROMPTING_OUTLINE_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 200, 0);
const OUTLINE_THICKNESS: f32 = 5.0;

// ── Outcome ─────────────────────────────────────────────────────────────────

/// How the operator ended the run. Read by `main` once the window is gone.
#[derive(Debug)]
pub enum Outcome {
    Confirmed(Vec<Quad>),
    Cancelled,
}

pub type SharedOutcome = Rc<RefCell<Option<Outcome>>>;

// ── App ─────────────────────────────────────────────────────────────────────

pub struct QuadLabelApp {
    surface: ImageSurface,
    session: Session,
    prompt: Option<LabelPrompt>,
    prompt_message: String,
    frame_interval: Duration,
    outcome: SharedOutcome,
    canvas_rect: egui::Rect,
}

impl QuadLabelApp {
    pub fn new(surface: ImageSurface, config: &Config, outcome: SharedOutcome) -> Self {
        Self {
            surface,
            session: Session::new(config.hit_radius),
            prompt: None,
            prompt_message: config.prompt_message.clone(),
            frame_interval: Duration::from_millis(config.frame_interval_ms),
            outcome,
            canvas_rect: egui::Rect::NOTHING,
        }
    }

    fn finish(&self, ctx: &egui::Context, outcome: Outcome) {
        let mut slot = self.outcome.borrow_mut();
        if slot.is_some() {
            return;
        }
        *slot = Some(outcome);
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (delete, confirm, cancel) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::Enter),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if delete {
            log::debug!("deleting...");
            self.session.delete_selected();
        }
        if confirm {
            let quads = self.session.quads().to_vec();
            self.finish(ctx, Outcome::Confirmed(quads));
        } else if cancel {
            self.finish(ctx, Outcome::Cancelled);
        }
    }

    /// Feeds canvas pointer input to the session, in image pixels.
    fn handle_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let canvas_rect = self.canvas_rect;
        let (pressed, press_pos, latest_pos, moved) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.interact_pos(),
                i.pointer.latest_pos(),
                i.pointer.delta() != egui::Vec2::ZERO,
            )
        });

        if pressed {
            if let Some(pos) = press_pos.filter(|p| canvas_rect.contains(*p)) {
                let (x, y) = self.surface.clamped_pixel_at(canvas_rect, pos);
                self.session.press(x, y);
            }
        }

        // A press only grabs a corner; it moves on later pointer motion.
        if self.session.is_dragging() && !pressed && moved {
            if let Some(pos) = latest_pos {
                let (x, y) = self.surface.clamped_pixel_at(canvas_rect, pos);
                self.session.pointer_moved(x, y);
            }
        }

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some((x, y)) = self.surface.pixel_at(canvas_rect, pos) {
                    self.session.double_click(x, y);
                }
            }
        }
    }

    fn draw_point(&self, painter: &egui::Painter, canvas_rect: egui::Rect, point: &Point) {
        let pos = self.surface.pixel_to_screen(canvas_rect, point.x, point.y);
        let radius = point.hit_radius as f32 * self.surface.zoom();
        painter.circle_filled(pos, radius, POINT_COLOR);
    }

    fn draw_outline(
        &self,
        painter: &egui::Painter,
        canvas_rect: egui::Rect,
        points: &[Point; 4],
        color: egui::Color32,
    ) {
        let corners: Vec<egui::Pos2> = points
            .iter()
            .map(|p| self.surface.pixel_to_screen(canvas_rect, p.x, p.y))
            .collect();
        let thickness = (OUTLINE_THICKNESS * self.surface.zoom()).max(1.0);
        painter.add(egui::Shape::closed_line(
            corners,
            egui::Stroke::new(thickness, color),
        ));
        for point in points {
            self.draw_point(painter, canvas_rect, point);
        }
    }

    fn draw_overlays(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        for point in self.session.pending() {
            self.draw_point(painter, canvas_rect, point);
        }

        for quad in self.session.quads() {
            let color = if self.session.is_selected(quad.id) {
                SELECTED_OUTLINE_COLOR
            } else {
                OUTLINE_COLOR
            };
            self.draw_outline(painter, canvas_rect, &quad.points, color);

            let first = quad.points[0];
            let anchor = self.surface.pixel_to_screen(canvas_rect, first.x, first.y)
                - egui::vec2(0.0, first.hit_radius as f32 * self.surface.zoom() + 2.0);
            painter.text(
                anchor,
                egui::Align2::LEFT_BOTTOM,
                &quad.label,
                egui::FontId::proportional(14.0),
                color,
            );
        }

        if let Some(ref prompt) = self.prompt {
            self.draw_outline(painter, canvas_rect, prompt.points(), PROMPTING_OUTLINE_COLOR);
        }
    }

    fn status_text(&self) -> String {
        let selected = self
            .session
            .selected_quad()
            .map(|q| format!("selected: {}", q.label))
            .unwrap_or_else(|| "nothing selected".to_string());
        format!(
            "corners: {}/4 | quads: {} | {} | zoom: {:.0}%",
            self.session.pending().len(),
            self.session.quads().len(),
            selected,
            self.surface.zoom() * 100.0
        )
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for QuadLabelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_frame(ctx);
    }
}

impl QuadLabelApp {
    fn run_frame(&mut self, ctx: &egui::Context) {
        // Everything but the label field is frozen while a prompt is open.
        let prompting = self.prompt.is_some();

        if !prompting {
            self.handle_keys(ctx);
        }

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status_text());
                ui.separator();
                ui.label("double-click: corner | drag: reshape | Backspace: delete | Enter: save | Esc: discard");
            });
        });

        // Canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;
            self.canvas_rect = canvas_rect;

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
            self.surface.paint(ctx, &painter, canvas_rect);

            // Handle pan (middle mouse button)
            let middle_down = ctx.input(|i| i.pointer.middle_down());
            if middle_down {
                let delta = ctx.input(|i| i.pointer.delta());
                self.surface.pan_by(delta);
            }

            // Handle zoom (scroll wheel)
            let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta != 0.0 && response.hovered() {
                self.surface
                    .zoom_by(canvas_rect, scroll_delta, response.hover_pos());
            }

            if !prompting && !middle_down {
                self.handle_pointer(ctx, &response);
            }

            // A drag must end even if the release lands while a prompt is up.
            if ctx.input(|i| i.pointer.primary_released()) {
                self.session.release();
            }

            self.draw_overlays(&painter, canvas_rect);
        });

        if self.prompt.is_none() {
            if let Some(points) = self.session.take_full_pending() {
                self.prompt = Some(LabelPrompt::new(self.prompt_message.clone(), points));
            }
        }

        if let Some(label) = self.prompt.as_mut().and_then(|p| p.show(ctx)) {
            if let Some(prompt) = self.prompt.take() {
                self.session.commit(*prompt.points(), label);
            }
        }

        ctx.request_repaint_after(self.frame_interval);
    }
}
