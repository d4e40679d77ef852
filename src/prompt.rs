use eframe::egui;

use crate::model::Point;

/// Modal label entry for a freshly placed quad. It has no close button: the
/// only way out is to confirm, possibly with an empty label.
pub struct LabelPrompt {
    message: String,
    text: String,
    points: [Point; 4],
}

impl LabelPrompt {
    pub fn new(message: impl Into<String>, points: [Point; 4]) -> Self {
        Self {
            message: message.into(),
            text: String::new(),
            points,
        }
    }

    /// The corners waiting for this label.
    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    /// Returns the label on the frame it is confirmed.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<String> {
        let mut confirmed = false;
        egui::Window::new("Label")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(self.message.as_str());
                    let te = ui.text_edit_singleline(&mut self.text);
                    let entered = te.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if !entered {
                        te.request_focus();
                    }
                    if ui.button("okay").clicked() || entered {
                        confirmed = true;
                    }
                });
            });
        confirmed.then(|| std::mem::take(&mut self.text))
    }
}
