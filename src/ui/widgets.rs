use crate::theme::Theme;
use crate::widget::course::PublishStatus;
use eframe::egui::{self, Color32, RichText};

pub fn loading(ui: &mut egui::Ui, theme: &Theme, label: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(theme.spacing_24 * 2.0);
        ui.add(egui::Spinner::new().size(36.0).color(theme.accent_primary));
        ui.add_space(theme.spacing_12);
        ui.label(RichText::new(label).color(theme.text_muted).size(14.0));
    });
}

pub fn empty(ui: &mut egui::Ui, theme: &Theme, label: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(theme.spacing_24);
        ui.label(RichText::new(label).color(theme.text_muted).size(15.0));
    });
}

pub fn badge(ui: &mut egui::Ui, theme: &Theme, text: &str, fill: Color32, color: Color32) {
    theme.badge_frame(fill).show(ui, |ui| {
        ui.label(RichText::new(text).color(color).size(12.0).strong());
    });
}

pub fn status_badge(ui: &mut egui::Ui, theme: &Theme, status: PublishStatus) {
    let (fill, color) = match status {
        PublishStatus::Published => (theme.success, theme.text_on_accent),
        PublishStatus::Draft => (theme.warning, theme.text_on_accent),
    };
    badge(ui, theme, status.label(), fill, color);
}

pub fn accent_button(ui: &mut egui::Ui, theme: &Theme, label: &str) -> egui::Response {
    ui.add(
        egui::Button::new(RichText::new(label).color(theme.text_on_accent).strong())
            .fill(theme.accent_primary),
    )
}

pub fn muted(text: impl Into<String>, theme: &Theme) -> RichText {
    RichText::new(text).color(theme.text_muted).size(13.0)
}
