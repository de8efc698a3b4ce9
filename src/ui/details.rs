use crate::theme::Theme;
use crate::ui::widgets::{self, muted};
use crate::ui::UiAction;
use crate::widget::course::CourseView;
use crate::widget::outline::CourseOutline;
use crate::widget::tools::CourseEdits;
use eframe::egui::{self, RichText};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Details,
    Lessons,
    Chapters,
    Outline,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [
        DetailTab::Details,
        DetailTab::Lessons,
        DetailTab::Chapters,
        DetailTab::Outline,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Details => "Details",
            Self::Lessons => "Lessons",
            Self::Chapters => "Chapters",
            Self::Outline => "Outline",
        }
    }

    fn needs_outline(self) -> bool {
        self != Self::Details
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum OutlineState {
    #[default]
    NotRequested,
    Loading,
    Ready(CourseOutline),
    Failed(String),
}

/// One course on screen, with the tab, edit form and delete confirmation that
/// only live as long as the pane.
#[derive(Debug, Clone)]
pub struct DetailsPane {
    pub course: CourseView,
    pub tab: DetailTab,
    pub outline: OutlineState,
    pub edits: Option<CourseEdits>,
    pub confirm_delete: bool,
    pub busy: bool,
    show_back: bool,
}

impl DetailsPane {
    pub fn new(course: CourseView, show_back: bool) -> Self {
        Self {
            course,
            tab: DetailTab::default(),
            outline: OutlineState::default(),
            edits: None,
            confirm_delete: false,
            busy: false,
            show_back,
        }
    }

    /// Swaps in a fresher record for the same course, keeping pane state.
    pub fn refresh_course(&mut self, course: CourseView) {
        if course.course_id == self.course.course_id {
            self.course = course;
        }
    }

    pub fn select_tab(&mut self, tab: DetailTab, emit: &mut dyn FnMut(UiAction)) {
        self.tab = tab;
        if tab.needs_outline() && self.outline == OutlineState::NotRequested && self.course.has_id() {
            self.outline = OutlineState::Loading;
            emit(UiAction::LoadOutline(self.course.clone()));
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, theme: &Theme, emit: &mut dyn FnMut(UiAction)) {
        self.render_toolbar(ui, theme, emit);
        ui.add_space(theme.spacing_8);
        self.render_summary(ui, theme);
        ui.add_space(theme.spacing_12);

        ui.horizontal(|ui| {
            for tab in DetailTab::ALL {
                if ui.selectable_label(self.tab == tab, tab.label()).clicked() {
                    self.select_tab(tab, emit);
                }
            }
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("course_details")
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                DetailTab::Details => self.render_details_tab(ui, theme, emit),
                DetailTab::Lessons => self.render_outline_tab(ui, theme, render_lessons),
                DetailTab::Chapters => self.render_outline_tab(ui, theme, render_chapters),
                DetailTab::Outline => self.render_outline_tab(ui, theme, render_outline),
            });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui, theme: &Theme, emit: &mut dyn FnMut(UiAction)) {
        ui.horizontal(|ui| {
            if self.show_back && ui.button("< Back").clicked() {
                emit(UiAction::Back);
            }
            if self.busy {
                ui.add(egui::Spinner::new().color(theme.accent_primary));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let has_id = self.course.has_id();
                if ui
                    .add_enabled(has_id && !self.busy, egui::Button::new("Delete"))
                    .clicked()
                {
                    self.confirm_delete = true;
                }
                if ui
                    .add_enabled(has_id && self.edits.is_none(), egui::Button::new("Edit"))
                    .clicked()
                {
                    self.edits = Some(CourseEdits::from_course(&self.course));
                    self.tab = DetailTab::Details;
                }
                if widgets::accent_button(ui, theme, "Ask assistant").clicked() {
                    emit(UiAction::AskAssistant(self.course.clone()));
                }
            });
        });

        if self.confirm_delete {
            theme.card_frame().show(ui, |ui| {
                ui.label(RichText::new("Delete this course?").color(theme.danger).strong());
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        self.confirm_delete = false;
                        self.busy = true;
                        emit(UiAction::DeleteCourse(self.course.clone()));
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_delete = false;
                    }
                });
            });
        }
    }

    fn render_summary(&self, ui: &mut egui::Ui, theme: &Theme) {
        let course = &self.course;
        ui.heading(&course.course_name);
        ui.horizontal(|ui| {
            widgets::status_badge(ui, theme, course.publish_status);
            ui.label(muted(format!("Enrolled: {}", course.enrolled_count), theme));
            ui.label(muted(format!("Rating {:.1}", course.rating), theme));
        });
        if let Some(sub_title) = &course.sub_title {
            ui.label(RichText::new(sub_title).size(15.0));
        }
    }

    fn render_details_tab(&mut self, ui: &mut egui::Ui, theme: &Theme, emit: &mut dyn FnMut(UiAction)) {
        if let Some(edits) = self.edits.as_mut() {
            let mut save = false;
            let mut cancel = false;
            theme.card_frame().show(ui, |ui| {
                ui.label(muted("Course name", theme));
                ui.text_edit_singleline(&mut edits.course_name);
                ui.label(muted("Subtitle", theme));
                ui.text_edit_singleline(&mut edits.sub_title);
                ui.label(muted("Description", theme));
                ui.text_edit_multiline(&mut edits.description);
                ui.horizontal(|ui| {
                    save = ui.add_enabled(!self.busy, egui::Button::new("Save")).clicked();
                    cancel = ui.button("Cancel").clicked();
                });
            });

            if save {
                let updates = edits.changes_from(&self.course);
                if updates.is_empty() {
                    self.edits = None;
                } else {
                    self.busy = true;
                    emit(UiAction::SaveEdits {
                        course: self.course.clone(),
                        updates,
                    });
                }
            } else if cancel {
                self.edits = None;
            }
            return;
        }

        let course = &self.course;
        match &course.description {
            Some(description) => {
                ui.label(description);
            }
            None => {
                ui.label(muted("No description", theme));
            }
        }
        ui.add_space(theme.spacing_8);
        if !course.categories.is_empty() {
            ui.label(muted(format!("Categories: {}", course.categories.join(", ")), theme));
        }
        if let Some(created) = course.created_date() {
            ui.label(muted(format!("Created: {created}"), theme));
        }
        if let Some(updated) = course.updated_date() {
            ui.label(muted(format!("Updated: {updated}"), theme));
        }
        if course.has_id() {
            ui.label(muted(format!("ID: {}", course.course_id), theme));
        }
    }

    fn render_outline_tab(
        &self,
        ui: &mut egui::Ui,
        theme: &Theme,
        render: fn(&mut egui::Ui, &Theme, &CourseOutline),
    ) {
        match &self.outline {
            OutlineState::NotRequested => widgets::empty(ui, theme, "Nothing loaded"),
            OutlineState::Loading => widgets::loading(ui, theme, "Loading..."),
            OutlineState::Failed(message) => {
                ui.label(RichText::new(message).color(theme.danger));
            }
            OutlineState::Ready(outline) if outline.is_empty() => {
                widgets::empty(ui, theme, "This course has no lessons yet")
            }
            OutlineState::Ready(outline) => render(ui, theme, outline),
        }
    }
}

fn render_lessons(ui: &mut egui::Ui, theme: &Theme, outline: &CourseOutline) {
    if outline.lessons.is_empty() {
        widgets::empty(ui, theme, "No lessons");
        return;
    }
    for lesson in &outline.lessons {
        ui.label(&lesson.name);
    }
}

fn render_chapters(ui: &mut egui::Ui, theme: &Theme, outline: &CourseOutline) {
    if outline.chapters.is_empty() {
        widgets::empty(ui, theme, "No chapters");
        return;
    }
    for chapter in &outline.chapters {
        ui.label(&chapter.name);
    }
}

fn render_outline(ui: &mut egui::Ui, theme: &Theme, outline: &CourseOutline) {
    if outline.chapters.is_empty() {
        widgets::empty(ui, theme, "No outline");
        return;
    }
    for chapter in &outline.chapters {
        ui.label(RichText::new(&chapter.name).strong());
        ui.indent(("outline_chapter", chapter.id.as_str()), |ui| {
            for lesson in &chapter.lessons {
                ui.label(&lesson.name);
            }
        });
    }
}
