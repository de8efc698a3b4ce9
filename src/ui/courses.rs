use crate::theme::Theme;
use crate::ui::widgets::{self, muted};
use crate::ui::UiAction;
use crate::widget::course::{CourseStats, CourseView, ListPayload};
use crate::widget::state::{FilterBy, SortBy, ViewMode, WidgetState, WidgetStatePatch};
use eframe::egui::{self, Align2, CornerRadius, FontId, RichText};

const CARD_WIDTH: f32 = 250.0;
const THUMBNAIL_HEIGHT: f32 = 72.0;

/// Everything the dashboard draws in one frame.
pub struct CoursesView<'a> {
    pub payload: &'a ListPayload,
    pub rows: &'a [CourseView],
    pub state: &'a WidgetState,
    pub refreshing: bool,
}

pub fn show(ui: &mut egui::Ui, theme: &Theme, view: &CoursesView<'_>, emit: &mut dyn FnMut(UiAction)) {
    let ListPayload::Ready(payload) = view.payload else {
        widgets::loading(ui, theme, "Loading courses...");
        return;
    };

    render_header(ui, theme, view.rows.len(), &payload.stats, view.refreshing, emit);
    ui.add_space(theme.spacing_8);
    render_controls(ui, theme, view.state, emit);
    ui.add_space(theme.spacing_12);

    egui::ScrollArea::vertical()
        .id_salt("course_list")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if view.rows.is_empty() {
                render_empty(ui, theme, view.state, emit);
                return;
            }
            match view.state.view_mode {
                ViewMode::Grid => render_grid(ui, theme, view.rows, emit),
                ViewMode::List => render_list(ui, theme, view.rows, emit),
            }
        });
}

fn render_header(
    ui: &mut egui::Ui,
    theme: &Theme,
    visible: usize,
    stats: &CourseStats,
    refreshing: bool,
    emit: &mut dyn FnMut(UiAction),
) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.heading(format!("Courses ({visible})"));
            ui.horizontal(|ui| {
                widgets::badge(
                    ui,
                    theme,
                    &format!("{} Published", stats.published),
                    theme.surface_3,
                    theme.success,
                );
                widgets::badge(
                    ui,
                    theme,
                    &format!("{} Draft", stats.draft),
                    theme.surface_3,
                    theme.warning,
                );
            });
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            if widgets::accent_button(ui, theme, "+ Create").clicked() {
                emit(UiAction::CreateCourse);
            }
            if refreshing {
                ui.add(egui::Spinner::new().color(theme.accent_primary));
            } else if ui.button("Refresh").clicked() {
                emit(UiAction::Refresh);
            }
        });
    });
}

fn render_controls(ui: &mut egui::Ui, theme: &Theme, state: &WidgetState, emit: &mut dyn FnMut(UiAction)) {
    ui.horizontal_wrapped(|ui| {
        let mut query = state.search_query.clone();
        let search = ui.add(
            egui::TextEdit::singleline(&mut query)
                .hint_text("Search courses...")
                .desired_width(220.0),
        );
        if search.changed() {
            emit(UiAction::UpdateState(WidgetStatePatch::search(query)));
        }
        if !state.search_query.is_empty() && ui.small_button("x").clicked() {
            emit(UiAction::UpdateState(WidgetStatePatch::search("")));
        }

        ui.add_space(theme.spacing_8);
        ui.label(muted("Filter by:", theme));
        egui::ComboBox::from_id_salt("filter_by")
            .selected_text(state.filter_by.label())
            .show_ui(ui, |ui| {
                for filter in FilterBy::ALL {
                    if ui
                        .selectable_label(state.filter_by == filter, filter.label())
                        .clicked()
                    {
                        emit(UiAction::UpdateState(WidgetStatePatch::filter_by(filter)));
                    }
                }
            });

        ui.label(muted("Sort by:", theme));
        egui::ComboBox::from_id_salt("sort_by")
            .selected_text(state.sort_by.label())
            .show_ui(ui, |ui| {
                for sort in SortBy::ALL {
                    if ui.selectable_label(state.sort_by == sort, sort.label()).clicked() {
                        emit(UiAction::UpdateState(WidgetStatePatch::sort_by(sort)));
                    }
                }
            });

        ui.add_space(theme.spacing_8);
        for (mode, label) in [(ViewMode::Grid, "Grid"), (ViewMode::List, "List")] {
            if ui.selectable_label(state.view_mode == mode, label).clicked() {
                emit(UiAction::UpdateState(WidgetStatePatch::view_mode(mode)));
            }
        }
    });
}

fn render_empty(ui: &mut egui::Ui, theme: &Theme, state: &WidgetState, emit: &mut dyn FnMut(UiAction)) {
    widgets::empty(ui, theme, "No courses found");
    let filtered = !state.search_query.is_empty() || state.filter_by != FilterBy::All;
    if filtered {
        ui.vertical_centered(|ui| {
            if ui.button("Clear filters").clicked() {
                emit(UiAction::UpdateState(WidgetStatePatch::clear_filters()));
            }
        });
    }
}

fn render_grid(ui: &mut egui::Ui, theme: &Theme, rows: &[CourseView], emit: &mut dyn FnMut(UiAction)) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(theme.spacing_16, theme.spacing_16);
        for course in rows {
            let clicked = ui
                .allocate_ui(egui::vec2(CARD_WIDTH, 0.0), |ui| grid_card(ui, theme, course))
                .inner;
            if clicked {
                emit(UiAction::OpenCourse(course.clone()));
            }
        }
    });
}

fn grid_card(ui: &mut egui::Ui, theme: &Theme, course: &CourseView) -> bool {
    let response = theme
        .card_frame()
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH - 2.0 * theme.spacing_12);
            let (rect, _) = ui.allocate_exact_size(
                egui::vec2(ui.available_width(), THUMBNAIL_HEIGHT),
                egui::Sense::hover(),
            );
            ui.painter().rect_filled(
                rect,
                CornerRadius::same(theme.radius_8),
                theme.card_accent(&course.course_name),
            );
            if !course.publish_status.is_published() {
                ui.painter().text(
                    rect.right_top() + egui::vec2(-8.0, 8.0),
                    Align2::RIGHT_TOP,
                    "Draft",
                    FontId::proportional(12.0),
                    theme.danger,
                );
            }

            ui.add_space(theme.spacing_4);
            ui.label(RichText::new(&course.course_name).strong().size(15.0));
            if let Some(sub_title) = &course.sub_title {
                ui.label(muted(sub_title, theme));
            }
            ui.horizontal(|ui| {
                ui.label(muted(format!("Rating {:.1}", course.rating), theme));
                ui.label(muted(format!("{} enrolled", course.enrolled_count), theme));
            });
        })
        .response;
    response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
        .clicked()
}

fn render_list(ui: &mut egui::Ui, theme: &Theme, rows: &[CourseView], emit: &mut dyn FnMut(UiAction)) {
    for course in rows {
        let response = theme
            .card_frame()
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(56.0, 56.0), egui::Sense::hover());
                    ui.painter().rect_filled(
                        rect,
                        CornerRadius::same(theme.radius_8),
                        theme.card_accent(&course.course_name),
                    );
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&course.course_name).strong().size(15.0));
                        if let Some(sub_title) = &course.sub_title {
                            ui.label(muted(sub_title, theme));
                        }
                        ui.horizontal(|ui| {
                            if !course.publish_status.is_published() {
                                widgets::status_badge(ui, theme, course.publish_status);
                            }
                            ui.label(muted(format!("Rating {:.1}", course.rating), theme));
                            ui.label(muted(format!("{} enrolled", course.enrolled_count), theme));
                        });
                    });
                });
            })
            .response;
        if response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand)
            .clicked()
        {
            emit(UiAction::OpenCourse(course.clone()));
        }
        ui.add_space(theme.spacing_8);
    }
}
