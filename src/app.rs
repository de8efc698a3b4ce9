use crate::config::WidgetKind;
use crate::event::AppEvent;
use crate::host::call::CallResult;
use crate::host::sandbox::SandboxHost;
use crate::host::{CallStatus, GlobalKey, HostActions, HostGlobalStore, PendingCall, SetGlobalsEvent};
use crate::theme::{Theme, ThemeMode};
use crate::ui::courses::{self, CoursesView};
use crate::ui::details::{DetailsPane, OutlineState};
use crate::ui::widgets;
use crate::ui::UiAction;
use crate::widget::course::{
    course_from_globals, course_from_tool_result, CourseView, CoursesPayload,
    DetailPayload, ListPayload,
};
use crate::widget::outline::CourseOutline;
use crate::widget::state::WidgetStateController;
use crate::widget::tools::{self, CourseTool};
use crate::widget::view::ViewMemo;
use crate::widget::watch::GlobalWatch;
use eframe::egui::{self, Color32, RichText, ScrollArea};
use serde_json::json;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
enum Request {
    Refresh,
    FetchCourse(String),
    FetchOutline(String),
    Update(String),
    Delete(String),
    FollowUp,
}

struct InFlight {
    request: Request,
    call: PendingCall,
}

enum Screen {
    List,
    Details(DetailsPane),
    Mounted(Mounted),
}

/// The course details widget mounted directly on a `tc_get_course` result.
enum Mounted {
    Loading,
    Missing,
    Ready(DetailsPane),
}

struct Watches {
    output: GlobalWatch,
    metadata: GlobalWatch,
    theme: GlobalWatch,
    locale: GlobalWatch,
    widget_state: GlobalWatch,
}

impl Watches {
    fn new(store: &dyn HostGlobalStore, ctx: &egui::Context) -> Self {
        let watch = |key| {
            let ctx = ctx.clone();
            GlobalWatch::new(store, key, move || ctx.request_repaint())
        };
        Self {
            output: watch(GlobalKey::ToolOutput),
            metadata: watch(GlobalKey::ToolResponseMetadata),
            theme: watch(GlobalKey::Theme),
            locale: watch(GlobalKey::Locale),
            widget_state: watch(GlobalKey::WidgetState),
        }
    }

    fn source_revision(&self) -> u64 {
        self.output.revision() + self.metadata.revision()
    }
}

pub struct CourseDeckApp {
    rx: Receiver<AppEvent>,
    host: SandboxHost,
    widget: WidgetKind,
    watches: Watches,
    state: WidgetStateController,
    memo: ViewMemo,
    widget_state_revision: u64,
    list: Option<(u64, ListPayload)>,
    mounted_revision: Option<u64>,
    screen: Screen,
    in_flight: Vec<InFlight>,
    theme: Theme,
    theme_revision: Option<u64>,
    diagnostics_log: Vec<String>,
    transcript: Vec<String>,
    notice: Option<String>,
}

impl CourseDeckApp {
    pub fn new(ctx: &egui::Context, rx: Receiver<AppEvent>, host: SandboxHost, widget: WidgetKind) -> Self {
        let watches = Watches::new(&host, ctx);
        let state = WidgetStateController::from_host(&host);
        let widget_state_revision = watches.widget_state.revision();
        let screen = match widget {
            WidgetKind::Courses => Screen::List,
            WidgetKind::Details => Screen::Mounted(Mounted::Loading),
        };
        tracing::info!(widget = widget.as_str(), "widget mounted");

        Self {
            rx,
            host,
            widget,
            watches,
            state,
            memo: ViewMemo::default(),
            widget_state_revision,
            list: None,
            mounted_revision: None,
            screen,
            in_flight: Vec::new(),
            theme: Theme::default(),
            theme_revision: None,
            diagnostics_log: Vec::new(),
            transcript: Vec::new(),
            notice: None,
        }
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("host event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        if let AppEvent::FollowUpRequested(prompt) = &event {
            self.transcript.push(prompt.clone());
        }
        self.log_diagnostic(event.to_log_line());
    }

    fn org_id(&self) -> Option<String> {
        match &self.list {
            Some((_, ListPayload::Ready(payload))) => payload.org_id.clone(),
            _ => None,
        }
    }

    fn issue(&mut self, request: Request, call: PendingCall) {
        tracing::debug!(?request, "host request issued");
        self.in_flight.push(InFlight { request, call });
    }

    fn call_tool(&mut self, request: Request, tool: CourseTool, args: serde_json::Value) {
        let call = self.host.call_tool(tool.name(), args);
        self.issue(request, call);
    }

    fn follow_up(&mut self, prompt: &str) {
        let call = self.host.send_follow_up_message(prompt);
        self.issue(Request::FollowUp, call);
    }

    fn is_refreshing(&self) -> bool {
        self.in_flight
            .iter()
            .any(|flight| flight.request == Request::Refresh)
    }

    fn pane_for(&mut self, course_id: &str) -> Option<&mut DetailsPane> {
        let pane = match &mut self.screen {
            Screen::Details(pane) | Screen::Mounted(Mounted::Ready(pane)) => pane,
            _ => return None,
        };
        (pane.course.course_id == course_id).then_some(pane)
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::UpdateState(patch) => {
                self.state.update(patch, &self.host);
            }
            UiAction::OpenCourse(course) => {
                let course_id = course.course_id.clone();
                let args = tools::course_lookup_args(&course);
                self.screen = Screen::Details(DetailsPane::new(course, true));
                if !course_id.is_empty() {
                    self.call_tool(Request::FetchCourse(course_id), CourseTool::GetCourse, args);
                }
            }
            UiAction::Back => self.screen = Screen::List,
            UiAction::Refresh => self.refresh(),
            UiAction::CreateCourse => self.follow_up(tools::CREATE_COURSE_PROMPT),
            UiAction::AskAssistant(course) => self.follow_up(&tools::details_prompt(&course)),
            UiAction::LoadOutline(course) => self.call_tool(
                Request::FetchOutline(course.course_id.clone()),
                CourseTool::GetCourseLessons,
                tools::course_lookup_args(&course),
            ),
            UiAction::SaveEdits { course, updates } => self.call_tool(
                Request::Update(course.course_id.clone()),
                CourseTool::UpdateCourse,
                tools::update_args(&course, updates),
            ),
            UiAction::DeleteCourse(course) => self.call_tool(
                Request::Delete(course.course_id.clone()),
                CourseTool::DeleteCourse,
                tools::course_lookup_args(&course),
            ),
        }
    }

    fn refresh(&mut self) {
        if self.widget != WidgetKind::Courses || self.is_refreshing() {
            return;
        }
        let args = tools::list_args(self.org_id().as_deref());
        self.call_tool(Request::Refresh, CourseTool::ListCoursesWithWidget, args);
    }

    fn poll_requests(&mut self) {
        let mut finished = Vec::new();
        self.in_flight.retain_mut(|flight| match flight.call.poll() {
            CallStatus::Pending => true,
            CallStatus::Ready(result) => {
                finished.push((flight.request.clone(), result));
                false
            }
        });

        for (request, result) in finished {
            self.complete(request, result);
        }
    }

    /// Host-call outcomes. A failure never undoes local state that was already
    /// applied; it only clears busy flags and surfaces a notice.
    fn complete(&mut self, request: Request, result: CallResult) {
        match (request, result) {
            (Request::Refresh, Ok(_)) => self.log_diagnostic("course list refreshed"),
            (Request::FetchCourse(course_id), Ok(result)) => {
                if let Some(course) = course_from_tool_result(&result) {
                    if let Some(pane) = self.pane_for(&course_id) {
                        pane.refresh_course(course);
                    }
                }
            }
            (Request::FetchOutline(course_id), Ok(result)) => {
                if let Some(pane) = self.pane_for(&course_id) {
                    pane.outline = OutlineState::Ready(CourseOutline::from_tool_result(&result));
                }
            }
            (Request::FetchOutline(course_id), Err(err)) => {
                tracing::warn!(%course_id, error = %err, "lesson lookup failed");
                if let Some(pane) = self.pane_for(&course_id) {
                    pane.outline = OutlineState::Failed(format!("Could not load lessons: {err}"));
                }
            }
            (Request::Update(course_id), Ok(_)) => {
                if let Some(pane) = self.pane_for(&course_id) {
                    pane.busy = false;
                    if let Some(edits) = pane.edits.take() {
                        let updated = edits.applied_to(&pane.course);
                        pane.refresh_course(updated);
                    }
                }
                self.notice = Some("Course updated".to_string());
                self.refresh();
            }
            (Request::Delete(course_id), Ok(_)) => {
                self.notice = Some("Course deleted".to_string());
                if matches!(self.screen, Screen::Details(_)) {
                    self.screen = Screen::List;
                } else if let Some(pane) = self.pane_for(&course_id) {
                    pane.busy = false;
                }
                self.refresh();
            }
            (Request::Update(course_id) | Request::Delete(course_id), Err(err)) => {
                tracing::warn!(%course_id, error = %err, "course change failed");
                if let Some(pane) = self.pane_for(&course_id) {
                    pane.busy = false;
                }
                self.notice = Some(format!("Request failed: {err}"));
            }
            (Request::FollowUp, Ok(_)) => {}
            (request, Err(err)) => {
                tracing::warn!(?request, error = %err, "host request failed");
                self.log_diagnostic(format!("{request:?} failed: {err}"));
                self.notice = Some(format!("Request failed: {err}"));
            }
        }
    }

    fn sync_theme(&mut self, ctx: &egui::Context) {
        let revision = self.watches.theme.revision();
        if self.theme_revision == Some(revision) {
            return;
        }
        self.theme_revision = Some(revision);
        let mode = ThemeMode::from_host(self.watches.theme.read(&self.host).as_str());
        self.theme = Theme::for_mode(mode);
        self.theme.apply_visuals(ctx);
    }

    /// A saved `widgetState` that shows up after mount (deferred injection)
    /// still seeds the controller, as long as the user has not changed anything.
    fn sync_widget_state(&mut self) {
        let revision = self.watches.widget_state.revision();
        if revision == self.widget_state_revision {
            return;
        }
        self.widget_state_revision = revision;
        if self.state.adopt_host(&self.host) {
            tracing::debug!("widget state seeded from host");
        }
    }

    /// Rows for the payload `sync_globals` last built, keyed on that payload's
    /// revision so a push landing mid-frame cannot pin stale rows.
    fn visible_rows(&mut self) -> Arc<Vec<CourseView>> {
        match &self.list {
            Some((revision, ListPayload::Ready(payload))) => {
                self.memo
                    .rows(*revision, self.state.current(), || payload.courses.clone())
            }
            _ => Arc::default(),
        }
    }

    fn sync_globals(&mut self) {
        let revision = self.watches.source_revision();
        match self.widget {
            WidgetKind::Courses => {
                if self.list.as_ref().map(|(rev, _)| *rev) != Some(revision) {
                    let payload = CoursesPayload::from_globals(
                        &self.watches.output.read(&self.host),
                        &self.watches.metadata.read(&self.host),
                    );
                    self.list = Some((revision, payload));
                }
            }
            WidgetKind::Details => {
                if self.mounted_revision == Some(revision) {
                    return;
                }
                self.mounted_revision = Some(revision);
                let payload = course_from_globals(
                    &self.watches.output.read(&self.host),
                    &self.watches.metadata.read(&self.host),
                );
                self.screen = match (std::mem::replace(&mut self.screen, Screen::List), payload) {
                    (Screen::Mounted(Mounted::Ready(mut pane)), DetailPayload::Ready(course))
                        if pane.course.course_id == course.course_id =>
                    {
                        pane.refresh_course(course);
                        Screen::Mounted(Mounted::Ready(pane))
                    }
                    (_, DetailPayload::Ready(course)) => {
                        Screen::Mounted(Mounted::Ready(DetailsPane::new(course, false)))
                    }
                    (_, DetailPayload::Missing) => Screen::Mounted(Mounted::Missing),
                    (_, DetailPayload::Loading) => Screen::Mounted(Mounted::Loading),
                };
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let injected = self.host.is_injected();
        let locale = self
            .watches
            .locale
            .read(&self.host)
            .as_str()
            .unwrap_or("-")
            .to_string();
        let mut toggle_theme = false;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Coursedeck");
                ui.separator();
                ui.label(format!("Widget: {}", self.widget.as_str()));
                ui.separator();
                let (label, color) = if injected {
                    ("Host globals ready", Color32::from_rgb(0x16, 0xA3, 0x4A))
                } else {
                    ("Waiting for host...", Color32::from_rgb(0xD9, 0x77, 0x06))
                };
                ui.label(RichText::new(label).color(color));
                ui.separator();
                ui.label(format!("Locale: {locale}"));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let next = self.theme.mode.toggled();
                    toggle_theme = ui.button(format!("Host theme: {}", next.as_str())).clicked();
                });
            });
        });

        if toggle_theme {
            let next = self.theme.mode.toggled();
            self.host
                .push_globals(SetGlobalsEvent::new().with(GlobalKey::Theme, json!(next.as_str())));
        }
    }

    fn render_host_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("host_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Host");
                ui.separator();
                ui.strong("Follow-up messages");
                if self.transcript.is_empty() {
                    ui.label(widgets::muted("None yet", &self.theme));
                }
                for prompt in &self.transcript {
                    ui.label(format!("[You] {prompt}"));
                }

                ui.separator();
                egui::CollapsingHeader::new("Diagnostics")
                    .default_open(false)
                    .show(ui, |ui| {
                        ScrollArea::vertical()
                            .id_salt("diagnostics_log")
                            .max_height(240.0)
                            .stick_to_bottom(true)
                            .show(ui, |ui| {
                                for entry in &self.diagnostics_log {
                                    ui.label(entry);
                                }
                            });
                    });
            });
    }

    fn render_widget(&mut self, ctx: &egui::Context) {
        let mut actions: Vec<UiAction> = Vec::new();
        let theme = self.theme.clone();
        let rows = if matches!(self.screen, Screen::List) {
            self.visible_rows()
        } else {
            Arc::default()
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(notice) = self.notice.clone() {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(notice).color(theme.text_muted));
                    if ui.small_button("x").clicked() {
                        self.notice = None;
                    }
                });
                ui.separator();
            }

            let mut emit = |action: UiAction| actions.push(action);
            match &mut self.screen {
                Screen::List => {
                    let loading = ListPayload::Loading;
                    let payload = self
                        .list
                        .as_ref()
                        .map(|(_, payload)| payload)
                        .unwrap_or(&loading);
                    let view = CoursesView {
                        payload,
                        rows: &rows,
                        state: self.state.current(),
                        refreshing: self.in_flight.iter().any(|flight| flight.request == Request::Refresh),
                    };
                    courses::show(ui, &theme, &view, &mut emit);
                }
                Screen::Details(pane) | Screen::Mounted(Mounted::Ready(pane)) => {
                    pane.show(ui, &theme, &mut emit);
                }
                Screen::Mounted(Mounted::Loading) => widgets::loading(ui, &theme, "Loading course details..."),
                Screen::Mounted(Mounted::Missing) => widgets::empty(ui, &theme, "No details"),
            }
        });

        for action in actions {
            self.apply_action(action);
        }
    }

    fn frame(&mut self, ctx: &egui::Context) {
        self.drain_events();
        self.poll_requests();
        self.sync_theme(ctx);
        self.sync_widget_state();
        self.sync_globals();
        self.render_top_bar(ctx);
        self.render_host_panel(ctx);
        self.render_widget(ctx);

        if !self.in_flight.is_empty() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}

impl eframe::App for CourseDeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frame(ctx);
    }
}

impl Drop for CourseDeckApp {
    fn drop(&mut self) {
        tracing::info!(
            widget = self.widget.as_str(),
            pending = self.in_flight.len(),
            "widget unmounted, releasing host subscriptions"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HostConfig, HostFixture};
    use crate::widget::state::{SortBy, ViewMode, WidgetStatePatch};
    use std::sync::mpsc;
    use tokio::runtime::Handle;

    fn app(widget: WidgetKind, inject_on_start: bool) -> CourseDeckApp {
        let config = HostConfig {
            fixture: HostFixture::builtin().expect("builtin fixture should parse"),
            widget,
            turn_id: "test-turn".to_string(),
            state_dir: None,
            latency: Duration::from_millis(if inject_on_start { 0 } else { 60_000 }),
            inject_on_start,
        };
        let (tx, rx) = mpsc::channel();
        let host = SandboxHost::start(&config, Handle::current(), tx);
        CourseDeckApp::new(&egui::Context::default(), rx, host, widget)
    }

    async fn settle(app: &mut CourseDeckApp) {
        for _ in 0..50 {
            app.poll_requests();
            if app.in_flight.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        app.drain_events();
        app.sync_widget_state();
        app.sync_globals();
    }

    #[tokio::test]
    async fn absent_tool_output_reads_as_loading() {
        let mut app = app(WidgetKind::Courses, false);
        app.sync_globals();
        assert!(matches!(app.list, Some((_, ListPayload::Loading))));
        assert!(app.org_id().is_none());
    }

    #[tokio::test]
    async fn injected_fixture_reads_as_ready_list() {
        let mut app = app(WidgetKind::Courses, true);
        app.sync_globals();
        match &app.list {
            Some((_, ListPayload::Ready(payload))) => {
                assert_eq!(payload.courses.len(), 6);
                assert_eq!(payload.org_id.as_deref(), Some("7001"));
            }
            _ => panic!("fixture list should be ready"),
        }
    }

    #[tokio::test]
    async fn state_update_survives_host_without_persistence() {
        let mut app = app(WidgetKind::Courses, true);
        app.apply_action(UiAction::UpdateState(WidgetStatePatch::sort_by(SortBy::Name)));
        assert_eq!(app.state.current().sort_by, SortBy::Name);
        assert!(app.host.snapshot(GlobalKey::WidgetState).is_absent());
    }

    #[tokio::test]
    async fn opening_a_course_fetches_the_full_record() {
        let mut app = app(WidgetKind::Courses, true);
        app.sync_globals();
        let course = match &app.list {
            Some((_, ListPayload::Ready(payload))) => payload
                .courses
                .iter()
                .find(|course| course.course_id == "3000094000002000004")
                .cloned()
                .expect("fixture course should exist"),
            _ => panic!("fixture list should be ready"),
        };
        assert_eq!(course.enrolled_count, 128);
        assert_eq!(
            course.description.as_deref(),
            Some("A hands-on first course in Rust for working programmers.")
        );

        app.apply_action(UiAction::OpenCourse(course));
        assert_eq!(
            app.in_flight[0].request,
            Request::FetchCourse("3000094000002000004".to_string())
        );

        settle(&mut app).await;
        match &app.screen {
            Screen::Details(pane) => {
                assert_eq!(pane.course.enrolled_count, 131);
                assert!(pane
                    .course
                    .description
                    .as_deref()
                    .is_some_and(|description| description.ends_with("error handling and cargo.")));
                assert_eq!(pane.course.categories, vec!["Engineering".to_string()]);
            }
            _ => panic!("details pane should be open"),
        }
    }

    #[tokio::test]
    async fn failed_lesson_lookup_marks_outline_failed() {
        let mut app = app(WidgetKind::Courses, true);
        let course = CourseView {
            course_id: "3000094000002000004".to_string(),
            ..CourseView::default()
        };
        app.screen = Screen::Details(DetailsPane::new(course.clone(), true));
        let (resolver, call) = PendingCall::channel();
        app.issue(Request::FetchOutline(course.course_id.clone()), call);
        resolver.resolve(Err(crate::error::HostError::ToolFailed {
            tool: "tc_get_course_lessons".to_string(),
            message: "boom".to_string(),
        }));

        app.poll_requests();
        match &app.screen {
            Screen::Details(pane) => {
                assert!(matches!(pane.outline, OutlineState::Failed(_)));
            }
            _ => panic!("details pane should stay open"),
        }
    }

    #[tokio::test]
    async fn delete_returns_to_list_and_refreshes() {
        let mut app = app(WidgetKind::Courses, true);
        app.sync_globals();
        let course = CourseView {
            course_id: "3000094000002000022".to_string(),
            ..CourseView::default()
        };
        app.screen = Screen::Details(DetailsPane::new(course.clone(), true));
        app.apply_action(UiAction::DeleteCourse(course));
        settle(&mut app).await;

        assert!(matches!(app.screen, Screen::List));
        assert_eq!(app.notice.as_deref(), Some("Course deleted"));
        assert!(app
            .diagnostics_log
            .iter()
            .any(|line| line.contains("tc_list_courses_with_widget")));
    }

    #[tokio::test]
    async fn details_widget_mounts_from_metadata() {
        let mut app = app(WidgetKind::Details, true);
        app.sync_globals();
        match &app.screen {
            Screen::Mounted(Mounted::Ready(pane)) => {
                assert_eq!(pane.course.course_name, "Intro to Rust");
            }
            _ => panic!("details widget should be ready"),
        }
    }

    #[tokio::test]
    async fn accepted_edit_updates_the_open_pane() {
        let mut app = app(WidgetKind::Courses, true);
        app.sync_globals();
        let course = CourseView {
            course_id: "3000094000002000004".to_string(),
            course_name: "Intro to Rust".to_string(),
            ..CourseView::default()
        };
        let mut pane = DetailsPane::new(course.clone(), true);
        let mut edits = crate::widget::tools::CourseEdits::from_course(&course);
        edits.course_name = "Rust for Beginners".to_string();
        let updates = edits.changes_from(&course);
        pane.edits = Some(edits);
        pane.busy = true;
        app.screen = Screen::Details(pane);

        app.apply_action(UiAction::SaveEdits { course, updates });
        settle(&mut app).await;

        match &app.screen {
            Screen::Details(pane) => {
                assert!(!pane.busy);
                assert!(pane.edits.is_none());
                assert_eq!(pane.course.course_name, "Rust for Beginners");
            }
            _ => panic!("details pane should stay open"),
        }
        assert_eq!(app.notice.as_deref(), Some("Course updated"));
    }

    #[tokio::test]
    async fn push_between_sync_and_render_does_not_pin_stale_rows() {
        let mut app = app(WidgetKind::Courses, true);
        app.sync_globals();

        app.host.push_globals(SetGlobalsEvent::new().with(
            GlobalKey::ToolResponseMetadata,
            json!({ "courses": [{ "courseId": "1", "courseName": "Only course" }] }),
        ));
        assert_eq!(app.visible_rows().len(), 6);

        app.sync_globals();
        let rows = app.visible_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course_name, "Only course");
    }

    #[tokio::test]
    async fn saved_state_arriving_after_mount_seeds_the_controller() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut config = HostConfig {
            fixture: HostFixture::builtin().expect("builtin fixture should parse"),
            widget: WidgetKind::Courses,
            turn_id: "turn-7".to_string(),
            state_dir: Some(dir.path().to_path_buf()),
            latency: Duration::ZERO,
            inject_on_start: true,
        };
        let (tx, _rx) = mpsc::channel();
        SandboxHost::start(&config, Handle::current(), tx)
            .set_widget_state(json!({ "viewMode": "list", "sortBy": "name" }))
            .expect("persistence should be available");

        config.inject_on_start = false;
        config.latency = Duration::from_millis(20);
        let (tx, rx) = mpsc::channel();
        let host = SandboxHost::start(&config, Handle::current(), tx);
        let mut app = CourseDeckApp::new(&egui::Context::default(), rx, host, WidgetKind::Courses);
        assert_eq!(app.state.current().view_mode, ViewMode::Grid);

        tokio::time::sleep(Duration::from_millis(100)).await;
        app.sync_widget_state();
        assert_eq!(app.state.current().view_mode, ViewMode::List);
        assert_eq!(app.state.current().sort_by, SortBy::Name);
    }
}
