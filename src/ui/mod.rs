//! egui rendering of the course widgets.
//!
//! Views never call the host themselves. They draw from data the app already
//! holds and report what the user did through `emit`.

use crate::widget::course::CourseView;
use crate::widget::state::WidgetStatePatch;
use serde_json::{Map, Value};

pub mod courses;
pub mod details;
pub mod widgets;

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    UpdateState(WidgetStatePatch),
    OpenCourse(CourseView),
    Back,
    Refresh,
    CreateCourse,
    AskAssistant(CourseView),
    LoadOutline(CourseView),
    SaveEdits {
        course: CourseView,
        updates: Map<String, Value>,
    },
    DeleteCourse(CourseView),
}
