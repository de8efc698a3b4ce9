use crate::widget::course::CourseView;
use serde_json::{json, Map, Value};

/// Host tools the course widgets call. The tools themselves live on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseTool {
    ListCoursesWithWidget,
    GetCourse,
    GetCourseLessons,
    UpdateCourse,
    DeleteCourse,
}

impl CourseTool {
    pub fn name(self) -> &'static str {
        match self {
            Self::ListCoursesWithWidget => "tc_list_courses_with_widget",
            Self::GetCourse => "tc_get_course",
            Self::GetCourseLessons => "tc_get_course_lessons",
            Self::UpdateCourse => "tc_update_course",
            Self::DeleteCourse => "tc_delete_course",
        }
    }
}

/// Editable fields sent as `updates` to `tc_update_course`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseEdits {
    pub course_name: String,
    pub sub_title: String,
    pub description: String,
}

impl CourseEdits {
    pub fn from_course(course: &CourseView) -> Self {
        Self {
            course_name: course.course_name.clone(),
            sub_title: course.sub_title.clone().unwrap_or_default(),
            description: course.description.clone().unwrap_or_default(),
        }
    }

    /// Only fields that differ from `course` end up in the update.
    pub fn changes_from(&self, course: &CourseView) -> Map<String, Value> {
        let mut updates = Map::new();
        let name = self.course_name.trim();
        if !name.is_empty() && name != course.course_name {
            updates.insert("courseName".into(), json!(name));
        }
        if self.sub_title.trim() != course.sub_title.as_deref().unwrap_or_default() {
            updates.insert("subTitle".into(), json!(self.sub_title.trim()));
        }
        if self.description.trim() != course.description.as_deref().unwrap_or_default() {
            updates.insert("description".into(), json!(self.description.trim()));
        }
        updates
    }

    /// The course as it reads once the host accepted these edits.
    pub fn applied_to(&self, course: &CourseView) -> CourseView {
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        let name = self.course_name.trim();
        CourseView {
            course_name: if name.is_empty() {
                course.course_name.clone()
            } else {
                name.to_string()
            },
            sub_title: optional(&self.sub_title),
            description: optional(&self.description),
            ..course.clone()
        }
    }
}

fn course_args(course_id: &str, org_id: Option<&str>) -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("courseId".into(), json!(course_id));
    if let Some(org_id) = org_id {
        args.insert("orgId".into(), json!(org_id));
    }
    args
}

pub fn list_args(org_id: Option<&str>) -> Value {
    match org_id {
        Some(org_id) => json!({ "orgId": org_id }),
        None => json!({}),
    }
}

pub fn course_lookup_args(course: &CourseView) -> Value {
    Value::Object(course_args(&course.course_id, course.org_id.as_deref()))
}

pub fn update_args(course: &CourseView, updates: Map<String, Value>) -> Value {
    let mut args = course_args(&course.course_id, course.org_id.as_deref());
    args.insert("updates".into(), Value::Object(updates));
    Value::Object(args)
}

pub fn details_prompt(course: &CourseView) -> String {
    format!(
        "Show me details for the course \"{}\" (ID: {})",
        course.course_name, course.course_id
    )
}

pub const CREATE_COURSE_PROMPT: &str = "I want to create a new course";
