use crate::widget::course::text;
use serde_json::Value;

pub const UNTITLED_LESSON: &str = "Untitled lesson";
pub const UNTITLED_CHAPTER: &str = "Untitled chapter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: String,
    pub name: String,
    pub lessons: Vec<Lesson>,
}

/// Lessons and chapters of one course, as returned by `tc_get_course_lessons`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseOutline {
    pub lessons: Vec<Lesson>,
    pub chapters: Vec<Chapter>,
}

impl CourseOutline {
    pub fn from_tool_result(result: &Value) -> Self {
        Self {
            lessons: lessons_from(result.get("lessons")),
            chapters: result
                .get("chapters")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(chapter).collect())
                .unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty() && self.chapters.is_empty()
    }
}

fn lessons_from(raw: Option<&Value>) -> Vec<Lesson> {
    raw.and_then(Value::as_array)
        .map(|items| items.iter().filter_map(lesson).collect())
        .unwrap_or_default()
}

fn lesson(raw: &Value) -> Option<Lesson> {
    let record = raw.as_object()?;
    Some(Lesson {
        id: text(record.get("sessionId").or_else(|| record.get("id"))).unwrap_or_default(),
        name: text(
            record
                .get("name")
                .or_else(|| record.get("sessionName"))
                .or_else(|| record.get("title")),
        )
        .unwrap_or_else(|| UNTITLED_LESSON.to_string()),
    })
}

fn chapter(raw: &Value) -> Option<Chapter> {
    let record = raw.as_object()?;
    Some(Chapter {
        id: text(record.get("sectionId").or_else(|| record.get("id"))).unwrap_or_default(),
        name: text(record.get("name").or_else(|| record.get("sectionName")))
            .unwrap_or_else(|| UNTITLED_CHAPTER.to_string()),
        lessons: lessons_from(record.get("lessons")),
    })
}
