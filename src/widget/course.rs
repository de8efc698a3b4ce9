//! Course records as the widgets see them.
//!
//! Upstream tools hand back two incompatible shapes (`{id, name, status, enrolled}`
//! and `{courseId, courseName, publishStatus, enrolledCount}`). `normalize_course`
//! is the one place that maps either shape onto `CourseView`, with a default for
//! every field so rendering never sees a hole.

use crate::host::Snapshot;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UNTITLED_COURSE: &str = "Untitled course";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PublishStatus {
    Published,
    #[default]
    Draft,
}

impl PublishStatus {
    /// `PUBLISHED` (any case) is published; `DRAFT`, `NONE`, `"0"` and anything
    /// else is a draft.
    pub fn from_raw(raw: Option<&Value>) -> Self {
        match raw.and_then(Value::as_str) {
            Some(status) if status.trim().eq_ignore_ascii_case("published") => Self::Published,
            _ => Self::Draft,
        }
    }

    pub fn is_published(self) -> bool {
        self == Self::Published
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Published => "Published",
            Self::Draft => "Draft",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub course_id: String,
    pub course_name: String,
    pub sub_title: Option<String>,
    pub description: Option<String>,
    pub publish_status: PublishStatus,
    pub enrolled_count: u64,
    pub rating: f64,
    pub created_time: i64,
    pub last_updated_time: i64,
    pub categories: Vec<String>,
    pub org_id: Option<String>,
}

impl CourseView {
    pub fn has_id(&self) -> bool {
        !self.course_id.is_empty()
    }

    pub fn created_date(&self) -> Option<String> {
        format_timestamp(self.created_time)
    }

    pub fn updated_date(&self) -> Option<String> {
        format_timestamp(self.last_updated_time)
    }
}

/// First alias whose value `read` accepts. Blank or zero primaries fall
/// through to the legacy key.
fn coalesce<T>(
    record: &Map<String, Value>,
    keys: &[&str],
    read: impl Fn(Option<&Value>) -> Option<T>,
) -> Option<T> {
    keys.iter().find_map(|key| read(record.get(*key)))
}

fn first_text<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| text(Some(value)).is_some())
}

pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64)),
        Value::String(raw) => raw.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn decimal(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn timestamp(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(|n| n as i64)),
        Value::String(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>()
                .ok()
                .or_else(|| raw.parse::<f64>().ok().filter(|n| n.is_finite()).map(|n| n as i64))
        }
        _ => None,
    }
}

/// Millisecond epoch timestamp to `YYYY-MM-DD`. Zero means "unknown".
pub fn format_timestamp(millis: i64) -> Option<String> {
    if millis <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis).map(|at| at.format("%Y-%m-%d").to_string())
}

/// Maps one raw course record onto `CourseView`. Non-object records yield `None`.
pub fn normalize_course(raw: &Value) -> Option<CourseView> {
    let record = raw.as_object()?;

    let categories = record
        .get("courseCategories")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| text(item.get("categoryName")))
                .collect()
        })
        .unwrap_or_default();

    Some(CourseView {
        course_id: coalesce(record, &["courseId", "id"], text).unwrap_or_default(),
        course_name: coalesce(record, &["courseName", "name"], text)
            .unwrap_or_else(|| UNTITLED_COURSE.to_string()),
        sub_title: coalesce(record, &["subTitle", "subtitle"], text),
        description: text(record.get("description")),
        publish_status: PublishStatus::from_raw(first_text(record, &["publishStatus", "status"])),
        enrolled_count: coalesce(record, &["enrolledCount", "enrolled"], |value| {
            count(value).filter(|n| *n > 0)
        })
        .unwrap_or(0),
        rating: decimal(record.get("rating")).unwrap_or(0.0),
        created_time: timestamp(record.get("createdTime")).unwrap_or(0),
        last_updated_time: timestamp(record.get("lastUpdatedTime")).unwrap_or(0),
        categories,
        org_id: text(record.get("orgId")),
    })
}

/// Normalizes an array of raw records, skipping entries that are not objects.
pub fn normalize_courses(raw: &Value) -> Vec<CourseView> {
    raw.as_array()
        .map(|items| items.iter().filter_map(normalize_course).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseStats {
    pub total: u64,
    pub published: u64,
    pub draft: u64,
}

impl CourseStats {
    pub fn from_courses(courses: &[CourseView]) -> Self {
        let published = courses
            .iter()
            .filter(|course| course.publish_status.is_published())
            .count() as u64;
        let total = courses.len() as u64;
        Self {
            total,
            published,
            draft: total - published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoursesPayload {
    pub courses: Vec<CourseView>,
    pub stats: CourseStats,
    pub org_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload {
    Loading,
    Ready(CoursesPayload),
}

impl CoursesPayload {
    /// Reads the course list the host put in `toolResponseMetadata`, falling back
    /// to `toolOutput`. Both absent means the host has not delivered anything yet.
    pub fn from_globals(output: &Snapshot, metadata: &Snapshot) -> ListPayload {
        if output.is_absent() && metadata.is_absent() {
            return ListPayload::Loading;
        }
        let output = output.as_value();
        let metadata = metadata.as_value();

        let courses = metadata
            .and_then(|meta| meta.get("courses"))
            .filter(|courses| courses.is_array())
            .or_else(|| output.and_then(|out| out.get("courses")))
            .map(normalize_courses)
            .unwrap_or_default();

        let stats = metadata
            .and_then(|meta| meta.get("stats"))
            .and_then(|stats| serde_json::from_value::<CourseStats>(stats.clone()).ok())
            .or_else(|| output.and_then(stats_from_counts))
            .unwrap_or_else(|| CourseStats::from_courses(&courses));

        let org_id = text(metadata.and_then(|meta| meta.get("orgId")))
            .or_else(|| text(output.and_then(|out| out.get("orgId"))))
            .or_else(|| courses.iter().find_map(|course| course.org_id.clone()));

        ListPayload::Ready(CoursesPayload {
            courses,
            stats,
            org_id,
        })
    }
}

fn stats_from_counts(output: &Value) -> Option<CourseStats> {
    let total = count(output.get("totalCourseCount"))?;
    Some(CourseStats {
        total,
        published: count(output.get("publishedCount")).unwrap_or(0),
        draft: count(output.get("draftCount")).unwrap_or(0),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailPayload {
    Loading,
    Missing,
    Ready(CourseView),
}

/// Finds the full course record behind a `tc_get_course` result: the metadata
/// channel first, then `_meta` or `course` inside the tool output.
pub fn course_from_globals(output: &Snapshot, metadata: &Snapshot) -> DetailPayload {
    if output.is_absent() && metadata.is_absent() {
        return DetailPayload::Loading;
    }
    course_from_parts(output.as_value(), metadata.as_value())
        .map(DetailPayload::Ready)
        .unwrap_or(DetailPayload::Missing)
}

/// Same lookup applied to a raw tool result (`{ _meta: { course }, course }`).
pub fn course_from_tool_result(result: &Value) -> Option<CourseView> {
    course_from_parts(Some(result), result.get("_meta"))
}

fn course_from_parts(output: Option<&Value>, metadata: Option<&Value>) -> Option<CourseView> {
    metadata
        .and_then(|meta| meta.get("course"))
        .or_else(|| output.and_then(|out| out.pointer("/_meta/course")))
        .or_else(|| output.and_then(|out| out.get("course")))
        .and_then(normalize_course)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_shape_normalizes_with_defaults() {
        let course = normalize_course(&json!({ "id": "9", "name": "Legacy", "status": "NONE" }))
            .expect("object should normalize");

        assert_eq!(course.course_id, "9");
        assert_eq!(course.course_name, "Legacy");
        assert_eq!(course.publish_status, PublishStatus::Draft);
        assert_eq!(course.enrolled_count, 0);
        assert_eq!(course.rating, 0.0);
        assert_eq!(course.created_time, 0);
        assert!(course.sub_title.is_none());
    }

    #[test]
    fn blank_primary_fields_fall_through_to_legacy_aliases() {
        let course = normalize_course(&json!({
            "courseId": "",
            "id": "9",
            "courseName": "  ",
            "name": "Legacy",
            "publishStatus": "",
            "status": "PUBLISHED",
            "enrolledCount": 0,
            "enrolled": 12
        }))
        .expect("object should normalize");

        assert_eq!(course.course_id, "9");
        assert_eq!(course.course_name, "Legacy");
        assert_eq!(course.publish_status, PublishStatus::Published);
        assert_eq!(course.enrolled_count, 12);
    }

    #[test]
    fn current_shape_wins_over_legacy_fields() {
        let course = normalize_course(&json!({
            "courseId": 3000094000002000004u64,
            "id": "ignored",
            "courseName": "Leadership 101",
            "subTitle": "  ",
            "publishStatus": "published",
            "enrolledCount": "42",
            "rating": 4.5,
            "createdTime": "1700000000000",
            "courseCategories": [{ "categoryName": "Business" }, { "other": 1 }],
            "orgId": "7001"
        }))
        .expect("object should normalize");

        assert_eq!(course.course_id, "3000094000002000004");
        assert_eq!(course.course_name, "Leadership 101");
        assert!(course.sub_title.is_none());
        assert_eq!(course.publish_status, PublishStatus::Published);
        assert_eq!(course.enrolled_count, 42);
        assert_eq!(course.rating, 4.5);
        assert_eq!(course.created_time, 1_700_000_000_000);
        assert_eq!(course.categories, vec!["Business".to_string()]);
        assert_eq!(course.org_id.as_deref(), Some("7001"));
        assert_eq!(course.created_date().as_deref(), Some("2023-11-14"));
    }

    #[test]
    fn every_field_defaults_on_empty_record() {
        let course = normalize_course(&json!({})).expect("object should normalize");
        assert_eq!(course.course_id, "");
        assert_eq!(course.course_name, UNTITLED_COURSE);
        assert_eq!(course.publish_status, PublishStatus::Draft);
        assert_eq!(course.enrolled_count, 0);
        assert!(course.created_date().is_none());
    }

    #[test]
    fn publish_status_is_binary() {
        for raw in [json!("DRAFT"), json!("NONE"), json!("0"), json!(1), Value::Null] {
            assert_eq!(PublishStatus::from_raw(Some(&raw)), PublishStatus::Draft);
        }
        assert_eq!(
            PublishStatus::from_raw(Some(&json!("PUBLISHED"))),
            PublishStatus::Published
        );
        assert_eq!(PublishStatus::from_raw(None), PublishStatus::Draft);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let courses = normalize_courses(&json!([
            { "courseId": "1", "courseName": "A" },
            "garbage",
            null,
            { "id": 2, "name": "B" }
        ]));
        let ids: Vec<_> = courses.iter().map(|c| c.course_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(normalize_courses(&json!({ "not": "a list" })).is_empty());
    }

    #[test]
    fn absent_globals_mean_loading() {
        assert_eq!(
            CoursesPayload::from_globals(&Snapshot::Absent, &Snapshot::Absent),
            ListPayload::Loading
        );
        assert_eq!(
            course_from_globals(&Snapshot::Absent, &Snapshot::Absent),
            DetailPayload::Loading
        );
    }

    #[test]
    fn present_payload_without_courses_is_empty_not_loading() {
        let payload = CoursesPayload::from_globals(
            &Snapshot::Present(json!({ "summary": "You have 0 courses." })),
            &Snapshot::Absent,
        );
        match payload {
            ListPayload::Ready(payload) => {
                assert!(payload.courses.is_empty());
                assert_eq!(payload.stats, CourseStats::default());
            }
            ListPayload::Loading => panic!("present output must not read as loading"),
        }
    }

    #[test]
    fn metadata_stats_take_priority_then_counts_then_computed() {
        let metadata = Snapshot::Present(json!({
            "courses": [{ "courseId": "1", "publishStatus": "PUBLISHED" }],
            "stats": { "total": 10, "published": 6, "draft": 4 },
            "orgId": "org-1"
        }));
        let ListPayload::Ready(from_meta) =
            CoursesPayload::from_globals(&Snapshot::Absent, &metadata)
        else {
            panic!("metadata payload should be ready");
        };
        assert_eq!(from_meta.stats.total, 10);
        assert_eq!(from_meta.org_id.as_deref(), Some("org-1"));

        let output = Snapshot::Present(json!({
            "courses": [{ "courseId": "1" }, { "courseId": "2" }],
            "totalCourseCount": 2,
            "publishedCount": 0,
            "draftCount": 2
        }));
        let ListPayload::Ready(from_output) = CoursesPayload::from_globals(&output, &Snapshot::Absent)
        else {
            panic!("output payload should be ready");
        };
        assert_eq!(from_output.courses.len(), 2);
        assert_eq!(
            from_output.stats,
            CourseStats {
                total: 2,
                published: 0,
                draft: 2
            }
        );

        let bare = Snapshot::Present(json!({
            "courses": [
                { "courseId": "1", "publishStatus": "PUBLISHED", "orgId": "org-9" },
                { "courseId": "2" }
            ]
        }));
        let ListPayload::Ready(computed) = CoursesPayload::from_globals(&bare, &Snapshot::Absent)
        else {
            panic!("output payload should be ready");
        };
        assert_eq!(
            computed.stats,
            CourseStats {
                total: 2,
                published: 1,
                draft: 1
            }
        );
        assert_eq!(computed.org_id.as_deref(), Some("org-9"));
    }

    #[test]
    fn detail_lookup_follows_metadata_then_output() {
        let metadata = Snapshot::Present(json!({ "course": { "courseId": "m", "courseName": "Meta" } }));
        let output = Snapshot::Present(json!({ "course": { "courseId": "o" } }));
        match course_from_globals(&output, &metadata) {
            DetailPayload::Ready(course) => assert_eq!(course.course_id, "m"),
            other => panic!("unexpected {other:?}"),
        }

        let nested = json!({ "_meta": { "course": { "id": "n", "name": "Nested" } } });
        assert_eq!(
            course_from_tool_result(&nested).map(|course| course.course_id),
            Some("n".to_string())
        );

        assert_eq!(
            course_from_globals(&Snapshot::Present(json!({ "summary": "x" })), &Snapshot::Absent),
            DetailPayload::Missing
        );
    }
}
