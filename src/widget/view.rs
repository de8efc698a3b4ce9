use crate::widget::course::CourseView;
use crate::widget::state::{FilterBy, SortBy, WidgetState};
use std::cmp::Ordering;
use std::sync::Arc;

/// Filter, then search, then sort. Always returns a fresh sequence.
pub fn derive_view(courses: &[CourseView], state: &WidgetState) -> Vec<CourseView> {
    let query = state.search_query.to_lowercase();

    let mut rows: Vec<CourseView> = courses
        .iter()
        .filter(|course| passes_filter(course, state.filter_by))
        .filter(|course| matches_query(course, &query))
        .cloned()
        .collect();

    rows.sort_by(|a, b| compare(a, b, state.sort_by));
    rows
}

fn passes_filter(course: &CourseView, filter: FilterBy) -> bool {
    match filter {
        FilterBy::All => true,
        FilterBy::Draft => !course.publish_status.is_published(),
        FilterBy::Published => course.publish_status.is_published(),
    }
}

fn matches_query(course: &CourseView, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    course.course_name.to_lowercase().contains(query)
        || course
            .sub_title
            .as_deref()
            .is_some_and(|sub_title| sub_title.to_lowercase().contains(query))
}

fn compare(a: &CourseView, b: &CourseView, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Name => a
            .course_name
            .to_lowercase()
            .cmp(&b.course_name.to_lowercase())
            .then_with(|| a.course_name.cmp(&b.course_name)),
        SortBy::Enrolled => b.enrolled_count.cmp(&a.enrolled_count),
        SortBy::Created => b.created_time.cmp(&a.created_time),
    }
}

/// Memoized `derive_view`: recomputes only when the source revision or the
/// widget state changed since the last call.
#[derive(Debug, Default)]
pub struct ViewMemo {
    key: Option<(u64, WidgetState)>,
    rows: Arc<Vec<CourseView>>,
}

impl ViewMemo {
    pub fn rows(
        &mut self,
        revision: u64,
        state: &WidgetState,
        source: impl FnOnce() -> Vec<CourseView>,
    ) -> Arc<Vec<CourseView>> {
        let fresh = matches!(&self.key, Some((rev, cached)) if *rev == revision && cached == state);
        if !fresh {
            self.rows = Arc::new(derive_view(&source(), state));
            self.key = Some((revision, state.clone()));
        }
        Arc::clone(&self.rows)
    }
}
