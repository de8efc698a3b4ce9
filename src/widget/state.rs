use crate::host::{GlobalKey, HostActions, HostGlobalStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Created,
    Name,
    Enrolled,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::Created, SortBy::Name, SortBy::Enrolled];

    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "Created time",
            Self::Name => "Name",
            Self::Enrolled => "Enrollment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterBy {
    #[default]
    All,
    Draft,
    Published,
}

impl FilterBy {
    pub const ALL: [FilterBy; 3] = [FilterBy::All, FilterBy::Draft, FilterBy::Published];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All courses",
            Self::Draft => "Draft only",
            Self::Published => "Published only",
        }
    }
}

/// The widget's persisted UI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetState {
    pub view_mode: ViewMode,
    pub sort_by: SortBy,
    pub filter_by: FilterBy,
    pub search_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetStatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<ViewMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<FilterBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl WidgetStatePatch {
    pub fn view_mode(view_mode: ViewMode) -> Self {
        Self {
            view_mode: Some(view_mode),
            ..Self::default()
        }
    }

    pub fn sort_by(sort_by: SortBy) -> Self {
        Self {
            sort_by: Some(sort_by),
            ..Self::default()
        }
    }

    pub fn filter_by(filter_by: FilterBy) -> Self {
        Self {
            filter_by: Some(filter_by),
            ..Self::default()
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn clear_filters() -> Self {
        Self {
            filter_by: Some(FilterBy::All),
            search_query: Some(String::new()),
            ..Self::default()
        }
    }
}

impl WidgetState {
    /// Shallow merge: fields the patch leaves out keep their current value.
    pub fn merge(&self, patch: &WidgetStatePatch) -> WidgetState {
        WidgetState {
            view_mode: patch.view_mode.unwrap_or(self.view_mode),
            sort_by: patch.sort_by.unwrap_or(self.sort_by),
            filter_by: patch.filter_by.unwrap_or(self.filter_by),
            search_query: patch
                .search_query
                .clone()
                .unwrap_or_else(|| self.search_query.clone()),
        }
    }
}

/// Owns the local copy of `WidgetState` and forwards every change to the host.
#[derive(Debug, Clone, Default)]
pub struct WidgetStateController {
    current: WidgetState,
    locally_changed: bool,
}

fn saved_state(store: &dyn HostGlobalStore) -> Option<WidgetState> {
    let snapshot = store.server_snapshot(GlobalKey::WidgetState);
    let saved = snapshot.as_value()?;
    match serde_json::from_value::<WidgetState>(saved.clone()) {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable saved widget state");
            None
        }
    }
}

impl WidgetStateController {
    pub fn new(initial: WidgetState) -> Self {
        Self {
            current: initial,
            locally_changed: false,
        }
    }

    /// Starts from the host's saved `widgetState`, or the default when the host
    /// has none or it does not parse.
    pub fn from_host(store: &dyn HostGlobalStore) -> Self {
        Self::new(saved_state(store).unwrap_or_default())
    }

    /// Re-reads the saved state when it reaches the widget after mount. Once the
    /// user changed something locally the host value is ignored. Returns whether
    /// the state was replaced.
    pub fn adopt_host(&mut self, store: &dyn HostGlobalStore) -> bool {
        if self.locally_changed {
            return false;
        }
        match saved_state(store) {
            Some(saved) if saved != self.current => {
                self.current = saved;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> &WidgetState {
        &self.current
    }

    /// Applies `patch` to the latest local state, then hands the whole record to
    /// the host. The local change stands even if the host cannot persist it.
    pub fn update(&mut self, patch: WidgetStatePatch, host: &dyn HostActions) -> &WidgetState {
        self.current = self.current.merge(&patch);
        self.locally_changed = true;

        match serde_json::to_value(&self.current) {
            Ok(value) => {
                if let Err(err) = host.set_widget_state(value) {
                    tracing::debug!(error = %err, "widget state not persisted");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to encode widget state"),
        }
        &self.current
    }
}
