//! Local stand-in for the apps runtime.
//!
//! Owns the global object, answers tool calls from the fixture on the tokio
//! runtime, and persists widget state per conversation turn.

use crate::config::{HostConfig, WidgetKind};
use crate::error::HostError;
use crate::event::AppEvent;
use crate::host::{
    ChangeListener, GlobalKey, HostActions, HostGlobalStore, HostGlobals, PendingCall,
    SetGlobalsEvent, Snapshot, Subscription,
};
use crate::session::{store, SavedWidgetState, SCHEMA_VERSION};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::runtime::Handle;

#[derive(Debug, Clone)]
struct Persistence {
    dir: PathBuf,
    turn_id: String,
    widget: WidgetKind,
}

#[derive(Clone)]
pub struct SandboxHost {
    globals: HostGlobals,
    tools: Arc<Map<String, Value>>,
    output_tool: &'static str,
    latency: Duration,
    runtime: Handle,
    events: mpsc::Sender<AppEvent>,
    persistence: Option<Persistence>,
}

/// Globals a tool result updates: `toolOutput` from `structuredContent` (or the
/// whole result) and `toolResponseMetadata` from `_meta`.
pub fn tool_result_globals(result: &Value) -> SetGlobalsEvent {
    let output = result
        .get("structuredContent")
        .cloned()
        .unwrap_or_else(|| result.clone());
    let mut event = SetGlobalsEvent::new().with(GlobalKey::ToolOutput, output);
    if let Some(meta) = result.get("_meta") {
        event = event.with(GlobalKey::ToolResponseMetadata, meta.clone());
    }
    event
}

fn timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs().to_string(),
        Err(_) => "0".to_string(),
    }
}

impl SandboxHost {
    pub fn start(config: &HostConfig, runtime: Handle, events: mpsc::Sender<AppEvent>) -> Self {
        let persistence = config.state_dir.as_ref().map(|dir| Persistence {
            dir: dir.clone(),
            turn_id: config.turn_id.clone(),
            widget: config.widget,
        });
        let host = Self {
            globals: HostGlobals::new(),
            tools: Arc::new(config.fixture.tools.clone()),
            output_tool: config.widget.output_tool(),
            latency: config.latency,
            runtime,
            events,
            persistence,
        };

        let initial = host.initial_globals(config);
        if config.inject_on_start {
            host.globals.inject(initial);
        } else {
            host.inject_later(initial);
        }
        host
    }

    fn initial_globals(&self, config: &HostConfig) -> Map<String, Value> {
        let mut globals = config.fixture.globals.clone();

        if config.widget == WidgetKind::Details {
            if let Some(result) = self.tools.get(self.output_tool) {
                globals.remove(GlobalKey::ToolResponseMetadata.as_str());
                globals.extend(tool_result_globals(result).globals);
            }
        }

        if let Some(saved) = self.restore_widget_state() {
            globals.insert(GlobalKey::WidgetState.as_str().to_string(), saved);
        }
        globals
    }

    fn restore_widget_state(&self) -> Option<Value> {
        let persistence = self.persistence.as_ref()?;
        let (saved, warning) = store::load_one(&persistence.dir, &persistence.turn_id);
        if let Some(warning) = warning {
            tracing::warn!(%warning, "saved widget state ignored");
            self.emit(AppEvent::HostWarning(warning));
        }
        saved
            .filter(|saved| saved.widget == persistence.widget.as_str())
            .map(|saved| saved.state)
    }

    fn inject_later(&self, initial: Map<String, Value>) {
        let globals = self.globals.clone();
        let events = self.events.clone();
        let latency = self.latency;
        self.runtime.spawn(async move {
            tokio::time::sleep(latency).await;
            globals.inject(initial);
            let _ = events.send(AppEvent::GlobalsInjected);
        });
    }

    fn emit(&self, event: AppEvent) {
        let _ = self.events.send(event);
    }

    pub fn is_injected(&self) -> bool {
        self.globals.is_injected()
    }

    /// Host-side push, as if the runtime changed a global on its own.
    pub fn push_globals(&self, event: SetGlobalsEvent) {
        self.globals.set_globals(event);
    }
}

impl HostGlobalStore for SandboxHost {
    fn subscribe(&self, key: GlobalKey, on_change: ChangeListener) -> Subscription {
        self.globals.subscribe(key, on_change)
    }

    fn snapshot(&self, key: GlobalKey) -> Snapshot {
        self.globals.snapshot(key)
    }
}

impl HostActions for SandboxHost {
    fn set_widget_state(&self, state: Value) -> Result<(), HostError> {
        let Some(persistence) = self.persistence.as_ref() else {
            return Err(HostError::Unavailable("setWidgetState"));
        };

        self.globals
            .set_globals(SetGlobalsEvent::new().with(GlobalKey::WidgetState, state.clone()));

        let saved = SavedWidgetState {
            schema_version: SCHEMA_VERSION,
            turn_id: persistence.turn_id.clone(),
            widget: persistence.widget.as_str().to_string(),
            state,
            saved_at: timestamp(),
        };
        if let Err(err) = store::save(&persistence.dir, &saved) {
            tracing::warn!(error = %err, "failed to persist widget state");
            self.emit(AppEvent::HostWarning(format!(
                "failed to persist widget state: {err}"
            )));
        }
        Ok(())
    }

    fn call_tool(&self, name: &str, args: Value) -> PendingCall {
        let (resolver, call) = PendingCall::channel();
        let tool = name.to_string();
        let response = self.tools.get(name).cloned();
        let renders_widget = name == self.output_tool;
        let globals = self.globals.clone();
        let events = self.events.clone();
        let latency = self.latency;

        tracing::debug!(%tool, %args, "call_tool");
        self.runtime.spawn(async move {
            tokio::time::sleep(latency).await;
            let result = match response {
                Some(result) => {
                    if renders_widget && result.get("_meta").is_some() {
                        globals.set_globals(tool_result_globals(&result));
                    }
                    let _ = events.send(AppEvent::ToolCompleted {
                        tool: tool.clone(),
                        outcome: "ok".to_string(),
                    });
                    Ok(result)
                }
                None => {
                    let message = "no fixture response".to_string();
                    let _ = events.send(AppEvent::ToolCompleted {
                        tool: tool.clone(),
                        outcome: message.clone(),
                    });
                    Err(HostError::ToolFailed { tool, message })
                }
            };
            resolver.resolve(result);
        });
        call
    }

    fn send_follow_up_message(&self, prompt: &str) -> PendingCall {
        let (resolver, call) = PendingCall::channel();
        let prompt = prompt.to_string();
        let events = self.events.clone();
        let latency = self.latency;

        self.runtime.spawn(async move {
            tokio::time::sleep(latency).await;
            let _ = events.send(AppEvent::FollowUpRequested(prompt));
            resolver.resolve(Ok(Value::Null));
        });
        call
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostFixture;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(state_dir: Option<PathBuf>, widget: WidgetKind) -> HostConfig {
        HostConfig {
            fixture: HostFixture::builtin().expect("builtin fixture should parse"),
            widget,
            turn_id: "turn-1".to_string(),
            state_dir,
            latency: Duration::ZERO,
            inject_on_start: true,
        }
    }

    #[tokio::test]
    async fn tool_result_with_meta_pushes_globals() {
        let (tx, rx) = mpsc::channel();
        let host = SandboxHost::start(&config(None, WidgetKind::Courses), Handle::current(), tx);
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        let _subscription = host.subscribe(
            GlobalKey::ToolResponseMetadata,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let result = host
            .call_tool("tc_list_courses_with_widget", json!({ "orgId": "7001" }))
            .wait()
            .await
            .expect("fixture tool should resolve");

        assert_eq!(result["totalCourseCount"], json!(6));
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(
            host.snapshot(GlobalKey::ToolOutput),
            Snapshot::Present(json!({ "summary": "You have 6 courses." }))
        );
        assert_eq!(
            rx.try_recv().expect("completion should be reported"),
            AppEvent::ToolCompleted {
                tool: "tc_list_courses_with_widget".to_string(),
                outcome: "ok".to_string()
            }
        );
    }

    #[tokio::test]
    async fn side_tool_results_leave_the_widget_globals_alone() {
        let (tx, _rx) = mpsc::channel();
        let host = SandboxHost::start(&config(None, WidgetKind::Courses), Handle::current(), tx);
        let before = host.snapshot(GlobalKey::ToolResponseMetadata);

        let result = host
            .call_tool("tc_get_course", json!({ "courseId": "3000094000002000004" }))
            .wait()
            .await
            .expect("fixture tool should resolve");

        assert!(result.pointer("/_meta/course").is_some());
        assert_eq!(host.snapshot(GlobalKey::ToolResponseMetadata), before);
    }

    #[tokio::test]
    async fn unknown_tool_fails_without_touching_globals() {
        let (tx, _rx) = mpsc::channel();
        let host = SandboxHost::start(&config(None, WidgetKind::Courses), Handle::current(), tx);
        let before = host.snapshot(GlobalKey::ToolResponseMetadata);

        let err = host
            .call_tool("tc_unknown", json!({}))
            .wait()
            .await
            .expect_err("unknown tool should fail");

        assert!(matches!(err, HostError::ToolFailed { ref tool, .. } if tool == "tc_unknown"));
        assert_eq!(host.snapshot(GlobalKey::ToolResponseMetadata), before);
    }

    #[tokio::test]
    async fn widget_state_survives_a_reload_of_the_same_turn() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let (tx, _rx) = mpsc::channel();
        let first = SandboxHost::start(
            &config(Some(dir.path().to_path_buf()), WidgetKind::Courses),
            Handle::current(),
            tx.clone(),
        );
        assert!(first.snapshot(GlobalKey::WidgetState).is_absent());
        first
            .set_widget_state(json!({ "viewMode": "list", "sortBy": "name" }))
            .expect("persistence should be available");

        let reloaded = SandboxHost::start(
            &config(Some(dir.path().to_path_buf()), WidgetKind::Courses),
            Handle::current(),
            tx,
        );
        assert_eq!(
            reloaded.snapshot(GlobalKey::WidgetState),
            Snapshot::Present(json!({ "viewMode": "list", "sortBy": "name" }))
        );
    }

    #[tokio::test]
    async fn ephemeral_host_reports_unavailable_persistence() {
        let (tx, _rx) = mpsc::channel();
        let host = SandboxHost::start(&config(None, WidgetKind::Courses), Handle::current(), tx);
        assert_eq!(
            host.set_widget_state(json!({})),
            Err(HostError::Unavailable("setWidgetState"))
        );
    }

    #[tokio::test]
    async fn details_widget_mounts_on_get_course_result() {
        let (tx, _rx) = mpsc::channel();
        let host = SandboxHost::start(&config(None, WidgetKind::Details), Handle::current(), tx);
        let metadata = host.snapshot(GlobalKey::ToolResponseMetadata);
        assert_eq!(
            metadata
                .as_value()
                .and_then(|meta| meta.pointer("/course/courseId")),
            Some(&json!("3000094000002000004"))
        );
    }

    #[tokio::test]
    async fn deferred_injection_starts_absent() {
        let (tx, rx) = mpsc::channel();
        let mut deferred = config(None, WidgetKind::Courses);
        deferred.inject_on_start = false;
        deferred.latency = Duration::from_millis(20);
        let host = SandboxHost::start(&deferred, Handle::current(), tx);

        assert!(host.snapshot(GlobalKey::ToolOutput).is_absent());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!host.snapshot(GlobalKey::ToolOutput).is_absent());
        assert_eq!(rx.try_recv(), Ok(AppEvent::GlobalsInjected));
    }

    #[tokio::test]
    async fn follow_up_message_reaches_the_transcript() {
        let (tx, rx) = mpsc::channel();
        let host = SandboxHost::start(&config(None, WidgetKind::Courses), Handle::current(), tx);
        host.send_follow_up_message("I want to create a new course")
            .wait()
            .await
            .expect("follow-up should resolve");
        assert_eq!(
            rx.try_recv(),
            Ok(AppEvent::FollowUpRequested(
                "I want to create a new course".to_string()
            ))
        );
    }
}
