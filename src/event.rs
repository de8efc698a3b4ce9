/// Host activity reported to the window, drained once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    GlobalsInjected,
    ToolCompleted { tool: String, outcome: String },
    FollowUpRequested(String),
    HostWarning(String),
}

impl AppEvent {
    pub fn to_log_line(&self) -> String {
        match self {
            Self::GlobalsInjected => "host globals injected".to_string(),
            Self::ToolCompleted { tool, outcome } => format!("tool {tool}: {outcome}"),
            Self::FollowUpRequested(prompt) => format!("follow-up message: {prompt}"),
            Self::HostWarning(message) => format!("host warning: {message}"),
        }
    }
}
