use crate::error::ConfigError;
use crate::session::store::default_state_dir;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUILTIN_FIXTURE: &str = include_str!("../fixtures/courses.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WidgetKind {
    /// Courses dashboard (list view with details drill-down).
    #[default]
    Courses,
    /// Course details widget, mounted on a `tc_get_course` result.
    Details,
}

impl WidgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Courses => "courses",
            Self::Details => "details",
        }
    }

    /// The tool whose result the widget renders.
    pub fn output_tool(self) -> &'static str {
        match self {
            Self::Courses => "tc_list_courses_with_widget",
            Self::Details => "tc_get_course",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "coursedeck", version, about = "Course widgets on a local sandbox host")]
pub struct Cli {
    /// Host fixture with initial globals and canned tool results.
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = WidgetKind::Courses)]
    pub widget: WidgetKind,

    /// Conversation turn the widget state is saved under.
    #[arg(long, default_value = "local-turn")]
    pub turn_id: String,

    /// Where widget state is persisted. Defaults to ~/.coursedeck/state.
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Simulated host round-trip latency; overrides the fixture.
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Start with no host globals and inject them after one round-trip.
    #[arg(long)]
    pub no_inject: bool,

    /// Run without a host persistence call (widget state is not durable).
    #[arg(long)]
    pub ephemeral: bool,

    /// tracing filter, e.g. `coursedeck=debug`. Falls back to RUST_LOG.
    #[arg(long)]
    pub log_filter: Option<String>,
}

fn default_latency_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostFixture {
    #[serde(default)]
    pub globals: Map<String, Value>,
    #[serde(default)]
    pub tools: Map<String, Value>,
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

impl HostFixture {
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_FIXTURE)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}

/// Everything the sandbox host needs, resolved from the CLI.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub fixture: HostFixture,
    pub widget: WidgetKind,
    pub turn_id: String,
    pub state_dir: Option<PathBuf>,
    pub latency: Duration,
    pub inject_on_start: bool,
}

impl HostConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let fixture = match &cli.fixture {
            Some(path) => HostFixture::load(path)?,
            None => HostFixture::builtin()?,
        };

        let state_dir = if cli.ephemeral {
            None
        } else {
            Some(
                cli.state_dir
                    .clone()
                    .or_else(default_state_dir)
                    .ok_or(ConfigError::NoStateDir)?,
            )
        };

        let latency_ms = cli.latency_ms.unwrap_or(fixture.latency_ms);
        Ok(Self {
            widget: cli.widget,
            turn_id: cli.turn_id.clone(),
            state_dir,
            latency: Duration::from_millis(latency_ms),
            inject_on_start: !cli.no_inject,
            fixture,
        })
    }
}
