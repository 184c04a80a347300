//! JSON-lines map events, for replays and the interactive loop.
//!
//! ```text
//! {"at": 100, "event": "marker_enter", "group": 0}
//! {"at": 250, "event": "preview_click", "group": 0, "post": "9f1c..."}
//! {"at": 900, "event": "close_panel"}
//! ```
//!
//! Groups are addressed by index. Without an explicit `generation` the index
//! refers to the marker set on screen when the event is handled.

use posts::PostId;
use runtime::event_bus::Event;
use scene::GroupId;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::session::Input;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    MarkerEnter { group: u32, generation: Option<u32> },
    MarkerLeave { group: u32, generation: Option<u32> },
    PopupEnter { group: u32, generation: Option<u32> },
    PopupLeave { group: u32, generation: Option<u32> },
    PopupRemoved { group: u32, generation: Option<u32> },
    MarkerClick { group: u32, generation: Option<u32> },
    PreviewClick {
        group: u32,
        post: String,
        generation: Option<u32>,
    },
    ClosePanel,
    Refresh,
}

impl UiEvent {
    pub fn into_input(self, current: u32) -> Input {
        let id = |group: u32, generation: Option<u32>| {
            GroupId::new(group, generation.unwrap_or(current))
        };
        match self {
            UiEvent::MarkerEnter { group, generation } => Input::MarkerEnter(id(group, generation)),
            UiEvent::MarkerLeave { group, generation } => Input::MarkerLeave(id(group, generation)),
            UiEvent::PopupEnter { group, generation } => Input::PopupEnter(id(group, generation)),
            UiEvent::PopupLeave { group, generation } => Input::PopupLeave(id(group, generation)),
            UiEvent::PopupRemoved { group, generation } => {
                Input::PopupRemoved(id(group, generation))
            }
            UiEvent::MarkerClick { group, generation } => Input::MarkerClick(id(group, generation)),
            UiEvent::PreviewClick {
                group,
                post,
                generation,
            } => Input::PreviewClick {
                group: id(group, generation),
                post_id: PostId(post),
            },
            UiEvent::ClosePanel => Input::ClosePanel,
            UiEvent::Refresh => Input::Refresh,
        }
    }
}

/// One timed line of a replay script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptLine {
    /// Milliseconds after session start.
    pub at: u64,
    #[serde(flatten)]
    pub event: UiEvent,
}

/// Parses a replay script. Blank lines and `#` comments are skipped.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, ClientError> {
    let mut lines: Vec<ScriptLine> = Vec::new();
    for (n, raw) in text.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let line: ScriptLine = serde_json::from_str(raw).map_err(|e| ClientError::Script {
            line: n + 1,
            message: e.to_string(),
        })?;
        if lines.last().is_some_and(|prev| prev.at > line.at) {
            return Err(ClientError::Script {
                line: n + 1,
                message: format!("time {} is earlier than the previous line", line.at),
            });
        }
        lines.push(line);
    }
    Ok(lines)
}

pub fn parse_event(line: &str) -> Result<UiEvent, ClientError> {
    serde_json::from_str(line.trim()).map_err(|e| ClientError::Script {
        line: 1,
        message: e.to_string(),
    })
}

pub fn format_event(event: &Event) -> String {
    format!("{:>7}ms  {:<18} {}", event.at.as_millis(), event.kind, event.message)
}
