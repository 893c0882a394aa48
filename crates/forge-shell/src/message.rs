//! Messages exchanged with the page: inbound IPC decoded by the shell, and
//! outbound events pushed to the page's scripting environment.

use crate::error::{Result, ShellError};
use crate::types::DraggableRegion;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const UPDATE_DRAGGABLE_REGIONS: &str = "update_draggable_regions";
pub const BEGIN_WINDOW_DRAG: &str = "begin_window_drag";
pub const CLOSE_WINDOW: &str = "close_window";

/// Raw message posted by the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcMessage {
    pub channel: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl IpcMessage {
    pub fn new(channel: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }

    /// Parse the JSON body the page posted over the IPC bridge
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| ShellError::invalid_message("<envelope>", e.to_string()))
    }
}

/// Messages the shell itself consumes
#[derive(Debug, Clone, PartialEq)]
pub enum ShellMessage {
    UpdateDraggableRegions(Vec<DraggableRegion>),
    BeginWindowDrag { x: i32, y: i32 },
    CloseWindow { force: bool },
}

#[derive(Deserialize)]
struct DragPoint {
    x: i32,
    y: i32,
}

#[derive(Deserialize, Default)]
struct CloseRequest {
    #[serde(default)]
    force: bool,
}

impl ShellMessage {
    /// `Ok(None)` for channels the shell does not own
    pub fn decode(message: &IpcMessage) -> Result<Option<Self>> {
        let decoded = match message.channel.as_str() {
            UPDATE_DRAGGABLE_REGIONS => Self::UpdateDraggableRegions(payload(message)?),
            BEGIN_WINDOW_DRAG => {
                let point: DragPoint = payload(message)?;
                Self::BeginWindowDrag {
                    x: point.x,
                    y: point.y,
                }
            }
            CLOSE_WINDOW => {
                let request: Option<CloseRequest> = payload(message)?;
                Self::CloseWindow {
                    force: request.unwrap_or_default().force,
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }
}

fn payload<T: DeserializeOwned>(message: &IpcMessage) -> Result<T> {
    serde_json::from_value(message.payload.clone())
        .map_err(|e| ShellError::invalid_message(&message.channel, e.to_string()))
}

/// Event delivered to the page-side object that mirrors this shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEvent {
    /// Id assigned to the shell by the scripting layer
    pub id: i32,
    pub event: String,
    pub args: Vec<String>,
}

impl OutboundEvent {
    pub fn new(id: i32, event: &str, arg: Option<&str>) -> Self {
        Self {
            id,
            event: event.to_string(),
            args: arg.map(|a| vec![a.to_string()]).unwrap_or_default(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ShellError::invalid_message(&self.event, e.to_string()))
    }
}
