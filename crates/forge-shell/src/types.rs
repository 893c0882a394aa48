//! Plain data exchanged between the content engine, the platform window and the shell.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Routing id used when a view is created without an opener route
pub const MSG_ROUTING_NONE: i32 = -2;

/// Opaque identifier of a content view (the engine's render-view handle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentViewId(pub u64);

impl fmt::Display for ContentViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// Browsing context (profile) a content view belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BrowsingContext {
    pub id: u32,
    pub off_the_record: bool,
}

/// Site hint used to group new views into a renderer process
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteAffinity(pub String);

/// Window geometry in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside (right and bottom edges exclusive)
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        let left = i64::from(self.x);
        let top = i64::from(self.y);
        x >= left
            && y >= top
            && x < left + i64::from(self.width)
            && y < top + i64::from(self.height)
    }
}

/// Reload flavours accepted by [`crate::Shell::reload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadType {
    /// Normal (cache-validating) reload
    #[default]
    Normal,
    /// Reload bypassing the cache (shift-reload)
    IgnoringCache,
    /// Reload using the original request URL
    OriginalRequestUrl,
}

/// Where a navigation requested by the page should land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOpenDisposition {
    CurrentTab,
    NewForegroundTab,
    NewBackgroundTab,
    NewPopup,
    NewWindow,
    SaveToDisk,
    IgnoreAction,
}

impl WindowOpenDisposition {
    /// Dispositions that need a fresh shell to host the navigation
    pub fn opens_new_shell(self) -> bool {
        matches!(
            self,
            Self::NewForegroundTab | Self::NewBackgroundTab | Self::NewPopup | Self::NewWindow
        )
    }
}

/// Navigation request forwarded by `OpenURLFromTab`
#[derive(Debug, Clone, PartialEq)]
pub struct OpenUrlParams {
    pub url: String,
    pub referrer: Option<String>,
    pub disposition: WindowOpenDisposition,
    pub user_gesture: bool,
}

impl OpenUrlParams {
    pub fn new(url: impl Into<String>, disposition: WindowOpenDisposition) -> Self {
        Self {
            url: url.into(),
            referrer: None,
            disposition,
            user_gesture: false,
        }
    }
}

/// Loading and history state shown by the window's toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Keyboard event the page did not consume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key: String,
    pub modifiers: Modifiers,
    pub is_repeat: bool,
}

/// Console message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConsoleLevel {
    Verbose,
    Info,
    Warning,
    Error,
}

impl ConsoleLevel {
    /// Map the engine's raw severity (0 = verbose .. 3 = error)
    pub fn from_raw(level: i32) -> Self {
        match level {
            i32::MIN..=0 => Self::Verbose,
            1 => Self::Info,
            2 => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// Application-defined area of a frameless window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraggableRegion {
    pub draggable: bool,
    pub bounds: Bounds,
}

/// Hit-test a point against draggable regions.
///
/// Regions are layered in order: the last region containing the point decides,
/// so a non-draggable region can carve a hole into an earlier draggable one.
pub fn is_draggable_at(regions: &[DraggableRegion], x: i32, y: i32) -> bool {
    regions
        .iter()
        .rev()
        .find(|region| region.bounds.contains(x, y))
        .map(|region| region.draggable)
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChooserMode {
    Open,
    OpenMultiple,
    OpenFolder,
    Save,
}

/// `<input type=file>` request
#[derive(Debug, Clone, PartialEq)]
pub struct FileChooserParams {
    pub mode: FileChooserMode,
    pub title: Option<String>,
    pub default_path: Option<PathBuf>,
    /// Accepted MIME types or extensions, as written in the `accept` attribute
    pub accept_types: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStreamType {
    Audio,
    Video,
}

/// getUserMedia request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStreamRequest {
    pub security_origin: String,
    pub audio: bool,
    pub video: bool,
}

/// Capture device granted to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStreamDevice {
    pub kind: MediaStreamType,
    pub id: String,
    pub name: String,
}

/// Engine-supplied completion for a media request; an empty list denies access
pub type MediaResponseCallback = Box<dyn FnOnce(Vec<MediaStreamDevice>)>;
