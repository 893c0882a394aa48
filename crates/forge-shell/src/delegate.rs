//! Callback contracts the content engine drives.
//!
//! Three independent capabilities, all implemented by [`Shell`](crate::Shell):
//! - [`ContentsDelegate`]: decisions and UI requests from a content view
//! - [`ContentsObserver`]: inbound messages posted by the page
//! - [`NotificationObserver`]: engine-wide broadcasts such as title changes
//!
//! Callbacks carry the id of the view that raised them, the way the engine
//! addresses its delegates.

use crate::collaborators::JavaScriptDialogCreator;
use crate::message::IpcMessage;
use crate::platform::ContentView;
use crate::types::{
    Bounds, ContentViewId, FileChooserParams, KeyboardEvent, MediaResponseCallback,
    MediaStreamRequest, OpenUrlParams,
};
use std::path::Path;
use std::rc::Rc;

pub trait ContentsDelegate {
    /// Route a navigation; returns the view that ends up handling it
    fn open_url_from_tab(
        &self,
        source: ContentViewId,
        params: &OpenUrlParams,
    ) -> Option<ContentViewId>;

    fn loading_state_changed(&self, source: ContentViewId);

    fn activate_contents(&self, contents: ContentViewId);

    fn deactivate_contents(&self, contents: ContentViewId);

    /// The view has fully closed. May arrive more than once.
    fn close_contents(&self, source: ContentViewId);

    fn move_contents(&self, source: ContentViewId, bounds: Bounds);

    fn is_popup_or_panel(&self, source: ContentViewId) -> bool;

    /// The engine created a view on its own (`window.open`)
    fn web_contents_created(
        &self,
        source: ContentViewId,
        source_frame_id: i64,
        target_url: &str,
        new_contents: Box<dyn ContentView>,
    );

    fn run_file_chooser(&self, source: ContentViewId, params: &FileChooserParams);

    fn enumerate_directory(&self, source: ContentViewId, request_id: i32, path: &Path);

    fn did_navigate_main_frame_post_commit(&self, source: ContentViewId);

    /// Same instance on every call
    fn javascript_dialog_creator(&self) -> Rc<dyn JavaScriptDialogCreator>;

    fn request_to_lock_mouse(
        &self,
        source: ContentViewId,
        user_gesture: bool,
        last_unlocked_by_target: bool,
    );

    fn handle_keyboard_event(&self, source: ContentViewId, event: &KeyboardEvent);

    /// `level` is the engine's raw severity. Returns `true` when handled.
    fn add_message_to_console(
        &self,
        source: ContentViewId,
        level: i32,
        message: &str,
        line_no: i32,
        source_id: &str,
    ) -> bool;

    fn request_media_access_permission(
        &self,
        source: ContentViewId,
        request: &MediaStreamRequest,
        respond: MediaResponseCallback,
    );
}

pub trait ContentsObserver {
    /// Returns whether the message was consumed. Unknown channels are left for
    /// other observers.
    fn on_message_received(&self, message: &IpcMessage) -> bool;
}

/// Engine-wide broadcasts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    TitleUpdated { view: ContentViewId, title: String },
}

pub trait NotificationObserver {
    fn observe(&self, notification: &Notification);
}
