//! Contracts the shell drives: the platform window, the content view, and the
//! factories that build them.
//!
//! Everything here runs on the UI sequence, so implementations use `&self` with
//! interior mutability the way `wry::WebView` and `tao::window::Window` do.

use crate::error::Result;
use crate::package::WindowManifest;
use crate::types::{
    Bounds, BrowsingContext, ContentViewId, DraggableRegion, KeyboardEvent, NavigationState,
    ReloadType, SiteAffinity,
};
use std::path::PathBuf;

/// Platform window owned by exactly one shell
pub trait NativeWindow {
    fn show(&self);
    fn hide(&self);
    /// Focus-in (`true`) or focus-out (`false`) intent
    fn focus(&self, focused: bool);
    /// Requested geometry; the window may clamp it to the screen
    fn set_bounds(&self, bounds: Bounds);
    fn set_title(&self, title: &str);
    /// Toolbar loading indicator and back/forward buttons
    fn set_navigation_state(&self, state: NavigationState);
    /// Toolbar address entry
    fn set_address(&self, url: &str);
    /// Default processing of a key the page left unhandled (menu accelerators)
    fn handle_keyboard_event(&self, event: &KeyboardEvent);
    fn update_draggable_regions(&self, regions: &[DraggableRegion]);
    /// Start a native move of a frameless window
    fn begin_drag(&self);
}

/// Builds the platform window for a freshly constructed shell
pub trait WindowFactory {
    fn create_window(
        &self,
        view: ContentViewId,
        manifest: &WindowManifest,
    ) -> Result<Box<dyn NativeWindow>>;
}

/// Web-content rendering surface owned by exactly one shell
pub trait ContentView {
    fn id(&self) -> ContentViewId;
    fn browsing_context(&self) -> BrowsingContext;
    /// Currently committed URL
    fn url(&self) -> String;
    fn load_url(&self, url: &str);
    fn go_to_offset(&self, offset: i32);
    fn reload(&self, kind: ReloadType);
    fn stop(&self);
    fn navigation_state(&self) -> NavigationState;
    /// Run the page's beforeunload-style confirmation; `true` lets the close proceed
    fn dispatch_before_unload(&self) -> bool;
    /// Deliver a serialized outbound event to the page's scripting environment
    fn send_event(&self, payload: &str);
    /// Ask the engine to close the view; it answers with `CloseContents`
    fn close(&self);
    fn got_response_to_lock_mouse_request(&self, allowed: bool);
    fn file_chooser_completed(&self, files: Vec<PathBuf>);
    fn directory_listing_completed(&self, request_id: i32, entries: Vec<PathBuf>);
}

/// Inputs for creating a content view
#[derive(Debug, Clone, Copy)]
pub struct CreateViewParams<'a> {
    pub browsing_context: BrowsingContext,
    pub site_affinity: Option<&'a SiteAffinity>,
    pub routing_id: i32,
    /// Existing view whose renderer process may be reused when compatible
    pub base_view: Option<ContentViewId>,
}

/// Creates content views; failures are reported as `ShellError::CreateFailed`
pub trait ContentViewFactory {
    fn create_view(&self, params: &CreateViewParams<'_>) -> Result<Box<dyn ContentView>>;
    /// View that hosts developer tools attached to `inspected`
    fn create_devtools_view(&self, inspected: &dyn ContentView) -> Result<Box<dyn ContentView>>;
}
