//! Translation of content-engine callbacks into shell actions.

use crate::collaborators::JavaScriptDialogCreator;
use crate::delegate::{ContentsDelegate, ContentsObserver, Notification, NotificationObserver};
use crate::message::{IpcMessage, ShellMessage};
use crate::platform::{ContentView, CreateViewParams};
use crate::shell::{Shell, ShellOrigin};
use crate::types::{
    Bounds, ConsoleLevel, ContentViewId, FileChooserParams, KeyboardEvent, MediaResponseCallback,
    MediaStreamDevice, MediaStreamRequest, OpenUrlParams, WindowOpenDisposition, MSG_ROUTING_NONE,
};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

impl ContentsDelegate for Shell {
    fn open_url_from_tab(
        &self,
        source: ContentViewId,
        params: &OpenUrlParams,
    ) -> Option<ContentViewId> {
        let disposition = params.disposition;
        if disposition == WindowOpenDisposition::CurrentTab {
            let target = self.context().registry().from_content_view(source);
            match target {
                Some(shell) => shell.load_url(&params.url),
                None => self.load_url(&params.url),
            }
            return Some(source);
        }

        if !disposition.opens_new_shell() {
            tracing::debug!("Ignoring {:?} navigation to {}", disposition, params.url);
            return None;
        }

        let origin = if disposition == WindowOpenDisposition::NewPopup {
            ShellOrigin::Popup
        } else {
            ShellOrigin::Primary
        };
        let create = CreateViewParams {
            browsing_context: self.content_view().browsing_context(),
            site_affinity: None,
            routing_id: MSG_ROUTING_NONE,
            base_view: Some(source),
        };
        match Shell::create_with_origin(self.context(), &create, &params.url, origin) {
            Ok(shell) => Some(shell.content_view().id()),
            Err(e) => {
                tracing::warn!("Cannot open {} ({:?}): {}", params.url, disposition, e);
                None
            }
        }
    }

    fn loading_state_changed(&self, _source: ContentViewId) {
        self.window()
            .set_navigation_state(self.content_view().navigation_state());
    }

    fn activate_contents(&self, _contents: ContentViewId) {
        self.window().focus(true);
        if let Some(shell) = self.rc() {
            self.context().registry().set_focused(&shell);
        }
    }

    fn deactivate_contents(&self, _contents: ContentViewId) {
        self.window().focus(false);
    }

    fn close_contents(&self, source: ContentViewId) {
        if source != self.content_view().id() {
            tracing::debug!("Ignoring close of foreign view {}", source);
            return;
        }
        self.destroy();
    }

    fn move_contents(&self, _source: ContentViewId, bounds: Bounds) {
        self.window().set_bounds(bounds);
    }

    fn is_popup_or_panel(&self, _source: ContentViewId) -> bool {
        self.origin() == ShellOrigin::Popup
    }

    fn web_contents_created(
        &self,
        source: ContentViewId,
        source_frame_id: i64,
        target_url: &str,
        new_contents: Box<dyn ContentView>,
    ) {
        let new_view = new_contents.id();
        tracing::debug!(
            "{} (frame {}) opened {} for {}",
            source,
            source_frame_id,
            new_view,
            target_url
        );
        let context = self.context();
        if let Err(e) = Shell::construct(
            context,
            new_contents,
            context.package().window_manifest(),
            ShellOrigin::Popup,
            Weak::new(),
        ) {
            tracing::warn!("Cannot wrap {} in a shell: {}", new_view, e);
        }
    }

    fn run_file_chooser(&self, source: ContentViewId, params: &FileChooserParams) {
        let completion = self.bind_live("file chooser", |shell, files: Vec<PathBuf>| {
            shell.content_view().file_chooser_completed(files)
        });
        self.context()
            .file_chooser()
            .run_file_chooser(source, params, completion);
    }

    fn enumerate_directory(&self, source: ContentViewId, request_id: i32, path: &Path) {
        let completion = self.bind_live("directory listing", move |shell, entries: Vec<PathBuf>| {
            shell
                .content_view()
                .directory_listing_completed(request_id, entries)
        });
        self.context()
            .file_chooser()
            .enumerate_directory(source, request_id, path, completion);
    }

    fn did_navigate_main_frame_post_commit(&self, _source: ContentViewId) {
        let url = self.content_view().url();
        tracing::debug!("{} committed {}", self.content_view().id(), url);
        self.window().set_address(&url);
    }

    fn javascript_dialog_creator(&self) -> Rc<dyn JavaScriptDialogCreator> {
        self.dialog_creator()
    }

    fn request_to_lock_mouse(
        &self,
        source: ContentViewId,
        user_gesture: bool,
        last_unlocked_by_target: bool,
    ) {
        let allowed =
            self.context()
                .mouse_lock()
                .decide(source, user_gesture, last_unlocked_by_target);
        self.content_view()
            .got_response_to_lock_mouse_request(allowed);
    }

    fn handle_keyboard_event(&self, _source: ContentViewId, event: &KeyboardEvent) {
        self.window().handle_keyboard_event(event);
    }

    fn add_message_to_console(
        &self,
        source: ContentViewId,
        level: i32,
        message: &str,
        line_no: i32,
        source_id: &str,
    ) -> bool {
        let level = ConsoleLevel::from_raw(level);
        let handled = self
            .context()
            .console()
            .handle(source, level, message, line_no, source_id);
        if handled {
            return true;
        }
        match level {
            ConsoleLevel::Verbose => {
                tracing::debug!(target: "forge_shell::console", "{}:{} {}", source_id, line_no, message)
            }
            ConsoleLevel::Info => {
                tracing::info!(target: "forge_shell::console", "{}:{} {}", source_id, line_no, message)
            }
            ConsoleLevel::Warning => {
                tracing::warn!(target: "forge_shell::console", "{}:{} {}", source_id, line_no, message)
            }
            ConsoleLevel::Error => {
                tracing::error!(target: "forge_shell::console", "{}:{} {}", source_id, line_no, message)
            }
        }
        false
    }

    fn request_media_access_permission(
        &self,
        source: ContentViewId,
        request: &MediaStreamRequest,
        respond: MediaResponseCallback,
    ) {
        let respond = self.bind_live("media access", move |_shell, devices: Vec<MediaStreamDevice>| {
            respond(devices)
        });
        self.context().media().request(source, request, respond);
    }
}

impl ContentsObserver for Shell {
    fn on_message_received(&self, message: &IpcMessage) -> bool {
        match ShellMessage::decode(message) {
            Ok(Some(decoded)) => {
                self.handle_message(decoded);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("{}", e);
                true
            }
        }
    }
}

impl NotificationObserver for Shell {
    fn observe(&self, notification: &Notification) {
        match notification {
            Notification::TitleUpdated { view, title } => {
                if *view == self.content_view().id() {
                    self.window().set_title(title);
                }
            }
        }
    }
}
