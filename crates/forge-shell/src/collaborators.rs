//! Pluggable collaborators the shell hands work to: dialogs, file choosers,
//! permission and console policies, and critical error presentation.
//!
//! Each trait comes with the default the shell context uses when the host does
//! not install its own.

use crate::types::{
    ConsoleLevel, ContentViewId, FileChooserParams, MediaResponseCallback, MediaStreamRequest,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Completion for a file chooser; an empty list means the user cancelled
pub type FileChooserCompletion = Box<dyn FnOnce(Vec<PathBuf>)>;

/// Completion for a directory listing request
pub type DirectoryListingCompletion = Box<dyn FnOnce(Vec<PathBuf>)>;

/// Completion for a JavaScript dialog: (accepted, user input)
pub type DialogCallback = Box<dyn FnOnce(bool, Option<String>)>;

// ============================================================================
// Dialogs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavaScriptDialogKind {
    Alert,
    Confirm,
    Prompt,
}

/// Presents `alert`/`confirm`/`prompt` and beforeunload dialogs for one shell
pub trait JavaScriptDialogCreator {
    fn run_javascript_dialog(
        &self,
        view: ContentViewId,
        origin: &str,
        kind: JavaScriptDialogKind,
        message: &str,
        default_prompt: &str,
        callback: DialogCallback,
    );

    fn run_before_unload_dialog(
        &self,
        view: ContentViewId,
        message: &str,
        is_reload: bool,
        callback: DialogCallback,
    );

    /// Drop every dialog still queued for `view`
    fn cancel_pending_dialogs(&self, view: ContentViewId);
}

/// Builds the per-shell dialog creator on first use
pub trait DialogCreatorFactory {
    fn create_dialog_creator(&self) -> Rc<dyn JavaScriptDialogCreator>;
}

/// Answers every dialog immediately without showing anything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentDialogs;

impl JavaScriptDialogCreator for SilentDialogs {
    fn run_javascript_dialog(
        &self,
        view: ContentViewId,
        _origin: &str,
        kind: JavaScriptDialogKind,
        message: &str,
        _default_prompt: &str,
        callback: DialogCallback,
    ) {
        tracing::debug!("Suppressed {:?} dialog from {}: {}", kind, view, message);
        callback(kind == JavaScriptDialogKind::Alert, None);
    }

    fn run_before_unload_dialog(
        &self,
        view: ContentViewId,
        _message: &str,
        _is_reload: bool,
        callback: DialogCallback,
    ) {
        tracing::debug!("Auto-accepting beforeunload for {}", view);
        callback(true, None);
    }

    fn cancel_pending_dialogs(&self, _view: ContentViewId) {}
}

impl DialogCreatorFactory for SilentDialogs {
    fn create_dialog_creator(&self) -> Rc<dyn JavaScriptDialogCreator> {
        Rc::new(SilentDialogs)
    }
}

// ============================================================================
// Files
// ============================================================================

/// Runs file pickers and directory listings on behalf of a content view
pub trait FileChooser {
    fn run_file_chooser(
        &self,
        view: ContentViewId,
        params: &FileChooserParams,
        completion: FileChooserCompletion,
    );

    fn enumerate_directory(
        &self,
        view: ContentViewId,
        request_id: i32,
        path: &Path,
        completion: DirectoryListingCompletion,
    );
}

/// Cancels every file chooser and lists every directory as empty
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFileChooser;

impl FileChooser for NoFileChooser {
    fn run_file_chooser(
        &self,
        view: ContentViewId,
        _params: &FileChooserParams,
        completion: FileChooserCompletion,
    ) {
        tracing::debug!("No file chooser installed, cancelling request from {}", view);
        completion(Vec::new());
    }

    fn enumerate_directory(
        &self,
        _view: ContentViewId,
        _request_id: i32,
        _path: &Path,
        completion: DirectoryListingCompletion,
    ) {
        completion(Vec::new());
    }
}

// ============================================================================
// Policies
// ============================================================================

/// Decides pointer lock requests; both flags arrive exactly as the engine sent them
pub trait MouseLockPolicy {
    fn decide(&self, view: ContentViewId, user_gesture: bool, last_unlocked_by_target: bool)
        -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AllowMouseLock;

impl MouseLockPolicy for AllowMouseLock {
    fn decide(&self, _view: ContentViewId, _user_gesture: bool, _last_unlocked: bool) -> bool {
        true
    }
}

/// Returns `true` when the console message was fully handled and default logging
/// should be suppressed
pub trait ConsoleMessageHandler {
    fn handle(
        &self,
        view: ContentViewId,
        level: ConsoleLevel,
        message: &str,
        line_no: i32,
        source_id: &str,
    ) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnhandledConsole;

impl ConsoleMessageHandler for UnhandledConsole {
    fn handle(&self, _: ContentViewId, _: ConsoleLevel, _: &str, _: i32, _: &str) -> bool {
        false
    }
}

/// Grants or denies capture devices; may answer asynchronously
pub trait MediaAccessPolicy {
    fn request(
        &self,
        view: ContentViewId,
        request: &MediaStreamRequest,
        respond: MediaResponseCallback,
    );
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DenyMediaAccess;

impl MediaAccessPolicy for DenyMediaAccess {
    fn request(
        &self,
        view: ContentViewId,
        request: &MediaStreamRequest,
        respond: MediaResponseCallback,
    ) {
        tracing::info!(
            "Denying media access for {} (origin {})",
            view,
            request.security_origin
        );
        respond(Vec::new());
    }
}

// ============================================================================
// Critical errors
// ============================================================================

/// Presents fatal-class errors to the user without terminating anything
pub trait CriticalErrorReporter {
    fn report(&self, title: &str, content: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogCriticalErrors;

impl CriticalErrorReporter for LogCriticalErrors {
    fn report(&self, title: &str, content: &str) {
        tracing::error!("{}: {}", title, content);
    }
}
