//! Recording fakes for every collaborator, so shells run without a display.

use crate::collaborators::{
    ConsoleMessageHandler, CriticalErrorReporter, DialogCallback, DialogCreatorFactory,
    DirectoryListingCompletion, FileChooser, FileChooserCompletion, JavaScriptDialogCreator,
    JavaScriptDialogKind, MediaAccessPolicy, MouseLockPolicy,
};
use crate::context::ShellContext;
use crate::delegate::ContentsDelegate;
use crate::error::{Result, ShellError};
use crate::package::{Package, WindowManifest};
use crate::platform::{ContentView, ContentViewFactory, CreateViewParams, NativeWindow, WindowFactory};
use crate::shell::Shell;
use crate::types::{
    Bounds, BrowsingContext, ConsoleLevel, ContentViewId, DraggableRegion, FileChooserParams,
    KeyboardEvent, MediaResponseCallback, MediaStreamDevice, MediaStreamRequest, NavigationState,
    ReloadType, SiteAffinity, MSG_ROUTING_NONE,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

// ============================================================================
// Content views
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    LoadUrl(String),
    GoToOffset(i32),
    Reload(ReloadType),
    Stop,
    Event(String),
    Close,
    MouseLock(bool),
    FilesChosen(Vec<PathBuf>),
    DirectoryListed(i32, Vec<PathBuf>),
}

#[derive(Default)]
struct ViewState {
    url: RefCell<String>,
    calls: RefCell<Vec<ViewCall>>,
    navigation: Cell<NavigationState>,
    veto_close: Cell<bool>,
    before_unload_calls: Cell<usize>,
    dropped: Cell<bool>,
}

/// Test-side handle onto a fake view, valid after the view itself is dropped
#[derive(Clone)]
pub struct ViewRecorder(Rc<ViewState>);

impl ViewRecorder {
    pub fn calls(&self) -> Vec<ViewCall> {
        self.0.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<ViewCall> {
        self.0.calls.take()
    }

    pub fn set_loading(&self, loading: bool) {
        let mut state = self.0.navigation.get();
        state.is_loading = loading;
        self.0.navigation.set(state);
    }

    pub fn set_navigation_state(&self, state: NavigationState) {
        self.0.navigation.set(state);
    }

    /// What the page answers to beforeunload
    pub fn set_before_unload(&self, allow: bool) {
        self.0.veto_close.set(!allow);
    }

    pub fn before_unload_calls(&self) -> usize {
        self.0.before_unload_calls.get()
    }

    pub fn close_requested(&self) -> bool {
        self.0.calls.borrow().contains(&ViewCall::Close)
    }

    pub fn dropped(&self) -> bool {
        self.0.dropped.get()
    }
}

struct FakeView {
    id: ContentViewId,
    browsing_context: BrowsingContext,
    state: Rc<ViewState>,
}

impl FakeView {
    fn record(&self, call: ViewCall) {
        self.state.calls.borrow_mut().push(call);
    }
}

impl ContentView for FakeView {
    fn id(&self) -> ContentViewId {
        self.id
    }

    fn browsing_context(&self) -> BrowsingContext {
        self.browsing_context
    }

    fn url(&self) -> String {
        self.state.url.borrow().clone()
    }

    fn load_url(&self, url: &str) {
        *self.state.url.borrow_mut() = url.to_string();
        self.record(ViewCall::LoadUrl(url.to_string()));
    }

    fn go_to_offset(&self, offset: i32) {
        self.record(ViewCall::GoToOffset(offset));
    }

    fn reload(&self, kind: ReloadType) {
        self.record(ViewCall::Reload(kind));
    }

    fn stop(&self) {
        self.record(ViewCall::Stop);
    }

    fn navigation_state(&self) -> NavigationState {
        self.state.navigation.get()
    }

    fn dispatch_before_unload(&self) -> bool {
        self.state
            .before_unload_calls
            .set(self.state.before_unload_calls.get() + 1);
        !self.state.veto_close.get()
    }

    fn send_event(&self, payload: &str) {
        self.record(ViewCall::Event(payload.to_string()));
    }

    fn close(&self) {
        self.record(ViewCall::Close);
    }

    fn got_response_to_lock_mouse_request(&self, allowed: bool) {
        self.record(ViewCall::MouseLock(allowed));
    }

    fn file_chooser_completed(&self, files: Vec<PathBuf>) {
        self.record(ViewCall::FilesChosen(files));
    }

    fn directory_listing_completed(&self, request_id: i32, entries: Vec<PathBuf>) {
        self.record(ViewCall::DirectoryListed(request_id, entries));
    }
}

impl Drop for FakeView {
    fn drop(&mut self) {
        self.state.dropped.set(true);
    }
}

// ============================================================================
// Windows
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum WindowCall {
    Show,
    Hide,
    Focus(bool),
    SetBounds(Bounds),
    SetTitle(String),
    NavigationState(NavigationState),
    Address(String),
    Keyboard(KeyboardEvent),
    DraggableRegions(Vec<DraggableRegion>),
    BeginDrag,
}

#[derive(Default)]
struct WindowState {
    manifest: RefCell<WindowManifest>,
    calls: RefCell<Vec<WindowCall>>,
    dropped: Cell<bool>,
}

#[derive(Clone)]
pub struct WindowRecorder(Rc<WindowState>);

impl WindowRecorder {
    pub fn calls(&self) -> Vec<WindowCall> {
        self.0.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<WindowCall> {
        self.0.calls.take()
    }

    pub fn manifest(&self) -> WindowManifest {
        self.0.manifest.borrow().clone()
    }

    pub fn dropped(&self) -> bool {
        self.0.dropped.get()
    }
}

struct FakeWindow {
    state: Rc<WindowState>,
}

impl FakeWindow {
    fn record(&self, call: WindowCall) {
        self.state.calls.borrow_mut().push(call);
    }
}

impl NativeWindow for FakeWindow {
    fn show(&self) {
        self.record(WindowCall::Show);
    }

    fn hide(&self) {
        self.record(WindowCall::Hide);
    }

    fn focus(&self, focused: bool) {
        self.record(WindowCall::Focus(focused));
    }

    fn set_bounds(&self, bounds: Bounds) {
        self.record(WindowCall::SetBounds(bounds));
    }

    fn set_title(&self, title: &str) {
        self.record(WindowCall::SetTitle(title.to_string()));
    }

    fn set_navigation_state(&self, state: NavigationState) {
        self.record(WindowCall::NavigationState(state));
    }

    fn set_address(&self, url: &str) {
        self.record(WindowCall::Address(url.to_string()));
    }

    fn handle_keyboard_event(&self, event: &KeyboardEvent) {
        self.record(WindowCall::Keyboard(event.clone()));
    }

    fn update_draggable_regions(&self, regions: &[DraggableRegion]) {
        self.record(WindowCall::DraggableRegions(regions.to_vec()));
    }

    fn begin_drag(&self) {
        self.record(WindowCall::BeginDrag);
    }
}

impl Drop for FakeWindow {
    fn drop(&mut self) {
        self.state.dropped.set(true);
    }
}

// ============================================================================
// Dialogs
// ============================================================================

struct FakeDialogs {
    cancelled: Rc<RefCell<Vec<ContentViewId>>>,
}

impl JavaScriptDialogCreator for FakeDialogs {
    fn run_javascript_dialog(
        &self,
        _view: ContentViewId,
        _origin: &str,
        _kind: JavaScriptDialogKind,
        _message: &str,
        _default_prompt: &str,
        _callback: DialogCallback,
    ) {
    }

    fn run_before_unload_dialog(
        &self,
        _view: ContentViewId,
        _message: &str,
        _is_reload: bool,
        callback: DialogCallback,
    ) {
        callback(true, None);
    }

    fn cancel_pending_dialogs(&self, view: ContentViewId) {
        self.cancelled.borrow_mut().push(view);
    }
}

// ============================================================================
// Platform
// ============================================================================

/// Owned copy of the parameters of the last `create_view` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedViewParams {
    pub browsing_context: BrowsingContext,
    pub site_affinity: Option<SiteAffinity>,
    pub routing_id: i32,
    pub base_view: Option<ContentViewId>,
}

#[derive(Default)]
pub struct FakePlatform {
    next_view: Cell<u64>,
    fail_next_view: Cell<bool>,
    last_view_params: RefCell<Option<RecordedViewParams>>,
    views: RefCell<HashMap<ContentViewId, Rc<ViewState>>>,
    windows: RefCell<HashMap<ContentViewId, Rc<WindowState>>>,
    dialog_creators_built: Cell<usize>,
    cancelled_dialogs: Rc<RefCell<Vec<ContentViewId>>>,
    file_chooser_requests: RefCell<Vec<FileChooserParams>>,
    pending_files: RefCell<Vec<FileChooserCompletion>>,
    pending_listings: RefCell<Vec<DirectoryListingCompletion>>,
    pending_media: RefCell<Vec<MediaResponseCallback>>,
    mouse_lock_answer: Cell<bool>,
    mouse_lock_requests: RefCell<Vec<(ContentViewId, bool, bool)>>,
    console_handled: Cell<bool>,
    console_messages: RefCell<Vec<(ConsoleLevel, String)>>,
    critical_errors: RefCell<Vec<(String, String)>>,
}

impl FakePlatform {
    /// Next `create_view` or `create_devtools_view` fails once
    pub fn fail_next_view(&self) {
        self.fail_next_view.set(true);
    }

    pub fn last_view_params(&self) -> Option<RecordedViewParams> {
        self.last_view_params.borrow().clone()
    }

    /// View created by the engine itself, as `window.open` would
    pub fn spawn_view(&self, browsing_context: BrowsingContext) -> Box<dyn ContentView> {
        Box::new(self.new_view(browsing_context))
    }

    fn new_view(&self, browsing_context: BrowsingContext) -> FakeView {
        let id = ContentViewId(self.next_view.get() + 1);
        self.next_view.set(id.0);
        let state = Rc::new(ViewState::default());
        self.views.borrow_mut().insert(id, state.clone());
        FakeView {
            id,
            browsing_context,
            state,
        }
    }

    fn take_failure(&self) -> Result<()> {
        if self.fail_next_view.replace(false) {
            return Err(ShellError::create_failed("renderer unavailable"));
        }
        Ok(())
    }

    pub fn view(&self, id: ContentViewId) -> ViewRecorder {
        ViewRecorder(self.views.borrow()[&id].clone())
    }

    pub fn window(&self, id: ContentViewId) -> WindowRecorder {
        WindowRecorder(self.windows.borrow()[&id].clone())
    }

    pub fn dialog_creators_built(&self) -> usize {
        self.dialog_creators_built.get()
    }

    pub fn cancelled_dialogs(&self) -> Vec<ContentViewId> {
        self.cancelled_dialogs.borrow().clone()
    }

    pub fn file_chooser_requests(&self) -> Vec<FileChooserParams> {
        self.file_chooser_requests.borrow().clone()
    }

    pub fn complete_file_chooser(&self, files: Vec<PathBuf>) {
        let completion = self.pending_files.borrow_mut().remove(0);
        completion(files);
    }

    pub fn complete_directory_listing(&self, entries: Vec<PathBuf>) {
        let completion = self.pending_listings.borrow_mut().remove(0);
        completion(entries);
    }

    pub fn complete_media_request(&self, devices: Vec<MediaStreamDevice>) {
        let respond = self.pending_media.borrow_mut().remove(0);
        respond(devices);
    }

    pub fn set_mouse_lock_answer(&self, allow: bool) {
        self.mouse_lock_answer.set(allow);
    }

    pub fn mouse_lock_requests(&self) -> Vec<(ContentViewId, bool, bool)> {
        self.mouse_lock_requests.borrow().clone()
    }

    pub fn set_console_handled(&self, handled: bool) {
        self.console_handled.set(handled);
    }

    pub fn console_messages(&self) -> Vec<(ConsoleLevel, String)> {
        self.console_messages.borrow().clone()
    }

    pub fn critical_errors(&self) -> Vec<(String, String)> {
        self.critical_errors.borrow().clone()
    }
}

impl ContentViewFactory for FakePlatform {
    fn create_view(&self, params: &CreateViewParams<'_>) -> Result<Box<dyn ContentView>> {
        *self.last_view_params.borrow_mut() = Some(RecordedViewParams {
            browsing_context: params.browsing_context,
            site_affinity: params.site_affinity.cloned(),
            routing_id: params.routing_id,
            base_view: params.base_view,
        });
        self.take_failure()?;
        Ok(Box::new(self.new_view(params.browsing_context)))
    }

    fn create_devtools_view(&self, inspected: &dyn ContentView) -> Result<Box<dyn ContentView>> {
        self.take_failure()?;
        Ok(Box::new(self.new_view(inspected.browsing_context())))
    }
}

impl WindowFactory for FakePlatform {
    fn create_window(
        &self,
        view: ContentViewId,
        manifest: &WindowManifest,
    ) -> Result<Box<dyn NativeWindow>> {
        let state = Rc::new(WindowState {
            manifest: RefCell::new(manifest.clone()),
            ..WindowState::default()
        });
        self.windows.borrow_mut().insert(view, state.clone());
        Ok(Box::new(FakeWindow { state }))
    }
}

impl DialogCreatorFactory for FakePlatform {
    fn create_dialog_creator(&self) -> Rc<dyn JavaScriptDialogCreator> {
        self.dialog_creators_built
            .set(self.dialog_creators_built.get() + 1);
        Rc::new(FakeDialogs {
            cancelled: self.cancelled_dialogs.clone(),
        })
    }
}

impl FileChooser for FakePlatform {
    fn run_file_chooser(
        &self,
        _view: ContentViewId,
        params: &FileChooserParams,
        completion: FileChooserCompletion,
    ) {
        self.file_chooser_requests.borrow_mut().push(params.clone());
        self.pending_files.borrow_mut().push(completion);
    }

    fn enumerate_directory(
        &self,
        _view: ContentViewId,
        _request_id: i32,
        _path: &Path,
        completion: DirectoryListingCompletion,
    ) {
        self.pending_listings.borrow_mut().push(completion);
    }
}

impl MouseLockPolicy for FakePlatform {
    fn decide(&self, view: ContentViewId, user_gesture: bool, last_unlocked_by_target: bool) -> bool {
        self.mouse_lock_requests
            .borrow_mut()
            .push((view, user_gesture, last_unlocked_by_target));
        self.mouse_lock_answer.get()
    }
}

impl ConsoleMessageHandler for FakePlatform {
    fn handle(
        &self,
        _view: ContentViewId,
        level: ConsoleLevel,
        message: &str,
        _line_no: i32,
        _source_id: &str,
    ) -> bool {
        self.console_messages
            .borrow_mut()
            .push((level, message.to_string()));
        self.console_handled.get()
    }
}

impl MediaAccessPolicy for FakePlatform {
    fn request(
        &self,
        _view: ContentViewId,
        _request: &MediaStreamRequest,
        respond: MediaResponseCallback,
    ) {
        self.pending_media.borrow_mut().push(respond);
    }
}

impl CriticalErrorReporter for FakePlatform {
    fn report(&self, title: &str, content: &str) {
        self.critical_errors
            .borrow_mut()
            .push((title.to_string(), content.to_string()));
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub platform: Rc<FakePlatform>,
    pub context: Rc<ShellContext>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_manifest(r#"{"name":"test-app","main":"index.html"}"#)
    }

    pub fn with_manifest(manifest: &str) -> Self {
        let package = Package::from_json("/tmp/test-app", manifest).unwrap();
        let platform = Rc::new(FakePlatform::default());
        let context = ShellContext::builder(package, platform.clone(), platform.clone())
            .dialogs(platform.clone())
            .file_chooser(platform.clone())
            .mouse_lock(platform.clone())
            .console(platform.clone())
            .media(platform.clone())
            .critical_errors(platform.clone())
            .build();
        Self { platform, context }
    }

    pub fn create(&self, url: &str) -> Rc<Shell> {
        Shell::create(
            &self.context,
            BrowsingContext::default(),
            url,
            None,
            MSG_ROUTING_NONE,
            None,
        )
        .unwrap()
    }

    /// The engine reporting that the shell's view has closed
    pub fn close_contents(&self, shell: &Rc<Shell>) {
        shell.close_contents(shell.content_view().id());
    }

    pub fn view(&self, shell: &Shell) -> ViewRecorder {
        self.platform.view(shell.content_view().id())
    }

    pub fn window(&self, shell: &Shell) -> WindowRecorder {
        self.platform.window(shell.content_view().id())
    }
}

// ============================================================================
// Log capture
// ============================================================================

/// Collects formatted `tracing` output written while a scope runs
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Run `f` with every event down to `TRACE` written into this buffer
    pub fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
