//! Shell - one application window.
//!
//! A shell exclusively owns a platform window and the content view rendered
//! inside it, registers itself with the [`WindowRegistry`](crate::WindowRegistry)
//! for its whole life, and translates content-engine callbacks into window and
//! application actions (see `events.rs` for the callback tables).
//!
//! ## Lifecycle
//! ```text
//! Shell::create ──► ContentViewFactory::create_view ──► load_url
//!        │
//!        └──► Shell::new ──► WindowFactory::create_window ──► registry.register
//!
//! close button ──► Shell::close ──► should_close_window ──► ContentView::close
//!                                                              │
//! engine: CloseContents ◄─────────────────────────────────────┘
//!        └──► destroy ──► registry.unregister (may signal shutdown) ──► drop
//! ```
//!
//! Everything runs on the UI sequence; late asynchronous completions are bound
//! through a weak handle and dropped once the shell is destroyed.

use crate::collaborators::JavaScriptDialogCreator;
use crate::context::ShellContext;
use crate::error::Result;
use crate::message::{OutboundEvent, ShellMessage};
use crate::package::{Package, WindowManifest};
use crate::platform::{ContentView, CreateViewParams, NativeWindow};
use crate::types::{
    is_draggable_at, BrowsingContext, ContentViewId, DraggableRegion, ReloadType, SiteAffinity,
};
use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// How a shell came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOrigin {
    /// Opened by the application (startup window, new-window navigation)
    Primary,
    /// Spawned by the page (`window.open`, popup dispositions)
    Popup,
    /// Hosts developer tools for another shell
    Devtools,
}

pub struct Shell {
    context: Rc<ShellContext>,
    weak_self: Weak<Shell>,
    // Declaration order is drop order: the view goes before the window hosting it.
    content_view: Box<dyn ContentView>,
    window: Box<dyn NativeWindow>,
    origin: ShellOrigin,
    id: Cell<i32>,
    force_close: Cell<bool>,
    closed: Cell<bool>,
    devtools_window: RefCell<Weak<Shell>>,
    inspected: Weak<Shell>,
    dialog_creator: OnceCell<Rc<dyn JavaScriptDialogCreator>>,
    draggable_regions: RefCell<Vec<DraggableRegion>>,
}

impl Shell {
    /// Wrap an existing content view in a new shell and register it.
    ///
    /// The window is created from `manifest` and shown unless the manifest
    /// says otherwise. No close negotiation happens here.
    pub fn new(
        context: &Rc<ShellContext>,
        content_view: Box<dyn ContentView>,
        manifest: &WindowManifest,
    ) -> Result<Rc<Self>> {
        Self::construct(
            context,
            content_view,
            manifest,
            ShellOrigin::Primary,
            Weak::new(),
        )
    }

    /// Create a content view, navigate it to `url` (when non-empty) and wrap it
    /// in a shell using the package's window manifest.
    pub fn create(
        context: &Rc<ShellContext>,
        browsing_context: BrowsingContext,
        url: &str,
        site_affinity: Option<&SiteAffinity>,
        routing_id: i32,
        base_view: Option<ContentViewId>,
    ) -> Result<Rc<Self>> {
        let params = CreateViewParams {
            browsing_context,
            site_affinity,
            routing_id,
            base_view,
        };
        Self::create_with_origin(context, &params, url, ShellOrigin::Primary)
    }

    pub(crate) fn create_with_origin(
        context: &Rc<ShellContext>,
        params: &CreateViewParams<'_>,
        url: &str,
        origin: ShellOrigin,
    ) -> Result<Rc<Self>> {
        let view = context.view_factory().create_view(params).map_err(|e| {
            tracing::warn!("Content view creation failed: {}", e);
            e
        })?;
        if !url.is_empty() {
            view.load_url(url);
        }
        Self::construct(
            context,
            view,
            context.package().window_manifest(),
            origin,
            Weak::new(),
        )
    }

    pub(crate) fn construct(
        context: &Rc<ShellContext>,
        content_view: Box<dyn ContentView>,
        manifest: &WindowManifest,
        origin: ShellOrigin,
        inspected: Weak<Shell>,
    ) -> Result<Rc<Self>> {
        let view_id = content_view.id();
        let window = context.window_factory().create_window(view_id, manifest)?;

        let shell = Rc::new_cyclic(|weak_self| Self {
            context: context.clone(),
            weak_self: weak_self.clone(),
            content_view,
            window,
            origin,
            id: Cell::new(0),
            force_close: Cell::new(origin == ShellOrigin::Devtools),
            closed: Cell::new(false),
            devtools_window: RefCell::new(Weak::new()),
            inspected,
            dialog_creator: OnceCell::new(),
            draggable_regions: RefCell::new(Vec::new()),
        });

        let registry = context.registry();
        registry.register(shell.clone());
        tracing::info!(
            "Created {:?} shell for {} ({} windows open)",
            origin,
            view_id,
            registry.len()
        );

        if manifest.is_shown() {
            shell.window.show();
        }
        if origin != ShellOrigin::Devtools && manifest.wants_devtools() {
            shell.show_devtools();
        }
        Ok(shell)
    }

    /// Tear down after the content view reported it closed. Idempotent.
    pub(crate) fn destroy(&self) {
        if self.closed.replace(true) {
            tracing::debug!("Shell for {} already destroyed", self.content_view.id());
            return;
        }

        let view = self.content_view.id();
        if let Some(dialogs) = self.dialog_creator.get() {
            dialogs.cancel_pending_dialogs(view);
        }

        let registry = self.context.registry();
        registry.clear_focused(self);
        // Holding the registry's reference until the end of this scope releases
        // the window and view only after shutdown has been signalled.
        let released = registry.unregister(self);
        if released.is_none() {
            tracing::warn!("Shell for {} was not registered", view);
        }
        tracing::info!("Destroyed shell for {} ({} windows remain)", view, registry.len());
    }

    /// Whether the shell is still registered and accepting work
    pub fn is_live(&self) -> bool {
        !self.closed.get()
    }

    // =========================================================================
    // Close negotiation
    // =========================================================================

    /// Decide whether the window may close. Never destroys the shell itself.
    pub fn should_close_window(&self) -> bool {
        if self.force_close.get() {
            return true;
        }
        let allowed = self.content_view.dispatch_before_unload();
        if !allowed {
            tracing::debug!("Close of {} vetoed by the page", self.content_view.id());
        }
        allowed
    }

    /// Ask the content view to close if negotiation allows it. The shell is
    /// destroyed later, when the engine answers with `CloseContents`.
    pub fn close(&self) -> bool {
        if !self.is_live() || !self.should_close_window() {
            return false;
        }
        self.content_view.close();
        true
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn load_url(&self, url: &str) {
        tracing::debug!("{} navigating to {}", self.content_view.id(), url);
        self.content_view.load_url(url);
    }

    pub fn go_back_or_forward(&self, offset: i32) {
        self.content_view.go_to_offset(offset);
    }

    pub fn reload(&self, kind: ReloadType) {
        self.content_view.reload(kind);
    }

    pub fn stop(&self) {
        self.content_view.stop();
    }

    /// Stop an in-flight load, or reload when idle; never both
    pub fn reload_or_stop(&self) {
        if self.content_view.navigation_state().is_loading {
            self.stop();
        } else {
            self.reload(ReloadType::Normal);
        }
    }

    // =========================================================================
    // Developer tools
    // =========================================================================

    /// Bring the existing devtools shell forward, or create one. Devtools
    /// shells are not inspected themselves.
    pub fn show_devtools(&self) {
        if self.is_devtools() {
            tracing::debug!("{} hosts devtools, not opening another", self.content_view.id());
            return;
        }
        let registry = self.context.registry();
        let existing = registry.resolve(&self.devtools_window.borrow());
        if let Some(devtools) = existing {
            devtools.window.show();
            devtools.window.focus(true);
            return;
        }

        let view = match self
            .context
            .view_factory()
            .create_devtools_view(self.content_view.as_ref())
        {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!("Cannot open devtools for {}: {}", self.content_view.id(), e);
                return;
            }
        };
        view.load_url(&self.context.config().devtools_url);

        let manifest = WindowManifest::for_devtools(self.context.config());
        match Self::construct(
            &self.context,
            view,
            &manifest,
            ShellOrigin::Devtools,
            self.weak_self.clone(),
        ) {
            Ok(devtools) => {
                *self.devtools_window.borrow_mut() = Rc::downgrade(&devtools);
            }
            Err(e) => {
                tracing::warn!("Cannot open devtools for {}: {}", self.content_view.id(), e);
            }
        }
    }

    /// Live shell showing this shell's devtools, if any
    pub fn devtools_window(&self) -> Option<Rc<Shell>> {
        self.context.registry().resolve(&self.devtools_window.borrow())
    }

    /// Live shell this devtools shell inspects
    pub fn inspected_shell(&self) -> Option<Rc<Shell>> {
        self.context.registry().resolve(&self.inspected)
    }

    // =========================================================================
    // Page communication
    // =========================================================================

    /// Fire-and-forget event to the page-side object with this shell's id
    pub fn send_event(&self, event: &str, arg: Option<&str>) {
        match OutboundEvent::new(self.id.get(), event, arg).to_json() {
            Ok(payload) => self.content_view.send_event(&payload),
            Err(e) => tracing::warn!("Dropping event '{}': {}", event, e),
        }
    }

    /// Report a fatal-class error to the user; the shell keeps running
    pub fn print_critical_error(&self, title: &str, content: &str) {
        tracing::error!("{} ({}): {}", title, self.content_view.id(), content);
        self.context.critical_errors().report(title, content);
    }

    /// Replace the cached draggable regions and pass them to the window
    pub fn update_draggable_regions(&self, regions: Vec<DraggableRegion>) {
        self.window.update_draggable_regions(&regions);
        *self.draggable_regions.borrow_mut() = regions;
    }

    pub fn draggable_regions(&self) -> Vec<DraggableRegion> {
        self.draggable_regions.borrow().clone()
    }

    pub(crate) fn handle_message(&self, message: ShellMessage) {
        match message {
            ShellMessage::UpdateDraggableRegions(regions) => {
                self.update_draggable_regions(regions)
            }
            ShellMessage::BeginWindowDrag { x, y } => {
                if is_draggable_at(&self.draggable_regions.borrow(), x, y) {
                    self.window.begin_drag();
                } else {
                    tracing::trace!("({}, {}) is outside every draggable region", x, y);
                }
            }
            ShellMessage::CloseWindow { force } => {
                if force {
                    self.force_close.set(true);
                }
                self.close();
            }
        }
    }

    /// Bind a completion to this shell; it runs only while the shell is live
    pub(crate) fn bind_live<T: 'static>(
        &self,
        what: &'static str,
        f: impl FnOnce(&Shell, T) + 'static,
    ) -> Box<dyn FnOnce(T)> {
        let weak = self.weak_self.clone();
        Box::new(move |value| match weak.upgrade() {
            Some(shell) if shell.is_live() => f(&shell, value),
            _ => tracing::warn!("Dropping late {} result for a destroyed shell", what),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn content_view(&self) -> &dyn ContentView {
        self.content_view.as_ref()
    }

    pub fn window(&self) -> &dyn NativeWindow {
        self.window.as_ref()
    }

    pub fn context(&self) -> &Rc<ShellContext> {
        &self.context
    }

    /// Process-wide application manifest
    pub fn package(&self) -> &Package {
        self.context.package()
    }

    pub fn origin(&self) -> ShellOrigin {
        self.origin
    }

    pub fn is_devtools(&self) -> bool {
        self.origin == ShellOrigin::Devtools
    }

    pub fn id(&self) -> i32 {
        self.id.get()
    }

    pub fn set_id(&self, id: i32) {
        self.id.set(id);
    }

    pub fn force_close(&self) -> bool {
        self.force_close.get()
    }

    pub fn set_force_close(&self, force: bool) {
        self.force_close.set(force);
    }

    pub(crate) fn dialog_creator(&self) -> Rc<dyn JavaScriptDialogCreator> {
        self.dialog_creator
            .get_or_init(|| self.context.dialogs().create_dialog_creator())
            .clone()
    }

    pub(crate) fn rc(&self) -> Option<Rc<Shell>> {
        self.weak_self.upgrade()
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        tracing::debug!("Releasing window and content view of {}", self.content_view.id());
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("id", &self.id.get())
            .field("view", &self.content_view.id())
            .field("origin", &self.origin)
            .field("closed", &self.closed.get())
            .finish()
    }
}
