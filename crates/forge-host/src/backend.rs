//! tao windows and wry webviews behind the shell's platform traits.
//!
//! Shells ask for windows and views from inside event handlers, where no
//! `EventLoopWindowTarget` is at hand. Both are therefore created as a
//! `Surface` that records what was asked of it, and the event loop realizes
//! pending surfaces once per iteration. Navigation, titles and geometry set
//! before that are applied when the native objects come up.

use crate::assets::AssetServer;
use forge_shell::{
    Bounds, BrowsingContext, ContentView, ContentViewFactory, ContentViewId, CreateViewParams,
    DraggableRegion, KeyboardEvent, NativeWindow, NavigationState, ReloadType, ShellError,
    WindowFactory, WindowManifest, WindowPosition,
};
use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tao::dpi::{LogicalPosition, LogicalSize, PhysicalPosition};
use tao::event_loop::{EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Fullscreen, Window, WindowBuilder, WindowId};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

const PRELOAD: &str = include_str!("preload.js");

/// The engine inspector ships in debug builds and with the `devtools` feature
const INSPECTOR: bool = cfg!(any(debug_assertions, feature = "devtools"));

/// Events raised by webviews, delivered through the tao event loop
#[derive(Debug)]
pub enum HostEvent {
    Ipc { view: ContentViewId, body: String },
    NewWindow { source: ContentViewId, url: String },
    TitleChanged { view: ContentViewId, title: String },
    PageLoad { view: ContentViewId, url: String, finished: bool },
    /// The view finished closing; the engine-side `CloseContents`
    CloseContents(ContentViewId),
    Menu(muda::MenuId),
}

struct Surface {
    view: ContentViewId,
    browsing_context: BrowsingContext,
    // Declaration order is drop order: the webview goes before its window.
    webview: OnceCell<WebView>,
    window: OnceCell<Window>,
    manifest: RefCell<WindowManifest>,
    visible: Cell<bool>,
    url: RefCell<String>,
    first_url: OnceCell<String>,
    scripts: RefCell<Vec<String>>,
    navigation: Cell<NavigationState>,
    commits: Cell<u32>,
}

impl Surface {
    fn new(view: ContentViewId, browsing_context: BrowsingContext) -> Self {
        Self {
            view,
            browsing_context,
            webview: OnceCell::new(),
            window: OnceCell::new(),
            manifest: RefCell::new(WindowManifest::default()),
            visible: Cell::new(false),
            url: RefCell::new(String::new()),
            first_url: OnceCell::new(),
            scripts: RefCell::new(Vec::new()),
            navigation: Cell::new(NavigationState::default()),
            commits: Cell::new(0),
        }
    }

    fn run_script(&self, js: String) {
        match self.webview.get() {
            Some(webview) => {
                if let Err(e) = webview.evaluate_script(&js) {
                    tracing::warn!("Script failed in {}: {}", self.view, e);
                }
            }
            None => self.scripts.borrow_mut().push(js),
        }
    }

    fn load(&self, url: &str) {
        *self.url.borrow_mut() = url.to_string();
        let _ = self.first_url.set(url.to_string());
        if let Some(webview) = self.webview.get() {
            if let Err(e) = webview.load_url(url) {
                tracing::warn!("{} failed to load {}: {}", self.view, url, e);
            }
        }
    }

    fn record_load(&self, url: &str, finished: bool) {
        let mut state = self.navigation.get();
        state.is_loading = !finished;
        if finished {
            *self.url.borrow_mut() = url.to_string();
            self.commits.set(self.commits.get().saturating_add(1));
            state.can_go_back = self.commits.get() > 1;
        }
        self.navigation.set(state);
    }
}

#[derive(Default)]
struct SurfaceTable {
    by_view: RefCell<HashMap<ContentViewId, Rc<Surface>>>,
    by_window: RefCell<HashMap<WindowId, ContentViewId>>,
}

impl SurfaceTable {
    fn get(&self, view: ContentViewId) -> Option<Rc<Surface>> {
        self.by_view.borrow().get(&view).cloned()
    }

    fn forget(&self, surface: &Surface) {
        self.by_view.borrow_mut().remove(&surface.view);
        if let Some(window) = surface.window.get() {
            self.by_window.borrow_mut().remove(&window.id());
        }
    }
}

pub struct Backend {
    proxy: EventLoopProxy<HostEvent>,
    assets: Arc<AssetServer>,
    app_name: String,
    table: Rc<SurfaceTable>,
    pending: RefCell<Vec<Rc<Surface>>>,
    next_view: Cell<u64>,
}

impl Backend {
    pub fn new(
        proxy: EventLoopProxy<HostEvent>,
        app_dir: impl Into<PathBuf>,
        app_name: &str,
        dev: bool,
    ) -> Self {
        Self {
            proxy,
            assets: Arc::new(AssetServer::new(app_dir, dev)),
            app_name: app_name.to_string(),
            table: Rc::new(SurfaceTable::default()),
            pending: RefCell::new(Vec::new()),
            next_view: Cell::new(0),
        }
    }

    pub fn view_for_window(&self, window: WindowId) -> Option<ContentViewId> {
        self.table.by_window.borrow().get(&window).copied()
    }

    /// Page load progress reported by a webview
    pub fn record_load(&self, view: ContentViewId, url: &str, finished: bool) {
        if let Some(surface) = self.table.get(view) {
            surface.record_load(url, finished);
        }
    }

    fn new_view(&self, browsing_context: BrowsingContext) -> HostView {
        let id = ContentViewId(self.next_view.get() + 1);
        self.next_view.set(id.0);
        let surface = Rc::new(Surface::new(id, browsing_context));
        self.table.by_view.borrow_mut().insert(id, surface.clone());
        tracing::debug!("Allocated surface for {}", id);
        HostView {
            surface,
            table: self.table.clone(),
            proxy: self.proxy.clone(),
        }
    }

    /// Build native windows and webviews for every surface that got a window
    /// since the last call. `on_window` sees each new window once.
    pub fn realize_pending(
        &self,
        target: &EventLoopWindowTarget<HostEvent>,
        mut on_window: impl FnMut(&Window),
    ) {
        let pending = self.pending.take();
        for surface in pending {
            if self.table.get(surface.view).is_none() {
                tracing::debug!("{} closed before it was realized", surface.view);
                continue;
            }
            match self.realize(&surface, target) {
                Ok(()) => {
                    if let Some(window) = surface.window.get() {
                        on_window(window);
                    }
                }
                Err(e) => {
                    tracing::error!("Cannot realize {}: {}", surface.view, e);
                    let _ = self.proxy.send_event(HostEvent::CloseContents(surface.view));
                }
            }
        }
    }

    fn realize(
        &self,
        surface: &Surface,
        target: &EventLoopWindowTarget<HostEvent>,
    ) -> Result<(), String> {
        let manifest = surface.manifest.borrow().clone();
        let window = self.build_window(&manifest, target)?;
        let webview = self.build_webview(surface, &window)?;

        self.table
            .by_window
            .borrow_mut()
            .insert(window.id(), surface.view);
        if surface.visible.get() {
            window.set_visible(true);
        }
        let _ = surface.window.set(window);
        if surface.webview.set(webview).is_err() {
            return Err("surface realized twice".to_string());
        }

        for js in surface.scripts.take() {
            surface.run_script(js);
        }
        tracing::info!("Realized window for {}", surface.view);
        Ok(())
    }

    fn build_window(
        &self,
        manifest: &WindowManifest,
        target: &EventLoopWindowTarget<HostEvent>,
    ) -> Result<Window, String> {
        let title = manifest
            .title
            .clone()
            .unwrap_or_else(|| self.app_name.clone());
        let mut builder = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(LogicalSize::new(
                manifest.width.unwrap_or(1024),
                manifest.height.unwrap_or(768),
            ))
            .with_resizable(manifest.resizable.unwrap_or(true))
            .with_decorations(manifest.has_frame())
            .with_always_on_top(manifest.always_on_top.unwrap_or(false))
            .with_visible(false);

        if let (Some(w), Some(h)) = (manifest.min_width, manifest.min_height) {
            builder = builder.with_min_inner_size(LogicalSize::new(w, h));
        }
        if let (Some(w), Some(h)) = (manifest.max_width, manifest.max_height) {
            builder = builder.with_max_inner_size(LogicalSize::new(w, h));
        }
        let explicit_position = manifest.x.zip(manifest.y);
        if let Some((x, y)) = explicit_position {
            builder = builder.with_position(LogicalPosition::new(x, y));
        }
        if manifest.fullscreen == Some(true) {
            builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = builder.build(target).map_err(|e| e.to_string())?;
        if explicit_position.is_none() && manifest.position == Some(WindowPosition::Center) {
            center(&window);
        }
        Ok(window)
    }

    fn build_webview(&self, surface: &Surface, window: &Window) -> Result<WebView, String> {
        let view = surface.view;
        let mut builder = WebViewBuilder::new()
            .with_initialization_script(PRELOAD)
            .with_devtools(INSPECTOR);

        let proxy = self.proxy.clone();
        builder = builder.with_ipc_handler(move |request| {
            let _ = proxy.send_event(HostEvent::Ipc {
                view,
                body: request.into_body(),
            });
        });

        let assets = self.assets.clone();
        builder = builder.with_custom_protocol("app".into(), move |_id, request| {
            assets.respond(&request.uri().to_string())
        });

        let proxy = self.proxy.clone();
        builder = builder.with_new_window_req_handler(move |url| {
            let _ = proxy.send_event(HostEvent::NewWindow { source: view, url });
            false
        });

        let proxy = self.proxy.clone();
        builder = builder.with_document_title_changed_handler(move |title| {
            let _ = proxy.send_event(HostEvent::TitleChanged { view, title });
        });

        let proxy = self.proxy.clone();
        builder = builder.with_on_page_load_handler(move |event, url| {
            let finished = matches!(event, PageLoadEvent::Finished);
            let _ = proxy.send_event(HostEvent::PageLoad {
                view,
                url,
                finished,
            });
        });

        let url = surface.url.borrow().clone();
        if !url.is_empty() {
            builder = builder.with_url(url);
        }

        #[cfg(target_os = "linux")]
        let webview = {
            use tao::platform::unix::WindowExtUnix;
            use wry::WebViewBuilderExtUnix;
            let vbox = window
                .default_vbox()
                .ok_or_else(|| "window has no GTK container".to_string())?;
            builder.build_gtk(vbox)
        };
        #[cfg(not(target_os = "linux"))]
        let webview = builder.build(window);

        webview.map_err(|e| e.to_string())
    }
}

/// Script for a reload; `None` means navigating back to the first URL.
/// wry has no cache-bypassing reload, so `IgnoringCache` reloads normally.
fn reload_script(kind: ReloadType) -> Option<&'static str> {
    match kind {
        ReloadType::Normal | ReloadType::IgnoringCache => Some("location.reload();"),
        ReloadType::OriginalRequestUrl => None,
    }
}

fn center(window: &Window) {
    let Some(monitor) = window.current_monitor() else {
        return;
    };
    let screen = monitor.size();
    let origin = monitor.position();
    let size = window.outer_size();
    let x = origin.x + (screen.width.saturating_sub(size.width) / 2) as i32;
    let y = origin.y + (screen.height.saturating_sub(size.height) / 2) as i32;
    window.set_outer_position(PhysicalPosition::new(x, y));
}

impl ContentViewFactory for Backend {
    fn create_view(&self, params: &CreateViewParams<'_>) -> forge_shell::Result<Box<dyn ContentView>> {
        if let Some(base) = params.base_view {
            tracing::debug!("New view opened from {}", base);
        }
        Ok(Box::new(self.new_view(params.browsing_context)))
    }

    fn create_devtools_view(
        &self,
        inspected: &dyn ContentView,
    ) -> forge_shell::Result<Box<dyn ContentView>> {
        let surface = self
            .table
            .get(inspected.id())
            .ok_or_else(|| ShellError::view_not_found(inspected.id()))?;
        match surface.webview.get() {
            #[cfg(any(debug_assertions, feature = "devtools"))]
            Some(webview) => webview.open_devtools(),
            #[cfg(not(any(debug_assertions, feature = "devtools")))]
            Some(_) => tracing::debug!(
                "Inspector not built in, {} gets the devtools page only",
                inspected.id()
            ),
            None => tracing::debug!("{} is not realized yet, inspector not opened", inspected.id()),
        }
        Ok(Box::new(self.new_view(surface.browsing_context)))
    }
}

impl WindowFactory for Backend {
    fn create_window(
        &self,
        view: ContentViewId,
        manifest: &WindowManifest,
    ) -> forge_shell::Result<Box<dyn NativeWindow>> {
        let surface = self.table.get(view).ok_or_else(|| {
            ShellError::platform(format!("{} has no surface to host a window", view))
        })?;
        *surface.manifest.borrow_mut() = manifest.clone();
        self.pending.borrow_mut().push(surface.clone());
        Ok(Box::new(HostWindow { surface }))
    }
}

// ============================================================================
// Content view
// ============================================================================

pub struct HostView {
    surface: Rc<Surface>,
    table: Rc<SurfaceTable>,
    proxy: EventLoopProxy<HostEvent>,
}

impl HostView {
    fn call(&self, function: &str, args: &str) {
        self.surface.run_script(format!(
            "window.__forge_shell && window.__forge_shell.{}({});",
            function, args
        ));
    }
}

impl ContentView for HostView {
    fn id(&self) -> ContentViewId {
        self.surface.view
    }

    fn browsing_context(&self) -> BrowsingContext {
        self.surface.browsing_context
    }

    fn url(&self) -> String {
        self.surface.url.borrow().clone()
    }

    fn load_url(&self, url: &str) {
        self.surface.load(url);
    }

    fn go_to_offset(&self, offset: i32) {
        self.surface.run_script(format!("history.go({});", offset));
    }

    fn reload(&self, kind: ReloadType) {
        if kind == ReloadType::IgnoringCache {
            tracing::debug!(
                "{}: webview cannot bypass its cache, reloading normally",
                self.surface.view
            );
        }
        match reload_script(kind) {
            Some(js) => self.surface.run_script(js.to_string()),
            None => {
                let url = self.surface.first_url.get().cloned().unwrap_or_default();
                if !url.is_empty() {
                    self.surface.load(&url);
                }
            }
        }
    }

    fn stop(&self) {
        self.surface.run_script("window.stop();".to_string());
    }

    fn navigation_state(&self) -> NavigationState {
        self.surface.navigation.get()
    }

    fn dispatch_before_unload(&self) -> bool {
        // A live page answers asynchronously through the `close` event.
        self.surface.webview.get().is_none()
    }

    fn send_event(&self, payload: &str) {
        self.call("dispatch", payload);
    }

    fn close(&self) {
        if self
            .proxy
            .send_event(HostEvent::CloseContents(self.surface.view))
            .is_err()
        {
            tracing::debug!("Event loop gone, {} closes with it", self.surface.view);
        }
    }

    fn got_response_to_lock_mouse_request(&self, allowed: bool) {
        tracing::debug!("Pointer lock for {}: {}", self.surface.view, allowed);
    }

    fn file_chooser_completed(&self, files: Vec<PathBuf>) {
        match serde_json::to_string(&files) {
            Ok(json) => self.call("resolveFiles", &json),
            Err(e) => tracing::warn!("Cannot deliver chosen files: {}", e),
        }
    }

    fn directory_listing_completed(&self, request_id: i32, entries: Vec<PathBuf>) {
        match serde_json::to_string(&entries) {
            Ok(json) => self.call("resolveDirectory", &format!("{}, {}", request_id, json)),
            Err(e) => tracing::warn!("Cannot deliver directory listing: {}", e),
        }
    }
}

impl Drop for HostView {
    fn drop(&mut self) {
        self.table.forget(&self.surface);
    }
}

// ============================================================================
// Window
// ============================================================================

pub struct HostWindow {
    surface: Rc<Surface>,
}

impl NativeWindow for HostWindow {
    fn show(&self) {
        self.surface.visible.set(true);
        if let Some(window) = self.surface.window.get() {
            window.set_visible(true);
        }
    }

    fn hide(&self) {
        self.surface.visible.set(false);
        if let Some(window) = self.surface.window.get() {
            window.set_visible(false);
        }
    }

    fn focus(&self, focused: bool) {
        if !focused {
            return;
        }
        if let Some(window) = self.surface.window.get() {
            if !window.is_focused() {
                window.set_focus();
            }
        }
    }

    fn set_bounds(&self, bounds: Bounds) {
        match self.surface.window.get() {
            Some(window) => {
                window.set_outer_position(LogicalPosition::new(bounds.x, bounds.y));
                window.set_inner_size(LogicalSize::new(bounds.width, bounds.height));
            }
            None => {
                let mut manifest = self.surface.manifest.borrow_mut();
                manifest.x = Some(bounds.x);
                manifest.y = Some(bounds.y);
                manifest.width = Some(bounds.width);
                manifest.height = Some(bounds.height);
            }
        }
    }

    fn set_title(&self, title: &str) {
        match self.surface.window.get() {
            Some(window) => window.set_title(title),
            None => self.surface.manifest.borrow_mut().title = Some(title.to_string()),
        }
    }

    fn set_navigation_state(&self, state: NavigationState) {
        tracing::trace!("{} navigation state {:?}", self.surface.view, state);
    }

    fn set_address(&self, url: &str) {
        tracing::trace!("{} at {}", self.surface.view, url);
    }

    fn handle_keyboard_event(&self, event: &KeyboardEvent) {
        tracing::trace!("{} left key {} unhandled", self.surface.view, event.key);
    }

    fn update_draggable_regions(&self, regions: &[DraggableRegion]) {
        tracing::trace!("{} has {} draggable regions", self.surface.view, regions.len());
    }

    fn begin_drag(&self) {
        if let Some(window) = self.surface.window.get() {
            if let Err(e) = window.drag_window() {
                tracing::warn!("Window drag failed for {}: {}", self.surface.view, e);
            }
        }
    }
}
