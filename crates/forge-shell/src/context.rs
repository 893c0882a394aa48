//! Everything a shell needs from the outside world, bundled once per process
//! and injected into every shell at construction.

use crate::collaborators::{
    AllowMouseLock, ConsoleMessageHandler, CriticalErrorReporter, DenyMediaAccess,
    DialogCreatorFactory, FileChooser, LogCriticalErrors, MediaAccessPolicy, MouseLockPolicy,
    NoFileChooser, SilentDialogs, UnhandledConsole,
};
use crate::config::ShellConfig;
use crate::package::Package;
use crate::platform::{ContentViewFactory, WindowFactory};
use crate::registry::WindowRegistry;
use std::rc::Rc;

pub struct ShellContext {
    registry: WindowRegistry,
    package: Package,
    config: ShellConfig,
    views: Rc<dyn ContentViewFactory>,
    windows: Rc<dyn WindowFactory>,
    dialogs: Rc<dyn DialogCreatorFactory>,
    file_chooser: Rc<dyn FileChooser>,
    mouse_lock: Rc<dyn MouseLockPolicy>,
    console: Rc<dyn ConsoleMessageHandler>,
    media: Rc<dyn MediaAccessPolicy>,
    critical_errors: Rc<dyn CriticalErrorReporter>,
}

impl ShellContext {
    pub fn builder(
        package: Package,
        views: Rc<dyn ContentViewFactory>,
        windows: Rc<dyn WindowFactory>,
    ) -> ShellContextBuilder {
        ShellContextBuilder {
            package,
            views,
            windows,
            config: ShellConfig::default(),
            dialogs: None,
            file_chooser: None,
            mouse_lock: None,
            console: None,
            media: None,
            critical_errors: None,
        }
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Process-wide application manifest
    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn view_factory(&self) -> &dyn ContentViewFactory {
        self.views.as_ref()
    }

    pub fn window_factory(&self) -> &dyn WindowFactory {
        self.windows.as_ref()
    }

    pub fn dialogs(&self) -> &dyn DialogCreatorFactory {
        self.dialogs.as_ref()
    }

    pub fn file_chooser(&self) -> &dyn FileChooser {
        self.file_chooser.as_ref()
    }

    pub fn mouse_lock(&self) -> &dyn MouseLockPolicy {
        self.mouse_lock.as_ref()
    }

    pub fn console(&self) -> &dyn ConsoleMessageHandler {
        self.console.as_ref()
    }

    pub fn media(&self) -> &dyn MediaAccessPolicy {
        self.media.as_ref()
    }

    pub fn critical_errors(&self) -> &dyn CriticalErrorReporter {
        self.critical_errors.as_ref()
    }
}

pub struct ShellContextBuilder {
    package: Package,
    views: Rc<dyn ContentViewFactory>,
    windows: Rc<dyn WindowFactory>,
    config: ShellConfig,
    dialogs: Option<Rc<dyn DialogCreatorFactory>>,
    file_chooser: Option<Rc<dyn FileChooser>>,
    mouse_lock: Option<Rc<dyn MouseLockPolicy>>,
    console: Option<Rc<dyn ConsoleMessageHandler>>,
    media: Option<Rc<dyn MediaAccessPolicy>>,
    critical_errors: Option<Rc<dyn CriticalErrorReporter>>,
}

impl ShellContextBuilder {
    pub fn config(mut self, config: ShellConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dialogs(mut self, dialogs: Rc<dyn DialogCreatorFactory>) -> Self {
        self.dialogs = Some(dialogs);
        self
    }

    pub fn file_chooser(mut self, file_chooser: Rc<dyn FileChooser>) -> Self {
        self.file_chooser = Some(file_chooser);
        self
    }

    pub fn mouse_lock(mut self, policy: Rc<dyn MouseLockPolicy>) -> Self {
        self.mouse_lock = Some(policy);
        self
    }

    pub fn console(mut self, handler: Rc<dyn ConsoleMessageHandler>) -> Self {
        self.console = Some(handler);
        self
    }

    pub fn media(mut self, policy: Rc<dyn MediaAccessPolicy>) -> Self {
        self.media = Some(policy);
        self
    }

    pub fn critical_errors(mut self, reporter: Rc<dyn CriticalErrorReporter>) -> Self {
        self.critical_errors = Some(reporter);
        self
    }

    pub fn build(self) -> Rc<ShellContext> {
        tracing::debug!(
            "Shell context for '{}' (quit_on_empty: {})",
            self.package.name(),
            self.config.quit_on_empty
        );
        Rc::new(ShellContext {
            registry: WindowRegistry::new(self.config.quit_on_empty),
            package: self.package,
            config: self.config,
            views: self.views,
            windows: self.windows,
            dialogs: self.dialogs.unwrap_or_else(|| Rc::new(SilentDialogs)),
            file_chooser: self.file_chooser.unwrap_or_else(|| Rc::new(NoFileChooser)),
            mouse_lock: self.mouse_lock.unwrap_or_else(|| Rc::new(AllowMouseLock)),
            console: self.console.unwrap_or_else(|| Rc::new(UnhandledConsole)),
            media: self.media.unwrap_or_else(|| Rc::new(DenyMediaAccess)),
            critical_errors: self
                .critical_errors
                .unwrap_or_else(|| Rc::new(LogCriticalErrors)),
        })
    }
}
