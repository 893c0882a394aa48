//! # Window registry - the ordered set of live shells.
//!
//! - Shells register themselves at construction and leave once their content
//!   view reports it has closed.
//! - Order is creation order; menu and taskbar code enumerate it as-is.
//! - When the last shell leaves and quit-on-empty is active, shutdown is
//!   signalled on a oneshot channel. Sending consumes the sender, so the
//!   signal fires at most once for the life of the registry.
//!
//! Lookups hand out `Rc<Shell>` clones and never hold the inner borrow while
//! calling back into a shell.

use crate::error::{Result, ShellError};
use crate::shell::Shell;
use crate::types::ContentViewId;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tokio::sync::oneshot;

pub struct WindowRegistry {
    windows: RefCell<Vec<Rc<Shell>>>,
    quit_on_empty: Cell<bool>,
    shutdown_tx: RefCell<Option<oneshot::Sender<()>>>,
    shutdown_rx: RefCell<Option<oneshot::Receiver<()>>>,
    focused: RefCell<Weak<Shell>>,
}

impl WindowRegistry {
    pub fn new(quit_on_empty: bool) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            windows: RefCell::new(Vec::new()),
            quit_on_empty: Cell::new(quit_on_empty),
            shutdown_tx: RefCell::new(Some(tx)),
            shutdown_rx: RefCell::new(Some(rx)),
            focused: RefCell::new(Weak::new()),
        }
    }

    /// Receiver for the shutdown signal; available once
    pub fn take_shutdown_receiver(&self) -> Option<oneshot::Receiver<()>> {
        self.shutdown_rx.borrow_mut().take()
    }

    pub fn quit_on_empty(&self) -> bool {
        self.quit_on_empty.get()
    }

    pub fn set_quit_on_empty(&self, quit: bool) {
        self.quit_on_empty.set(quit);
    }

    pub fn shutdown_signaled(&self) -> bool {
        self.shutdown_tx.borrow().is_none()
    }

    pub(crate) fn register(&self, shell: Rc<Shell>) {
        let mut windows = self.windows.borrow_mut();
        debug_assert!(
            !windows.iter().any(|w| Rc::ptr_eq(w, &shell)),
            "shell registered twice"
        );
        windows.push(shell);
    }

    /// Remove `shell`; returns the registry's reference so the caller decides
    /// when the shell is released
    pub(crate) fn unregister(&self, shell: &Shell) -> Option<Rc<Shell>> {
        let (removed, now_empty) = {
            let mut windows = self.windows.borrow_mut();
            let index = windows
                .iter()
                .position(|w| std::ptr::eq(Rc::as_ptr(w), shell))?;
            let removed = windows.remove(index);
            (removed, windows.is_empty())
        };

        if now_empty && self.quit_on_empty.get() {
            self.signal_shutdown();
        }
        Some(removed)
    }

    fn signal_shutdown(&self) {
        let Some(tx) = self.shutdown_tx.borrow_mut().take() else {
            tracing::debug!("Shutdown already signalled");
            return;
        };
        tracing::info!("Last window closed, signalling shutdown");
        if tx.send(()).is_err() {
            tracing::debug!("Shutdown receiver already dropped");
        }
    }

    /// Live shells in creation order
    pub fn windows(&self) -> Vec<Rc<Shell>> {
        self.windows.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.windows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.borrow().is_empty()
    }

    pub fn contains(&self, shell: &Shell) -> bool {
        self.windows
            .borrow()
            .iter()
            .any(|w| std::ptr::eq(Rc::as_ptr(w), shell))
    }

    /// Reverse lookup from a content view handle to its owning shell
    pub fn from_content_view(&self, view: ContentViewId) -> Option<Rc<Shell>> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.content_view().id() == view)
            .cloned()
    }

    /// Like [`Self::from_content_view`], for callers that treat a miss as an error
    pub fn require(&self, view: ContentViewId) -> Result<Rc<Shell>> {
        self.from_content_view(view)
            .ok_or_else(|| ShellError::view_not_found(view))
    }

    /// Lookup by the id the scripting layer assigned
    pub fn from_id(&self, id: i32) -> Option<Rc<Shell>> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.id() == id)
            .cloned()
    }

    /// Resolve a weak link; absent once the target has left the registry
    pub fn resolve(&self, link: &Weak<Shell>) -> Option<Rc<Shell>> {
        link.upgrade().filter(|shell| self.contains(shell))
    }

    pub fn focused(&self) -> Option<Rc<Shell>> {
        let link = self.focused.borrow().clone();
        self.resolve(&link)
    }

    pub fn set_focused(&self, shell: &Rc<Shell>) {
        *self.focused.borrow_mut() = Rc::downgrade(shell);
    }

    pub(crate) fn clear_focused(&self, shell: &Shell) {
        let mut focused = self.focused.borrow_mut();
        if std::ptr::eq(focused.as_ptr(), shell) {
            *focused = Weak::new();
        }
    }

    /// Force-close every live shell (application quit)
    pub fn close_all(&self) {
        let windows = self.windows();
        tracing::info!("Closing all {} windows", windows.len());
        for shell in windows {
            shell.set_force_close(true);
            shell.close();
        }
    }
}
