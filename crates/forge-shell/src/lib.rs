//! # forge-shell
//!
//! Per-window shell controller for a desktop host that embeds a web-content
//! engine. A [`Shell`] owns one platform window and the content view inside
//! it, keeps itself in the process-wide [`WindowRegistry`], and translates
//! engine callbacks into window and application actions.
//!
//! The crate never talks to a window toolkit or webview directly. Hosts supply
//! implementations of the traits in [`platform`] and [`collaborators`] through
//! a [`ShellContext`], then feed engine events into the [`ContentsDelegate`],
//! [`ContentsObserver`] and [`NotificationObserver`] implementations on each
//! shell.
//!
//! ```text
//! host event loop ──► registry.from_content_view(id) ──► Shell
//!                                                         │
//!        ┌────────────────────────────────────────────────┤
//!        ▼                     ▼                          ▼
//!   NativeWindow          ContentView              collaborators
//!  (show/focus/title)  (navigate/send_event)  (dialogs, files, policies)
//! ```
//!
//! All of it is single-threaded: shells are `Rc`, state lives in `Cell` and
//! `RefCell`, and links between shells are `Weak` handles resolved through the
//! registry.

pub mod collaborators;
pub mod config;
pub mod context;
pub mod delegate;
pub mod error;
mod events;
pub mod message;
pub mod package;
pub mod platform;
pub mod registry;
pub mod shell;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::ShellConfig;
pub use context::{ShellContext, ShellContextBuilder};
pub use delegate::{ContentsDelegate, ContentsObserver, Notification, NotificationObserver};
pub use error::{Result, ShellError, ShellErrorCode};
pub use message::{IpcMessage, OutboundEvent, ShellMessage};
pub use package::{Package, WindowManifest, WindowPosition};
pub use platform::{ContentView, ContentViewFactory, CreateViewParams, NativeWindow, WindowFactory};
pub use registry::WindowRegistry;
pub use shell::{Shell, ShellOrigin};
pub use types::*;
