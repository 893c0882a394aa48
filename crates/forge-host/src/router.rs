//! Routes tao window events, webview callbacks and menu commands to shells.

use crate::backend::{Backend, HostEvent};
use crate::menu::{AppMenu, MenuCommand};
use forge_shell::{
    ContentViewFactory, ContentViewId, ContentsDelegate, ContentsObserver, CreateViewParams,
    FileChooserMode, FileChooserParams, IpcMessage, Notification, NotificationObserver,
    ReloadType, Shell, ShellContext, MSG_ROUTING_NONE,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::rc::Rc;
use tao::event::WindowEvent;
use tao::event_loop::EventLoopWindowTarget;
use tao::window::WindowId;

/// Host-private channels posted by the preload script
const CONSOLE: &str = "__console";
const FILE_CHOOSER: &str = "__file_chooser";
const ENUMERATE_DIRECTORY: &str = "__enumerate_directory";

#[derive(Debug, Deserialize)]
struct ConsoleReport {
    level: i32,
    message: String,
    #[serde(default)]
    line: i32,
    #[serde(default)]
    source: String,
}

#[derive(Debug, Deserialize)]
struct FileChooserRequest {
    #[serde(default)]
    mode: String,
    title: Option<String>,
    #[serde(default)]
    accept: Vec<String>,
}

impl FileChooserRequest {
    fn into_params(self) -> FileChooserParams {
        let mode = match self.mode.as_str() {
            "multiple" => FileChooserMode::OpenMultiple,
            "folder" => FileChooserMode::OpenFolder,
            "save" => FileChooserMode::Save,
            _ => FileChooserMode::Open,
        };
        FileChooserParams {
            mode,
            title: self.title,
            default_path: None,
            accept_types: self.accept,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryRequest {
    request_id: i32,
    path: PathBuf,
}

pub struct Router {
    context: Rc<ShellContext>,
    backend: Rc<Backend>,
    menu: AppMenu,
    next_id: i32,
}

impl Router {
    pub fn new(context: Rc<ShellContext>, backend: Rc<Backend>, menu: AppMenu) -> Self {
        Self {
            context,
            backend,
            menu,
            next_id: 0,
        }
    }

    fn shell(&self, view: ContentViewId) -> Option<Rc<Shell>> {
        let shell = self.context.registry().from_content_view(view);
        if shell.is_none() {
            tracing::debug!("No shell for {}, dropping event", view);
        }
        shell
    }

    /// Realize new windows, give them the menu, and number new shells
    pub fn settle(&mut self, target: &EventLoopWindowTarget<HostEvent>) {
        let menu = &self.menu;
        self.backend.realize_pending(target, |window| menu.attach(window));

        for shell in self.context.registry().windows() {
            if shell.id() == 0 {
                self.next_id += 1;
                shell.set_id(self.next_id);
            }
        }
    }

    pub fn user_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Ipc { view, body } => self.ipc(view, &body),
            HostEvent::NewWindow { source, url } => self.new_window(source, &url),
            HostEvent::TitleChanged { view, title } => {
                let notification = Notification::TitleUpdated { view, title };
                for shell in self.context.registry().windows() {
                    shell.observe(&notification);
                }
            }
            HostEvent::PageLoad {
                view,
                url,
                finished,
            } => {
                self.backend.record_load(view, &url, finished);
                if let Some(shell) = self.shell(view) {
                    shell.loading_state_changed(view);
                    if finished {
                        shell.did_navigate_main_frame_post_commit(view);
                    }
                }
            }
            HostEvent::CloseContents(view) => {
                if let Some(shell) = self.shell(view) {
                    shell.close_contents(view);
                }
            }
            HostEvent::Menu(id) => match self.menu.command(&id) {
                Some(command) => self.run_command(command),
                None => tracing::warn!("Menu event for unknown item {:?}", id),
            },
        }
    }

    pub fn window_event(&mut self, window_id: WindowId, event: &WindowEvent<'_>) {
        let Some(view) = self.backend.view_for_window(window_id) else {
            return;
        };
        let Some(shell) = self.shell(view) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => request_close(&shell),
            WindowEvent::Focused(true) => {
                shell.activate_contents(view);
                shell.send_event("focus", None);
            }
            WindowEvent::Focused(false) => {
                shell.deactivate_contents(view);
                shell.send_event("blur", None);
            }
            WindowEvent::Resized(size) => {
                shell.send_event("resize", Some(&format!("{}x{}", size.width, size.height)));
            }
            WindowEvent::Moved(position) => {
                shell.send_event("move", Some(&format!("{},{}", position.x, position.y)));
            }
            _ => {}
        }
    }

    fn ipc(&self, view: ContentViewId, body: &str) {
        let Some(shell) = self.shell(view) else {
            return;
        };
        let message = match IpcMessage::from_json(body) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Malformed IPC from {}: {}", view, e);
                return;
            }
        };

        match message.channel.as_str() {
            CONSOLE => match serde_json::from_value::<ConsoleReport>(message.payload) {
                Ok(report) => {
                    shell.add_message_to_console(
                        view,
                        report.level,
                        &report.message,
                        report.line,
                        &report.source,
                    );
                }
                Err(e) => tracing::warn!("Bad console report from {}: {}", view, e),
            },
            FILE_CHOOSER => match serde_json::from_value::<FileChooserRequest>(message.payload) {
                Ok(request) => shell.run_file_chooser(view, &request.into_params()),
                Err(e) => tracing::warn!("Bad file chooser request from {}: {}", view, e),
            },
            ENUMERATE_DIRECTORY => {
                match serde_json::from_value::<DirectoryRequest>(message.payload) {
                    Ok(request) => shell.enumerate_directory(view, request.request_id, &request.path),
                    Err(e) => tracing::warn!("Bad directory request from {}: {}", view, e),
                }
            }
            _ => {
                if !shell.on_message_received(&message) {
                    tracing::debug!("Unhandled message on channel '{}'", message.channel);
                }
            }
        }
    }

    /// `window.open` from a page: the view is created here and handed to the
    /// opener, as the engine would
    fn new_window(&self, source: ContentViewId, url: &str) {
        let Some(opener) = self.shell(source) else {
            return;
        };
        let params = CreateViewParams {
            browsing_context: opener.content_view().browsing_context(),
            site_affinity: None,
            routing_id: MSG_ROUTING_NONE,
            base_view: Some(source),
        };
        match self.backend.create_view(&params) {
            Ok(view) => {
                view.load_url(url);
                opener.web_contents_created(source, 0, url, view);
            }
            Err(e) => tracing::warn!("Cannot open {} from {}: {}", url, source, e),
        }
    }

    fn run_command(&self, command: MenuCommand) {
        let registry = self.context.registry();
        if command == MenuCommand::Quit {
            registry.close_all();
            return;
        }

        let Some(shell) = registry
            .focused()
            .or_else(|| registry.windows().last().cloned())
        else {
            tracing::debug!("{:?} with no window open", command);
            return;
        };
        match command {
            MenuCommand::Reload => shell.reload(ReloadType::Normal),
            MenuCommand::ForceReload => shell.reload(ReloadType::IgnoringCache),
            MenuCommand::Stop => shell.stop(),
            MenuCommand::Back => shell.go_back_or_forward(-1),
            MenuCommand::Forward => shell.go_back_or_forward(1),
            MenuCommand::DevTools => shell.show_devtools(),
            MenuCommand::CloseWindow => request_close(&shell),
            MenuCommand::Quit => {}
        }
    }
}

/// Close now if allowed, otherwise let the page decide through a `close` event
fn request_close(shell: &Shell) {
    if !shell.close() && shell.is_live() {
        shell.send_event("close", None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_chooser_request_modes() {
        let request: FileChooserRequest =
            serde_json::from_str(r#"{"mode":"multiple","accept":[".png"]}"#).unwrap();
        let params = request.into_params();
        assert_eq!(params.mode, FileChooserMode::OpenMultiple);
        assert_eq!(params.accept_types, vec![".png"]);
        assert_eq!(params.title, None);

        let request: FileChooserRequest = serde_json::from_str(r#"{"title":"Pick"}"#).unwrap();
        assert_eq!(request.into_params().mode, FileChooserMode::Open);
    }

    #[test]
    fn test_console_report_defaults() {
        let report: ConsoleReport =
            serde_json::from_str(r#"{"level":2,"message":"careful"}"#).unwrap();
        assert_eq!(report.level, 2);
        assert_eq!(report.line, 0);
        assert!(report.source.is_empty());
    }
}
