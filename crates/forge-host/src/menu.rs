//! Application menu (`muda`) and the shell operations behind it.

use muda::accelerator::Accelerator;
use muda::{Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Reload,
    ForceReload,
    Stop,
    Back,
    Forward,
    DevTools,
    CloseWindow,
    Quit,
}

const VIEW_ITEMS: &[(&str, &str, MenuCommand)] = &[
    ("Reload", "CmdOrCtrl+R", MenuCommand::Reload),
    ("Force Reload", "CmdOrCtrl+Shift+R", MenuCommand::ForceReload),
    ("Stop", "Escape", MenuCommand::Stop),
    ("Back", "Alt+ArrowLeft", MenuCommand::Back),
    ("Forward", "Alt+ArrowRight", MenuCommand::Forward),
    ("Developer Tools", "F12", MenuCommand::DevTools),
];

const WINDOW_ITEMS: &[(&str, &str, MenuCommand)] = &[
    ("Close Window", "CmdOrCtrl+W", MenuCommand::CloseWindow),
    ("Quit", "CmdOrCtrl+Q", MenuCommand::Quit),
];

pub struct AppMenu {
    menu: Menu,
    commands: HashMap<MenuId, MenuCommand>,
}

impl AppMenu {
    pub fn build() -> Result<Self, muda::Error> {
        let menu = Menu::new();
        let mut commands = HashMap::new();

        let view = Submenu::new("View", true);
        add_items(&view, VIEW_ITEMS, &mut commands)?;
        let window = Submenu::new("Window", true);
        add_items(&window, &WINDOW_ITEMS[..1], &mut commands)?;
        window.append(&PredefinedMenuItem::separator())?;
        add_items(&window, &WINDOW_ITEMS[1..], &mut commands)?;
        menu.append_items(&[&view, &window])?;

        #[cfg(target_os = "macos")]
        menu.init_for_nsapp();

        tracing::debug!("Application menu with {} commands", commands.len());
        Ok(Self { menu, commands })
    }

    pub fn command(&self, id: &MenuId) -> Option<MenuCommand> {
        self.commands.get(id).copied()
    }

    /// Install the menu bar on a freshly created window
    pub fn attach(&self, window: &tao::window::Window) {
        #[cfg(target_os = "windows")]
        {
            use tao::platform::windows::WindowExtWindows;
            unsafe {
                if let Err(e) = self.menu.init_for_hwnd(window.hwnd() as isize) {
                    tracing::warn!("Cannot attach menu: {}", e);
                }
            }
        }

        #[cfg(target_os = "linux")]
        {
            use gtk::prelude::*;
            use tao::platform::unix::WindowExtUnix;
            let gtk_window: &gtk::Window = window.gtk_window().upcast_ref();
            if let Err(e) = self.menu.init_for_gtk_window(gtk_window, window.default_vbox()) {
                tracing::warn!("Cannot attach menu: {}", e);
            }
        }

        #[cfg(target_os = "macos")]
        let _ = window;
    }
}

fn add_items(
    submenu: &Submenu,
    items: &[(&str, &str, MenuCommand)],
    commands: &mut HashMap<MenuId, MenuCommand>,
) -> Result<(), muda::Error> {
    for (label, accelerator, command) in items {
        let accelerator = accelerator.parse::<Accelerator>().ok();
        let item = MenuItem::new(*label, true, accelerator);
        submenu.append(&item)?;
        commands.insert(item.id().clone(), *command);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accelerators_parse() {
        for (label, accelerator, _) in VIEW_ITEMS.iter().chain(WINDOW_ITEMS) {
            assert!(
                accelerator.parse::<Accelerator>().is_ok(),
                "{} has an invalid accelerator {}",
                label,
                accelerator
            );
        }
    }

    #[test]
    fn test_every_command_has_an_item() {
        let labels: Vec<_> = VIEW_ITEMS
            .iter()
            .chain(WINDOW_ITEMS)
            .map(|(_, _, command)| *command)
            .collect();
        assert_eq!(labels.len(), 8);
        assert!(labels.contains(&MenuCommand::Quit));
        assert!(labels.contains(&MenuCommand::DevTools));
    }
}
