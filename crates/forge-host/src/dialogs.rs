//! Native dialogs via `rfd`.

use forge_shell::collaborators::{
    CriticalErrorReporter, DirectoryListingCompletion, FileChooser, FileChooserCompletion,
};
use forge_shell::{ContentViewId, FileChooserMode, FileChooserParams};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::{Path, PathBuf};

/// Extensions named in an `accept` list; MIME types are skipped
pub fn accepted_extensions(accept_types: &[String]) -> Vec<String> {
    accept_types
        .iter()
        .filter_map(|t| t.trim().strip_prefix('.'))
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct RfdFileChooser;

impl FileChooser for RfdFileChooser {
    fn run_file_chooser(
        &self,
        view: ContentViewId,
        params: &FileChooserParams,
        completion: FileChooserCompletion,
    ) {
        let mut dialog = FileDialog::new();
        if let Some(title) = &params.title {
            dialog = dialog.set_title(title);
        }
        if let Some(path) = &params.default_path {
            dialog = dialog.set_directory(path);
        }
        let extensions = accepted_extensions(&params.accept_types);
        if !extensions.is_empty() {
            dialog = dialog.add_filter("Accepted files", &extensions);
        }

        let chosen: Vec<PathBuf> = match params.mode {
            FileChooserMode::Open => dialog.pick_file().into_iter().collect(),
            FileChooserMode::OpenMultiple => dialog.pick_files().unwrap_or_default(),
            FileChooserMode::OpenFolder => dialog.pick_folder().into_iter().collect(),
            FileChooserMode::Save => dialog.save_file().into_iter().collect(),
        };
        tracing::debug!("{:?} chooser for {} returned {} paths", params.mode, view, chosen.len());
        completion(chosen);
    }

    fn enumerate_directory(
        &self,
        view: ContentViewId,
        request_id: i32,
        path: &Path,
        completion: DirectoryListingCompletion,
    ) {
        let entries = match std::fs::read_dir(path) {
            Ok(dir) => {
                let mut entries: Vec<PathBuf> = dir
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .collect();
                entries.sort();
                entries
            }
            Err(e) => {
                tracing::warn!(
                    "Listing {} for {} (request {}) failed: {}",
                    path.display(),
                    view,
                    request_id,
                    e
                );
                Vec::new()
            }
        };
        completion(entries);
    }
}

pub struct RfdErrorReporter;

impl CriticalErrorReporter for RfdErrorReporter {
    fn report(&self, title: &str, content: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(title)
            .set_description(content)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
