use super::{ClassFileLoader, FileKind, LoadListener, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

impl ClassFileLoader {
    /// Load every file under a directory, in file name order, as a single group
    pub(super) fn load_directory(
        &mut self,
        root: &Path,
        listener: &mut dyn LoadListener,
    ) -> Result<()> {
        let files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Skipping unreadable entry under '{}': {}", root.display(), err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();

        let group = root.display().to_string();
        self.begin_group(&group, Some(files.len()), listener);
        for file in &files {
            let filename = file.display().to_string();
            if FileKind::of(&filename) == FileKind::Other {
                self.load_file(&filename, &[], listener);
                continue;
            }
            match fs::read(file) {
                Ok(bytes) => self.load_file(&filename, &bytes, listener),
                Err(err) => log::warn!("Cannot read '{}': {}", filename, err),
            }
        }
        self.end_group(listener);
        Ok(())
    }
}
