//! ZIP and JAR archives
//!
//! A JAR whose manifest declares `Multi-Release: true` can hold several versions of a class:
//! the base entry `a/B.class` plus entries like `META-INF/versions/17/a/B.class` meant for
//! newer runtimes. Only one version of each class is loaded.

use super::{ClassFileLoader, LoadListener, Result};
use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};
use zip::ZipArchive;

pub const MANIFEST: &str = "META-INF/MANIFEST.MF";
pub const VERSIONS_PREFIX: &str = "META-INF/versions/";

impl ClassFileLoader {
    /// Load every file entry of an archive as one group
    ///
    /// `jar` enables multi-release handling (when the manifest asks for it).
    pub fn load_archive<R: Read + Seek>(
        &mut self,
        name: &str,
        reader: R,
        jar: bool,
        listener: &mut dyn LoadListener,
    ) -> Result<()> {
        let mut archive = ZipArchive::new(reader)?;
        let multi_release = jar && is_multi_release(&mut archive)?;
        let mut files = vec![];
        for index in 0..archive.len() {
            let entry = archive.by_index(index)?;
            if !entry.is_dir() {
                files.push((index, entry.name().to_owned()));
            }
        }
        let file_names: Vec<&str> = files.iter().map(|(_, name)| name.as_str()).collect();
        let selected: Vec<usize> =
            select_entries(&file_names, multi_release, self.settings.target_jdk)
                .into_iter()
                .map(|selected| files[selected].0)
                .collect();

        self.begin_group(name, Some(selected.len()), listener);
        for index in selected {
            let mut entry = archive.by_index(index)?;
            let filename = entry.name().to_owned();
            log::trace!("Reading '{}' ({} bytes)", filename, entry.size());
            let mut bytes = Vec::with_capacity(entry.size().min(1 << 20) as usize);
            match entry.read_to_end(&mut bytes) {
                Ok(_) => self.load_file(&filename, &bytes, listener),
                Err(err) => log::warn!("Cannot read '{}' in '{}': {}", filename, name, err),
            }
        }
        self.end_group(listener);
        Ok(())
    }
}

/// Does the main section of the manifest contain `Multi-Release: true`?
fn is_multi_release<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<bool> {
    let mut manifest = String::new();
    match archive.by_name(MANIFEST) {
        Ok(mut entry) => {
            entry.read_to_string(&mut manifest)?;
        }
        Err(zip::result::ZipError::FileNotFound) => return Ok(false),
        Err(err) => return Err(err.into()),
    }
    Ok(manifest_declares_multi_release(&manifest))
}

fn manifest_declares_multi_release(manifest: &str) -> bool {
    manifest
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .any(|(key, value)| {
            key.trim().eq_ignore_ascii_case("Multi-Release")
                && value.trim().eq_ignore_ascii_case("true")
        })
}

/// Split `META-INF/versions/<N>/<path>` into `N` and `path`
fn versioned_entry(name: &str) -> Option<(u16, &str)> {
    let rest = name.strip_prefix(VERSIONS_PREFIX)?;
    let (version, path) = rest.split_once('/')?;
    let version = version.parse().ok()?;
    if path.is_empty() {
        None
    } else {
        Some((version, path))
    }
}

/// Indices of the archive entries to load, in archive order
///
/// Without multi-release handling, every entry is loaded. With it, each class resolves to its
/// versioned entry with the highest `N` no greater than `target_jdk` (the highest `N` overall
/// when there is no target), falling back to the base entry. The chosen entry takes the place of
/// the base entry; a versioned class with no base entry is loaded where it first appears.
/// Versioned entries that aren't classes are left alone.
pub fn select_entries<S: AsRef<str>>(
    names: &[S],
    multi_release: bool,
    target_jdk: Option<u16>,
) -> Vec<usize> {
    if !multi_release {
        return (0..names.len()).collect();
    }

    // Best qualifying version of every versioned class
    let mut best: HashMap<&str, (u16, usize)> = HashMap::new();
    for (index, name) in names.iter().enumerate() {
        let (version, path) = match versioned_entry(name.as_ref()) {
            Some(versioned) if versioned.1.ends_with(".class") => versioned,
            _ => continue,
        };
        if target_jdk.map_or(false, |target| version > target) {
            continue;
        }
        let current = best.entry(path).or_insert((version, index));
        if version > current.0 {
            *current = (version, index);
        }
    }

    let all_names: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
    let mut selected = vec![];
    for (index, name) in names.iter().map(AsRef::as_ref).enumerate() {
        match versioned_entry(name) {
            Some((_, path)) if path.ends_with(".class") => {
                let chosen = best.get(path).map(|(_, chosen)| *chosen);
                if chosen == Some(index) && !all_names.contains(path) {
                    selected.push(index);
                } else {
                    log::trace!("Skipping shadowed entry '{}'", name);
                }
            }
            _ => selected.push(best.get(name).map_or(index, |(_, chosen)| *chosen)),
        }
    }
    selected
}

#[cfg(test)]
mod test {
    use super::*;

    const ENTRIES: [&str; 6] = [
        "META-INF/MANIFEST.MF",
        "META-INF/versions/9/test.class",
        "META-INF/versions/17/test.class",
        "META-INF/versions/21/test.class",
        "test.class",
        "other/Plain.class",
    ];

    fn selected_names(multi_release: bool, target_jdk: Option<u16>) -> Vec<&'static str> {
        select_entries(&ENTRIES, multi_release, target_jdk)
            .into_iter()
            .map(|index| ENTRIES[index])
            .collect()
    }

    #[test]
    fn newest_version_without_target() {
        assert_eq!(
            selected_names(true, None),
            vec![
                "META-INF/MANIFEST.MF",
                "META-INF/versions/21/test.class",
                "other/Plain.class"
            ]
        );
    }

    #[test]
    fn highest_version_up_to_target() {
        assert_eq!(
            selected_names(true, Some(19))[1],
            "META-INF/versions/17/test.class"
        );
        assert_eq!(
            selected_names(true, Some(17))[1],
            "META-INF/versions/17/test.class"
        );
    }

    #[test]
    fn base_entry_below_every_version() {
        assert_eq!(selected_names(true, Some(8))[1], "test.class");
    }

    #[test]
    fn plain_archives_load_everything() {
        assert_eq!(selected_names(false, Some(8)), ENTRIES.to_vec());
    }

    #[test]
    fn versioned_class_without_base() {
        let names = ["META-INF/versions/11/only/New.class", "a/B.class"];
        assert_eq!(select_entries(&names, true, Some(17)), vec![0, 1]);
        assert_eq!(select_entries(&names, true, Some(8)), vec![1]);
    }

    #[test]
    fn manifest_header() {
        assert!(manifest_declares_multi_release(
            "Manifest-Version: 1.0\r\nMulti-Release: true\r\n\r\n"
        ));
        assert!(!manifest_declares_multi_release("Manifest-Version: 1.0\n"));
        assert!(!manifest_declares_multi_release(
            "Manifest-Version: 1.0\n\nName: a/B.class\nMulti-Release: true\n"
        ));
    }
}
