//! Finding and decoding class files
//!
//! The loader takes paths to `.class` files, directories, and `.jar`/`.zip` archives, decodes
//! every class file it finds, and keeps the results by class name. Progress is reported to a
//! [`LoadListener`] as a nested sequence of events:
//!
//! ```text
//! begin_session
//!   begin_group        (one per path, archive, or nested archive)
//!     begin_file       (one per file in the group)
//!       begin_classfile
//!       end_classfile  (only when the class decoded successfully)
//!     end_file
//!   end_group
//! end_session
//! ```
//!
//! A file that fails to decode is logged and skipped: it does not stop the rest of the load.

mod directory;
mod jar;

use crate::jvm;
use crate::jvm::class_file::{ClassFile, ClassFileRepository};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io::BufReader;
use std::path::Path;

pub use jar::{select_entries, MANIFEST, VERSIONS_PREFIX};

#[derive(Debug)]
pub enum Error {
    ClassFile(jvm::Error),
    Io(std::io::Error),
    Archive(zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<jvm::Error> for Error {
    fn from(err: jvm::Error) -> Error {
        Error::ClassFile(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Error {
        Error::Archive(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::ClassFile(err) => err.fmt(f),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Archive(err) => write!(f, "bad archive: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ClassFile(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Archive(err) => Some(err),
        }
    }
}

/// Receives the progress of a load
///
/// Every method defaults to doing nothing. `group` is the name of the innermost enclosing group.
#[allow(unused_variables)]
pub trait LoadListener {
    fn begin_session(&mut self) {}

    /// `size` is the number of entries in the group, when it is known up front
    fn begin_group(&mut self, group: &str, size: Option<usize>) {}

    fn begin_file(&mut self, group: &str, filename: &str) {}

    fn begin_classfile(&mut self, group: &str, filename: &str) {}

    fn end_classfile(&mut self, group: &str, filename: &str, classfile: &ClassFile) {}

    fn end_file(&mut self, group: &str, filename: &str) {}

    fn end_group(&mut self, group: &str) {}

    fn end_session(&mut self) {}
}

/// Ignores every event
impl LoadListener for () {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderSettings {
    /// JDK release used to pick entries out of multi-release JARs (`None` picks the newest)
    pub target_jdk: Option<u16>,
}

/// What a file name says about how to load it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Class,
    Jar,
    Zip,
    Other,
}

impl FileKind {
    fn of(filename: &str) -> FileKind {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".class") {
            FileKind::Class
        } else if lower.ends_with(".jar") {
            FileKind::Jar
        } else if lower.ends_with(".zip") {
            FileKind::Zip
        } else {
            FileKind::Other
        }
    }
}

/// Loads class files and keeps them by dotted class name
pub struct ClassFileLoader {
    settings: LoaderSettings,
    classfiles: HashMap<String, ClassFile>,

    /// Names of the groups currently open, innermost last
    groups: Vec<String>,
}

impl ClassFileLoader {
    pub fn new(settings: LoaderSettings) -> ClassFileLoader {
        ClassFileLoader {
            settings,
            classfiles: HashMap::new(),
            groups: vec![],
        }
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// Load every path as part of one session
    pub fn load<P, I>(&mut self, paths: I, listener: &mut dyn LoadListener)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        log::debug!("Begin session");
        listener.begin_session();
        for path in paths {
            self.load_path(path.as_ref(), listener);
        }
        listener.end_session();
        log::debug!("End session");
    }

    /// Load a `.class` file, a directory tree, or a `.jar`/`.zip` archive
    ///
    /// Anything else is ignored.
    pub fn load_path(&mut self, path: &Path, listener: &mut dyn LoadListener) {
        let name = path.display().to_string();
        let outcome = if path.is_dir() {
            self.load_directory(path, listener)
        } else {
            match FileKind::of(&name) {
                FileKind::Class => {
                    self.begin_group(&name, Some(1), listener);
                    let outcome = fs::read(path)
                        .map_err(Error::from)
                        .map(|bytes| self.load_file(&name, &bytes, listener));
                    self.end_group(listener);
                    outcome
                }
                FileKind::Jar => self.load_archive_path(path, true, listener),
                FileKind::Zip => self.load_archive_path(path, false, listener),
                FileKind::Other => {
                    log::debug!("Ignoring '{}'", name);
                    Ok(())
                }
            }
        };
        if let Err(err) = outcome {
            log::warn!("Cannot load '{}': {}", name, err);
        }
    }

    fn load_archive_path(
        &mut self,
        path: &Path,
        multi_release: bool,
        listener: &mut dyn LoadListener,
    ) -> Result<()> {
        let file = fs::File::open(path)?;
        let name = path.display().to_string();
        self.load_archive(&name, BufReader::new(file), multi_release, listener)
    }

    /// Load one file found inside a group, dispatching on its name
    ///
    /// Nested archives become groups of their own. Files that are neither classes nor archives
    /// still produce file events.
    fn load_file(&mut self, filename: &str, bytes: &[u8], listener: &mut dyn LoadListener) {
        let group = self.current_group().to_owned();
        log::debug!("Begin file '{}'", filename);
        listener.begin_file(&group, filename);

        match FileKind::of(filename) {
            FileKind::Class => self.load_classfile(filename, bytes, listener),
            kind @ (FileKind::Jar | FileKind::Zip) => {
                let reader = std::io::Cursor::new(bytes);
                let jar = kind == FileKind::Jar;
                if let Err(err) = self.load_archive(filename, reader, jar, listener) {
                    log::warn!("Cannot load nested archive '{}': {}", filename, err);
                }
            }
            FileKind::Other => log::trace!("Skipping contents of '{}'", filename),
        }

        listener.end_file(&group, filename);
        log::debug!("End file '{}'", filename);
    }

    fn load_classfile(&mut self, filename: &str, bytes: &[u8], listener: &mut dyn LoadListener) {
        let group = self.current_group().to_owned();
        listener.begin_classfile(&group, filename);

        let decoded = ClassFile::read(&mut &bytes[..])
            .and_then(|classfile| Ok((classfile.class_name()?, classfile)));
        match decoded {
            Ok((class_name, classfile)) => {
                log::debug!("Loaded class '{}' from '{}'", class_name, filename);
                listener.end_classfile(&group, filename, &classfile);
                if self.classfiles.insert(class_name.clone(), classfile).is_some() {
                    log::debug!("Class '{}' replaced by the copy in '{}'", class_name, filename);
                }
            }
            Err(err) => log::warn!("Cannot load class from '{}': {}", filename, err),
        }
    }

    fn begin_group(&mut self, group: &str, size: Option<usize>, listener: &mut dyn LoadListener) {
        log::debug!("Begin group '{}' of size {:?}", group, size);
        listener.begin_group(group, size);
        self.groups.push(group.to_owned());
    }

    fn end_group(&mut self, listener: &mut dyn LoadListener) {
        if let Some(group) = self.groups.pop() {
            listener.end_group(&group);
            log::debug!("End group '{}'", group);
        }
    }

    fn current_group(&self) -> &str {
        self.groups.last().map_or("", String::as_str)
    }

    pub fn classfile(&self, name: &str) -> Option<&ClassFile> {
        self.classfiles.get(name)
    }

    /// Dotted names of all the loaded classes, sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classfiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Loaded classes, sorted by name
    pub fn classfiles(&self) -> Vec<&ClassFile> {
        self.class_names()
            .into_iter()
            .filter_map(|name| self.classfiles.get(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.classfiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classfiles.is_empty()
    }

    pub fn into_classfiles(self) -> HashMap<String, ClassFile> {
        self.classfiles
    }
}

impl ClassFileRepository for ClassFileLoader {
    fn get_classfile(&self, name: &str) -> Option<&ClassFile> {
        self.classfiles.get(name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Events(Vec<String>);

    impl LoadListener for Events {
        fn begin_group(&mut self, group: &str, size: Option<usize>) {
            self.0.push(format!("begin_group {} {:?}", group, size));
        }

        fn begin_file(&mut self, _group: &str, filename: &str) {
            self.0.push(format!("begin_file {}", filename));
        }

        fn begin_classfile(&mut self, _group: &str, filename: &str) {
            self.0.push(format!("begin_classfile {}", filename));
        }

        fn end_classfile(&mut self, _group: &str, filename: &str, _classfile: &ClassFile) {
            self.0.push(format!("end_classfile {}", filename));
        }

        fn end_file(&mut self, _group: &str, filename: &str) {
            self.0.push(format!("end_file {}", filename));
        }

        fn end_group(&mut self, group: &str) {
            self.0.push(format!("end_group {}", group));
        }
    }

    #[test]
    fn file_kinds() {
        assert_eq!(FileKind::of("a/B.class"), FileKind::Class);
        assert_eq!(FileKind::of("lib/x.JAR"), FileKind::Jar);
        assert_eq!(FileKind::of("x.zip"), FileKind::Zip);
        assert_eq!(FileKind::of("META-INF/MANIFEST.MF"), FileKind::Other);
    }

    #[test]
    fn bad_classfile_is_skipped() {
        let mut loader = ClassFileLoader::new(LoaderSettings::default());
        let mut events = Events::default();
        loader.begin_group("group", Some(1), &mut events);
        loader.load_file("Broken.class", &[0xca, 0xfe], &mut events);
        loader.end_group(&mut events);

        assert!(loader.is_empty());
        assert_eq!(
            events.0,
            vec![
                "begin_group group Some(1)",
                "begin_file Broken.class",
                "begin_classfile Broken.class",
                "end_file Broken.class",
                "end_group group",
            ]
        );
    }
}
