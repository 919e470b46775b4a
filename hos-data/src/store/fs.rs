//! Capability-based directory creation for database files.

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Create the directory that will hold `database`, if it names one.
pub(crate) fn ensure_parent_dir(database: &Utf8Path) -> io::Result<()> {
    let Some(parent) = database.parent().filter(|dir| !dir.as_str().is_empty()) else {
        return Ok(());
    };
    let (root, relative) = split_root(parent);
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?.create_dir_all(&relative)
}

/// Split `dir` into the directory cap-std opens with ambient authority and
/// the path created beneath it.
fn split_root(dir: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let mut root = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in dir.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir => root.push(component),
            Utf8Component::CurDir => {}
            other => relative.push(other),
        }
    }
    if root.as_str().is_empty() {
        root.push(".");
    }
    (root, relative)
}
