//! Depth-first directory walker with visitor-controlled pruning.

use anyhow::Context;
use std::fs::FileType;
use std::io;
use std::path::{Path, PathBuf};

/// What the walker should do after visiting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Do not descend into this directory. Ignored for non-directories.
    SkipSubtree,
}

/// Walks `root` depth-first in lexical order, root included.
///
/// The visitor sees every entry with its (non-followed) file type. A
/// directory whose listing fails is offered a second time with the error;
/// its children are then not visited. Only a root that cannot be
/// inspected at all aborts the walk.
pub fn walk<F>(root: &Path, mut visitor: F) -> anyhow::Result<()>
where
    F: FnMut(&Path, io::Result<FileType>) -> Visit,
{
    let root_type = std::fs::symlink_metadata(root)
        .with_context(|| format!("Failed to read {}", root.display()))?
        .file_type();
    walk_entry(root, Ok(root_type), &mut visitor);
    Ok(())
}

fn walk_entry<F>(path: &Path, file_type: io::Result<FileType>, visitor: &mut F)
where
    F: FnMut(&Path, io::Result<FileType>) -> Visit,
{
    let is_dir = matches!(&file_type, Ok(ft) if ft.is_dir());
    if visitor(path, file_type) == Visit::SkipSubtree || !is_dir {
        return;
    }

    let children = match read_children(path) {
        Ok(children) => children,
        Err(err) => {
            visitor(path, Err(err));
            return;
        }
    };

    for (child, child_type) in children {
        walk_entry(&child, child_type, visitor);
    }
}

fn read_children(dir: &Path) -> io::Result<Vec<(PathBuf, io::Result<FileType>)>> {
    let mut children = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| (e.path(), e.file_type())))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()));
    Ok(children)
}
