//! Newick tree files

use std::fs;
use std::io::Read;
use std::path::Path;

use ensview_tree::Tree;
use tracing::debug;

use crate::error::IoResult;
use crate::matrix::open;

/// Read a tree from a Newick file
pub fn read_newick(path: &Path) -> IoResult<Tree> {
    let mut text = String::new();
    open(path)?.read_to_string(&mut text)?;
    let tree = Tree::from_newick(text.trim())?;
    debug!(path = %path.display(), terminals = tree.terminals().len(), "read tree");
    Ok(tree)
}

/// Write `tree` as a single-line Newick file
pub fn write_newick(path: &Path, tree: &Tree) -> IoResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}\n", tree.to_newick()))?;
    Ok(())
}
