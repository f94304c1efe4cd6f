use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::git::objects::{GitObject, read_object};
use crate::git::repo::GitRepository;
use crate::git::tree::GitTree;

/// Recursively materialize `tree_obj` into `dest_dir`.
///
/// `dest_dir` must not exist, or exist and be empty; this never overwrites a populated
/// directory.
pub fn checkout_tree(repo: &GitRepository, tree_obj: &GitObject, dest_dir: &Path) -> Result<()> {
    let tree = match tree_obj {
        GitObject::Tree(tree) => tree,
        other => {
            return Err(Error::MalformedTree(format!(
                "checkout target is a {}, not a tree",
                other.kind()
            )));
        }
    };

    if dest_dir.exists() {
        if !dest_dir.is_dir() {
            return Err(Error::NotADirectory(dest_dir.display().to_string()));
        }
        if dest_dir.read_dir()?.next().is_some() {
            return Err(Error::NotEmpty(dest_dir.display().to_string()));
        }
    } else {
        fs::create_dir_all(dest_dir)?;
    }

    checkout_into(repo, tree, dest_dir)
}

fn checkout_into(repo: &GitRepository, tree: &GitTree, dest_dir: &Path) -> Result<()> {
    for entry in &tree.entries {
        let entry_sha = hex::encode(entry.id);
        let name = String::from_utf8_lossy(&entry.name);
        let entry_path = dest_dir.join(name.as_ref());

        log::trace!("checking out {name} ({entry_sha})");
        let obj = read_object(repo, &entry_sha)?;

        match obj {
            GitObject::Tree(subtree) => {
                fs::create_dir_all(&entry_path)?;
                checkout_into(repo, &subtree, &entry_path)?;
            }
            GitObject::Blob(data) => {
                fs::write(&entry_path, data)?;
            }
            other => {
                return Err(Error::MalformedTree(format!(
                    "tree entry {name:?} points at a {}, expected tree or blob",
                    other.kind()
                )));
            }
        }
    }

    Ok(())
}
