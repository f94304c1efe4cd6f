use std::path::Path;

use anyhow::{Result, bail};

use gitling::git::checkout::checkout_tree;
use gitling::git::objects::{GitObject, read_object};
use gitling::git::repo::repo_find;

pub fn run(commit: &str) -> Result<()> {
    let repo = repo_find(".", true)?.expect("repo_find with required=true never returns None");

    let obj = read_object(&repo, commit)?;
    let kvlm = match obj {
        GitObject::Commit(kvlm) => kvlm,
        other => bail!("object {commit} is a {}, not a commit", other.kind()),
    };

    let tree_sha = kvlm.get(b"tree").expect("a commit always has a tree field");
    let tree_sha = std::str::from_utf8(tree_sha)?.to_string();
    let tree_obj = read_object(&repo, &tree_sha)?;

    let dest = Path::new(&repo.worktree).join("checkout");
    checkout_tree(&repo, &tree_obj, &dest)?;

    println!("Checked out {tree_sha} into {}", dest.display());
    Ok(())
}
