use std::path::PathBuf;

use anyhow::{Result, bail};

use gitling::git::objects::{GitObject, write_object};
use gitling::git::repo::repo_find;

pub fn run(write: bool, object_type: &str, file: PathBuf) -> Result<()> {
    if object_type != "blob" {
        bail!("unsupported object type: {object_type}");
    }

    let data = std::fs::read(&file)?;
    let blob = GitObject::Blob(data);

    let repo = repo_find(".", true)?.expect("repo_find with required=true never returns None");
    let sha = write_object(&repo, &blob, write)?;
    println!("{sha}");

    Ok(())
}
