use std::io::Write;

use anyhow::{Result, bail};

use gitling::git::objects::read_object;
use gitling::git::repo::repo_find;

pub fn run(object_type: &str, object: &str) -> Result<()> {
    let repo = repo_find(".", true)?.expect("repo_find with required=true never returns None");

    let obj = read_object(&repo, object)?;
    if obj.kind() != object_type {
        bail!("object {object} is a {}, not a {object_type}", obj.kind());
    }

    std::io::stdout().write_all(&obj.serialize())?;
    Ok(())
}
