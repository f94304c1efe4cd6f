use std::env;

use anyhow::Result;

use gitling::git::repo::GitRepository;

pub fn run(path: Option<&str>) -> Result<()> {
    let repo_path = match path {
        Some(p) => p.into(),
        None => env::current_dir()?,
    };

    let repo = GitRepository::create(repo_path)?;
    println!("Initialized empty repository in {}", repo.gitdir.display());

    Ok(())
}
