use ini::Ini;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A handle onto a Git-compatible repository: a worktree plus its `.git` metadata directory.
///
/// The repository owns no in-memory object cache; every read or write goes to disk.
#[derive(Debug, Clone)]
pub struct GitRepository {
    pub worktree: PathBuf,
    pub gitdir: PathBuf,
    pub config: Ini,
}

impl GitRepository {
    /// Open a repository rooted at `path`. Unless `force`, requires `path/.git` to already be a
    /// directory and `path/.git/config` to declare `repositoryformatversion = 0`.
    pub fn new<P: AsRef<Path>>(path: P, force: bool) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();
        let gitdir = worktree.join(".git");

        log::debug!("opening repository at {}", worktree.display());

        if !(force || gitdir.is_dir()) {
            return Err(Error::NotARepository(worktree.display().to_string()));
        }

        let config_path = gitdir.join("config");
        let config = if config_path.exists() {
            Ini::load_from_file(&config_path).map_err(|e| Error::MissingConfig(e.to_string()))?
        } else if force {
            Ini::new()
        } else {
            return Err(Error::MissingConfig(config_path.display().to_string()));
        };

        if !force {
            let version = config
                .get_from(Some("core"), "repositoryformatversion")
                .ok_or_else(|| Error::UnsupportedFormat("missing".to_string()))?;
            if version != "0" {
                return Err(Error::UnsupportedFormat(version.to_string()));
            }
        }

        Ok(GitRepository {
            worktree,
            gitdir,
            config,
        })
    }

    /// Create a fresh repository at `path`, which must either not exist or be an empty directory.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();

        log::debug!("creating repository at {}", worktree.display());

        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(Error::NotADirectory(worktree.display().to_string()));
            }
            if worktree.read_dir()?.next().is_some() {
                return Err(Error::NotEmpty(worktree.display().to_string()));
            }
        } else {
            create_dir_all(&worktree)?;
        }

        // mkdir=true, so each of these always creates and returns Some(path); the path itself
        // isn't needed here.
        let repo = GitRepository::new(&worktree, true)?;

        repo.repo_dir(&["branches"], true)?;
        repo.repo_dir(&["objects"], true)?;
        repo.repo_dir(&["refs", "tags"], true)?;
        repo.repo_dir(&["refs", "heads"], true)?;

        fs::write(
            repo.repo_path(&["description"]),
            "Unnamed repository; edit this file 'description' to name the repository.\n",
        )?;

        fs::write(repo.repo_path(&["HEAD"]), "ref: refs/heads/master\n")?;

        let mut config = Ini::new();
        config
            .with_section(Some("core"))
            .set("repositoryformatversion", "0")
            .set("filemode", "false")
            .set("bare", "false");
        config
            .write_to_file(repo.repo_path(&["config"]))
            .map_err(|e| Error::IOError(e.to_string()))?;

        GitRepository::new(&worktree, false)
    }

    /// Computes a path under `.git` from path components, without touching the filesystem.
    ///
    /// This doubles as the "file" path helper: every file this repository writes (`HEAD`,
    /// `config`, `description`, loose objects) lives under a directory `create` already made
    /// via `repo_dir`, so there's no on-demand parent-creating variant distinct from this one.
    pub fn repo_path(&self, segments: &[&str]) -> PathBuf {
        segments
            .iter()
            .fold(self.gitdir.clone(), |p, seg| p.join(seg))
    }

    /// Computes (and optionally creates) a directory under `.git`.
    ///
    /// Returns `Ok(Some(path))` when the directory exists (creating it first if `mkdir`),
    /// `Ok(None)` when it doesn't exist and `mkdir` is false, and `NotADirectory` when the path
    /// exists but isn't a directory.
    pub fn repo_dir(&self, segments: &[&str], mkdir: bool) -> Result<Option<PathBuf>> {
        let path = self.repo_path(segments);

        if mkdir && !path.exists() {
            create_dir_all(&path)?;
        }

        if !path.exists() {
            return Ok(None);
        }

        if !path.is_dir() {
            return Err(Error::NotADirectory(path.display().to_string()));
        }

        Ok(Some(path))
    }
}

/// Starting at `start`, walk up the directory tree until a `.git` directory is found.
///
/// Returns `Ok(None)` when no repository is found and `required` is false; fails with
/// `NotARepository` when `required` is true.
pub fn repo_find<P: AsRef<Path>>(start: P, required: bool) -> Result<Option<GitRepository>> {
    let path = fs::canonicalize(start.as_ref())?;
    repo_find_from(&path, required)
}

fn repo_find_from(path: &Path, required: bool) -> Result<Option<GitRepository>> {
    log::trace!("checking {} for a .git directory", path.display());

    if path.join(".git").is_dir() {
        return Ok(Some(GitRepository::new(path, false)?));
    }

    match path.parent() {
        Some(parent) if parent != path => repo_find_from(parent, required),
        _ => {
            if required {
                Err(Error::NotARepository(path.display().to_string()))
            } else {
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tempdir() -> TempDir {
        TempDir::new().expect("failed to create tempdir")
    }

    #[test]
    fn create_makes_the_expected_layout() {
        let dir = tempdir();
        let repo = GitRepository::create(dir.path()).unwrap();

        assert!(repo.gitdir.join("objects").is_dir());
        assert!(repo.gitdir.join("refs/heads").is_dir());
        assert!(repo.gitdir.join("refs/tags").is_dir());
        assert!(repo.gitdir.join("branches").is_dir());

        let head = fs::read_to_string(repo.gitdir.join("HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/master\n");

        assert_eq!(
            repo.config.get_from(Some("core"), "repositoryformatversion"),
            Some("0")
        );
    }

    #[test]
    fn create_on_nonempty_directory_fails() {
        let dir = tempdir();
        fs::write(dir.path().join("existing"), b"data").unwrap();

        let err = GitRepository::create(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotEmpty(_)));
    }

    #[test]
    fn open_rejects_unsupported_format_version() {
        let dir = tempdir();
        GitRepository::create(dir.path()).unwrap();

        let config_path = dir.path().join(".git/config");
        fs::write(
            &config_path,
            "[core]\nrepositoryformatversion = 1\nfilemode = false\nbare = false\n",
        )
        .unwrap();

        let err = GitRepository::new(dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn open_without_force_requires_gitdir() {
        let dir = tempdir();
        let err = GitRepository::new(dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::NotARepository(_)));
    }

    #[test]
    fn find_locates_repo_from_nested_subdirectory() {
        let dir = tempdir();
        GitRepository::create(dir.path()).unwrap();

        let nested = dir.path().join("a/b/c");
        create_dir_all(&nested).unwrap();

        let repo = repo_find(&nested, true).unwrap().unwrap();
        assert_eq!(
            fs::canonicalize(&repo.worktree).unwrap(),
            fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn find_idempotent_once_located() {
        let dir = tempdir();
        GitRepository::create(dir.path()).unwrap();

        let first = repo_find(dir.path(), true).unwrap().unwrap();
        let second = repo_find(&first.worktree, true).unwrap().unwrap();
        assert_eq!(first.worktree, second.worktree);
    }

    #[test]
    fn find_without_repo_and_required_fails() {
        let dir = tempdir();
        let err = repo_find(dir.path(), true).unwrap_err();
        assert!(matches!(err, Error::NotARepository(_)));
    }

    #[test]
    fn find_without_repo_and_not_required_returns_none() {
        let dir = tempdir();
        let result = repo_find(dir.path(), false).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn repo_dir_without_mkdir_on_absent_directory_returns_none() {
        let dir = tempdir();
        let repo = GitRepository::create(dir.path()).unwrap();

        let result = repo.repo_dir(&["refs", "remotes"], false).unwrap();
        assert!(result.is_none());
        assert!(!repo.gitdir.join("refs/remotes").exists());
    }

    #[test]
    fn repo_dir_without_mkdir_on_existing_directory_returns_some() {
        let dir = tempdir();
        let repo = GitRepository::create(dir.path()).unwrap();

        let result = repo.repo_dir(&["refs", "heads"], false).unwrap();
        assert_eq!(result, Some(repo.gitdir.join("refs/heads")));
    }

    #[test]
    fn repo_dir_on_path_occupied_by_a_file_fails() {
        let dir = tempdir();
        let repo = GitRepository::create(dir.path()).unwrap();
        fs::write(repo.gitdir.join("HEAD"), b"not a directory").unwrap();

        let err = repo.repo_dir(&["HEAD"], false).unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }
}
