use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use sha1::{Digest, Sha1};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::git::kvlm::{self, Kvlm};
use crate::git::repo::GitRepository;
use crate::git::tree::GitTree;

/// The four object kinds a Git-compatible object database stores.
///
/// Modeled as a closed, tagged sum rather than a trait-object hierarchy: dispatch on `kind()`/
/// pattern match, never on a virtual method a base type leaves unimplemented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitObject {
    Blob(Vec<u8>),
    Tree(GitTree),
    Commit(Kvlm),
    Tag(Kvlm),
}

impl GitObject {
    pub fn kind(&self) -> &'static str {
        match self {
            GitObject::Blob(_) => "blob",
            GitObject::Tree(_) => "tree",
            GitObject::Commit(_) => "commit",
            GitObject::Tag(_) => "tag",
        }
    }

    /// Produce the object's payload bytes (the part after the `kind SP len NUL` header).
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            GitObject::Blob(data) => data.clone(),
            GitObject::Tree(tree) => tree.serialize(),
            GitObject::Commit(kvlm) => kvlm::serialize(kvlm),
            GitObject::Tag(kvlm) => kvlm::serialize(kvlm),
        }
    }

    fn deserialize(kind: &str, payload: &[u8]) -> Result<Self> {
        match kind {
            "blob" => Ok(GitObject::Blob(payload.to_vec())),
            "tree" => Ok(GitObject::Tree(GitTree::deserialize(payload)?)),
            "commit" => Ok(GitObject::Commit(kvlm::parse(payload)?)),
            "tag" => Ok(GitObject::Tag(kvlm::parse(payload)?)),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

fn object_path(repo: &GitRepository, sha: &str) -> PathBuf {
    repo.gitdir
        .join("objects")
        .join(&sha[0..2])
        .join(&sha[2..])
}

/// Read and decode the object identified by `sha` (a 40-character lower-case hex digest).
pub fn read_object(repo: &GitRepository, sha: &str) -> Result<GitObject> {
    let path = object_path(repo, sha);
    log::debug!("reading object {sha} from {}", path.display());

    let compressed = fs::read(&path)?;

    let mut decoder = ZlibDecoder::new(&compressed[..]);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| Error::DecompressError(e.to_string()))?;

    let space = raw
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::MalformedHeader(format!("no space in header of object {sha}")))?;
    let kind = std::str::from_utf8(&raw[..space])?.to_string();

    let nul = raw[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|off| space + off)
        .ok_or_else(|| Error::MalformedHeader(format!("no NUL in header of object {sha}")))?;

    let declared_len: usize = std::str::from_utf8(&raw[space + 1..nul])?.parse()?;
    let payload = &raw[nul + 1..];

    if declared_len != payload.len() {
        return Err(Error::LengthMismatch {
            sha: sha.to_string(),
            declared: declared_len,
            actual: payload.len(),
        });
    }

    GitObject::deserialize(&kind, payload)
}

/// Frame, hash, and (if `persist`) write `obj` to the object database. Returns the object's
/// 40-character hex identifier.
pub fn write_object(repo: &GitRepository, obj: &GitObject, persist: bool) -> Result<String> {
    let payload = obj.serialize();
    let header = format!("{} {}\0", obj.kind(), payload.len());
    let framed = [header.as_bytes(), &payload[..]].concat();

    let mut hasher = Sha1::new();
    hasher.update(&framed);
    let sha = hex::encode(hasher.finalize());

    log::debug!("writing {} object as {sha}", obj.kind());

    if persist {
        let path = object_path(repo, &sha);
        if !path.exists() {
            let dir = path.parent().expect("object path always has a parent");
            fs::create_dir_all(dir)?;

            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&framed)?;
            let compressed = encoder.finish()?;

            let tmp_path = dir.join(format!(".tmp-{sha}"));
            {
                let mut tmp = File::create(&tmp_path)?;
                tmp.write_all(&compressed)?;
            }
            fs::rename(&tmp_path, &path)?;
        }
    }

    Ok(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> (TempDir, GitRepository) {
        let dir = TempDir::new().unwrap();
        let repo = GitRepository::create(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn blob_hash_matches_reference_git() {
        let (_dir, repo) = repo();
        let blob = GitObject::Blob(b"hello\n".to_vec());
        let sha = write_object(&repo, &blob, true).unwrap();

        assert_eq!(sha, "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(
            repo.gitdir
                .join("objects/ce/013625030ba8dba906f756967f9e9ca394464a")
                .exists()
        );
    }

    #[test]
    fn write_without_persist_reports_same_hash_as_persisted_write() {
        let (_dir, repo) = repo();
        let blob = GitObject::Blob(b"round trip me\n".to_vec());

        let dry_run_sha = write_object(&repo, &blob, false).unwrap();
        let persisted_sha = write_object(&repo, &blob, true).unwrap();

        assert_eq!(dry_run_sha, persisted_sha);
    }

    #[test]
    fn blob_round_trips_through_write_and_read() {
        let (_dir, repo) = repo();
        let blob = GitObject::Blob(b"some file contents".to_vec());
        let sha = write_object(&repo, &blob, true).unwrap();

        let read_back = read_object(&repo, &sha).unwrap();
        assert_eq!(read_back, blob);
    }

    #[test]
    fn rewriting_identical_content_is_not_an_error() {
        let (_dir, repo) = repo();
        let blob = GitObject::Blob(b"idempotent".to_vec());

        let first = write_object(&repo, &blob, true).unwrap();
        let second = write_object(&repo, &blob, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn reading_unknown_kind_fails() {
        let (_dir, repo) = repo();
        let path = repo.gitdir.join("objects/de/adbeef");
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let framed = b"widget 3\0abc";
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(framed).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let err = read_object(&repo, "deadbeef").unwrap_err();
        assert!(matches!(err, Error::UnknownKind(_)));
    }

    #[test]
    fn reading_object_with_bad_length_fails() {
        let (_dir, repo) = repo();
        let path = repo.gitdir.join("objects/de/adbeef");
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let framed = b"blob 99\0short";
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(framed).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let err = read_object(&repo, "deadbeef").unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { .. }));
    }

    #[test]
    fn tag_and_commit_share_kvlm_payload_shape() {
        let (_dir, repo) = repo();
        let mut kvlm = Kvlm::new();
        kvlm.insert(b"object".to_vec(), b"deadbeef".to_vec());
        kvlm.message = b"a tag\n".to_vec();

        let tag = GitObject::Tag(kvlm.clone());
        let sha = write_object(&repo, &tag, true).unwrap();
        let read_back = read_object(&repo, &sha).unwrap();

        match read_back {
            GitObject::Tag(round_tripped) => assert_eq!(round_tripped, kvlm),
            other => panic!("expected a Tag object, got {other:?}"),
        }
    }
}
