use crate::error::{Error, Result};

/// One entry in a tree: a file mode, an entry name, and the 20 raw SHA-1 bytes it points at.
///
/// `mode` is kept as the raw bytes git wrote (`100644`, `40000`, ...) rather than normalized,
/// so re-serializing an entry reproduces its original bytes exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTreeLeaf {
    pub mode: Vec<u8>,
    pub name: Vec<u8>,
    pub id: [u8; 20],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTree {
    pub entries: Vec<GitTreeLeaf>,
}

impl GitTree {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Decode a tree's packed binary payload: repeated `mode SP name NUL id[20]` records.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        log::trace!("parsing tree payload of {} bytes", data.len());

        let mut entries = Vec::new();
        let mut pos = 0usize;

        while pos < data.len() {
            let space = data[pos..]
                .iter()
                .position(|&b| b == b' ')
                .map(|off| pos + off)
                .ok_or_else(|| Error::MalformedTree("expected space after mode".to_string()))?;
            let mode = data[pos..space].to_vec();
            if mode.len() != 5 && mode.len() != 6 {
                return Err(Error::MalformedTree(format!(
                    "mode has unexpected length: {:?}",
                    String::from_utf8_lossy(&mode)
                )));
            }

            let null = data[space + 1..]
                .iter()
                .position(|&b| b == 0)
                .map(|off| space + 1 + off)
                .ok_or_else(|| Error::MalformedTree("expected NUL after name".to_string()))?;
            let name = data[space + 1..null].to_vec();

            let id_start = null + 1;
            let id_end = id_start + 20;
            if id_end > data.len() {
                return Err(Error::MalformedTree(format!(
                    "incomplete id for entry {:?}",
                    String::from_utf8_lossy(&name)
                )));
            }
            let mut id = [0u8; 20];
            id.copy_from_slice(&data[id_start..id_end]);

            entries.push(GitTreeLeaf { mode, name, id });
            pos = id_end;
        }

        Ok(Self { entries })
    }

    /// Encode entries back to their packed binary form, in the order currently held.
    ///
    /// Callers that build a tree from scratch are responsible for sorting entries first;
    /// this only re-serializes whatever order they're already in.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(&entry.mode);
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(&entry.id);
        }
        out
    }
}
