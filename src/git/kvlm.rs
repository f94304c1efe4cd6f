use crate::error::{Error, Result};

/// A KVLM header value: most keys occur once, but a few (e.g. `parent` on a merge commit)
/// repeat. Modeled as a sum type instead of always paying for a `Vec` per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Single(Vec<u8>),
    Many(Vec<Vec<u8>>),
}

impl Value {
    fn first(&self) -> &[u8] {
        match self {
            Value::Single(v) => v,
            Value::Many(vs) => vs.first().map(|v| v.as_slice()).unwrap_or(&[]),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &[u8]> + '_> {
        match self {
            Value::Single(v) => Box::new(std::iter::once(v.as_slice())),
            Value::Many(vs) => Box::new(vs.iter().map(|v| v.as_slice())),
        }
    }
}

/// A commit or tag payload: an ordered list of key/value header pairs, a blank line, then a
/// free-form message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kvlm {
    pub headers: Vec<(Vec<u8>, Value)>,
    pub message: Vec<u8>,
}

impl Kvlm {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            message: Vec::new(),
        }
    }

    /// Append a value for `key`, preserving first-seen key order and folding repeats into
    /// `Value::Many`.
    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) {
        if let Some((_, existing)) = self.headers.iter_mut().find(|(k, _)| *k == key) {
            match existing {
                Value::Single(first) => {
                    *existing = Value::Many(vec![first.clone(), value]);
                }
                Value::Many(values) => values.push(value),
            }
            return;
        }
        self.headers.push((key, Value::Single(value)));
    }

    /// The first (or only) value for `key`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, v)| v.first())
    }

    /// Every value stored for `key`, in insertion order.
    pub fn values<'a>(&'a self, key: &[u8]) -> impl Iterator<Item = &'a [u8]> {
        self.headers
            .iter()
            .filter(move |(k, _)| k.as_slice() == key)
            .flat_map(|(_, v)| v.iter())
    }
}

/// Parse a KVLM payload: each header line is `key SP value NL`, with continuation lines
/// (`\n ` inside a value) folded back to bare `\n`. The blank line ending the header block
/// separates it from the free-form message.
pub fn parse(raw: &[u8]) -> Result<Kvlm> {
    log::trace!("parsing KVLM payload of {} bytes", raw.len());

    let mut kvlm = Kvlm::new();
    let mut pos = 0usize;

    if raw.is_empty() {
        return Ok(kvlm);
    }

    let next_new_line = |from: usize| -> Result<usize> {
        raw[from..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|off| from + off)
            .ok_or_else(|| Error::MalformedHeader("expected newline in KVLM".to_string()))
    };

    loop {
        let spc = raw[pos..]
            .iter()
            .position(|&b| b == b' ')
            .map(|off| pos + off);
        let nl = raw[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|off| pos + off);

        match (spc, nl) {
            (_, Some(nlpos)) if spc.map(|s| s > nlpos).unwrap_or(true) => {
                if nlpos != pos {
                    return Err(Error::MalformedHeader(
                        "expected blank line at headers/message boundary".to_string(),
                    ));
                }

                kvlm.message = raw.get(nlpos + 1..).unwrap_or(&[]).to_vec();
                break;
            }
            (Some(spcpos), Some(_nlpos)) => {
                let key = raw[pos..spcpos].to_vec();
                let mut end = spcpos;

                loop {
                    let nlpos = next_new_line(end + 1)?;
                    if nlpos + 1 < raw.len() && raw[nlpos + 1] == b' ' {
                        end = nlpos;
                    } else {
                        end = nlpos;
                        break;
                    }
                }

                let slice = &raw[spcpos + 1..end];
                let mut val = Vec::with_capacity(slice.len());
                let mut i = 0usize;
                while i < slice.len() {
                    if slice[i] == b'\n' && i + 1 < slice.len() && slice[i + 1] == b' ' {
                        val.push(b'\n');
                        i += 2;
                    } else {
                        val.push(slice[i]);
                        i += 1;
                    }
                }

                kvlm.insert(key, val);

                pos = end + 1;
                if pos >= raw.len() {
                    kvlm.message.clear();
                    break;
                }
            }
            _ => {
                return Err(Error::MalformedHeader(
                    "missing space or newline in header".to_string(),
                ));
            }
        }
    }

    Ok(kvlm)
}

/// Inverse of `parse`: re-fold bare `\n` in values back into `\n ` continuations.
pub fn serialize(kvlm: &Kvlm) -> Vec<u8> {
    log::trace!("serializing KVLM with {} header(s)", kvlm.headers.len());

    let mut out = Vec::new();

    for (k, v) in &kvlm.headers {
        for value in v.iter() {
            out.extend_from_slice(k);
            out.push(b' ');
            let mut i = 0usize;
            while i < value.len() {
                if value[i] == b'\n' {
                    out.push(b'\n');
                    out.push(b' ');
                } else {
                    out.push(value[i]);
                }
                i += 1;
            }
            out.push(b'\n');
        }
    }

    out.push(b'\n');
    out.extend_from_slice(&kvlm.message);
    out
}
