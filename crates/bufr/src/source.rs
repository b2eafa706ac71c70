//! Access to decoded BUFR subsets.
//!
//! Decoding BUFR is left to an external decoder. A [`SubsetSource`] walks
//! messages and subsets the way the NCEP BUFRLIB interface does: advance
//! to a message, load each of its subsets in turn, then read mnemonics from
//! the loaded subset.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{BufrError, BufrResult};

/// Message and subset cursor over decoded BUFR data.
pub trait SubsetSource {
    /// Move to the next message. `false` at end of input.
    fn advance(&mut self) -> BufrResult<bool>;

    /// Load the next subset of the current message. `false` when the
    /// message has no more subsets.
    fn load_subset(&mut self) -> BufrResult<bool>;

    /// Values of the space-separated `mnemonics` in the loaded subset, in
    /// order. Missing values are NaN.
    fn read_subset(&mut self, mnemonics: &str) -> BufrResult<Vec<f64>>;

    /// Every replication of `mnemonic` in the loaded subset.
    fn read_replicated(&mut self, mnemonic: &str) -> BufrResult<Vec<f64>>;
}

/// A mnemonic's value: one number, a replicated sequence, or missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Replicated(Vec<Option<f64>>),
    Missing(()),
}

/// One decoded subset, keyed by mnemonic.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Subset(pub HashMap<String, Value>);

impl Subset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mnemonic: &str, value: f64) -> Self {
        self.0.insert(mnemonic.to_string(), Value::Scalar(value));
        self
    }

    pub fn with_replicated(mut self, mnemonic: &str, values: &[f64]) -> Self {
        let values = values.iter().map(|v| Some(*v)).collect();
        self.0.insert(mnemonic.to_string(), Value::Replicated(values));
        self
    }

    fn scalar(&self, mnemonic: &str) -> f64 {
        match self.0.get(mnemonic) {
            Some(Value::Scalar(v)) => *v,
            Some(Value::Replicated(vs)) => vs.first().copied().flatten().unwrap_or(f64::NAN),
            Some(Value::Missing(())) | None => f64::NAN,
        }
    }

    fn replicated(&self, mnemonic: &str) -> Vec<f64> {
        match self.0.get(mnemonic) {
            Some(Value::Replicated(vs)) => vs.iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
            Some(Value::Scalar(v)) => vec![*v],
            Some(Value::Missing(())) | None => Vec::new(),
        }
    }
}

fn read_mnemonics(subset: Option<&Subset>, mnemonics: &str) -> BufrResult<Vec<f64>> {
    let subset = subset.ok_or(BufrError::NoSubset)?;
    Ok(mnemonics.split_whitespace().map(|m| subset.scalar(m)).collect())
}

/// Subsets held in memory, grouped by message.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    messages: Vec<Vec<Subset>>,
    message: Option<usize>,
    subset: Option<usize>,
}

impl MemorySource {
    pub fn new(messages: Vec<Vec<Subset>>) -> Self {
        Self {
            messages,
            message: None,
            subset: None,
        }
    }

    fn current(&self) -> Option<&Subset> {
        let m = self.message?;
        self.messages.get(m)?.get(self.subset?)
    }
}

impl SubsetSource for MemorySource {
    fn advance(&mut self) -> BufrResult<bool> {
        let next = self.message.map_or(0, |m| m + 1);
        self.message = Some(next);
        self.subset = None;
        Ok(next < self.messages.len())
    }

    fn load_subset(&mut self) -> BufrResult<bool> {
        let Some(subsets) = self.message.and_then(|m| self.messages.get(m)) else {
            return Ok(false);
        };
        let next = self.subset.map_or(0, |s| s + 1);
        self.subset = Some(next);
        Ok(next < subsets.len())
    }

    fn read_subset(&mut self, mnemonics: &str) -> BufrResult<Vec<f64>> {
        read_mnemonics(self.current(), mnemonics)
    }

    fn read_replicated(&mut self, mnemonic: &str) -> BufrResult<Vec<f64>> {
        let subset = self.current().ok_or(BufrError::NoSubset)?;
        Ok(subset.replicated(mnemonic))
    }
}

/// JSON-lines dump written by an external BUFR decoder.
///
/// Each line is one message: a JSON array of subsets, each an object
/// mapping mnemonics to a number, an array of numbers, or `null`.
///
/// ```text
/// [{"SAID": 223, "SIID": 570, "CLAT": 45.1, "CHNM": [1, 2], "TMBR": [190.2, null]}]
/// ```
pub struct DumpSource<R> {
    reader: R,
    line: usize,
    subsets: Vec<Subset>,
    subset: Option<usize>,
}

impl DumpSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> BufrResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "Opened BUFR dump");
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> DumpSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            subsets: Vec::new(),
            subset: None,
        }
    }
}

impl<R: BufRead> SubsetSource for DumpSource<R> {
    fn advance(&mut self) -> BufrResult<bool> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                self.subsets.clear();
                self.subset = None;
                return Ok(false);
            }
            self.line += 1;
            if !buf.trim().is_empty() {
                break;
            }
        }
        self.subsets = serde_json::from_str(buf.trim()).map_err(|e| BufrError::Dump {
            line: self.line,
            message: e.to_string(),
        })?;
        self.subset = None;
        Ok(true)
    }

    fn load_subset(&mut self) -> BufrResult<bool> {
        let next = self.subset.map_or(0, |s| s + 1);
        self.subset = Some(next);
        Ok(next < self.subsets.len())
    }

    fn read_subset(&mut self, mnemonics: &str) -> BufrResult<Vec<f64>> {
        read_mnemonics(self.subset.and_then(|s| self.subsets.get(s)), mnemonics)
    }

    fn read_replicated(&mut self, mnemonic: &str) -> BufrResult<Vec<f64>> {
        let subset = self
            .subset
            .and_then(|s| self.subsets.get(s))
            .ok_or(BufrError::NoSubset)?;
        Ok(subset.replicated(mnemonic))
    }
}
