//! String interning for the serializer.
//!
//! All strings of one object live in a single UTF-8 blob; the string table
//! is a vector of cumulative byte offsets with one sentinel entry past the
//! last string, so entry `i` spans `table[i]..table[i + 1]`. Interning
//! dedupes: a path and a later reference to it share one entry.

use indexmap::IndexSet;
use osprey_object::StringId;

use crate::error::EmitError;

#[derive(Debug, Default)]
pub(crate) struct StringTableBuilder {
    strings: IndexSet<String>,
}

impl StringTableBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its stable id.
    pub(crate) fn intern(&mut self, s: &str) -> StringId {
        if let Some(index) = self.strings.get_index_of(s) {
            return StringId(index as u32);
        }
        let (index, _) = self.strings.insert_full(s.to_owned());
        StringId(index as u32)
    }

    pub(crate) fn len(&self) -> usize {
        self.strings.len()
    }

    /// Produce the blob and the offset table (count + 1 sentinel entries).
    pub(crate) fn finish(self) -> Result<(Vec<u8>, Vec<u8>), EmitError> {
        let blob_len: usize = self.strings.iter().map(|s| s.len()).sum();
        if u32::try_from(blob_len).is_err() {
            return Err(EmitError::StringBlobTooLarge(blob_len));
        }

        let mut blob = Vec::with_capacity(blob_len);
        let mut table = Vec::with_capacity((self.strings.len() + 1) * 4);
        for s in &self.strings {
            table.extend_from_slice(&(blob.len() as u32).to_le_bytes());
            blob.extend_from_slice(s.as_bytes());
        }
        table.extend_from_slice(&(blob.len() as u32).to_le_bytes());
        Ok((blob, table))
    }
}
