/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Symbol identity and the symbol-table section's wire format.
//!
//! A symbol's id is derived from its name by hashing with SHA-256 and taking
//! the little-endian `u32` at bytes `[4..8)` of the digest. Two distinct
//! names landing on the same id is a fatal [`AssemblyError::Symbol`] — the
//! id space is 32 bits and collisions are assumed vanishingly rare, but
//! silently merging two symbols would corrupt every relocation that
//! targets either of them.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::errors::AssemblyError;

/// What kind of thing a symbol refers to, stored in its table entry so a
/// downstream linker or debugger can tell code labels from data labels
/// without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    Unknown,
    KnownPointer,
    UnknownPointer,
    Code,
    Data,
}

impl SymbolType {
    fn tag(self) -> u8 {
        match self {
            SymbolType::Unknown => 0,
            SymbolType::KnownPointer => 1,
            SymbolType::UnknownPointer => 2,
            SymbolType::Code => 3,
            SymbolType::Data => 4,
        }
    }
}

/// A single defined symbol: its derived id, the kind of thing it names, its
/// resolved address, and its source name (kept for the sentinel entry and
/// for error messages; not required to reconstruct the table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub id: u32,
    pub ty: SymbolType,
    pub address: u64,
    pub name: String,
}

impl SymbolEntry {
    /// Header word `name_words | (type << 16) | (id << 32)`, address word,
    /// then the name padded up to that word count.
    pub fn encode(&self) -> Result<Vec<u8>, AssemblyError> {
        // An empty name still emits one zero-filled name word rather than
        // zero words, so a reader can rely on every entry occupying at
        // least one name word after its two header words.
        let name_words = crate::util::updiv(self.name.len() as u64, 8).max(1);
        if name_words > 0xffff {
            return Err(AssemblyError::symbol(format!(
                "symbol `{}` has a name too long to encode ({} words)",
                self.name, name_words
            )));
        }

        let header = name_words | ((self.ty.tag() as u64) << 16) | ((self.id as u64) << 32);

        let mut out = Vec::with_capacity(16 + name_words as usize * 8);
        out.extend_from_slice(&header.to_le_bytes());
        out.extend_from_slice(&self.address.to_le_bytes());
        out.extend_from_slice(self.name.as_bytes());
        out.resize(out.len() + (name_words as usize * 8 - self.name.len()), 0);
        Ok(out)
    }
}

/// Derives a symbol's 32-bit id from its name. Exposed standalone so the
/// driver can compute an id for an unresolved reference (to embed inline via
/// `LinkerFlags::UnknownSymbol`) without needing a full table entry.
pub fn encode_symbol_id(name: &str) -> u32 {
    let digest = Sha256::digest(name.as_bytes());
    u32::from_le_bytes([digest[4], digest[5], digest[6], digest[7]])
}

/// The full set of symbols defined by one assembly run, keyed by name.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    ids: HashMap<u32, String>,
    by_name: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new symbol, deriving its id and checking for a collision
    /// against every symbol inserted so far. Re-inserting an already-known
    /// name just updates its type/address in place (used to move a skeleton
    /// entry's placeholder address to its final resolved value).
    pub fn insert(&mut self, name: &str, ty: SymbolType, address: u64) -> Result<(), AssemblyError> {
        if let Some(&index) = self.by_name.get(name) {
            self.entries[index].address = address;
            self.entries[index].ty = ty;
            return Ok(());
        }

        let id = encode_symbol_id(name);
        if let Some(existing) = self.ids.get(&id) {
            if existing != name {
                return Err(AssemblyError::symbol(format!(
                    "symbol id collision: `{}` and `{}` both hash to {:#010x}",
                    existing, name, id
                )));
            }
        }
        self.ids.insert(id, name.to_string());
        self.by_name.insert(name.to_string(), self.entries.len());
        self.entries.push(SymbolEntry {
            id,
            ty,
            address,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// The entry's position in insertion order, for relocations that need to
    /// reference a symbol by table index rather than by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    /// Appends the `.end` sentinel marking the logical end of the
    /// assembled address space, then serializes every entry in insertion
    /// order.
    pub fn encode(&self, end_address: u64) -> Result<Vec<u8>, AssemblyError> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend(entry.encode()?);
        }
        let sentinel = SymbolEntry {
            id: encode_symbol_id(".end"),
            ty: SymbolType::Unknown,
            address: end_address,
            name: ".end".to_string(),
        };
        out.extend(sentinel.encode()?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_hashes_to_same_id() {
        assert_eq!(encode_symbol_id("main"), encode_symbol_id("main"));
    }

    #[test]
    fn distinct_names_usually_hash_differently() {
        assert_ne!(encode_symbol_id("main"), encode_symbol_id("loop_start"));
    }

    #[test]
    fn insert_same_name_twice_updates_in_place() {
        let mut table = SymbolTable::new();
        table.insert("main", SymbolType::Code, 0).unwrap();
        table.insert("main", SymbolType::Code, 16).unwrap();
        assert_eq!(table.get("main").unwrap().address, 16);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn encode_pads_name_to_8_byte_words() {
        let mut table = SymbolTable::new();
        table.insert("ab", SymbolType::Code, 0x10).unwrap();
        let encoded = table.encode(0x20).unwrap();
        // header(8) + address(8) + name padded to one 8-byte word, then the
        // `.end` sentinel of the same shape.
        assert_eq!(encoded.len(), 24 + 24);
        assert_eq!(&encoded[16..18], b"ab");
        assert_eq!(&encoded[18..24], &[0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn empty_name_still_emits_one_zero_name_word() {
        let entry = SymbolEntry { id: 0, ty: SymbolType::Unknown, address: 0, name: String::new() };
        let encoded = entry.encode().unwrap();
        assert_eq!(encoded.len(), 24);
        assert_eq!(&encoded[16..24], &[0u8; 8]);
    }

    #[test]
    fn name_of_exactly_eight_bytes_serializes_as_one_word() {
        let entry = SymbolEntry {
            id: 0,
            ty: SymbolType::Unknown,
            address: 0,
            name: "abcdefgh".to_string(),
        };
        let encoded = entry.encode().unwrap();
        assert_eq!(encoded.len(), 24);
        assert_eq!(&encoded[16..24], b"abcdefgh");
    }

    #[test]
    fn encode_appends_end_sentinel_with_given_address() {
        let table = SymbolTable::new();
        let encoded = table.encode(0x1000).unwrap();
        assert_eq!(encoded.len(), 24);
        let address = u64::from_le_bytes(encoded[8..16].try_into().unwrap());
        assert_eq!(address, 0x1000);
    }

    #[test]
    fn header_word_packs_length_type_and_id() {
        let mut table = SymbolTable::new();
        table.insert("main", SymbolType::Code, 0).unwrap();
        let encoded = table.encode(0).unwrap();
        let header = u64::from_le_bytes(encoded[0..8].try_into().unwrap());
        let id = encode_symbol_id("main");
        assert_eq!(header & 0xffff, 1);
        assert_eq!((header >> 16) & 0xffff, SymbolType::Code.tag() as u64);
        assert_eq!(header >> 32, id as u64);
    }
}
