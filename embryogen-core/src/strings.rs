//! The strings dictionary (§6's "new-type-hash announce" wire message,
//! §5's "independently maintained per process" model), grounded in the
//! original `StringsDictionary`/`hashedString`.
//!
//! A hash→string map split into a `known` (already synchronised) half
//! and a `new` (pending broadcast) half. Add-only: nothing is ever
//! removed.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use embryogen_concepts::errors::IndexError;

/// Padded-fixed-length buffer size for the wire representation of an
/// agent-type string (§6: "256-byte buffer").
pub const STRINGS_IMPRINT_SIZE: usize = 256;

pub fn hash_string(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Default, Clone)]
pub struct StringsDictionary {
    known: BTreeMap<u64, String>,
    new: BTreeMap<u64, String>,
}

impl StringsDictionary {
    pub fn new() -> Self {
        StringsDictionary::default()
    }

    pub fn translate_id_to_string(&self, id: u64) -> Result<&str, IndexError> {
        self.known
            .get(&id)
            .or_else(|| self.new.get(&id))
            .map(|s| s.as_str())
            .ok_or_else(|| IndexError::new(format!("string with hash {id} is not in the dictionary")))
    }

    /// No-op if `s` is already known or pending, mirroring the
    /// original's "don't add anything if it is already in the
    /// Dictionary".
    pub fn register_this_string(&mut self, s: &str) {
        let id = hash_string(s);
        if !self.known.contains_key(&id) && !self.new.contains_key(&id) {
            self.new.insert(id, s.to_string());
        }
    }

    pub fn known_dictionary(&self) -> &BTreeMap<u64, String> {
        &self.known
    }

    pub fn new_dictionary(&self) -> &BTreeMap<u64, String> {
        &self.new
    }

    pub fn how_many_should_be_broadcast(&self) -> usize {
        self.new.len()
    }

    pub fn these_should_be_broadcast(&self) -> &BTreeMap<u64, String> {
        &self.new
    }

    /// Moves every pending entry into `known`, emptying `new`.
    pub fn mark_all_was_broadcast(&mut self) {
        for (hash, s) in std::mem::take(&mut self.new) {
            self.known.insert(hash, s);
        }
    }

    /// Receiving side: enlists an incoming `(hash, string)` pair
    /// straight into `known`. If the hash is already known, checks the
    /// two strings actually agree — a mismatch is a fatal consistency
    /// error (§7: "dictionary mismatches across peers are fatal").
    pub fn enlist_the_incoming_item(&mut self, hash: u64, s: &str) -> Result<(), IndexError> {
        match self.known.get(&hash) {
            None => {
                self.known.insert(hash, s.to_string());
                Ok(())
            }
            Some(existing) if existing == s => Ok(()),
            Some(existing) => Err(IndexError::new(format!(
                "hashing malfunction: have >>{existing}<< and got >>{s}<<, both of hash {hash}"
            ))),
        }
    }
}

/// Pads (with zero bytes) or truncates `s` into a fixed `STRINGS_IMPRINT_SIZE`
/// buffer for the wire format (§6).
pub fn imprint_into_buffer(s: &str) -> [u8; STRINGS_IMPRINT_SIZE] {
    let mut buf = [0u8; STRINGS_IMPRINT_SIZE];
    let bytes = s.as_bytes();
    let copy_len = bytes.len().min(STRINGS_IMPRINT_SIZE);
    buf[..copy_len].copy_from_slice(&bytes[..copy_len]);
    buf
}

pub fn read_imprinted_buffer(buf: &[u8; STRINGS_IMPRINT_SIZE]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_twice_is_a_no_op() {
        let mut dict = StringsDictionary::new();
        dict.register_this_string("NucleusAgent");
        dict.register_this_string("NucleusAgent");
        assert_eq!(dict.how_many_should_be_broadcast(), 1);
    }

    #[test]
    fn broadcast_cycle_moves_new_into_known() {
        let mut dict = StringsDictionary::new();
        dict.register_this_string("NucleusAgent");
        assert_eq!(dict.how_many_should_be_broadcast(), 1);
        dict.mark_all_was_broadcast();
        assert_eq!(dict.how_many_should_be_broadcast(), 0);
        assert!(dict.known_dictionary().values().any(|v| v == "NucleusAgent"));
    }

    #[test]
    fn enlisting_a_mismatched_string_for_a_known_hash_errors() {
        let mut dict = StringsDictionary::new();
        let hash = hash_string("NucleusAgent");
        dict.enlist_the_incoming_item(hash, "NucleusAgent").unwrap();
        let err = dict.enlist_the_incoming_item(hash, "SomethingElse");
        assert!(err.is_err());
    }

    #[test]
    fn imprint_roundtrips_through_padding() {
        let buf = imprint_into_buffer("NucleusAgent");
        assert_eq!(read_imprinted_buffer(&buf), "NucleusAgent");
    }
}
