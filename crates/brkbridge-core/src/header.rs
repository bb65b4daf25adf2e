#![forbid(unsafe_code)]

//! Codec for the fixed-width string fields at the front of a `.brk` pack.
//!
//! A pack opens with two 16-byte fields: the pack name (bytes 0..16) and the
//! author (bytes 16..32). Each byte is a character code; a field ends at the
//! first [`FIELD_TERMINATOR`] byte or at the field boundary, whichever comes
//! first. On encode, short fields are padded with the terminator byte, which
//! never corresponds to a representable character. Everything after the
//! header is opaque payload owned by the game module.

/// Width of one header string field, in bytes.
pub const FIELD_LEN: usize = 16;

/// Byte value that terminates (and pads) a header field.
pub const FIELD_TERMINATOR: u8 = 0xFF;

/// Total size of the name + author header.
pub const PACK_HEADER_LEN: usize = FIELD_LEN * 2;

/// File extension for level packs, without the dot.
pub const PACK_EXTENSION: &str = "brk";

/// Decode one fixed-width field.
///
/// Reads up to [`FIELD_LEN`] bytes, stopping early at the terminator or at the
/// end of `bytes`. Each byte maps to the char with the same code, so the
/// result always has at most [`FIELD_LEN`] characters. Input without a
/// terminator is not an error; the field is simply truncated at the boundary.
#[must_use]
pub fn decode_field(bytes: &[u8]) -> String {
    let mut field = String::with_capacity(FIELD_LEN);
    for &byte in bytes.iter().take(FIELD_LEN) {
        if byte == FIELD_TERMINATOR {
            break;
        }
        field.push(char::from(byte));
    }
    field
}

/// Encode a string into one fixed-width field, truncating past
/// [`FIELD_LEN`] bytes and padding the remainder with the terminator.
#[must_use]
pub fn encode_field(value: &str) -> [u8; FIELD_LEN] {
    let mut field = [FIELD_TERMINATOR; FIELD_LEN];
    let bytes = value.as_bytes();
    let len = bytes.len().min(FIELD_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Parsed name + author fields of a pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackHeader {
    /// Pack name (bytes 0..16).
    pub name: String,
    /// Pack author (bytes 16..32).
    pub author: String,
}

impl PackHeader {
    /// Parse both header fields from the front of a pack buffer.
    ///
    /// A buffer shorter than the header yields truncated (possibly empty)
    /// fields rather than an error.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Self {
        Self {
            name: decode_field(bytes),
            author: decode_field(bytes.get(FIELD_LEN..).unwrap_or_default()),
        }
    }
}

/// Derive the download file name for an exported pack buffer.
#[must_use]
pub fn export_file_name(bytes: &[u8]) -> String {
    format!("{}.{PACK_EXTENSION}", decode_field(bytes))
}

/// Return the stem of `file_name` when it carries the `.brk` extension
/// (case-insensitive), or `None` for anything else.
///
/// Only the part after the last dot counts as the extension, so
/// `archive.brk.txt` is rejected and a bare `brk` passes with an empty stem.
#[must_use]
pub fn pack_file_stem(file_name: &str) -> Option<&str> {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case(PACK_EXTENSION) => Some(stem),
        Some(_) => None,
        None if file_name.eq_ignore_ascii_case(PACK_EXTENSION) => Some(""),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn field_stops_at_terminator() {
        let mut bytes = [FIELD_TERMINATOR; 32];
        bytes[..4].copy_from_slice(b"PACK");
        assert_eq!(decode_field(&bytes), "PACK");
    }

    #[test]
    fn field_without_terminator_takes_full_width() {
        let bytes = [b'A'; 32];
        assert_eq!(decode_field(&bytes), "A".repeat(FIELD_LEN));
    }

    #[test]
    fn field_truncates_at_end_of_short_input() {
        assert_eq!(decode_field(b"LVL"), "LVL");
        assert_eq!(decode_field(&[]), "");
    }

    #[test]
    fn parse_reads_name_and_author() {
        let mut bytes = vec![FIELD_TERMINATOR; 40];
        bytes[..5].copy_from_slice(b"SPACE");
        bytes[FIELD_LEN..FIELD_LEN + 2].copy_from_slice(b"ME");
        let header = PackHeader::parse(&bytes);
        assert_eq!(header.name, "SPACE");
        assert_eq!(header.author, "ME");
    }

    #[test]
    fn parse_tolerates_buffer_shorter_than_header() {
        let header = PackHeader::parse(b"LVL");
        assert_eq!(header.name, "LVL");
        assert_eq!(header.author, "");
    }

    #[test]
    fn export_file_name_appends_extension() {
        let mut bytes = vec![FIELD_TERMINATOR; PACK_HEADER_LEN];
        bytes[..3].copy_from_slice(b"LVL");
        assert_eq!(export_file_name(&bytes), "LVL.brk");
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let field = encode_field("ALBUMS I LIKE");
        assert_eq!(decode_field(&field), "ALBUMS I LIKE");
    }

    #[test]
    fn encode_truncates_and_pads() {
        let field = encode_field("EXACTLY SEVENTEEN");
        assert_eq!(decode_field(&field), "EXACTLY SEVENTEE");

        let field = encode_field("HI");
        assert_eq!(&field[2..], &[FIELD_TERMINATOR; FIELD_LEN - 2]);
    }

    #[test]
    fn pack_file_stem_accepts_brk_case_insensitively() {
        assert_eq!(pack_file_stem("pack.brk"), Some("pack"));
        assert_eq!(pack_file_stem("SPACE.BRK"), Some("SPACE"));
        assert_eq!(pack_file_stem("a.b.Brk"), Some("a.b"));
    }

    #[test]
    fn pack_file_stem_rejects_other_extensions() {
        assert_eq!(pack_file_stem("notes.txt"), None);
        assert_eq!(pack_file_stem("archive.brk.txt"), None);
        assert_eq!(pack_file_stem("no_extension"), None);
    }

    proptest! {
        #[test]
        fn decode_never_panics_and_bounds_length(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let field = decode_field(&bytes);
            prop_assert!(field.chars().count() <= FIELD_LEN);
        }

        #[test]
        fn parse_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let header = PackHeader::parse(&bytes);
            prop_assert!(header.name.chars().count() <= FIELD_LEN);
            prop_assert!(header.author.chars().count() <= FIELD_LEN);
        }

        #[test]
        fn terminator_position_bounds_name(k in 0usize..FIELD_LEN) {
            let mut bytes = vec![b'Z'; PACK_HEADER_LEN];
            bytes[k] = FIELD_TERMINATOR;
            let header = PackHeader::parse(&bytes);
            prop_assert_eq!(header.name.len(), k);
        }
    }
}
