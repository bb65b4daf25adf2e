#![no_main]

use brkbridge_core::header::{FIELD_LEN, PackHeader, decode_field, export_file_name};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes to the header codec.
    // Parsing must never panic regardless of input, and field lengths are
    // bounded by the fixed field width.
    let header = PackHeader::parse(data);
    assert!(header.name.chars().count() <= FIELD_LEN);
    assert!(header.author.chars().count() <= FIELD_LEN);

    // The derived download name always ends with the pack extension.
    let file_name = export_file_name(data);
    assert!(file_name.ends_with(".brk"));

    // Field decode agrees with full-header parse on the name field.
    assert_eq!(decode_field(data), header.name);
});
