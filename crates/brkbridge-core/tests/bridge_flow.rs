#![forbid(unsafe_code)]

//! End-to-end flow over the core: admit packs the way the browser adapter
//! does, stage them, and drain them the way the module does.

use brkbridge_core::{BridgeCore, CatalogEntry, PackOrigin, header};

fn pack_bytes(name: &str, author: &str, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&header::encode_field(name));
    bytes.extend_from_slice(&header::encode_field(author));
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn picker_file_flows_through_to_the_module() {
    let mut bridge = BridgeCore::new();

    // "PACK" with a 255 terminator, as a picked file would carry it.
    let bytes = pack_bytes("PACK", "SOMEONE", &[0xAB; 64]);
    let id = bridge
        .add_pack("pack.brk", bytes.clone(), PackOrigin::FilePicker)
        .expect("picked .brk admits");

    // Single-file selection auto-stages.
    assert!(bridge.stage_entry(id));

    let pulled = bridge.pull_pending().expect("module poll finds the pack");
    assert_eq!(pulled, bytes);
    assert_eq!(header::PackHeader::parse(&pulled).name, "PACK");

    // Nothing staged after the pull: the sentinel path.
    assert_eq!(bridge.pull_pending(), None);
}

#[test]
fn export_of_a_pulled_pack_names_the_download() {
    // Inbound transfer: first 16 bytes "LVL" + terminator drive the filename.
    let bytes = pack_bytes("LVL", "", &[1, 2, 3]);
    assert_eq!(header::export_file_name(&bytes), "LVL.brk");
}

#[test]
fn defaults_and_picked_files_share_one_catalog() {
    let mut bridge = BridgeCore::new();

    let shipped = bridge
        .add_pack(
            "SPACE.brk",
            pack_bytes("SPACE", "HOUSE", &[0; 8]),
            PackOrigin::Prefetched,
        )
        .unwrap();
    let picked = bridge
        .add_pack(
            "custom.brk",
            pack_bytes("CUSTOM", "GUEST", &[1; 8]),
            PackOrigin::FilePicker,
        )
        .unwrap();

    let rows: Vec<_> = bridge
        .catalog()
        .entries()
        .iter()
        .map(|entry| (entry.file_name().to_owned(), entry.closable()))
        .collect();
    assert_eq!(
        rows,
        vec![("SPACE.brk".to_owned(), false), ("custom.brk".to_owned(), true)]
    );

    // Clicking one row then the other: whichever came last wins the slot.
    assert!(bridge.stage_entry(shipped));
    assert!(bridge.stage_entry(picked));
    let pulled = bridge.pull_pending().unwrap();
    assert_eq!(
        bridge.catalog().get(picked).map(CatalogEntry::bytes),
        Some(&pulled[..])
    );
}

#[test]
fn closing_a_row_does_not_unstage_its_bytes() {
    let mut bridge = BridgeCore::new();
    let id = bridge
        .add_pack(
            "custom.brk",
            pack_bytes("CUSTOM", "", &[5; 8]),
            PackOrigin::FilePicker,
        )
        .unwrap();

    assert!(bridge.stage_entry(id));
    assert!(bridge.remove_entry(id));

    // The staged copy survives removal; only the catalog row is gone.
    assert!(bridge.pull_pending().is_some());
    assert!(bridge.catalog().is_empty());
}
