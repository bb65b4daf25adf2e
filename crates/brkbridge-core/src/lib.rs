#![forbid(unsafe_code)]

//! `brkbridge-core` is the deterministic core of the level transfer bridge
//! between a WASM game module and the browser page hosting it.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) feeds loaded pack
//!   bytes in; the module pulls them at a time of its own choosing.
//! - **Single-slot delivery**: one pending buffer at a time, overwrite on
//!   stage, consume on take (see [`mailbox::PackMailbox`]).
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate intentionally does not bind to `wasm-bindgen`. It provides the
//! building blocks that `brkbridge-web` wraps with a stable JS API, and is
//! fully testable on native targets.

#[cfg(feature = "config")]
pub mod config;

pub mod catalog;
pub mod header;
pub mod mailbox;

pub use catalog::{CatalogEntry, EntryId, PackCatalog, PackOrigin};
pub use header::PackHeader;
pub use mailbox::PackMailbox;

/// Errors rejecting a buffer at catalog admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// File name does not carry the `.brk` extension.
    UnsupportedFile(String),
    /// Buffer too small to hold the name + author header.
    PackTooSmall {
        /// Length of the rejected buffer.
        len: usize,
    },
}

impl core::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedFile(name) => {
                write!(f, "not a .{} pack: {name}", header::PACK_EXTENSION)
            }
            Self::PackTooSmall { len } => write!(
                f,
                "pack of {len} bytes is not larger than its {}-byte header",
                header::PACK_HEADER_LEN
            ),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Catalog + mailbox state behind the bridge's exported functions.
///
/// All operations are synchronous; the browser adapter performs its
/// asynchronous reads first and hands finished buffers in.
#[derive(Debug, Default, Clone)]
pub struct BridgeCore {
    mailbox: PackMailbox,
    catalog: PackCatalog,
}

impl BridgeCore {
    /// Create a bridge with nothing loaded and nothing staged.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mailbox: PackMailbox::new(),
            catalog: PackCatalog::new(),
        }
    }

    /// Admit a loaded buffer into the catalog.
    ///
    /// Admission applies to every producer: the file name must carry the
    /// `.brk` extension and the buffer must be larger than the 32-byte
    /// header. The author label for the catalog row is parsed from the
    /// header here. Admission does not stage the buffer.
    pub fn add_pack(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
        origin: PackOrigin,
    ) -> Result<EntryId, BridgeError> {
        if header::pack_file_stem(file_name).is_none() {
            return Err(BridgeError::UnsupportedFile(file_name.to_owned()));
        }
        if bytes.len() <= header::PACK_HEADER_LEN {
            return Err(BridgeError::PackTooSmall { len: bytes.len() });
        }

        let author = PackHeader::parse(&bytes).author;
        #[cfg(feature = "tracing")]
        tracing::debug!(file_name, len = bytes.len(), %author, "pack admitted");
        Ok(self.catalog.add(file_name, author, origin, bytes))
    }

    /// Stage a catalog entry's bytes for the module's next pull.
    ///
    /// Returns `false` when the entry no longer exists.
    pub fn stage_entry(&mut self, id: EntryId) -> bool {
        let Some(entry) = self.catalog.get(id) else {
            return false;
        };
        let bytes = entry.bytes().to_vec();
        self.mailbox.stage(bytes);
        true
    }

    /// Stage raw bytes directly, bypassing the catalog.
    pub fn stage_bytes(&mut self, bytes: Vec<u8>) {
        self.mailbox.stage(bytes);
    }

    /// Outbound pull: take the staged buffer, if any.
    pub fn pull_pending(&mut self) -> Option<Vec<u8>> {
        let pulled = self.mailbox.try_take();
        #[cfg(feature = "tracing")]
        tracing::trace!(served = pulled.is_some(), "module pulled pending buffer");
        pulled
    }

    /// Drop a catalog entry. Any already-staged copy of its bytes stays
    /// staged; removal only affects the catalog.
    pub fn remove_entry(&mut self, id: EntryId) -> bool {
        self.catalog.remove(id)
    }

    #[must_use]
    pub const fn catalog(&self) -> &PackCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn mailbox(&self) -> &PackMailbox {
        &self.mailbox
    }
}
