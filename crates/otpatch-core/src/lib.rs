//! # otpatch-core
//!
//! Size-preserving patch engine for the game client executable.
//!
//! This crate provides:
//! - Exact-match signature replacement (RSA key swap, anti-cheat hook)
//! - Embedded `name=value` property rewriting with space padding
//! - A strictly ordered patch pipeline with a pre-mutation backup
//! - A file-size invariant enforced after every mutation and before
//!   any write
//!
//! The executable is treated as an opaque byte sequence; there is no
//! PE/ELF model. Everything is located by literal signatures and ASCII
//! markers, and the total byte length of the file never changes.

pub mod backup;
pub mod buffer;
pub mod config;
pub mod error;
pub mod patcher;
pub mod property;
pub mod report;
pub mod signature;

pub use backup::{backup_path, write_backup};
pub use buffer::PatchBuffer;
pub use config::{KNOWN_PROPERTIES, MANDATORY_PROPERTIES, KeyConfig, PatchConfig};
pub use error::{Error, Result};
pub use patcher::{Patcher, PatcherConfig};
pub use property::{PADDING_BYTE, PropertyOccurrence, PropertySpec};
pub use report::{ItemKind, ItemReport, PatchOutcome, PatchReport};
pub use signature::{
    Signature, SignatureEntry, SignatureSet, builtin_signatures, format_pattern, load_signatures,
    parse_pattern, save_signatures,
};
