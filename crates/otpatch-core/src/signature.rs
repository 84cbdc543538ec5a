//! Fixed byte-signature replacement.
//!
//! A signature is an equal-length `(pattern, replacement)` pair located by
//! exact match: the client's stock RSA key blob swapped for the server's
//! key, or the anti-cheat initialization hook with its conditional jump
//! flipped to an unconditional one. Equal length is a construction-time
//! precondition; it is what lets a signature swap never move another byte.
//!
//! Signatures come from three places: two raw key-blob files read off disk,
//! the built-in anti-cheat entry, or a JSON signature set of hex strings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::buffer::PatchBuffer;
use crate::error::{Error, Result};
use crate::report::PatchOutcome;

/// An exact-match byte substitution.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pattern: Vec<u8>,
    replacement: Vec<u8>,
    pub mandatory: bool,
}

impl Signature {
    pub fn new(
        name: impl Into<String>,
        pattern: Vec<u8>,
        replacement: Vec<u8>,
        mandatory: bool,
    ) -> Result<Self> {
        let name = name.into();
        if pattern.len() != replacement.len() {
            return Err(Error::LengthMismatch {
                name,
                pattern: pattern.len(),
                replacement: replacement.len(),
            });
        }
        if pattern.is_empty() {
            return Err(Error::Config(format!("Signature '{name}' is empty")));
        }
        Ok(Self {
            name,
            pattern,
            replacement,
            mandatory,
        })
    }

    /// Build a signature from two raw blob files, e.g. the stock RSA key and
    /// its replacement.
    pub fn from_key_files<P: AsRef<Path>>(
        name: impl Into<String>,
        pattern_path: P,
        replacement_path: P,
        mandatory: bool,
    ) -> Result<Self> {
        let pattern = fs::read(pattern_path)?;
        let replacement = fs::read(replacement_path)?;
        Self::new(name, pattern, replacement, mandatory)
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    /// Replace the first occurrence of the pattern in `buffer`.
    ///
    /// Already-patched buffers are recognized by the replacement being
    /// present instead of the pattern, so re-runs are no-ops rather than
    /// failures. Mandatory-miss handling is the orchestrator's job; this
    /// only reports what it saw.
    pub fn apply(&self, buffer: &mut PatchBuffer) -> PatchOutcome {
        if let Some(span) = buffer.find_span(0, &self.pattern) {
            debug!("Signature '{}' found at offset {:#x}", self.name, span.start);
            buffer.splice(span, &self.replacement);
            info!("Signature '{}' patched", self.name);
            PatchOutcome::Patched
        } else if buffer.contains(&self.replacement) {
            info!("Signature '{}' already patched", self.name);
            PatchOutcome::AlreadyPatched
        } else {
            debug!("Signature '{}' not present", self.name);
            PatchOutcome::NotFound
        }
    }
}

/// One signature in the on-disk JSON format, bytes as hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub mandatory: bool,
}

impl SignatureEntry {
    pub fn to_signature(&self) -> Result<Signature> {
        Signature::new(
            self.name.clone(),
            parse_pattern(&self.pattern)?,
            parse_pattern(&self.replacement)?,
            self.mandatory,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureSet {
    pub version: String,
    pub entries: Vec<SignatureEntry>,
}

impl SignatureSet {
    pub fn entry(&self, name: &str) -> Option<&SignatureEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn signatures(&self) -> Result<Vec<Signature>> {
        self.entries.iter().map(SignatureEntry::to_signature).collect()
    }
}

pub fn load_signatures<P: AsRef<Path>>(path: P) -> Result<SignatureSet> {
    let content = fs::read_to_string(&path)?;
    let data = serde_json::from_str(&content)?;
    Ok(data)
}

pub fn save_signatures<P: AsRef<Path>>(path: P, signatures: &SignatureSet) -> Result<()> {
    let content = serde_json::to_string_pretty(signatures)?;
    fs::write(path, content)?;
    Ok(())
}

/// Anti-cheat hook: jnz over the init call becomes jmp, skipping it.
const ANTICHEAT_HOOK: &str = "8D 4D B4 75 0E E8 5F 7B";
const ANTICHEAT_HOOK_DISABLED: &str = "8D 4D B4 EB 0E E8 5F 7B";

/// Built-in signature set for known client versions. The RSA key swap is
/// not here; it is file-based and always mandatory.
pub fn builtin_signatures() -> SignatureSet {
    SignatureSet {
        version: env!("CARGO_PKG_VERSION").to_string(),
        entries: vec![SignatureEntry {
            name: "anticheat-hook".to_string(),
            pattern: ANTICHEAT_HOOK.to_string(),
            replacement: ANTICHEAT_HOOK_DISABLED.to_string(),
            mandatory: false,
        }],
    }
}

pub fn parse_pattern(pattern: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        let value = u8::from_str_radix(token, 16)
            .map_err(|e| Error::Config(format!("Invalid signature token '{token}': {e}")))?;
        bytes.push(value);
    }

    if bytes.is_empty() {
        return Err(Error::Config("Signature pattern is empty".to_string()));
    }

    Ok(bytes)
}

pub fn format_pattern(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook_signature() -> Signature {
        builtin_signatures().entries[0].to_signature().unwrap()
    }

    #[test]
    fn test_parse_pattern() {
        let bytes = parse_pattern("8D 4D B4 75").unwrap();
        assert_eq!(bytes, vec![0x8D, 0x4D, 0xB4, 0x75]);
    }

    #[test]
    fn test_parse_pattern_rejects_garbage() {
        assert!(parse_pattern("8D ZZ").is_err());
        assert!(parse_pattern("").is_err());
    }

    #[test]
    fn test_format_pattern_roundtrip() {
        let pattern = vec![0x8D, 0x4D, 0xB4, 0xEB, 0x0E];
        let formatted = format_pattern(&pattern);
        assert_eq!(formatted, "8D 4D B4 EB 0E");
        assert_eq!(parse_pattern(&formatted).unwrap(), pattern);
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = Signature::new("bad", vec![1, 2, 3], vec![1, 2], false).unwrap_err();
        match err {
            Error::LengthMismatch {
                pattern,
                replacement,
                ..
            } => {
                assert_eq!(pattern, 3);
                assert_eq!(replacement, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_apply_patches_first_occurrence() {
        let sig = Signature::new("key", b"OLDKEY".to_vec(), b"NEWKEY".to_vec(), true).unwrap();
        let mut buf = PatchBuffer::new(b"xxOLDKEYyyOLDKEYzz".to_vec());
        assert_eq!(sig.apply(&mut buf), PatchOutcome::Patched);
        assert_eq!(buf.as_slice(), b"xxNEWKEYyyOLDKEYzz");
        assert!(buf.check_size_invariant().is_ok());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let sig = hook_signature();
        let mut buf = PatchBuffer::new({
            let mut v = b"head".to_vec();
            v.extend_from_slice(sig.pattern());
            v.extend_from_slice(b"tail");
            v
        });

        assert_eq!(sig.apply(&mut buf), PatchOutcome::Patched);
        let patched = buf.as_slice().to_vec();

        assert_eq!(sig.apply(&mut buf), PatchOutcome::AlreadyPatched);
        assert_eq!(buf.as_slice(), patched.as_slice());
    }

    #[test]
    fn test_apply_not_found() {
        let sig = hook_signature();
        let mut buf = PatchBuffer::new(b"no hooks here".to_vec());
        assert_eq!(sig.apply(&mut buf), PatchOutcome::NotFound);
    }

    #[test]
    fn test_signature_set_lookup() {
        let set = builtin_signatures();
        assert!(set.entry("ANTICHEAT-HOOK").is_some());
        assert!(set.entry("missing").is_none());
    }

    #[test]
    fn test_from_key_files() {
        use std::io::Write;

        let mut find = tempfile::NamedTempFile::new().unwrap();
        let mut replace = tempfile::NamedTempFile::new().unwrap();
        find.write_all(b"-----BEGIN RSA A-----").unwrap();
        replace.write_all(b"-----BEGIN RSA B-----").unwrap();

        let sig = Signature::from_key_files("rsa", find.path(), replace.path(), true).unwrap();
        assert_eq!(sig.pattern().len(), sig.replacement().len());
        assert!(sig.mandatory);
    }
}
