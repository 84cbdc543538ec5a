//! The patch pipeline.
//!
//! One `Patcher` run is a strict sequence: load the target, write the
//! backup, apply signatures, apply properties, re-check the size invariant,
//! write the result. Every fatal condition short-circuits before the final
//! write, so an aborted run leaves the target file exactly as it was; the
//! backup file is the only side effect that may already exist.

use std::path::Path;

use tracing::{info, warn};

use crate::backup;
use crate::buffer::PatchBuffer;
use crate::error::{Error, Result};
use crate::property::PropertySpec;
use crate::report::{ItemKind, PatchOutcome, PatchReport};
use crate::signature::Signature;

#[derive(Debug, Clone)]
pub struct PatcherConfig {
    /// Write a timestamped backup before mutating. On by default; scripted
    /// re-runs may turn it off when a backup already exists.
    pub backup: bool,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self { backup: true }
    }
}

pub struct Patcher {
    signatures: Vec<Signature>,
    properties: Vec<PropertySpec>,
    config: PatcherConfig,
}

impl Patcher {
    pub fn new(signatures: Vec<Signature>, properties: Vec<PropertySpec>) -> Self {
        Self::with_config(signatures, properties, PatcherConfig::default())
    }

    pub fn with_config(
        signatures: Vec<Signature>,
        properties: Vec<PropertySpec>,
        config: PatcherConfig,
    ) -> Self {
        Self {
            signatures,
            properties,
            config,
        }
    }

    /// Apply all configured edits to an in-memory buffer.
    ///
    /// Ends with the size-invariant check but performs no file I/O; `run`
    /// wraps this with load, backup and write.
    pub fn apply(&self, buffer: &mut PatchBuffer) -> Result<PatchReport> {
        let mut report = PatchReport::default();

        for signature in &self.signatures {
            let outcome = signature.apply(buffer);
            if outcome == PatchOutcome::NotFound {
                if signature.mandatory {
                    return Err(Error::SignatureMissing(signature.name.clone()));
                }
                warn!("Optional signature '{}' not found, skipping", signature.name);
                report.warn(format!("signature '{}' not found", signature.name));
            }
            report.record(&signature.name, ItemKind::Signature, outcome);
        }

        for property in &self.properties {
            let outcome = property.apply(buffer)?;
            if outcome == PatchOutcome::NotFound {
                if property.mandatory {
                    return Err(Error::PropertyMissing(property.name.clone()));
                }
                warn!("Property '{}' not found, skipping", property.name);
                report.warn(format!("property '{}' not found", property.name));
            }
            report.record(&property.name, ItemKind::Property, outcome);
        }

        buffer.check_size_invariant()?;
        Ok(report)
    }

    /// Patch the file at `target` in place.
    ///
    /// The target is only rewritten after every edit succeeded and the
    /// final length check passed; any error before that leaves it
    /// untouched on disk.
    pub fn run(&self, target: &Path) -> Result<PatchReport> {
        let mut buffer = PatchBuffer::read_from(target)?;
        info!("Loaded {} ({} bytes)", target.display(), buffer.len());

        let backup_path = if self.config.backup {
            Some(backup::write_backup(target, buffer.as_slice())?)
        } else {
            None
        };

        let mut report = self.apply(&mut buffer)?;
        report.backup_path = backup_path;

        buffer.write_to(target)?;
        info!(
            "Patched file written to {} ({} of {} edits applied)",
            target.display(),
            report.patched_count(),
            report.items.len(),
        );

        Ok(report)
    }
}
