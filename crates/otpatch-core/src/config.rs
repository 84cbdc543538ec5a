//! Patcher configuration file.
//!
//! A TOML file names the two key-blob files and the property values to
//! write. Property names are checked against the known client property
//! list here, before the engine runs; the engine itself only knows "found
//! or not found".

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::property::PropertySpec;
use crate::signature::Signature;

/// Property names that exist in supported client versions.
pub const KNOWN_PROPERTIES: &[&str] = &[
    "loginWebService",
    "clientWebService",
    "tibiaPageUrl",
    "tibiaStoreGetCoinsUrl",
    "getPremiumUrl",
    "createAccountUrl",
    "accessAccountUrl",
    "lostAccountUrl",
    "manualUrl",
    "faqUrl",
    "premiumFeaturesUrl",
    "crashReportUrl",
    "fpsHistoryRecipient",
    "cipSoftUrl",
];

/// Properties the client cannot log in without.
pub const MANDATORY_PROPERTIES: &[&str] = &["loginWebService"];

#[derive(Debug, Clone, Deserialize)]
pub struct KeyConfig {
    /// Blob holding the stock key to search for.
    pub find: PathBuf,
    /// Blob holding the replacement key, identical length.
    pub replace: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatchConfig {
    pub keys: KeyConfig,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl PatchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: PatchConfig =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for name in self.properties.keys() {
            if !KNOWN_PROPERTIES.contains(&name.as_str()) {
                return Err(Error::UnknownProperty(name.clone()));
            }
        }
        Ok(())
    }

    /// The configured property edits, with mandatory ones flagged.
    pub fn property_specs(&self) -> Vec<PropertySpec> {
        self.properties
            .iter()
            .map(|(name, value)| {
                let spec = PropertySpec::new(name, value);
                if MANDATORY_PROPERTIES.contains(&name.as_str()) {
                    spec.mandatory()
                } else {
                    spec
                }
            })
            .collect()
    }

    /// The mandatory key-swap signature, read from the configured blobs.
    pub fn key_signature(&self) -> Result<Signature> {
        Signature::from_key_files("rsa-key", &self.keys.find, &self.keys.replace, true)
    }
}
