use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// One indoor lighting zone.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    pub id: u8,
    pub label: String,
}

/// One door or gate actuator and its controller command id.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    pub id: u8,
    pub label: String,
}

/// Site inventory: which entities exist and how the operator sees them named.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub zones: HashMap<String, ZoneConfig>,
    pub access: HashMap<String, AccessConfig>,
    /// Devices with a manual-override toggle.
    pub overrides: Vec<String>,
    /// Outdoor light targets.
    pub outdoor: Vec<String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(filename: P) -> anyhow::Result<Self> {
        let handle = File::open(filename)?;
        let data: Config = serde_yaml::from_reader(handle)?;

        Ok(data)
    }
}
