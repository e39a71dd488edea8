use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tillage_core::{Crop, CropKind, SUN_MAX, WATER_MAX};

const SUPPORTED_CATALOG_VERSION: u32 = 1;

/// Crops the player can choose from, ordered by name.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CropCatalog {
    crops: BTreeMap<String, Crop>,
}

impl CropCatalog {
    /// Catalog used when no file is supplied.
    pub(crate) fn builtin() -> Self {
        let crops = [("flower", 3, 1), ("grass", 1, 1), ("tree", 5, 2)]
            .into_iter()
            .map(|(name, min_sun, min_water)| {
                (
                    name.to_owned(),
                    Crop::new(CropKind::new(name), min_sun, min_water),
                )
            })
            .collect();
        Self { crops }
    }

    /// Reads and validates a catalog file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read crop catalog at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid crop catalog at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(contents).context("failed to parse crop catalog toml contents")?;
        if manifest.version != SUPPORTED_CATALOG_VERSION {
            bail!(
                "unsupported crop catalog version {}; expected {}",
                manifest.version,
                SUPPORTED_CATALOG_VERSION
            );
        }
        if manifest.crops.is_empty() {
            bail!("crop catalog defines no crops");
        }

        let mut crops = BTreeMap::new();
        for (name, entry) in manifest.crops {
            if name.trim().is_empty() {
                bail!("crop names must not be blank");
            }
            if entry.min_sun > SUN_MAX {
                bail!("crop `{name}` needs sun {} but cells top out at {SUN_MAX}", entry.min_sun);
            }
            if entry.min_water > WATER_MAX {
                bail!(
                    "crop `{name}` needs water {} but cells top out at {WATER_MAX}",
                    entry.min_water
                );
            }
            let crop = Crop::new(CropKind::new(name.clone()), entry.min_sun, entry.min_water);
            let _ = crops.insert(name, crop);
        }
        Ok(Self { crops })
    }

    /// Crop registered under `name`.
    pub(crate) fn get(&self, name: &str) -> Option<&Crop> {
        self.crops.get(name)
    }

    /// Crop selected when a session starts.
    pub(crate) fn first(&self) -> Option<&Crop> {
        self.crops.values().next()
    }

    /// Every crop in name order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Crop> {
        self.crops.values()
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    crops: BTreeMap<String, CropEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CropEntry {
    min_sun: u8,
    min_water: u8,
}
