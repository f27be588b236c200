//! Client-only preferences: navigation density and upload folder labels

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::resource::UploadKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct PreferenceData {
    sidebar_collapsed: bool,
    /// Keyed by upload kind (`images`, `videos`, `files`)
    folders: BTreeMap<String, Vec<String>>,
}

/// `preferences.toml`, saved after every change
#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
    data: PreferenceData,
}

impl Preferences {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("Invalid preferences file: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PreferenceData::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let text = toml::to_string_pretty(&self.data).context("Failed to encode preferences")?;
        super::write_file(&self.path, &text)
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.data.sidebar_collapsed
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) -> Result<()> {
        self.data.sidebar_collapsed = collapsed;
        self.save()
    }

    pub fn folders(&self, kind: UploadKind) -> &[String] {
        self.data
            .folders
            .get(kind.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Add a folder label; names are trimmed and unique per kind
    pub fn add_folder(&mut self, kind: UploadKind, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Folder name cannot be empty");
        }
        let folders = self.data.folders.entry(kind.as_str().to_string()).or_default();
        if folders.iter().any(|f| f == name) {
            bail!("Folder '{}' already exists in {}", name, kind.as_str());
        }
        folders.push(name.to_string());
        self.save()
    }

    pub fn remove_folder(&mut self, kind: UploadKind, name: &str) -> Result<()> {
        let Some(folders) = self.data.folders.get_mut(kind.as_str()) else {
            bail!("No folder '{}' in {}", name, kind.as_str());
        };
        let Some(pos) = folders.iter().position(|f| f == name.trim()) else {
            bail!("No folder '{}' in {}", name, kind.as_str());
        };
        folders.remove(pos);
        if folders.is_empty() {
            self.data.folders.remove(kind.as_str());
        }
        self.save()
    }
}
