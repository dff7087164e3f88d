//! Startup resources: the ordered list of shader sources the renderer needs,
//! and an async loader that either resolves all of them or fails.
//!
//! Loading is the first of two startup phases. The caller awaits
//! [`load_resources`] (typically through `pollster::block_on`) and only
//! builds the scene once it holds a complete [`ResourceBundle`].
//!
//! # Invariants
//! - A bundle is never partial: the first failing fetch aborts the load.
//! - Failures name the resource and path that could not be fetched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Bundle key of the static-surface vertex shader.
pub const SURFACE_VERTEX: &str = "vert_shader";
/// Bundle key of the static-surface fragment shader.
pub const SURFACE_FRAGMENT: &str = "frag_shader";
/// Bundle key of the light-sprite vertex shader.
pub const LIGHT_VERTEX: &str = "vertl_shader";
/// Bundle key of the light-sprite fragment shader.
pub const LIGHT_FRAGMENT: &str = "fragl_shader";

/// Errors from resource loading.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("failed to load resource {name:?} from {path}: {source}")]
    LoadFailure {
        name: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("resource {0:?} is not in the bundle")]
    Missing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of the startup list: the key the renderer looks it up by and where to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub path: String,
}

/// Ordered list of resources to fetch before the scene is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceList {
    pub entries: Vec<ResourceEntry>,
}

impl Default for ResourceList {
    /// The four shader sources the renderer needs.
    fn default() -> Self {
        Self::from_pairs(&[
            (SURFACE_VERTEX, "shaders/default.vert.wgsl"),
            (SURFACE_FRAGMENT, "shaders/default.frag.wgsl"),
            (LIGHT_VERTEX, "shaders/light.vert.wgsl"),
            (LIGHT_FRAGMENT, "shaders/light.frag.wgsl"),
        ])
    }
}

impl ResourceList {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(name, path)| ResourceEntry {
                    name: (*name).into(),
                    path: (*path).into(),
                })
                .collect(),
        }
    }

    /// Load a resource list from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Save the resource list as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ResourceError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where resource text comes from.
pub trait ResourceSource {
    /// Fetch the text at `path`.
    fn fetch(&self, path: &str) -> impl Future<Output = std::io::Result<String>>;
}

/// Reads resources from disk, relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSource for FsSource {
    fn fetch(&self, path: &str) -> impl Future<Output = std::io::Result<String>> {
        let full = self.root.join(path);
        async move { std::fs::read_to_string(full) }
    }
}

/// In-memory resources keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl ResourceSource for MemorySource {
    fn fetch(&self, path: &str) -> impl Future<Output = std::io::Result<String>> {
        let found = self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{path} not found"))
        });
        async move { found }
    }
}

/// Fully loaded resources, keyed by entry name.
#[derive(Debug, Clone, Default)]
pub struct ResourceBundle {
    entries: BTreeMap<String, String>,
}

impl ResourceBundle {
    /// Look up a resource by name.
    pub fn get(&self, name: &str) -> Result<&str, ResourceError> {
        self.entries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ResourceError::Missing(name.into()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the loaded resources in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Fetch every entry of `list` from `source`.
///
/// Returns the complete bundle, or the first failure. Nothing after a
/// failing entry is fetched.
pub async fn load_resources<S: ResourceSource>(
    list: &ResourceList,
    source: &S,
) -> Result<ResourceBundle, ResourceError> {
    let mut entries = BTreeMap::new();
    for entry in &list.entries {
        match source.fetch(&entry.path).await {
            Ok(text) => {
                tracing::debug!(name = %entry.name, path = %entry.path, bytes = text.len(), "resource loaded");
                entries.insert(entry.name.clone(), text);
            }
            Err(e) => {
                tracing::error!(name = %entry.name, path = %entry.path, "resource load failed: {e}");
                return Err(ResourceError::LoadFailure {
                    name: entry.name.clone(),
                    path: entry.path.clone(),
                    source: e,
                });
            }
        }
    }
    tracing::info!(count = entries.len(), "all resources loaded");
    Ok(ResourceBundle { entries })
}

/// The four shader sources, pulled out of a bundle by their well-known names.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub surface_vertex: String,
    pub surface_fragment: String,
    pub light_vertex: String,
    pub light_fragment: String,
}

impl ShaderSources {
    pub fn from_bundle(bundle: &ResourceBundle) -> Result<Self, ResourceError> {
        Ok(Self {
            surface_vertex: bundle.get(SURFACE_VERTEX)?.to_owned(),
            surface_fragment: bundle.get(SURFACE_FRAGMENT)?.to_owned(),
            light_vertex: bundle.get(LIGHT_VERTEX)?.to_owned(),
            light_fragment: bundle.get(LIGHT_FRAGMENT)?.to_owned(),
        })
    }
}

pub fn crate_info() -> &'static str {
    concat!("cityscape-assets v", env!("CARGO_PKG_VERSION"))
}
