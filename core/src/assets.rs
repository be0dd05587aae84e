//! Asset collaborator. The engine never loads models itself; actors ask
//! an `AssetSource` for the clip metadata they need during setup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

pub const FISH_FLOP_CLIP: &str = "fish_flop";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub name:          String,
    pub duration_secs: f32,
}

pub trait AssetSource {
    fn clip(&self, name: &str) -> SimResult<ClipInfo>;
}

/// Clip table keyed by name. Built in code or loaded from
/// `{data_dir}/assets/clips.json`.
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: HashMap<String, ClipInfo>,
}

#[derive(Debug, Deserialize)]
struct ClipsFile {
    clips: Vec<ClipInfo>,
}

impl ClipLibrary {
    /// The clips shipped with the scene.
    pub fn builtin() -> Self {
        Self::default().with_clip(FISH_FLOP_CLIP, 0.6)
    }

    pub fn with_clip(mut self, name: &str, duration_secs: f32) -> Self {
        self.clips.insert(name.to_string(), ClipInfo {
            name: name.to_string(),
            duration_secs,
        });
        self
    }

    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/assets/clips.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: ClipsFile = serde_json::from_str(&content)?;
        let clips = file
            .clips
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();
        Ok(Self { clips })
    }
}

impl AssetSource for ClipLibrary {
    fn clip(&self, name: &str) -> SimResult<ClipInfo> {
        let info = self.clips.get(name).ok_or_else(|| SimError::AssetLoad {
            name:   name.to_string(),
            reason: "no such clip".into(),
        })?;
        if !(info.duration_secs > 0.0) {
            return Err(SimError::AssetLoad {
                name:   name.to_string(),
                reason: format!("non-positive duration {}", info.duration_secs),
            });
        }
        Ok(info.clone())
    }
}
