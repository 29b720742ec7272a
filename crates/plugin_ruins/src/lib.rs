//! # Ruins
//!
//! Spawns ruin models in chunks as they finish loading. Whether a chunk gets
//! a ruin, which model variant it gets and where it goes inside the chunk
//! all derive from seeded grid noise, so the same world seed always
//! produces the same ruins.
//!
//! Every `.cub` file in the model directory contributes six variants: as
//! loaded, rotated left, rotated right, rotated 180 degrees and mirrored on
//! either axis. A ruin is only placed when the ground under it is flat
//! enough.

pub mod noise;
pub mod settings;

use noise::noise;
use script_api::{
    BlockType, EventOutcome, HostEvent, ScriptError, ScriptHost, ServerScript, VoxelModel,
};
use settings::{RuinsSettings, SettingsError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SCRIPT_NAME: &str = "ruins";

/// Edge length of a chunk in blocks.
pub const CHUNK_SIZE: i64 = 256;

/// Largest height spread, relative to the model height, a ruin may stand on.
const MAX_SLOPE: f64 = 0.4;

/// Blocks the ground scan looks through.
const IGNORED_BLOCKS: [BlockType; 5] = [
    BlockType::Empty,
    BlockType::Water,
    BlockType::FlatWater,
    BlockType::Wood,
    BlockType::Leaf,
];

/// Orientation applied to a model after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    AsLoaded,
    RotateLeft,
    RotateRight,
    Rotate180,
    MirrorX,
    MirrorY,
}

impl Transform {
    pub const ALL: [Transform; 6] = [
        Transform::AsLoaded,
        Transform::RotateLeft,
        Transform::RotateRight,
        Transform::Rotate180,
        Transform::MirrorX,
        Transform::MirrorY,
    ];

    pub fn apply(self, model: &mut VoxelModel) {
        match self {
            Self::AsLoaded => {}
            Self::RotateLeft => model.rotate_left_z(),
            Self::RotateRight => model.rotate_right_z(),
            Self::Rotate180 => model.rotate_180_z(),
            Self::MirrorX => model.mirror_x(),
            Self::MirrorY => model.mirror_y(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelVariant {
    pub path: PathBuf,
    pub transform: Transform,
}

/// Lists the `.cub` files of `dir` in name order.
fn model_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_cub = path.extension().map_or(false, |ext| ext == "cub");
        if is_cub && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Lowest and highest ground level over the chunk-local area
/// `lx..=ux` x `ly..=uy`.
fn ground_heights(
    host: &dyn ScriptHost,
    origin: (i64, i64),
    lower: (i64, i64),
    upper: (i64, i64),
) -> (i64, i64) {
    let mut min = 100_000;
    let mut max = 0;
    for x in lower.0..=upper.0 {
        for y in lower.1..=upper.1 {
            let (wx, wy) = (origin.0 + x, origin.1 + y);
            let mut h = host.column_height(wx, wy);
            while h > 0 && IGNORED_BLOCKS.contains(&host.block_at(wx, wy, h - 1)) {
                h -= 1;
            }
            min = min.min(h);
            max = max.max(h);
        }
    }
    (min, max)
}

#[derive(Debug, Default)]
pub struct RuinsScript {
    settings: Option<RuinsSettings>,
    seed: i64,
    variants: Vec<ModelVariant>,
    models: HashMap<PathBuf, VoxelModel>,
}

impl RuinsScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variants(&self) -> &[ModelVariant] {
        &self.variants
    }

    fn model(&mut self, host: &mut dyn ScriptHost, variant: &ModelVariant) -> Option<VoxelModel> {
        if !self.models.contains_key(&variant.path) {
            match host.load_model(&variant.path) {
                Ok(model) => {
                    self.models.insert(variant.path.clone(), model);
                }
                Err(e) => {
                    warn!("Could not load ruin model: {}", e);
                    return None;
                }
            }
        }
        let mut model = self.models.get(&variant.path)?.clone();
        variant.transform.apply(&mut model);
        Some(model)
    }

    /// Tries to place a ruin in chunk `(cx, cy)`.
    fn populate_chunk(&mut self, host: &mut dyn ScriptHost, cx: i64, cy: i64) {
        let Some(threshold) = self.settings.as_ref().map(|s| s.threshold) else {
            return;
        };
        if self.variants.is_empty() {
            return;
        }
        let n = noise(self.seed, cx, cy);
        if n <= threshold {
            return;
        }

        let variant = self.variants[(n as usize) % self.variants.len()].clone();
        let Some(model) = self.model(host, &variant) else {
            return;
        };
        let size = model.size();

        let lower_x = noise(self.seed, cx + 21, cy - 42).min(CHUNK_SIZE - size.x as i64);
        let lower_y = noise(self.seed, cx - 42, cy + 21).min(CHUNK_SIZE - size.y as i64);
        let upper_x = lower_x + size.x as i64;
        let upper_y = lower_y + size.y as i64;

        let origin = (CHUNK_SIZE * cx, CHUNK_SIZE * cy);
        let (lower_z, upper_z) =
            ground_heights(host, origin, (lower_x, lower_y), (upper_x, upper_y));

        if ((upper_z - lower_z) as f64) >= MAX_SLOPE * size.z as f64 {
            debug!("Chunk ({}, {}) too steep for {:?}", cx, cy, variant.path);
            return;
        }
        let (x, y) = (origin.0 + lower_x, origin.1 + lower_y);
        debug!("Placing {:?} ({:?}) at ({}, {}, {})", variant.path, variant.transform, x, y, lower_z);
        host.place_model(&model, x, y, lower_z);
    }
}

impl ServerScript for RuinsScript {
    fn name(&self) -> &str {
        SCRIPT_NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn on_load(&mut self, host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
        let settings = RuinsSettings::load(host.data_store()).map_err(|e| match e {
            SettingsError::Data(e) => ScriptError::Data(e),
            other => ScriptError::Settings(other.to_string()),
        })?;

        let files = match model_files(&settings.model_path) {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not read ruin models from {:?}: {}", settings.model_path, e);
                Vec::new()
            }
        };
        self.variants = files
            .iter()
            .flat_map(|path| {
                Transform::ALL.iter().map(move |&transform| ModelVariant {
                    path: path.clone(),
                    transform,
                })
            })
            .collect();
        self.models.clear();
        self.seed = host.world_seed() as i64;

        info!(
            "Ruins loaded: {} models, {} variants, threshold {}",
            files.len(),
            self.variants.len(),
            settings.threshold
        );
        self.settings = Some(settings);
        Ok(())
    }

    fn on_event(
        &mut self,
        host: &mut dyn ScriptHost,
        event: &HostEvent,
    ) -> Result<EventOutcome, ScriptError> {
        if let HostEvent::ChunkLoad { x, y } = *event {
            self.populate_chunk(host, x, y);
        }
        Ok(EventOutcome::Continue)
    }
}
