//! Voxel models and terrain block types.
//!
//! Models use the `.cub` layout: three little-endian `u32` dimensions
//! (x, y, z) followed by one RGB triple per voxel, iterated z-major, then y,
//! then x. An all-zero triple is an empty voxel.

use thiserror::Error;

/// Terrain block categories the host reports for a world column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Empty,
    Solid,
    Water,
    FlatWater,
    Wood,
    Leaf,
}

/// Extent of a model in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model data truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("model has a zero dimension")]
    Empty,
}

/// A block model that can be transformed and placed into the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelModel {
    size: ModelSize,
    voxels: Vec<Option<[u8; 3]>>,
}

impl VoxelModel {
    /// Creates an empty model of the given size.
    pub fn new(size: ModelSize) -> Self {
        let count = (size.x * size.y * size.z) as usize;
        Self { size, voxels: vec![None; count] }
    }

    /// Decodes a model from `.cub` bytes.
    pub fn from_cub_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        if bytes.len() < 12 {
            return Err(ModelError::Truncated { expected: 12, actual: bytes.len() });
        }
        let dim = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let size = ModelSize { x: dim(0), y: dim(4), z: dim(8) };
        if size.x == 0 || size.y == 0 || size.z == 0 {
            return Err(ModelError::Empty);
        }

        let count = (size.x * size.y * size.z) as usize;
        let expected = 12 + count * 3;
        if bytes.len() < expected {
            return Err(ModelError::Truncated { expected, actual: bytes.len() });
        }

        let mut model = Self::new(size);
        let mut offset = 12;
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let rgb = [bytes[offset], bytes[offset + 1], bytes[offset + 2]];
                    offset += 3;
                    if rgb != [0, 0, 0] {
                        model.set(x, y, z, Some(rgb));
                    }
                }
            }
        }
        Ok(model)
    }

    pub fn size(&self) -> ModelSize {
        self.size
    }

    fn index(&self, x: u32, y: u32, z: u32) -> usize {
        ((z * self.size.y + y) * self.size.x + x) as usize
    }

    /// Voxel color at the given model coordinate.
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<[u8; 3]> {
        self.voxels[self.index(x, y, z)]
    }

    pub fn set(&mut self, x: u32, y: u32, z: u32, voxel: Option<[u8; 3]>) {
        let index = self.index(x, y, z);
        self.voxels[index] = voxel;
    }

    /// Number of non-empty voxels.
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.is_some()).count()
    }

    /// Rebuilds the model with a coordinate mapping from old to new space.
    fn remap<F>(&self, size: ModelSize, map: F) -> Self
    where
        F: Fn(u32, u32, u32) -> (u32, u32, u32),
    {
        let mut out = Self::new(size);
        for z in 0..self.size.z {
            for y in 0..self.size.y {
                for x in 0..self.size.x {
                    let (nx, ny, nz) = map(x, y, z);
                    out.set(nx, ny, nz, self.get(x, y, z));
                }
            }
        }
        out
    }

    /// Rotates 90 degrees counter-clockwise around the z axis.
    pub fn rotate_left_z(&mut self) {
        let s = self.size;
        let size = ModelSize { x: s.y, y: s.x, z: s.z };
        *self = self.remap(size, |x, y, z| (s.y - 1 - y, x, z));
    }

    /// Rotates 90 degrees clockwise around the z axis.
    pub fn rotate_right_z(&mut self) {
        let s = self.size;
        let size = ModelSize { x: s.y, y: s.x, z: s.z };
        *self = self.remap(size, |x, y, z| (y, s.x - 1 - x, z));
    }

    /// Rotates 180 degrees around the z axis.
    pub fn rotate_180_z(&mut self) {
        let s = self.size;
        *self = self.remap(s, |x, y, z| (s.x - 1 - x, s.y - 1 - y, z));
    }

    /// Mirrors the model at the x plane.
    pub fn mirror_x(&mut self) {
        let s = self.size;
        *self = self.remap(s, |x, y, z| (s.x - 1 - x, y, z));
    }

    /// Mirrors the model at the y plane.
    pub fn mirror_y(&mut self) {
        let s = self.size;
        *self = self.remap(s, |x, y, z| (x, s.y - 1 - y, z));
    }
}
