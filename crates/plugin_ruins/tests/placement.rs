use plugin_ruins::{RuinsScript, Transform};
use script_api::{BlockType, HostEvent, LocalWorld, ModelSize, ServerScript};
use std::path::Path;
use tempfile::TempDir;

const SEED: u32 = 7;

/// `.cub` bytes of a 4x2x10 model with a single voxel.
fn tower_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    for dim in [4u32, 2, 10] {
        bytes.extend_from_slice(&dim.to_le_bytes());
    }
    let mut voxels = vec![0u8; 4 * 2 * 10 * 3];
    voxels[..3].copy_from_slice(&[200, 180, 150]);
    bytes.extend_from_slice(&voxels);
    bytes
}

struct Setup {
    _dir: TempDir,
    world: LocalWorld,
    script: RuinsScript,
}

fn setup(threshold: i64, write_model: bool) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("models");
    std::fs::create_dir(&models).unwrap();
    if write_model {
        std::fs::write(models.join("tower.cub"), tower_bytes()).unwrap();
    }
    write_settings(dir.path(), &models, threshold);

    let mut world = LocalWorld::new(dir.path()).with_seed(SEED);
    let mut script = RuinsScript::new();
    script.on_load(&mut world).unwrap();
    Setup { _dir: dir, world, script }
}

fn write_settings(data_dir: &Path, models: &Path, threshold: i64) {
    std::fs::write(
        data_dir.join("ruins.toml"),
        format!(
            "version = 1\nthreshold = {}\nmodel_path = \"{}\"\n",
            threshold,
            models.display()
        ),
    )
    .unwrap();
}

fn load_chunk(s: &mut Setup, x: i64, y: i64) {
    s.script
        .on_event(&mut s.world, &HostEvent::ChunkLoad { x, y })
        .unwrap();
}

#[test]
fn test_every_model_has_six_variants() {
    let s = setup(0, true);
    let transforms: Vec<Transform> = s.script.variants().iter().map(|v| v.transform).collect();
    assert_eq!(transforms, Transform::ALL.to_vec());
}

#[test]
fn test_ruin_placed_on_flat_ground() {
    let mut s = setup(0, true);
    load_chunk(&mut s, 0, 0);

    // noise 8 picks the right rotated variant.
    let placed = s.world.placed_models();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].size, ModelSize { x: 2, y: 4, z: 10 });
    assert_eq!((placed[0].x, placed[0].y, placed[0].z), (31, 124, 64));
}

#[test]
fn test_ground_scan_skips_foliage_and_water() {
    let mut s = setup(0, true);
    s.world.set_block(31, 124, 63, BlockType::Leaf);
    s.world.set_block(31, 124, 62, BlockType::Water);
    load_chunk(&mut s, 0, 0);

    let placed = s.world.placed_models();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].z, 62);
}

#[test]
fn test_steep_ground_is_rejected() {
    let mut s = setup(0, true);
    // Chunk (1, 1) puts a mirrored tower at local (100, 106).
    s.world.set_column_height(358, 363, 80);
    load_chunk(&mut s, 1, 1);
    assert!(s.world.placed_models().is_empty());

    s.world.set_column_height(358, 363, 67);
    load_chunk(&mut s, 1, 1);
    let placed = s.world.placed_models();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].size, ModelSize { x: 4, y: 2, z: 10 });
    assert_eq!((placed[0].x, placed[0].y, placed[0].z), (356, 362, 64));
}

#[test]
fn test_threshold_blocks_everything() {
    let mut s = setup(127, true);
    for x in 0..6 {
        for y in 0..3 {
            load_chunk(&mut s, x, y);
        }
    }
    assert!(s.world.placed_models().is_empty());
}

#[test]
fn test_no_models_means_no_ruins() {
    let mut s = setup(0, false);
    assert!(s.script.variants().is_empty());
    load_chunk(&mut s, 0, 0);
    assert!(s.world.placed_models().is_empty());
}

#[test]
fn test_placement_is_deterministic() {
    let mut a = setup(0, true);
    let mut b = setup(0, true);
    for x in -3..3 {
        for y in -3..3 {
            load_chunk(&mut a, x, y);
            load_chunk(&mut b, x, y);
        }
    }
    assert!(!a.world.placed_models().is_empty());
    assert_eq!(a.world.placed_models(), b.world.placed_models());
}
