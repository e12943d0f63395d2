use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, Rgba, RgbaImage};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use terrain_forge::export::{GlbTerrainExporter, PlacementLog};
use terrain_forge::{GenError, GenerationSettings, GeneratorConfig, generate};

fn png(img: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("terrain-forge-it-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn assert_heights(settings: &GenerationSettings, expected: f32) {
    let generation = generate(settings, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
    assert_eq!(generation.height_field.width(), 4);
    assert_eq!(generation.height_field.height(), 4);
    for &h in generation.height_field.heights() {
        assert!((h - expected).abs() < 1e-2, "height {} should be about {}", h, expected);
    }
}

#[test]
fn mid_gray_heightmap_scenario() {
    // 128 / 255 is the closest 8-bit value to 0.5
    let heightmap = png(&RgbaImage::from_pixel(4, 4, Rgba([128, 128, 128, 255])));

    let mut settings = GenerationSettings::new(heightmap);
    assert_heights(&settings, 0.5);

    settings.invert_height = true;
    assert_heights(&settings, 0.5);

    settings.height_scale = 0.0;
    assert_heights(&settings, 0.0);
    settings.invert_height = false;
    assert_heights(&settings, 0.0);
}

#[test]
fn config_file_to_exported_scene() {
    let dir = scratch_dir("scene");

    // Gradient heightmap, not square, not a power of two
    let heightmap = RgbaImage::from_fn(24, 20, |x, _| {
        let v = (x * 10) as u8;
        Rgba([v, v, v, 255])
    });
    fs::write(dir.join("height.png"), png(&heightmap)).unwrap();

    // Left half forest, right half meadow
    let objects = RgbaImage::from_fn(32, 32, |x, _| {
        if x < 16 {
            Rgba([0, 128, 0, 255])
        } else {
            Rgba([255, 255, 0, 255])
        }
    });
    fs::write(dir.join("objects.png"), png(&objects)).unwrap();
    fs::write(dir.join("flowers.png"), png(&RgbaImage::from_pixel(5, 5, Rgba([255, 0, 255, 255]))))
        .unwrap();

    let config_path = dir.join("forge.toml");
    fs::write(
        &config_path,
        r#"
        heightmap = "height.png"
        max_height = 60.0
        generate_objects = true
        object_map = "objects.png"
        object_density = 0.04
        seed = 99

        [[elements]]
        name = "pine"
        color = [0.0, 0.5, 0.0, 1.0]
        tolerance = 0.05
        prefab = "PineTree"

        [[elements]]
        name = "flowers"
        color = [1.0, 1.0, 0.0, 1.0]
        tolerance = 0.05
        brush = "flowers.png"
        "#,
    )
    .unwrap();

    let config = GeneratorConfig::load(&config_path).unwrap();
    let settings = config.resolve(&dir).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap());
    let generation = generate(&settings, &mut rng).unwrap();

    // 24x20 rounds up to 32; 32 / (100 * 0.04) = 8 pixel tiles, 4x4 of them
    assert_eq!(generation.descriptor.heightmap_resolution, 32);
    assert_eq!(generation.placements.len(), 8);
    for placement in &generation.placements {
        assert_eq!(placement.prototype_id, "PineTree");
        assert!(placement.position.x >= 0.0 && placement.position.x < 16.0);
        assert!(placement.position.z >= 0.0 && placement.position.z < 32.0);
        assert!(placement.position.y >= 0.0 && placement.position.y <= 60.0);
    }

    let texture = generation.texture.as_ref().expect("flower brushes paint the ground");
    let magenta = glam::Vec4::new(1.0, 0.0, 1.0, 1.0);
    assert_eq!(texture.get(16, 0), Some(magenta));
    assert_eq!(texture.get(31, 24), Some(magenta));

    let out = dir.join("out");
    let mut terrain = GlbTerrainExporter::new(&out);
    let mut log = PlacementLog::default();
    generation.deliver(&mut terrain, &mut log).unwrap();
    log.save(&out.join("placements.json")).unwrap();

    assert!(out.join("terrain.glb").is_file());
    assert!(out.join("texture.png").is_file());
    assert!(out.join("terrain.json").is_file());
    assert_eq!(log.placements().len(), 8);
}

#[test]
fn missing_object_map_aborts_before_generation() {
    let dir = scratch_dir("missing-map");
    fs::write(dir.join("height.png"), png(&RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])))).unwrap();

    let config = GeneratorConfig {
        heightmap: PathBuf::from("height.png"),
        generate_objects: true,
        object_map: PathBuf::from("nowhere.png"),
        ..GeneratorConfig::default()
    };
    let err = config.resolve(&dir).unwrap_err();
    assert!(matches!(err, GenError::MissingResource { what: "object map", .. }), "got {:?}", err);
}
