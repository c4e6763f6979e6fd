//! Generates a strip of terrain chunks and writes the last frame to disk.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p meshgen-demo -- --side-length 64 --frames 120`.

mod export;

use clap::Parser;
use meshgen_chunk::{ChunkGenerator, DVec3, Rgba8, TerrainVertex};
use meshgen_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

use crate::export::{DemoError, write_chunk};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    if let Err(e) = meshgen_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config))
    {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run(&config) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), DemoError> {
    let mut generator = ChunkGenerator::from_config(config)?;
    let desc = generator.describe_geometry()?;
    let (width, height) = generator.describe_texture();
    info!(
        side_length = desc.side_length,
        vertices = desc.vertex_count,
        faces = desc.face_count,
        texture = %format!("{width}x{height}"),
        "buffers described"
    );

    let mut vertices = vec![TerrainVertex::default(); desc.vertex_count];
    let mut indices = vec![0u32; desc.index_count()];
    let mut texels = vec![Rgba8::default(); width as usize * height as usize];

    let step = DVec3::from_array(config.demo.offset_step);
    let mut offset = DVec3::ZERO;
    let frames = config.demo.frames.max(1);
    for frame in 0..frames {
        generator.fill(&mut vertices, &mut indices, &mut texels, offset)?;
        if frame + 1 < frames {
            offset += step;
        }
    }
    info!(frames, ?offset, "frames generated");

    let written = write_chunk(
        &config.demo.output_dir,
        &vertices,
        &indices,
        &texels,
        width,
        height,
    )?;
    for path in written {
        info!(path = %path.display(), "wrote");
    }

    generator.destroy();
    Ok(())
}
