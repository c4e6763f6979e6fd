//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terrain chunk generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "meshgen", about = "Procedural terrain chunk generator")]
pub struct CliArgs {
    /// Cells along each chunk side.
    #[arg(long)]
    pub side_length: Option<u32>,

    /// World-space height of a fully raised column.
    #[arg(long)]
    pub height_scale: Option<f64>,

    /// Noise seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Noise octave count (0-8).
    #[arg(long)]
    pub octaves: Option<u32>,

    /// Square texture size in texels.
    #[arg(long)]
    pub texture_size: Option<u32>,

    /// Number of frames to generate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Output directory for the PNG and buffer dumps.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(n) = args.side_length {
            self.chunk.side_length = n;
        }
        if let Some(h) = args.height_scale {
            self.chunk.height_scale = h;
        }
        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(octaves) = args.octaves {
            self.noise.octaves = octaves;
        }
        if let Some(size) = args.texture_size {
            self.chunk.texture_size = Some([size, size]);
        }
        if let Some(frames) = args.frames {
            self.demo.frames = frames;
        }
        if let Some(ref dir) = args.output {
            self.demo.output_dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
