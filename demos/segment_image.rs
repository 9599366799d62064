//! Example: Segment an image file into hexagonally seeded superpixels
//!
//! Usage: `cargo run --example segment_image -- <input> [cell_size] [weight] [output]`
//!
//! Writes the input with segment boundaries painted green, plus a mosaic of
//! segment mean colors next to it.

use std::env;
use std::error::Error;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use flexi_logger::Logger;
use hex_vcells::{render, RelaxationEngine, SourceImage, VCellsConfigBuilder};
use image::RgbImage;

fn main() -> Result<(), Box<dyn Error>> {
    let _logger = Logger::try_with_str("info")?.start()?;

    let mut args = env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("usage: segment_image <input> [cell_size] [weight] [output]");
        std::process::exit(2);
    };
    let cell_size: f32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(15.0);
    let weight: f32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(100.0);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| with_suffix(Path::new(&input), "cells"));

    let decoded = image::open(&input)?.to_rgb8();
    let (width, height) = decoded.dimensions();
    let source = SourceImage::from_rgb8(width, height, decoded.as_raw())?;

    let config = VCellsConfigBuilder::new()
        .cell_size(cell_size)?
        .weight(weight)?
        .build();

    println!("Segmenting {} ({}x{})", input, width, height);
    println!("  Cell size: {}", config.cell_size);
    println!("  Weight: {}", config.weight);
    println!("  Radius: {}", config.radius);

    let mut engine = RelaxationEngine::new(source, &config)?;
    println!("  Seeded segments: {}", engine.tessellation().segment_count());

    let report = engine.run_with(config.max_iterations, |report, _| {
        if report.iteration % 10 == 0 {
            println!(
                "  iteration {:>4}: {} of {} edge pixels moved",
                report.iteration, report.moved, report.candidates
            );
        }
        ControlFlow::Continue(())
    })?;

    let live = engine.tessellation().occupied().count();
    println!(
        "\n{:?} after {} iterations, {} pixels moved, {} segments left",
        report.termination,
        report.iterations(),
        report.total_moved(),
        live
    );

    let overlay = render::boundary_overlay(engine.image(), engine.tessellation(), [0, 255, 0]);
    save(width, height, overlay, &output)?;

    let mosaic_path = with_suffix(&output, "mean");
    let mosaic = render::mean_color_fill(engine.image(), engine.tessellation());
    save(width, height, mosaic, &mosaic_path)?;

    println!("Wrote {} and {}", output.display(), mosaic_path.display());
    Ok(())
}

fn save(width: u32, height: u32, buffer: Vec<u8>, path: &Path) -> Result<(), Box<dyn Error>> {
    let image = RgbImage::from_raw(width, height, buffer).ok_or("buffer size mismatch")?;
    image.save(path)?;
    Ok(())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    path.with_file_name(format!("{}_{}.png", stem, suffix))
}
