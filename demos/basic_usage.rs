//! Basic usage example for the outline-to-pptx crate
//!
//! This example populates a template with a small hard-coded outline and
//! writes the finished deck next to it.
//!
//! Run with: cargo run --example basic_usage <path/to/template.potx> <output.pptx>

use outline_to_pptx::{generate, image_source_from_key, Outline, Result};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: cargo run --example basic_usage <template.potx> <output.pptx>");
        return Ok(());
    }

    let outline: Outline = serde_json::from_str(
        r#"{
            "topic": "Rust in production",
            "slides": [
                { "title": "Rust in production", "bullets": ["What we shipped and what we learned"] },
                { "title": "Why it stuck", "bullets": ["Fearless refactoring", "One binary to deploy", "Boring on-call rotations"] },
                "Questions?"
            ]
        }"#,
    )?;

    // No key in the environment selects the keyless image strategy.
    let images = image_source_from_key(env::var("UNSPLASH_ACCESS_KEY").ok())?;

    generate(
        Path::new(&args[1]),
        Path::new(&args[2]),
        &outline,
        images.as_ref(),
    )?;

    println!("Presentation saved to {}", args[2]);
    Ok(())
}
