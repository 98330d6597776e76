//! Vignette
//!
//! Headless driver for the vignette stage. Plays back a timed input script
//! against the scene table and logs what a renderer would draw each frame.

mod app;
mod capture;
mod input;

use clap::Parser;
use std::path::PathBuf;

/// Vignette - representation switching and scene transitions
#[derive(Parser, Debug)]
#[command(name = "vignette")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene descriptor table (JSON). Uses the built-in captures when absent
    #[arg(long)]
    scenes: Option<PathBuf>,

    /// Model mesh list (JSON). Uses a procedural placeholder when absent
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Timed input script (JSON). Uses the built-in demo when absent
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Stage configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames to run; defaults to covering the script plus a settle period
    #[arg(short, long)]
    frames: Option<u64>,

    /// Fixed frame rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Simulated environment capture latency in milliseconds
    #[arg(long, default_value_t = 250)]
    capture_latency_ms: u64,

    /// Make every environment capture fail
    #[arg(long)]
    fail_captures: bool,
}

fn main() {
    let args = Args::parse();

    let options = app::RunOptions {
        scenes: args.scenes,
        model: args.model,
        script: args.script,
        config: args.config,
        frames: args.frames,
        fps: args.fps,
        capture_latency_ms: args.capture_latency_ms,
        fail_captures: args.fail_captures,
    };

    if let Err(e) = app::run(options) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
