//! Example: Analyze a single audio file and print its chord chart
//!
//! Usage:
//!   cargo run --release --example analyze_file -- [--json] <file>

use chordmaster_dsp::io::decode_audio;
use chordmaster_dsp::{analyze_audio, AnalysisConfig};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut json = false;
    let mut path: Option<String> = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--help" | "-h" => {
                eprintln!("Usage: analyze_file [--json] <file>");
                return Ok(());
            }
            _ => path = Some(arg),
        }
    }

    let Some(path) = path else {
        eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
        std::process::exit(2);
    };

    let audio = decode_audio(&path)?;
    eprintln!(
        "Decoded {}: {:.1}s at {} Hz ({} channels)",
        path,
        audio.duration_seconds(),
        audio.sample_rate,
        audio.channels
    );

    let result = analyze_audio(&audio.samples, audio.sample_rate, AnalysisConfig::default())?;
    let chart = result.to_chart();

    if json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
        return Ok(());
    }

    println!("Analysis Results:");
    println!("  Tempo: {:.1} BPM", chart.tempo_bpm);
    println!(
        "  Key: {} {} (confidence: {:.3}, clarity: {:.3})",
        chart.key, chart.mode, result.key_confidence, result.key_clarity
    );
    println!("  Meter: {}/4", chart.beats_per_bar);
    for warning in &result.metadata.warnings {
        println!("  Warning: {}", warning);
    }
    println!();
    for bar in &chart.bars {
        println!(
            "  {:>4}  {:>7.2}s - {:>7.2}s  {}",
            bar.bar, bar.start_time, bar.end_time, bar.chord
        );
    }

    Ok(())
}
