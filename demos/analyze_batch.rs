//! Example: Analyze multiple audio files in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files (batch-level). Each file analysis is still single-threaded.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use chordmaster_dsp::io::decode_audio;
use chordmaster_dsp::{analyze_audio, AnalysisConfig, ChordChart};
use rayon::prelude::*;
use std::env;
use std::time::Instant;

struct ItemOut {
    path: String,
    result: Result<ChordChart, String>,
    elapsed_ms: f32,
}

fn analyze_one(path: &str, config: &AnalysisConfig) -> ItemOut {
    let t0 = Instant::now();
    let result = decode_audio(path)
        .map_err(|e| format!("decode failed: {e}"))
        .and_then(|audio| {
            analyze_audio(&audio.samples, audio.sample_rate, config.clone())
                .map_err(|e| format!("analysis failed: {e}"))
        })
        .map(|r| r.to_chart());

    ItemOut {
        path: path.to_string(),
        result,
        elapsed_ms: t0.elapsed().as_secs_f32() * 1000.0,
    }
}

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn percentile(mut xs: Vec<f32>, p: f32) -> Option<f32> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((xs.len() - 1) as f32 * p.clamp(0.0, 1.0)).round() as usize;
    Some(xs[idx.min(xs.len() - 1)])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let config = AnalysisConfig::default();

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<ItemOut> =
        pool.install(|| paths.par_iter().map(|p| analyze_one(p, &config)).collect());

    for (idx, o) in outs.iter().enumerate() {
        match (&o.result, json) {
            (Ok(chart), true) => {
                println!(
                    "{{\"file\":{},\"chart\":{}}}",
                    serde_json::to_string(&o.path)?,
                    serde_json::to_string(chart)?
                );
            }
            (Err(e), true) => {
                println!(
                    "{{\"file\":{},\"error\":{}}}",
                    serde_json::to_string(&o.path)?,
                    serde_json::to_string(e)?
                );
            }
            (Ok(chart), false) => {
                let progression: Vec<&str> =
                    chart.bars.iter().map(|b| b.chord.as_str()).collect();
                println!(
                    "[{}/{}] {}: {:.1} BPM, {} {}, {}/4, {} bars: {} ({:.0}ms)",
                    idx + 1,
                    outs.len(),
                    o.path,
                    chart.tempo_bpm,
                    chart.key,
                    chart.mode,
                    chart.beats_per_bar,
                    chart.bars.len(),
                    progression.join(" | "),
                    o.elapsed_ms
                );
            }
            (Err(e), false) => {
                println!("[{}/{}] {}: ERROR: {}", idx + 1, outs.len(), o.path, e);
            }
        }
    }

    let ok_times: Vec<f32> = outs
        .iter()
        .filter(|o| o.result.is_ok())
        .map(|o| o.elapsed_ms)
        .collect();
    let wall_ms = t0.elapsed().as_secs_f64() * 1000.0;

    eprintln!(
        "Done: ok={}/{} wall={:.0}ms",
        ok_times.len(),
        outs.len(),
        wall_ms
    );
    if !ok_times.is_empty() {
        let mean = ok_times.iter().sum::<f32>() / ok_times.len() as f32;
        let p50 = percentile(ok_times.clone(), 0.50).unwrap_or(mean);
        let p90 = percentile(ok_times.clone(), 0.90).unwrap_or(mean);
        eprintln!(
            "time_ms: mean={:.2} p50={:.2} p90={:.2}",
            mean, p50, p90
        );
    }

    Ok(())
}
