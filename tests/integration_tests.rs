//! Integration tests for the chord chart analysis engine

use chordmaster_dsp::io::decode_audio;
use chordmaster_dsp::{
    analyze_audio, analyze_with_beats, AnalysisConfig, AnalysisError, AnalysisFlag, Bar, Chord,
    ChordLabel, ChordQuality, Mode, PitchClass,
};
use std::f32::consts::PI;

const SR: u32 = 22050;

/// A minor triad: A3, C4, E4
const A_MINOR_TRIAD: [f32; 3] = [220.0, 261.63, 329.63];

fn a_minor() -> ChordLabel {
    ChordLabel::Chord(Chord::new(PitchClass::new(9), ChordQuality::Minor))
}

/// Sustained triad plus 6 kHz clicks every 0.5 s (120 BPM), every
/// `accent_every`-th click louder
fn triad_with_clicks(seconds: f32, sample_rate: u32, accent_every: usize) -> Vec<f32> {
    let sr = sample_rate as f32;
    let n = (seconds * sr) as usize;
    let mut samples: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f32 / sr;
            A_MINOR_TRIAD
                .iter()
                .map(|&f| 0.2 * (2.0 * PI * f * t).sin())
                .sum()
        })
        .collect();

    let click_len = (0.02 * sr) as usize;
    let decay = 0.004 * sr;
    let mut beat = 0;
    loop {
        let start = (beat as f32 * 0.5 * sr) as usize;
        if start >= n {
            break;
        }
        let amp = if beat % accent_every == 0 { 1.0 } else { 0.5 };
        for k in 0..click_len.min(n - start) {
            let env = (-(k as f32) / decay).exp();
            samples[start + k] += amp * env * (2.0 * PI * 6000.0 * k as f32 / sr).sin();
        }
        beat += 1;
    }

    samples
}

/// Triad for the first `tone_seconds`, digital silence afterwards
fn triad_then_silence(tone_seconds: f32, total_seconds: f32) -> Vec<f32> {
    let sr = SR as f32;
    let n = (total_seconds * sr) as usize;
    let tone = (tone_seconds * sr) as usize;
    (0..n)
        .map(|i| {
            if i >= tone {
                return 0.0;
            }
            let t = i as f32 / sr;
            A_MINOR_TRIAD
                .iter()
                .map(|&f| 0.2 * (2.0 * PI * f * t).sin())
                .sum()
        })
        .collect()
}

fn beat_grid(period: f32, seconds: f32) -> Vec<f32> {
    (0..)
        .map(|i| i as f32 * period)
        .take_while(|&t| t < seconds)
        .collect()
}

fn assert_contiguous(bars: &[Bar], duration: f32) {
    for (i, bar) in bars.iter().enumerate() {
        assert_eq!(bar.index, i + 1);
        assert!(bar.end_time > bar.start_time, "bar {} is empty", bar.index);
        if let Some(next) = bars.get(i + 1) {
            assert_eq!(bar.end_time, next.start_time);
            assert_eq!(bar.next_chord, Some(next.chord));
            assert_eq!(next.previous_chord, Some(bar.chord));
        }
    }
    if let Some(first) = bars.first() {
        assert_eq!(first.previous_chord, None);
    }
    if let Some(last) = bars.last() {
        assert_eq!(last.next_chord, None);
        assert!((last.end_time - duration).abs() < 1e-4);
    }
}

#[test]
fn test_a_minor_triad_with_clicks() {
    let samples = triad_with_clicks(16.0, SR, 4);
    let result = analyze_audio(&samples, SR, AnalysisConfig::default())
        .expect("Analysis should succeed");

    assert_eq!(result.key_root, PitchClass::new(9));
    assert_eq!(result.mode, Mode::Minor);
    assert!(result.key_confidence > 0.0);
    assert_eq!(result.beats_per_bar, 4);

    assert!(
        result.tempo_bpm > 110.0 && result.tempo_bpm < 130.0,
        "tempo {:.1}",
        result.tempo_bpm
    );
    assert!(result.beats.len() >= 24, "only {} beats", result.beats.len());
    for pair in result.beats.windows(2) {
        let interval = pair[1] - pair[0];
        assert!(
            (interval - 0.5).abs() < 0.06,
            "beat interval {:.3} s",
            interval
        );
    }

    assert!(!result.bars.is_empty());
    for bar in &result.bars {
        assert_eq!(bar.chord, a_minor(), "bar {}", bar.index);
    }
    assert_contiguous(&result.bars, result.metadata.duration_seconds);

    assert_eq!(result.metadata.sample_rate, SR);
    assert_eq!(result.metadata.beat_count, result.beats.len());
    assert!((result.metadata.duration_seconds - 16.0).abs() < 1e-3);
}

#[test]
fn test_analysis_is_deterministic() {
    let samples = triad_with_clicks(8.0, SR, 4);
    let first = analyze_audio(&samples, SR, AnalysisConfig::default()).unwrap();
    let second = analyze_audio(&samples, SR, AnalysisConfig::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_resampled_input() {
    let samples = triad_with_clicks(8.0, 44100, 4);
    let result = analyze_audio(&samples, 44100, AnalysisConfig::default()).unwrap();

    assert_eq!(result.metadata.sample_rate, 22050);
    assert!((result.metadata.duration_seconds - 8.0).abs() < 1e-3);
    assert_eq!(result.key_root, PitchClass::new(9));
    assert_eq!(result.mode, Mode::Minor);
}

#[test]
fn test_silence_yields_empty_chart() {
    let samples = vec![0.0f32; SR as usize * 5];
    let result = analyze_audio(&samples, SR, AnalysisConfig::default()).unwrap();

    assert_eq!(result.tempo_bpm, 0.0);
    assert!(result.beats.is_empty());
    assert!(result.bars.is_empty());
    assert_eq!(result.beats_per_bar, 4);
    assert_eq!(result.key_root, PitchClass::new(0));
    assert_eq!(result.mode, Mode::Major);
    assert_eq!(result.key_confidence, 0.0);

    let flags = &result.metadata.flags;
    assert!(flags.contains(&AnalysisFlag::NoBeatsDetected));
    assert!(flags.contains(&AnalysisFlag::MeterFallback));
    assert!(flags.contains(&AnalysisFlag::WeakTonality));
    assert!(!result.metadata.warnings.is_empty());
}

#[test]
fn test_invalid_input() {
    let config = AnalysisConfig::default();

    assert!(matches!(
        analyze_audio(&[], SR, config.clone()),
        Err(AnalysisError::InvalidInput(_))
    ));
    assert!(matches!(
        analyze_audio(&[0.1; 1000], 0, config.clone()),
        Err(AnalysisError::InvalidInput(_))
    ));

    let mut samples = vec![0.1f32; 1000];
    samples[10] = f32::NAN;
    assert!(matches!(
        analyze_audio(&samples, SR, config),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn test_supplied_beats_triple_meter() {
    let samples = triad_with_clicks(12.0, SR, 3);
    let beats = beat_grid(0.5, 12.0);
    let result =
        analyze_with_beats(&samples, SR, &beats, 120.0, AnalysisConfig::default()).unwrap();

    assert_eq!(result.beats_per_bar, 3);
    assert_eq!(result.tempo_bpm, 120.0);
    assert_eq!(result.beats, beats);
    assert_eq!(result.bars.len(), 8);
    assert_eq!(result.bars[1].start_time, 1.5);
    assert!(!result.metadata.flags.contains(&AnalysisFlag::MeterFallback));
    assert_contiguous(&result.bars, 12.0);
}

#[test]
fn test_supplied_beats_quadruple_meter() {
    let samples = triad_with_clicks(12.0, SR, 4);
    let beats = beat_grid(0.5, 12.0);
    let result =
        analyze_with_beats(&samples, SR, &beats, 120.0, AnalysisConfig::default()).unwrap();

    assert_eq!(result.beats_per_bar, 4);
    assert_eq!(result.bars.len(), 6);
    assert!(result.bars.iter().all(|bar| bar.chord == a_minor()));
}

#[test]
fn test_few_beats_fall_back_to_common_time() {
    let samples = triad_with_clicks(4.0, SR, 3);
    let beats = [0.0, 1.0, 2.0];
    let result =
        analyze_with_beats(&samples, SR, &beats, 60.0, AnalysisConfig::default()).unwrap();

    assert_eq!(result.beats_per_bar, 4);
    assert!(result.metadata.flags.contains(&AnalysisFlag::MeterFallback));

    // One bar covering every beat, closed by the waveform end
    assert_eq!(result.bars.len(), 1);
    assert_eq!(result.bars[0].start_time, 0.0);
    assert!((result.bars[0].end_time - 4.0).abs() < 1e-4);
    assert_eq!(result.bars[0].previous_chord, None);
    assert_eq!(result.bars[0].next_chord, None);
}

#[test]
fn test_silent_bars_are_no_chord() {
    let samples = triad_then_silence(4.0, 10.0);
    let beats = beat_grid(0.5, 10.0);
    let result =
        analyze_with_beats(&samples, SR, &beats, 120.0, AnalysisConfig::default()).unwrap();

    let silent: Vec<&Bar> = result
        .bars
        .iter()
        .filter(|bar| bar.start_time >= 5.0)
        .collect();
    assert!(!silent.is_empty());
    for bar in silent {
        assert_eq!(bar.chord, ChordLabel::NoChord, "bar {}", bar.index);
    }

    for bar in result.bars.iter().filter(|bar| bar.end_time <= 3.5) {
        assert_eq!(bar.chord, a_minor(), "bar {}", bar.index);
    }
    assert_contiguous(&result.bars, 10.0);
}

#[test]
fn test_supplied_beats_validation() {
    let samples = triad_with_clicks(2.0, SR, 4);
    let config = AnalysisConfig::default();

    for beats in [vec![0.0, 0.5, 0.5], vec![1.0, 0.5], vec![-0.5, 0.5], vec![0.0, f32::NAN]] {
        assert!(matches!(
            analyze_with_beats(&samples, SR, &beats, 120.0, config.clone()),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
    assert!(analyze_with_beats(&samples, SR, &[0.0, 0.5], -1.0, config).is_err());
}

#[test]
fn test_beats_past_waveform_end_rejected() {
    let samples = triad_with_clicks(2.0, SR, 4);
    let beats = [0.0, 0.5, 1.0, 1.5, 2.5, 3.0];
    let result = analyze_with_beats(&samples, SR, &beats, 120.0, AnalysisConfig::default());
    assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));

    // A beat exactly at the end would open an empty bar
    let result = analyze_with_beats(&samples, SR, &[0.0, 2.0], 120.0, AnalysisConfig::default());
    assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
}

#[test]
fn test_duration_from_input_waveform() {
    // Odd length: the 22050 Hz buffer is half a sample longer than the input
    let mut samples = triad_with_clicks(2.0, 44100, 4);
    samples.push(0.0);
    assert_eq!(samples.len(), 88201);
    let expected = 88201.0f32 / 44100.0;

    let result =
        analyze_with_beats(&samples, 44100, &[0.0, 0.5, 1.0], 120.0, AnalysisConfig::default())
            .unwrap();

    assert_eq!(result.metadata.sample_rate, 22050);
    assert_eq!(result.metadata.duration_seconds, expected);
    assert_eq!(result.bars.len(), 1);
    assert_eq!(result.bars[0].end_time, expected);
}

#[test]
fn test_short_a_minor_triad() {
    let samples = triad_with_clicks(4.0, SR, 4);
    let result = analyze_audio(&samples, SR, AnalysisConfig::default()).unwrap();

    assert_eq!(result.key_root, PitchClass::new(9));
    assert_eq!(result.mode, Mode::Minor);
    assert_eq!(result.beats_per_bar, 4);
    assert!(!result.bars.is_empty());
    for bar in &result.bars {
        assert_eq!(bar.chord, a_minor(), "bar {}", bar.index);
    }
    assert!(result.beats.iter().all(|&t| t < 4.0));
    assert_contiguous(&result.bars, 4.0);
}

#[test]
fn test_chart_serialization() {
    let samples = triad_with_clicks(6.0, SR, 4);
    let beats = beat_grid(0.5, 6.0);
    let result =
        analyze_with_beats(&samples, SR, &beats, 119.96, AnalysisConfig::default()).unwrap();

    let json = serde_json::to_value(result.to_chart()).unwrap();
    assert_eq!(json["tempo_bpm"].as_f64().map(|v| (v * 10.0).round()), Some(1200.0));
    assert_eq!(json["key"], "A");
    assert_eq!(json["mode"], "minor");
    assert_eq!(json["beats_per_bar"], result.beats_per_bar);

    let bars = json["bars"].as_array().unwrap();
    assert_eq!(bars.len(), result.bars.len());
    assert!(bars.len() >= 3);
    let last = bars.len() - 1;
    assert_eq!(bars[0]["bar"], 1);
    assert_eq!(bars[0]["chord"], "Am");
    assert!(bars[0]["prevChord"].is_null());
    assert_eq!(bars[0]["nextChord"], "Am");
    assert_eq!(bars[last]["prevChord"], "Am");
    assert!(bars[last]["nextChord"].is_null());
    assert_eq!(bars[last]["end_time"], 6.0);

    // The full result round-trips with string chord labels
    let text = serde_json::to_string(&result).unwrap();
    assert!(text.contains("\"Am\""));
    let back: chordmaster_dsp::AnalysisResult = serde_json::from_str(&text).unwrap();
    assert_eq!(back.bars, result.bars);
}

#[test]
fn test_decode_wav_file() {
    let samples = triad_with_clicks(6.0, SR, 4);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triad.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SR,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let peak = samples.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for &s in &samples {
        let v = (s / peak * 0.9 * i16::MAX as f32) as i16;
        writer.write_sample(v).unwrap();
        writer.write_sample(v).unwrap();
    }
    writer.finalize().unwrap();

    let audio = decode_audio(&path).unwrap();
    assert_eq!(audio.sample_rate, SR);
    assert_eq!(audio.channels, 2);
    assert_eq!(audio.samples.len(), samples.len());
    assert!((audio.duration_seconds() - 6.0).abs() < 1e-3);
    for (&decoded, &written) in audio.samples.iter().zip(samples.iter()).step_by(97) {
        assert!((decoded - written / peak * 0.9).abs() < 1e-3);
    }

    let result = analyze_audio(&audio.samples, audio.sample_rate, AnalysisConfig::default())
        .unwrap();
    assert_eq!(result.key_root, PitchClass::new(9));
    assert_eq!(result.mode, Mode::Minor);
}

#[test]
fn test_decode_rejects_non_audio() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "not audio").unwrap();
    assert!(matches!(
        decode_audio(&path),
        Err(AnalysisError::DecodingError(_))
    ));
}
