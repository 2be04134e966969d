//! Bar segmentation and chord labeling
//!
//! Walks the beat timeline in strides of `beats_per_bar`, averages the chroma
//! columns of each bar, and scores every template by dot product. A template
//! whose root matches the bar's bass note gets its score multiplied by
//! [`BASS_BOOST`]. The first maximum in template order wins.
//!
//! Bar `k` spans `[beats[i], beats[i + beats_per_bar])`; the last bar runs to
//! `duration`. Beats at or after `duration` are ignored. Bars whose chroma range is empty or out of bounds,
//! or whose mean chroma is all zero, are labeled "N.C.".
//!
//! # Example
//!
//! ```no_run
//! use chordmaster_dsp::features::chords::{label_bars, ChordTemplateBank};
//! use chordmaster_dsp::features::chroma::extract_chroma;
//! use chordmaster_dsp::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! let samples = vec![0.0f32; 22050 * 4];
//! let chroma = extract_chroma(&samples, 22050, &config.chroma_config())?;
//! let beats = vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5];
//! let bars = label_bars(
//!     &chroma,
//!     &beats,
//!     4,
//!     &samples,
//!     22050,
//!     4.0,
//!     ChordTemplateBank::shared(),
//!     &config.bass_chroma_config(),
//! )?;
//! assert_eq!(bars.len(), 2);
//! # Ok::<(), chordmaster_dsp::AnalysisError>(())
//! ```

use super::bass::detect_bass;
use super::templates::ChordTemplateBank;
use super::ChordLabel;
use crate::analysis::result::{Bar, PitchClass};
use crate::error::AnalysisError;
use crate::features::chroma::normalization::{dot, l2_norm, l2_normalize, EPSILON};
use crate::features::chroma::{ChromaConfig, ChromaMatrix, N_CHROMA};

/// Score multiplier for templates whose root matches the bass note
pub const BASS_BOOST: f32 = 1.15;

/// Segment the beat timeline into bars and label each with a chord
///
/// # Arguments
///
/// * `chroma` - Full-range chroma matrix of the waveform
/// * `beats` - Beat times in seconds (strictly increasing)
/// * `beats_per_bar` - Bar length in beats (3 or 4)
/// * `samples` - The analyzed waveform (for bass detection)
/// * `sample_rate` - Sample rate of `samples`
/// * `duration` - Length of the caller's waveform in seconds; closes the last bar
/// * `templates` - Chord dictionary
/// * `bass_config` - Reduced-octave chroma parameters for the bass hint
///
/// # Returns
///
/// Contiguous bars with 1-based indices and neighbor links. No beats, no bars.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `beats_per_bar` is 0, the sample
/// rate is 0, or `duration` is negative or not finite.
#[allow(clippy::too_many_arguments)]
pub fn label_bars(
    chroma: &ChromaMatrix,
    beats: &[f32],
    beats_per_bar: usize,
    samples: &[f32],
    sample_rate: u32,
    duration: f32,
    templates: &ChordTemplateBank,
    bass_config: &ChromaConfig,
) -> Result<Vec<Bar>, AnalysisError> {
    if beats_per_bar == 0 {
        return Err(AnalysisError::InvalidInput(
            "Beats per bar must be > 0".to_string(),
        ));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    if !duration.is_finite() || duration < 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid duration: {}",
            duration
        )));
    }

    let in_range = beats.partition_point(|&t| t < duration);
    if in_range < beats.len() {
        log::debug!(
            "Ignoring {} beats at or after {:.2}s",
            beats.len() - in_range,
            duration
        );
    }
    let beats = &beats[..in_range];

    let mut bars = Vec::with_capacity(beats.len() / beats_per_bar + 1);

    for (k, i) in (0..beats.len()).step_by(beats_per_bar).enumerate() {
        let start_time = beats[i];
        let end_time = beats.get(i + beats_per_bar).copied().unwrap_or(duration);

        let chord = match chroma.frame_range(start_time, end_time) {
            None => {
                log::debug!(
                    "Bar {}: no chroma frames in [{:.2}, {:.2})",
                    k + 1,
                    start_time,
                    end_time
                );
                ChordLabel::NoChord
            }
            Some(range) => {
                let mean = chroma.mean_over(range);
                let segment = sample_range(samples, sample_rate, start_time, end_time);
                let bass = detect_bass(segment, sample_rate, bass_config)?;
                match_chord(&mean, bass, templates)
            }
        };

        bars.push(Bar {
            index: k + 1,
            start_time,
            end_time,
            chord,
            previous_chord: None,
            next_chord: None,
        });
    }

    link_neighbors(&mut bars);

    log::debug!(
        "Labeled {} bars ({} beats, {} per bar)",
        bars.len(),
        beats.len(),
        beats_per_bar
    );

    Ok(bars)
}

/// Pick the best template for a bar's mean chroma
///
/// The vector is L2-normalized first; an all-zero vector yields "N.C.". Ties
/// go to the first template in bank order.
pub fn match_chord(
    mean_chroma: &[f32; N_CHROMA],
    bass: Option<PitchClass>,
    templates: &ChordTemplateBank,
) -> ChordLabel {
    if l2_norm(mean_chroma) <= EPSILON {
        return ChordLabel::NoChord;
    }
    let vector = l2_normalize(mean_chroma);

    let mut best: Option<(ChordLabel, f32)> = None;
    for template in templates {
        let mut score = dot(&vector, &template.vector);
        if bass == Some(template.root()) {
            score *= BASS_BOOST;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((ChordLabel::Chord(template.chord), score)),
        }
    }

    best.map(|(label, _)| label).unwrap_or(ChordLabel::NoChord)
}

/// Fill `previous_chord`/`next_chord` from adjacent bars
pub fn link_neighbors(bars: &mut [Bar]) {
    let labels: Vec<ChordLabel> = bars.iter().map(|bar| bar.chord).collect();
    for (i, bar) in bars.iter_mut().enumerate() {
        bar.previous_chord = if i > 0 { Some(labels[i - 1]) } else { None };
        bar.next_chord = labels.get(i + 1).copied();
    }
}

/// Samples covering `[start_time, end_time)`, clipped to the waveform
fn sample_range(samples: &[f32], sample_rate: u32, start_time: f32, end_time: f32) -> &[f32] {
    let to_index = |t: f32| -> usize {
        if t <= 0.0 {
            0
        } else {
            ((t * sample_rate as f32).floor() as usize).min(samples.len())
        }
    };
    let start = to_index(start_time);
    let end = to_index(end_time).max(start);
    &samples[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chords::templates::ChordTemplate;
    use crate::features::chords::{Chord, ChordQuality};

    const SR: u32 = 22050;
    const HOP: usize = 512;

    fn bass_config() -> ChromaConfig {
        ChromaConfig {
            frame_size: 4096,
            hop_size: HOP,
            min_midi: 24,
            n_octaves: 3,
        }
    }

    fn a_minor_column() -> [f32; N_CHROMA] {
        let mut col = [0.0f32; N_CHROMA];
        col[9] = 1.0;
        col[0] = 0.9;
        col[4] = 0.85;
        col
    }

    fn label(root: usize, quality: ChordQuality) -> ChordLabel {
        ChordLabel::Chord(Chord::new(PitchClass::new(root), quality))
    }

    #[test]
    fn test_match_chord_a_minor() {
        let chord = match_chord(&a_minor_column(), None, ChordTemplateBank::shared());
        assert_eq!(chord, label(9, ChordQuality::Minor));
    }

    #[test]
    fn test_match_chord_zero_vector_is_no_chord() {
        let chord = match_chord(&[0.0; N_CHROMA], Some(PitchClass::new(0)), ChordTemplateBank::shared());
        assert_eq!(chord, ChordLabel::NoChord);
    }

    #[test]
    fn test_bass_hint_breaks_ties() {
        let c_major = ChordTemplate::new(PitchClass::new(0), ChordQuality::Major);
        let a_minor = ChordTemplate::new(PitchClass::new(9), ChordQuality::Minor);
        let mut both = [0.0f32; N_CHROMA];
        for i in 0..N_CHROMA {
            both[i] = c_major.vector[i] + a_minor.vector[i];
        }
        let bank = ChordTemplateBank::from_templates(vec![c_major, a_minor]);

        assert_eq!(
            match_chord(&both, Some(PitchClass::new(9)), &bank),
            label(9, ChordQuality::Minor)
        );
        assert_eq!(
            match_chord(&both, Some(PitchClass::new(0)), &bank),
            label(0, ChordQuality::Major)
        );
    }

    #[test]
    fn test_exact_tie_keeps_first_template() {
        let first = ChordTemplate::new(PitchClass::new(0), ChordQuality::Major);
        let bank = ChordTemplateBank::from_templates(vec![first.clone(), first.clone()]);
        let mut twin = ChordTemplate::new(PitchClass::new(0), ChordQuality::Major);
        twin.chord = Chord::new(PitchClass::new(0), ChordQuality::Major7);
        let bank_with_twin = ChordTemplateBank::from_templates(vec![first.clone(), twin]);

        assert_eq!(
            match_chord(&first.vector, None, &bank),
            label(0, ChordQuality::Major)
        );
        assert_eq!(
            match_chord(&first.vector, None, &bank_with_twin),
            label(0, ChordQuality::Major)
        );
    }

    #[test]
    fn test_label_bars_contiguous_and_linked() {
        let n_frames = 1 + 4 * SR as usize / HOP;
        let chroma = ChromaMatrix::new(vec![a_minor_column(); n_frames], HOP, SR);
        let samples = vec![0.0f32; 4 * SR as usize];
        let beats = vec![0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5];

        let bars = label_bars(
            &chroma,
            &beats,
            4,
            &samples,
            SR,
            4.0,
            ChordTemplateBank::shared(),
            &bass_config(),
        )
        .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].index, 1);
        assert_eq!(bars[1].index, 2);
        assert_eq!(bars[0].start_time, 0.5);
        assert_eq!(bars[0].end_time, bars[1].start_time);
        assert_eq!(bars[1].end_time, 4.0);

        let am = label(9, ChordQuality::Minor);
        assert!(bars.iter().all(|bar| bar.chord == am));
        assert_eq!(bars[0].previous_chord, None);
        assert_eq!(bars[0].next_chord, Some(am));
        assert_eq!(bars[1].previous_chord, Some(am));
        assert_eq!(bars[1].next_chord, None);
    }

    #[test]
    fn test_label_bars_out_of_range_is_no_chord() {
        // Chroma only covers the first second
        let chroma = ChromaMatrix::new(vec![a_minor_column(); 40], HOP, SR);
        let samples = vec![0.0f32; 4 * SR as usize];
        let beats = vec![0.0, 0.25, 0.5, 0.75, 2.0, 2.25, 2.5, 2.75];

        let bars = label_bars(
            &chroma,
            &beats,
            4,
            &samples,
            SR,
            4.0,
            ChordTemplateBank::shared(),
            &bass_config(),
        )
        .unwrap();

        assert_eq!(bars[0].chord, label(9, ChordQuality::Minor));
        assert_eq!(bars[1].chord, ChordLabel::NoChord);
        assert_eq!(bars[0].next_chord, Some(ChordLabel::NoChord));
    }

    #[test]
    fn test_label_bars_empty_and_invalid() {
        let chroma = ChromaMatrix::new(Vec::new(), HOP, SR);
        let bank = ChordTemplateBank::shared();
        assert!(label_bars(&chroma, &[], 4, &[0.0; 100], SR, 0.1, bank, &bass_config())
            .unwrap()
            .is_empty());
        assert!(label_bars(&chroma, &[0.0], 0, &[0.0; 100], SR, 0.1, bank, &bass_config()).is_err());

        // Zero chroma columns for the bar
        let bars = label_bars(&chroma, &[0.0, 0.5], 4, &[0.0; 22050], SR, 1.0, bank, &bass_config())
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].chord, ChordLabel::NoChord);
    }

    #[test]
    fn test_beats_past_duration_are_ignored() {
        let n_frames = 1 + 2 * SR as usize / HOP;
        let chroma = ChromaMatrix::new(vec![a_minor_column(); n_frames], HOP, SR);
        let samples = vec![0.0f32; 2 * SR as usize];
        let beats = vec![0.0, 0.5, 1.0, 1.5, 2.5, 3.0];

        let bars = label_bars(
            &chroma,
            &beats,
            4,
            &samples,
            SR,
            2.0,
            ChordTemplateBank::shared(),
            &bass_config(),
        )
        .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].start_time, 0.0);
        assert_eq!(bars[0].end_time, 2.0);
    }

    #[test]
    fn test_duration_closes_last_bar() {
        // Caller duration differs slightly from the processed buffer length
        let n_frames = 1 + SR as usize / HOP;
        let chroma = ChromaMatrix::new(vec![a_minor_column(); n_frames], HOP, SR);
        let samples = vec![0.0f32; SR as usize];
        let bars = label_bars(
            &chroma,
            &[0.0, 0.25],
            4,
            &samples,
            SR,
            1.000_022_7,
            ChordTemplateBank::shared(),
            &bass_config(),
        )
        .unwrap();
        assert_eq!(bars[0].end_time, 1.000_022_7);

        assert!(label_bars(
            &chroma,
            &[0.0],
            4,
            &samples,
            SR,
            f32::NAN,
            ChordTemplateBank::shared(),
            &bass_config(),
        )
        .is_err());
    }

    #[test]
    fn test_sample_range_clipping() {
        let samples = vec![0.0f32; 1000];
        assert_eq!(sample_range(&samples, 100, 1.0, 2.0).len(), 100);
        assert_eq!(sample_range(&samples, 100, 9.5, 20.0).len(), 50);
        assert!(sample_range(&samples, 100, 30.0, 40.0).is_empty());
    }
}
