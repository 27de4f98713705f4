use std::path::Path;

use ss_core::config::FeatureConfig;

use crate::clip::AudioClip;
use crate::decode::decode_file;
use crate::error::AudioError;
use crate::mel::{MelFilterbank, power_to_db_with_peak};
use crate::resample::resample_mono;
use crate::stft::Stft;

/// Log-mel spectrogram with a fixed time axis.
///
/// Row-major `(n_mels, n_frames)`: value for band `m` at frame `t` lives at
/// `m * n_frames + t`. Values are dB relative to the clip's peak power;
/// frames past the end of the clip are 0.0.
#[derive(Clone, Debug, PartialEq)]
pub struct MelSpectrogram {
    data: Vec<f32>,
    n_mels: usize,
    n_frames: usize,
    source_frames: usize,
}

impl MelSpectrogram {
    /// Number of mel bands (rows).
    #[must_use]
    pub fn n_mels(&self) -> usize {
        self.n_mels
    }

    /// Number of time frames (columns), always the configured `max_frames`.
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// STFT frames of the clip before truncation/padding.
    #[must_use]
    pub fn source_frames(&self) -> usize {
        self.source_frames
    }

    /// Value at `(mel, frame)`.
    #[must_use]
    pub fn get(&self, mel: usize, frame: usize) -> Option<f32> {
        if mel >= self.n_mels || frame >= self.n_frames {
            return None;
        }
        self.data.get(mel * self.n_frames + frame).copied()
    }

    /// Row-major values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Turns audio files into classifier-ready log-mel spectrograms.
///
/// Pipeline: decode → mono downmix → resample → centred STFT → mel
/// filterbank → dB (ref = peak) → fix time axis to `max_frames`.
///
/// # Example
/// ```
/// use ss_audio::FeatureExtractor;
/// use ss_core::config::FeatureConfig;
/// let mut extractor = FeatureExtractor::new(FeatureConfig::default());
/// let mel = extractor.extract_samples(&vec![0.0; 24_000], 24_000).unwrap();
/// assert_eq!((mel.n_mels(), mel.n_frames()), (128, 640));
/// ```
pub struct FeatureExtractor {
    config: FeatureConfig,
    stft: Stft,
    filterbank: MelFilterbank,
}

impl FeatureExtractor {
    /// Build an extractor; the FFT plan and filterbank are computed once.
    #[must_use]
    pub fn new(config: FeatureConfig) -> Self {
        let mut config = config;
        config.clamp_all();
        let stft = Stft::new(config.n_fft, config.hop_length);
        let filterbank = MelFilterbank::new(config.sample_rate, config.n_fft, config.n_mels);
        debug_assert_eq!(stft.bins(), filterbank.n_bins());
        Self {
            config,
            stft,
            filterbank,
        }
    }

    /// Decode `path` and compute its spectrogram.
    ///
    /// # Errors
    /// Returns `AudioError` if the file cannot be decoded or resampled.
    pub fn extract(&mut self, path: impl AsRef<Path>) -> Result<MelSpectrogram, AudioError> {
        let clip = decode_file(path)?;
        self.extract_clip(&clip)
    }

    /// Compute the spectrogram of an already decoded clip.
    ///
    /// # Errors
    /// Returns `AudioError::Resample` if rate conversion fails.
    pub fn extract_clip(&mut self, clip: &AudioClip) -> Result<MelSpectrogram, AudioError> {
        let mono = clip.to_mono();
        self.extract_samples(&mono, clip.sample_rate)
    }

    /// Compute the spectrogram of mono samples at `sample_rate`.
    ///
    /// # Errors
    /// Returns `AudioError::Resample` if rate conversion fails.
    pub fn extract_samples(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<MelSpectrogram, AudioError> {
        let target_rate = self.config.sample_rate;
        let resampled;
        let samples = if sample_rate == target_rate {
            samples
        } else {
            resampled = resample_mono(samples, sample_rate, target_rate)?;
            &resampled
        };

        let n_mels = self.config.n_mels;
        let max_frames = self.config.max_frames;
        let source_frames = self.stft.frame_count(samples.len());
        let kept = source_frames.min(max_frames);

        // Band-major buffer of the kept frames; the peak spans every frame
        let mut power = vec![0.0f32; n_mels * kept];
        let mut column = vec![0.0f32; n_mels];
        let mut peak = 0.0f32;
        let filterbank = &self.filterbank;
        self.stft.for_each_frame(samples, |t, spectrum| {
            filterbank.apply(spectrum, &mut column);
            for (m, &v) in column.iter().enumerate() {
                peak = peak.max(v);
                if t < kept {
                    power[m * kept + t] = v;
                }
            }
        });

        power_to_db_with_peak(&mut power, peak, peak, self.config.top_db);

        let mut data = vec![0.0f32; n_mels * max_frames];
        for m in 0..n_mels {
            data[m * max_frames..m * max_frames + kept]
                .copy_from_slice(&power[m * kept..(m + 1) * kept]);
        }

        log::trace!(
            "Mel spectrogram: {source_frames} frames -> {max_frames} (peak power {peak:.3e})"
        );

        Ok(MelSpectrogram {
            data,
            n_mels,
            n_frames: max_frames,
            source_frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, secs: f32, rate: u32) -> Vec<f32> {
        let n = (secs * rate as f32) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.4)
            .collect()
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(FeatureConfig::default())
    }

    #[test]
    fn short_clip_is_zero_padded_to_max_frames() {
        let mut ex = extractor();
        let mel = ex.extract_samples(&tone(440.0, 1.0, 24_000), 24_000).unwrap();
        assert_eq!(mel.n_frames(), 640);
        assert_eq!(mel.source_frames(), 1 + 24_000 / 512);
        assert_eq!(mel.as_slice().len(), 128 * 640);
        for m in 0..128 {
            assert_eq!(mel.get(m, 639), Some(0.0));
            assert_eq!(mel.get(m, mel.source_frames()), Some(0.0));
        }
    }

    #[test]
    fn long_clip_is_truncated_to_max_frames() {
        let mut ex = extractor();
        // 20 s at 24 kHz gives 938 frames
        let mel = ex.extract_samples(&tone(220.0, 20.0, 24_000), 24_000).unwrap();
        assert_eq!(mel.n_frames(), 640);
        assert!(mel.source_frames() > 640);
        // Real content everywhere, below the 0 dB peak
        assert!(mel.get(0, 639).is_some_and(|v| v <= 0.0));
        assert!(mel.as_slice().iter().all(|&v| (-80.0..=0.0).contains(&v)));
    }

    #[test]
    fn db_values_are_referenced_to_peak() {
        let mut ex = extractor();
        let mel = ex.extract_samples(&tone(1000.0, 2.0, 24_000), 24_000).unwrap();
        let kept = mel.source_frames();
        let max = (0..128)
            .flat_map(|m| (0..kept).map(move |t| (m, t)))
            .filter_map(|(m, t)| mel.get(m, t))
            .fold(f32::NEG_INFINITY, f32::max);
        assert!(max.abs() < 1e-4, "peak should be 0 dB, got {max}");
        let min = mel.as_slice().iter().copied().fold(f32::INFINITY, f32::min);
        assert!(min >= -80.0 - 1e-4);
    }

    #[test]
    fn stereo_with_identical_channels_matches_mono() {
        let mono = tone(660.0, 1.5, 24_000);
        let stereo = AudioClip {
            channels: vec![mono.clone(), mono.clone()],
            sample_rate: 24_000,
        };
        let mut ex = extractor();
        let a = ex.extract_clip(&AudioClip::mono(mono, 24_000)).unwrap();
        let b = ex.extract_clip(&stereo).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn other_rates_are_resampled_first() {
        let mut ex = extractor();
        let mel = ex.extract_samples(&tone(440.0, 1.0, 44_100), 44_100).unwrap();
        // 1 s resampled to 24 kHz
        assert_eq!(mel.source_frames(), 1 + 24_000 / 512);
    }

    #[test]
    fn extraction_is_deterministic() {
        let samples = tone(330.0, 3.0, 24_000);
        let mut ex = extractor();
        let a = ex.extract_samples(&samples, 24_000).unwrap();
        let b = ex.extract_samples(&samples, 24_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn extract_reads_wav_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kick.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 24_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in tone(80.0, 0.5, 24_000) {
            let v = (s * 20_000.0) as i16;
            writer.write_sample(v).unwrap();
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let mut ex = extractor();
        let mel = ex.extract(&path).unwrap();
        assert_eq!((mel.n_mels(), mel.n_frames()), (128, 640));
        assert_eq!(mel.source_frames(), 1 + 12_000 / 512);
    }
}
