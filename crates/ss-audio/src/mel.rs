/// Smallest power considered by [`power_to_db`].
pub const AMIN: f32 = 1e-10;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz to mel, Slaney scale (linear below 1 kHz, logarithmic above).
#[must_use]
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Mel to Hz, Slaney scale.
#[must_use]
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// One triangular band, stored sparsely from its first non-zero bin.
#[derive(Clone, Debug)]
struct Band {
    start: usize,
    weights: Vec<f32>,
}

/// Triangular mel filterbank with Slaney area normalisation.
///
/// Bands span `0..sample_rate/2`, edges equally spaced on the Slaney mel
/// scale, each band scaled by `2 / (f_right - f_left)`.
///
/// # Example
/// ```
/// use ss_audio::mel::MelFilterbank;
/// let fb = MelFilterbank::new(24_000, 2048, 128);
/// assert_eq!(fb.n_mels(), 128);
/// ```
#[derive(Clone, Debug)]
pub struct MelFilterbank {
    bands: Vec<Band>,
    n_bins: usize,
}

impl MelFilterbank {
    /// Build the filterbank for the given rate, FFT size, and band count.
    #[must_use]
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let n_bins = n_fft / 2 + 1;
        let sr = f64::from(sample_rate);
        let fft_freqs: Vec<f64> = (0..n_bins)
            .map(|i| i as f64 * sr / n_fft as f64)
            .collect();

        let mel_max = hz_to_mel(sr / 2.0);
        let mel_f: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
            .collect();

        let bands = (0..n_mels)
            .map(|m| {
                let (left, center, right) = (mel_f[m], mel_f[m + 1], mel_f[m + 2]);
                let enorm = 2.0 / (right - left);
                let dense: Vec<f32> = fft_freqs
                    .iter()
                    .map(|&f| {
                        let lower = (f - left) / (center - left);
                        let upper = (right - f) / (right - center);
                        (lower.min(upper).max(0.0) * enorm) as f32
                    })
                    .collect();
                let start = dense.iter().position(|&w| w > 0.0).unwrap_or(0);
                let end = dense.iter().rposition(|&w| w > 0.0).map_or(start, |e| e + 1);
                Band {
                    start,
                    weights: dense[start..end].to_vec(),
                }
            })
            .collect();

        Self { bands, n_bins }
    }

    /// Number of mel bands.
    #[must_use]
    pub fn n_mels(&self) -> usize {
        self.bands.len()
    }

    /// Number of FFT bins expected by [`MelFilterbank::apply`].
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Weight of `bin` in `band` (0.0 outside the triangle).
    #[must_use]
    pub fn weight(&self, band: usize, bin: usize) -> f32 {
        self.bands.get(band).map_or(0.0, |b| {
            bin.checked_sub(b.start)
                .and_then(|i| b.weights.get(i))
                .copied()
                .unwrap_or(0.0)
        })
    }

    /// Project one power spectrum frame onto the mel bands.
    pub fn apply(&self, power: &[f32], out: &mut [f32]) {
        for (slot, band) in out.iter_mut().zip(&self.bands) {
            let spectrum = power.get(band.start..).unwrap_or(&[]);
            *slot = band
                .weights
                .iter()
                .zip(spectrum)
                .map(|(w, p)| w * p)
                .sum();
        }
    }
}

/// Convert power values to decibels in place, relative to `reference`.
///
/// `10·log10(max(AMIN, s)) - 10·log10(max(AMIN, reference))`, then values
/// more than `top_db` below the maximum are raised to that floor.
pub fn power_to_db(values: &mut [f32], reference: f32, top_db: f32) {
    let peak = values.iter().copied().fold(0.0f32, f32::max);
    power_to_db_with_peak(values, reference, peak, top_db);
}

/// Same as [`power_to_db`] but with the floor taken from an explicit `peak`
/// power, for when `values` is a window of a larger spectrogram.
pub fn power_to_db_with_peak(values: &mut [f32], reference: f32, peak: f32, top_db: f32) {
    let ref_db = 10.0 * reference.max(AMIN).log10();
    let floor = 10.0 * peak.max(AMIN).log10() - ref_db - top_db;
    for v in values.iter_mut() {
        *v = (10.0 * v.max(AMIN).log10() - ref_db).max(floor);
    }
}
