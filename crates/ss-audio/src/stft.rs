use std::sync::Arc;

use realfft::RealFftPlanner;
use realfft::num_complex::Complex;

/// Centred short-time power spectrum using realfft.
///
/// The signal is zero-padded by `n_fft / 2` on both sides, giving
/// `1 + len / hop` frames for an even `n_fft`. Each frame is weighted by a
/// periodic Hann window and reduced to `|X|²` over `n_fft / 2 + 1` bins.
///
/// Pre-allocates the FFT plan and scratch buffers, frames are processed one
/// at a time through [`Stft::for_each_frame`].
///
/// # Example
/// ```
/// use ss_audio::stft::Stft;
/// let stft = Stft::new(2048, 512);
/// assert_eq!(stft.frame_count(24_000), 47);
/// ```
pub struct Stft {
    n_fft: usize,
    hop: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    power_buf: Vec<f32>,
    plan: Arc<dyn realfft::RealToComplex<f32>>,
    window: Vec<f32>,
}

impl Stft {
    /// Create a new STFT with the given window size and hop.
    ///
    /// # Panics
    /// Panics if `n_fft` or `hop` is 0.
    #[must_use]
    pub fn new(n_fft: usize, hop: usize) -> Self {
        assert!(n_fft > 0, "FFT size must be > 0");
        assert!(hop > 0, "hop length must be > 0");

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(n_fft);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();
        let power_buf = vec![0.0; spectrum_buf.len()];

        // Periodic Hann (DFT-even)
        let window: Vec<f32> = (0..n_fft)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * i as f64 / n_fft as f64;
                (0.5 - 0.5 * phase.cos()) as f32
            })
            .collect();

        Self {
            n_fft,
            hop,
            input_buf,
            spectrum_buf,
            scratch,
            power_buf,
            plan,
            window,
        }
    }

    /// Number of frequency bins per frame (`n_fft / 2 + 1`).
    #[must_use]
    pub fn bins(&self) -> usize {
        self.spectrum_buf.len()
    }

    /// Number of frames produced for a signal of `len` samples.
    #[must_use]
    pub fn frame_count(&self, len: usize) -> usize {
        let padded = len + 2 * (self.n_fft / 2);
        if padded < self.n_fft {
            0
        } else {
            1 + (padded - self.n_fft) / self.hop
        }
    }

    /// Compute the power spectrum of every frame, calling `f(frame_idx, power)`.
    pub fn for_each_frame(&mut self, samples: &[f32], mut f: impl FnMut(usize, &[f32])) {
        let pad = self.n_fft / 2;
        let frames = self.frame_count(samples.len());

        for frame_idx in 0..frames {
            // Position of the frame start in the unpadded signal
            let start = (frame_idx * self.hop) as isize - pad as isize;
            for (i, slot) in self.input_buf.iter_mut().enumerate() {
                let pos = start + i as isize;
                *slot = if pos >= 0 && (pos as usize) < samples.len() {
                    samples[pos as usize] * self.window[i]
                } else {
                    0.0
                };
            }

            if self
                .plan
                .process_with_scratch(&mut self.input_buf, &mut self.spectrum_buf, &mut self.scratch)
                .is_err()
            {
                self.power_buf.fill(0.0);
            } else {
                for (p, c) in self.power_buf.iter_mut().zip(&self.spectrum_buf) {
                    *p = c.re * c.re + c.im * c.im;
                }
            }

            f(frame_idx, &self.power_buf);
        }
    }
}
