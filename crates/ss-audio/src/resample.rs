use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::AudioError;

/// Upper bound on flush passes when draining the resampler tail.
const MAX_FLUSH_PASSES: usize = 64;

/// Resample a mono buffer from `from_rate` to `to_rate`.
///
/// Uses a 256-tap sinc interpolator (BlackmanHarris2 window). The filter
/// delay is compensated and the output holds exactly
/// `ceil(len * to_rate / from_rate)` samples.
///
/// # Errors
/// Returns `AudioError::Resample` if rubato rejects the ratio or fails.
///
/// # Example
/// ```
/// use ss_audio::resample::resample_mono;
/// let out = resample_mono(&vec![0.0; 48_000], 48_000, 24_000).unwrap();
/// assert_eq!(out.len(), 24_000);
/// ```
pub fn resample_mono(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AudioError::Resample(format!(
            "invalid rates {from_rate} -> {to_rate}"
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let expected = (samples.len() as f64 * ratio).ceil() as usize;

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    // Single pass: chunk size = input length
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, samples.len(), 1)
        .map_err(|e| AudioError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| AudioError::Resample(e.to_string()))?
        .swap_remove(0);

    let mut passes = 0;
    while output.len() < delay + expected && passes < MAX_FLUSH_PASSES {
        let tail = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?
            .swap_remove(0);
        if tail.is_empty() {
            break;
        }
        output.extend_from_slice(&tail);
        passes += 1;
    }

    let mut output: Vec<f32> = output.into_iter().skip(delay).take(expected).collect();
    output.resize(expected, 0.0);

    log::trace!(
        "Resampled {} samples ({from_rate} Hz) -> {} samples ({to_rate} Hz)",
        samples.len(),
        output.len()
    );

    Ok(output)
}
