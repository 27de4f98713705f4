/// Decoded waveform, one `Vec<f32>` per channel, samples in [-1, 1].
#[derive(Clone, Debug, Default)]
pub struct AudioClip {
    /// Planar channel data. All channels have the same length.
    pub channels: Vec<Vec<f32>>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Wrap a mono buffer.
    #[must_use]
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            channels: vec![samples],
            sample_rate,
        }
    }

    /// Number of frames (samples per channel).
    #[must_use]
    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Duration in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Average all channels into a single mono buffer.
    ///
    /// # Example
    /// ```
    /// use ss_audio::AudioClip;
    /// let clip = AudioClip { channels: vec![vec![1.0, 0.0], vec![0.0, 0.0]], sample_rate: 8000 };
    /// assert_eq!(clip.to_mono(), vec![0.5, 0.0]);
    /// ```
    #[must_use]
    pub fn to_mono(&self) -> Vec<f32> {
        match self.channels.as_slice() {
            [] => Vec::new(),
            [only] => only.clone(),
            all => {
                let n = self.frames();
                let scale = 1.0 / all.len() as f32;
                (0..n)
                    .map(|i| all.iter().map(|ch| ch[i]).sum::<f32>() * scale)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_channels_downmix_to_the_channel() {
        let ch: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();
        let clip = AudioClip {
            channels: vec![ch.clone(), ch.clone()],
            sample_rate: 24_000,
        };
        let mono = clip.to_mono();
        for (a, b) in mono.iter().zip(&ch) {
            assert!((a - b).abs() < 1e-7);
        }
    }

    #[test]
    fn empty_clip_has_no_frames() {
        let clip = AudioClip::default();
        assert_eq!(clip.frames(), 0);
        assert!(clip.to_mono().is_empty());
        assert_eq!(clip.duration_secs(), 0.0);
    }
}
