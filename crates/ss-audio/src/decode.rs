use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::clip::AudioClip;
use crate::error::AudioError;

/// Decode an audio file into planar f32 channels at its native rate.
///
/// Supports WAV, AIFF, MP3, FLAC, OGG Vorbis, and M4A (AAC/ALAC) via symphonia.
///
/// # Errors
/// Returns `AudioError::Io` if the file cannot be opened and
/// `AudioError::Decode` if it cannot be probed, has no audio track, or
/// yields no samples.
///
/// # Example
/// ```no_run
/// use ss_audio::decode::decode_file;
/// let clip = decode_file("kick.wav").unwrap();
/// println!("{} channels @ {} Hz", clip.channel_count(), clip.sample_rate);
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<AudioClip, AudioError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AudioError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::decode(path, format!("probe: {e}")))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::decode(path, "no default audio track"))?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channel_count = track
        .codec_params
        .channels
        .map_or(0, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::decode(path, format!("codec: {e}")))?;

    let track_id = track.id;
    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                log::warn!("Audio decode packet error in {}: {e}", path.display());
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Audio decode frame error in {}: {e}", path.display());
                continue;
            }
            Err(e) => return Err(AudioError::decode(path, e)),
        };

        let spec = *decoded.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }
        let spec_channels = spec.channels.count();
        if channel_count == 0 {
            channel_count = spec_channels;
        }
        if channels.is_empty() {
            channels = vec![Vec::new(); spec_channels.max(1)];
        }

        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger than current capacity
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        for frame in buf.samples().chunks(spec_channels.max(1)) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
    }

    let clip = AudioClip {
        channels,
        sample_rate,
    };
    if clip.frames() == 0 || clip.sample_rate == 0 {
        return Err(AudioError::decode(path, "no audio samples"));
    }

    log::debug!(
        "Decoded {} frames x {} ch @ {}Hz from {}",
        clip.frames(),
        clip.channel_count(),
        clip.sample_rate,
        path.display()
    );

    Ok(clip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, rate: u32, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            let v = ((i as f32 * 0.05).sin() * 8000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(v).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn decodes_stereo_wav_into_planar_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 2, 22_050, 4410);

        let clip = decode_file(&path).unwrap();
        assert_eq!(clip.channel_count(), 2);
        assert_eq!(clip.sample_rate, 22_050);
        assert_eq!(clip.frames(), 4410);
        assert_eq!(clip.channels[0], clip.channels[1]);
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        assert!(matches!(decode_file(&path), Err(AudioError::Decode { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            decode_file(dir.path().join("nope.flac")),
            Err(AudioError::Io { .. })
        ));
    }
}
