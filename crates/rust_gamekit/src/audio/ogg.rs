//! OGG Vorbis decoding to interleaved 16-bit PCM

use std::io::Cursor;

use rodio::{Decoder, Source};

use crate::audio::backend::SoundBuffer;
use crate::audio::{AudioError, AudioResult};

/// Decode a complete OGG Vorbis file
pub fn decode(bytes: Vec<u8>) -> AudioResult<SoundBuffer> {
    let decoder = Decoder::new_vorbis(Cursor::new(bytes))
        .map_err(|e| AudioError::Decode(format!("Failed to decode OGG: {}", e)))?;

    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<i16> = decoder.collect();

    log::debug!(
        "Decoded OGG: {} ch, {} Hz, {} samples",
        channels,
        sample_rate,
        samples.len()
    );
    Ok(SoundBuffer::new(channels, sample_rate, samples))
}

/// Decode an OGG file and keep only one channel
pub fn decode_mono(bytes: Vec<u8>, use_left: bool) -> AudioResult<SoundBuffer> {
    let stereo = decode(bytes)?;
    Ok(SoundBuffer::new(
        1,
        stereo.sample_rate,
        extract_channel(&stereo.samples, stereo.channels, use_left),
    ))
}

/// Pick one channel out of interleaved samples
///
/// Left is interleaved sample `channels * i`, right is `channels * i + 1`.
/// Mono input is returned as is.
pub fn extract_channel(samples: &[i16], channels: u16, use_left: bool) -> Vec<i16> {
    let stride = usize::from(channels.max(1));
    if stride == 1 {
        return samples.to_vec();
    }
    let offset = if use_left { 0 } else { 1 };
    samples
        .chunks_exact(stride)
        .map(|frame| frame[offset])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_left_and_right() {
        let interleaved = [1, -1, 2, -2, 3, -3];

        assert_eq!(extract_channel(&interleaved, 2, true), vec![1, 2, 3]);
        assert_eq!(extract_channel(&interleaved, 2, false), vec![-1, -2, -3]);
    }

    #[test]
    fn test_extract_from_mono() {
        assert_eq!(extract_channel(&[5, 6, 7], 1, false), vec![5, 6, 7]);
    }

    #[test]
    fn test_extract_drops_partial_frame() {
        assert_eq!(extract_channel(&[1, 2, 3], 2, true), vec![1]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = decode(b"definitely not vorbis".to_vec());
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }
}
