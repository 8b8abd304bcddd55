//! RIFF/WAVE encoding for the resampled audio track.
//!
//! The layout is fixed: 44-byte header, PCM format 1, one channel, 16 kHz,
//! 16 bits per sample, little-endian samples.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{MediaError, MediaResult};

pub const SAMPLE_RATE: u32 = 16_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;
pub const HEADER_LEN: usize = 44;

/// Canonical output format: mono 16 kHz signed 16-bit PCM.
pub fn wav_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Convert a float sample to 16-bit PCM.
///
/// Negative values scale by 0x8000 and positive by 0x7FFF, then truncate.
pub fn pcm16_from_f32(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode 16-bit samples into a WAV file.
pub fn encode_wav(samples: &[i16]) -> MediaResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN + samples.len() * 2));

    let mut writer = WavWriter::new(&mut cursor, wav_spec())?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}

/// Encode float samples in [-1, 1] into a WAV file.
pub fn encode_wav_f32(samples: &[f32]) -> MediaResult<Vec<u8>> {
    let pcm: Vec<i16> = samples.iter().copied().map(pcm16_from_f32).collect();
    encode_wav(&pcm)
}

/// Parsed header and samples of a canonical WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub samples: Vec<i16>,
}

impl WavInfo {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate.max(1) as f64
    }
}

/// Decode a WAV file, rejecting anything but mono 16 kHz 16-bit PCM.
pub fn decode_wav(bytes: &[u8]) -> MediaResult<WavInfo> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec != wav_spec() {
        return Err(MediaError::InvalidWav(format!(
            "expected mono 16 kHz 16-bit PCM, got {} ch {} Hz {}-bit {:?}",
            spec.channels, spec.sample_rate, spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_bit_exact() {
        let wav = encode_wav(&[0, 1, -1]).unwrap();
        let parts: [&[u8]; 13] = [
            b"RIFF",
            &42u32.to_le_bytes(),
            b"WAVE",
            b"fmt ",
            &16u32.to_le_bytes(),
            &1u16.to_le_bytes(),
            &1u16.to_le_bytes(),
            &16000u32.to_le_bytes(),
            &32000u32.to_le_bytes(),
            &2u16.to_le_bytes(),
            &16u16.to_le_bytes(),
            b"data",
            &6u32.to_le_bytes(),
        ];
        let expected_header = parts.concat();

        assert_eq!(&wav[..HEADER_LEN], expected_header.as_slice());
        assert_eq!(wav.len(), HEADER_LEN + 6);
        assert_eq!(&wav[HEADER_LEN..], &[0, 0, 1, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn test_standard_reader_round_trip() {
        let samples: Vec<i16> = (0..1600)
            .map(|i| ((i as f32 * 0.05).sin() * 20_000.0) as i16)
            .chain([i16::MIN, i16::MAX, 0])
            .collect();
        let wav = encode_wav(&samples).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_decode_matches_encode() {
        let samples = vec![5, -5, 300, -300];
        let info = decode_wav(&encode_wav(&samples).unwrap()).unwrap();
        assert_eq!(info.samples, samples);
        assert_eq!(info.sample_rate, SAMPLE_RATE);
        assert_eq!(info.channels, 1);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_wav(b"not a wav").is_err());
        let mut wav = encode_wav(&[1, 2, 3]).unwrap();
        wav.truncate(HEADER_LEN + 2);
        assert!(decode_wav(&wav).is_err());
    }

    #[test]
    fn test_decode_rejects_stereo() {
        let spec = WavSpec {
            channels: 2,
            ..wav_spec()
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        writer.write_sample(1i16).unwrap();
        writer.write_sample(-1i16).unwrap();
        writer.finalize().unwrap();

        let err = decode_wav(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, MediaError::InvalidWav(_)));
    }

    #[test]
    fn test_pcm_conversion() {
        assert_eq!(pcm16_from_f32(1.0), 32767);
        assert_eq!(pcm16_from_f32(-1.0), -32768);
        assert_eq!(pcm16_from_f32(2.5), 32767);
        assert_eq!(pcm16_from_f32(-7.0), -32768);
        assert_eq!(pcm16_from_f32(0.5), 16383);
        assert_eq!(pcm16_from_f32(-0.5), -16384);
        assert_eq!(pcm16_from_f32(f32::NAN), 0);
    }
}
