//! RIFF/WAVE parsing for uncompressed linear PCM

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;

/// Result type for WAV operations
pub type WavResult<T> = Result<T, WavError>;

/// WAV decoding errors
#[derive(Error, Debug)]
pub enum WavError {
    /// The file could not be read
    #[error("WAV IO error: {0}")]
    Io(#[from] io::Error),

    /// The container structure is malformed or truncated
    #[error("Malformed WAV: {0}")]
    Format(String),

    /// The container is valid but its encoding is not handled
    #[error("Unsupported WAV: {0}")]
    UnsupportedFormat(String),
}

const CHUNK_RIFF: &[u8; 4] = b"RIFF";
const CHUNK_WAVE: &[u8; 4] = b"WAVE";
const CHUNK_JUNK: &[u8; 4] = b"JUNK";
const CHUNK_FMT: &[u8; 4] = b"fmt ";
const CHUNK_DATA: &[u8; 4] = b"data";

/// Only plain PCM `fmt ` chunks are accepted
const PCM_FMT_LENGTH: u32 = 16;
const FORMAT_LINEAR_PCM: u16 = 1;

/// Playback layout of a PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// One channel of unsigned bytes
    Mono8,
    /// One channel of signed 16-bit samples
    Mono16,
    /// Two interleaved channels of unsigned bytes
    Stereo8,
    /// Two interleaved channels of signed 16-bit samples
    Stereo16,
}

impl SampleFormat {
    /// Interleaved channel count
    pub fn channels(self) -> u16 {
        match self {
            SampleFormat::Mono8 | SampleFormat::Mono16 => 1,
            SampleFormat::Stereo8 | SampleFormat::Stereo16 => 2,
        }
    }
}

/// Decoded WAV header and raw sample bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    /// Interleaved channel count
    pub channels: u16,
    /// Frames per second
    pub sample_rate: u32,
    /// Declared byte rate
    pub avg_bytes_per_sec: u32,
    /// Bytes per frame
    pub block_align: u16,
    /// Bits per single-channel sample
    pub bits_per_sample: u16,
    /// Contents of the `data` chunk
    pub pcm: Vec<u8>,
}

/// Chunk-scanning WAV reader
pub struct WavParser;

impl WavParser {
    /// Parse a WAV file
    pub fn load<P: AsRef<Path>>(path: P) -> WavResult<WavInfo> {
        let path = path.as_ref();
        let info = Self::parse(BufReader::new(File::open(path)?))?;

        log::info!(
            "Loaded WAV {:?}: {} ch, {} Hz, {} bit, {} bytes",
            path,
            info.channels,
            info.sample_rate,
            info.bits_per_sample,
            info.pcm.len()
        );
        Ok(info)
    }

    /// Parse WAV bytes already in memory
    pub fn parse_bytes(data: &[u8]) -> WavResult<WavInfo> {
        Self::parse(data)
    }

    /// Parse a WAV stream
    ///
    /// Checks the `RIFF`/`WAVE` header, skips a leading `JUNK` chunk and any
    /// other chunk before `fmt `, then skips to `data`.
    pub fn parse<R: Read>(mut reader: R) -> WavResult<WavInfo> {
        let r = &mut reader;

        expect_tag(r, CHUNK_RIFF)?;
        let _riff_length = read_u32(r)?;
        expect_tag(r, CHUNK_WAVE)?;

        let mut name = read_tag(r)?;
        if &name == CHUNK_JUNK {
            skip_chunk(r)?;
            name = read_tag(r)?;
        }
        while &name != CHUNK_FMT {
            skip_chunk(r)?;
            name = read_tag(r)?;
        }

        let fmt_length = read_u32(r)?;
        if fmt_length != PCM_FMT_LENGTH {
            return Err(WavError::UnsupportedFormat(format!(
                "fmt chunk of {} bytes, only linear PCM is supported",
                fmt_length
            )));
        }
        let format = read_u16(r)?;
        if format != FORMAT_LINEAR_PCM {
            return Err(WavError::UnsupportedFormat(format!(
                "format code {}, only uncompressed PCM is supported",
                format
            )));
        }

        let channels = read_u16(r)?;
        let sample_rate = read_u32(r)?;
        let avg_bytes_per_sec = read_u32(r)?;
        let block_align = read_u16(r)?;
        let bits_per_sample = read_u16(r)?;

        name = read_tag(r)?;
        while &name != CHUNK_DATA {
            skip_chunk(r)?;
            name = read_tag(r)?;
        }

        // The declared length is untrusted; grow with what actually arrives.
        let data_length = read_u32(r)?;
        let mut pcm = Vec::new();
        r.by_ref().take(u64::from(data_length)).read_to_end(&mut pcm)?;
        if pcm.len() < data_length as usize {
            return Err(WavError::Format(format!(
                "data chunk declares {} bytes, found {}",
                data_length,
                pcm.len()
            )));
        }

        Ok(WavInfo {
            channels,
            sample_rate,
            avg_bytes_per_sec,
            block_align,
            bits_per_sample,
            pcm,
        })
    }
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> WavResult<()> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => WavError::Format("unexpected end of data".to_string()),
        _ => WavError::Io(e),
    })
}

fn read_tag<R: Read>(r: &mut R) -> WavResult<[u8; 4]> {
    let mut tag = [0; 4];
    read_exact(r, &mut tag)?;
    Ok(tag)
}

fn expect_tag<R: Read>(r: &mut R, expected: &[u8; 4]) -> WavResult<()> {
    let tag = read_tag(r)?;
    if &tag == expected {
        Ok(())
    } else {
        Err(WavError::Format(format!(
            "expected {:?}, found {:?}",
            String::from_utf8_lossy(expected),
            String::from_utf8_lossy(&tag)
        )))
    }
}

fn read_u16<R: Read>(r: &mut R) -> WavResult<u16> {
    let mut buf = [0; 2];
    read_exact(r, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> WavResult<u32> {
    let mut buf = [0; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Skip a chunk body whose name has already been read
fn skip_chunk<R: Read>(r: &mut R) -> WavResult<()> {
    let length = u64::from(read_u32(r)?);
    let skipped = io::copy(&mut r.take(length), &mut io::sink())?;
    if skipped == length {
        Ok(())
    } else {
        Err(WavError::Format("chunk extends past end of data".to_string()))
    }
}

impl WavInfo {
    /// Single-channel copy of this stream
    ///
    /// Mono input is returned unchanged. 8-bit stereo keeps every even
    /// byte whichever channel is requested. Wider stereo picks bytes per
    /// output index `i`: left takes `2i` for even `i` and `2i - 1` for odd
    /// `i`; right takes `2i + 2` for even `i` and `2i + 1` for odd `i`.
    /// This selects whole samples for 16-bit data only.
    pub fn convert_to_mono(&self, use_left: bool) -> WavResult<WavInfo> {
        match self.channels {
            1 => return Ok(self.clone()),
            2 => {}
            n => {
                return Err(WavError::UnsupportedFormat(format!(
                    "cannot downmix {} channels",
                    n
                )))
            }
        }

        let len = self.pcm.len() / 2;
        let mut mono = Vec::with_capacity(len);
        for i in 0..len {
            let src = if self.bits_per_sample == 8 {
                2 * i
            } else if use_left {
                if i % 2 == 0 {
                    2 * i
                } else {
                    2 * i - 1
                }
            } else if i % 2 == 0 {
                2 * i + 2
            } else {
                2 * i + 1
            };
            let byte = self.pcm.get(src).copied().ok_or_else(|| {
                WavError::Format(format!(
                    "mono conversion reads byte {} of {}",
                    src,
                    self.pcm.len()
                ))
            })?;
            mono.push(byte);
        }

        Ok(WavInfo {
            channels: 1,
            avg_bytes_per_sec: self.avg_bytes_per_sec / 2,
            pcm: mono,
            ..self.clone()
        })
    }

    /// Little-endian signed 16-bit samples
    pub fn pcm16(&self) -> Vec<i16> {
        self.pcm
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    /// Little-endian signed 24-bit samples, sign-extended
    pub fn pcm24(&self) -> Vec<i32> {
        self.pcm
            .chunks_exact(3)
            .map(|b| i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8)
            .collect()
    }

    /// 24-bit samples narrowed to 16 bits by dropping the low byte
    pub fn pcm16_from_24(&self) -> Vec<i16> {
        self.pcm
            .chunks_exact(3)
            .map(|b| i16::from_le_bytes([b[1], b[2]]))
            .collect()
    }

    /// Playback layout; 24-bit data plays as 16-bit after narrowing
    pub fn sample_format(&self) -> WavResult<SampleFormat> {
        match (self.channels, self.bits_per_sample) {
            (1, 8) => Ok(SampleFormat::Mono8),
            (1, 16 | 24) => Ok(SampleFormat::Mono16),
            (2, 8) => Ok(SampleFormat::Stereo8),
            (2, 16 | 24) => Ok(SampleFormat::Stereo16),
            (channels, bits) => Err(WavError::UnsupportedFormat(format!(
                "{} channels at {} bits per sample",
                channels, bits
            ))),
        }
    }

    /// Signed 16-bit samples ready for playback
    ///
    /// Unsigned 8-bit samples are re-centred on zero and scaled up.
    pub fn to_pcm_i16(&self) -> WavResult<Vec<i16>> {
        self.sample_format()?;
        Ok(match self.bits_per_sample {
            8 => self
                .pcm
                .iter()
                .map(|&b| (i16::from(b) - 128) << 8)
                .collect(),
            24 => self.pcm16_from_24(),
            _ => self.pcm16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(name: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = name.to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    fn fmt_body(format: u16, channels: u16, rate: u32, bits: u16) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let mut body = Vec::new();
        body.extend_from_slice(&format.to_le_bytes());
        body.extend_from_slice(&channels.to_le_bytes());
        body.extend_from_slice(&rate.to_le_bytes());
        body.extend_from_slice(&(rate * u32::from(block_align)).to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&bits.to_le_bytes());
        body
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(&body);
        out
    }

    fn stereo16(pcm: Vec<u8>) -> WavInfo {
        WavInfo {
            channels: 2,
            sample_rate: 44100,
            avg_bytes_per_sec: 176_400,
            block_align: 4,
            bits_per_sample: 16,
            pcm,
        }
    }

    #[test]
    fn test_literal_round_trip() {
        let bytes = riff(&[
            chunk(b"fmt ", &fmt_body(1, 2, 22050, 16)),
            chunk(b"data", &[1, 2, 3, 4, 5, 6, 7, 8]),
        ]);

        let info = WavParser::parse_bytes(&bytes).unwrap();

        assert_eq!(
            info,
            WavInfo {
                channels: 2,
                sample_rate: 22050,
                avg_bytes_per_sec: 88200,
                block_align: 4,
                bits_per_sample: 16,
                pcm: vec![1, 2, 3, 4, 5, 6, 7, 8],
            }
        );
    }

    #[test]
    fn test_skips_junk_and_unknown_chunks() {
        let bytes = riff(&[
            chunk(b"JUNK", &[0; 28]),
            chunk(b"bext", &[9; 5]),
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 8)),
            chunk(b"LIST", b"INFOISFT"),
            chunk(b"data", &[128, 129]),
        ]);

        let info = WavParser::parse_bytes(&bytes).unwrap();

        assert_eq!(info.channels, 1);
        assert_eq!(info.pcm, vec![128, 129]);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = riff(&[chunk(b"fmt ", &fmt_body(1, 1, 8000, 8))]);
        bytes[8..12].copy_from_slice(b"AVI ");

        assert!(matches!(WavParser::parse_bytes(&bytes), Err(WavError::Format(_))));
        assert!(matches!(WavParser::parse_bytes(b"RIFX"), Err(WavError::Format(_))));
    }

    #[test]
    fn test_extended_fmt_rejected() {
        let mut body = fmt_body(1, 2, 44100, 16);
        body.extend_from_slice(&[0, 0]);
        let bytes = riff(&[chunk(b"fmt ", &body), chunk(b"data", &[])]);

        assert!(matches!(
            WavParser::parse_bytes(&bytes),
            Err(WavError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_compressed_rejected() {
        let bytes = riff(&[chunk(b"fmt ", &fmt_body(3, 1, 44100, 32)), chunk(b"data", &[])]);

        assert!(matches!(
            WavParser::parse_bytes(&bytes),
            Err(WavError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_truncated_data() {
        let mut bytes = riff(&[
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 8)),
            chunk(b"data", &[1, 2, 3, 4]),
        ]);
        bytes.truncate(bytes.len() - 2);

        assert!(matches!(WavParser::parse_bytes(&bytes), Err(WavError::Format(_))));
    }

    #[test]
    fn test_oversized_data_length() {
        let mut bytes = riff(&[
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 8)),
            chunk(b"data", &[1, 2, 3, 4]),
        ]);
        let len_at = bytes.len() - 8;
        bytes[len_at..len_at + 4].copy_from_slice(&u32::MAX.to_le_bytes());

        match WavParser::parse_bytes(&bytes) {
            Err(WavError::Format(msg)) => assert!(msg.contains("found 4"), "{}", msg),
            other => panic!("expected a format error, got {:?}", other.map(|info| info.pcm.len())),
        }
    }

    #[test]
    fn test_missing_data_chunk() {
        let bytes = riff(&[chunk(b"fmt ", &fmt_body(1, 1, 8000, 8))]);
        assert!(matches!(WavParser::parse_bytes(&bytes), Err(WavError::Format(_))));
    }

    #[test]
    fn test_mono_is_noop() {
        let info = WavInfo {
            channels: 1,
            sample_rate: 8000,
            avg_bytes_per_sec: 8000,
            block_align: 1,
            bits_per_sample: 8,
            pcm: vec![1, 2, 3],
        };

        assert_eq!(info.convert_to_mono(true).unwrap(), info);
        assert_eq!(info.convert_to_mono(false).unwrap(), info);
    }

    #[test]
    fn test_left_extraction_16bit() {
        let info = stereo16(vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let mono = info.convert_to_mono(true).unwrap();

        assert_eq!(mono.pcm, vec![1, 2, 5, 6]);
        assert_eq!(mono.pcm16(), vec![i16::from_le_bytes([1, 2]), i16::from_le_bytes([5, 6])]);
        assert_eq!(mono.channels, 1);
        assert_eq!(mono.avg_bytes_per_sec, 88200);
        assert_eq!(mono.block_align, info.block_align);
    }

    #[test]
    fn test_right_extraction_pinned() {
        let info = stereo16(vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let mono = info.convert_to_mono(false).unwrap();

        // even i reads 2i + 2, odd i reads 2i + 1
        assert_eq!(mono.pcm, vec![3, 4, 7, 8]);
    }

    #[test]
    fn test_right_extraction_out_of_range() {
        let info = stereo16(vec![1, 2, 3, 4, 5, 6]);

        assert!(matches!(info.convert_to_mono(false), Err(WavError::Format(_))));
        assert_eq!(info.convert_to_mono(true).unwrap().pcm, vec![1, 2, 5]);
    }

    #[test]
    fn test_8bit_stereo_takes_even_bytes() {
        let info = WavInfo {
            bits_per_sample: 8,
            block_align: 2,
            ..stereo16(vec![10, 20, 30, 40])
        };

        assert_eq!(info.convert_to_mono(true).unwrap().pcm, vec![10, 30]);
        assert_eq!(info.convert_to_mono(false).unwrap().pcm, vec![10, 30]);
    }

    #[test]
    fn test_too_many_channels() {
        let info = WavInfo {
            channels: 6,
            ..stereo16(vec![0; 12])
        };

        assert!(matches!(info.convert_to_mono(true), Err(WavError::UnsupportedFormat(_))));
        assert!(matches!(info.sample_format(), Err(WavError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_24_to_16_narrowing() {
        let info = WavInfo {
            channels: 1,
            bits_per_sample: 24,
            block_align: 3,
            ..stereo16(vec![0x11, 0x22, 0x33, 0xAA, 0xBB, 0xFF])
        };

        assert_eq!(info.pcm16_from_24(), vec![0x3322, i16::from_le_bytes([0xBB, 0xFF])]);
        assert_eq!(info.pcm24(), vec![0x0033_2211, -0x0000_4456]);
        assert_eq!(info.sample_format().unwrap(), SampleFormat::Mono16);
        assert_eq!(info.to_pcm_i16().unwrap(), info.pcm16_from_24());
    }

    #[test]
    fn test_sample_formats() {
        let base = stereo16(vec![]);
        let with = |channels, bits| WavInfo {
            channels,
            bits_per_sample: bits,
            ..base.clone()
        };

        assert_eq!(with(1, 8).sample_format().unwrap(), SampleFormat::Mono8);
        assert_eq!(with(1, 16).sample_format().unwrap(), SampleFormat::Mono16);
        assert_eq!(with(2, 8).sample_format().unwrap(), SampleFormat::Stereo8);
        assert_eq!(with(2, 24).sample_format().unwrap(), SampleFormat::Stereo16);
        assert!(with(2, 32).sample_format().is_err());
    }

    #[test]
    fn test_8bit_recentred() {
        let info = WavInfo {
            channels: 1,
            bits_per_sample: 8,
            block_align: 1,
            ..stereo16(vec![0, 128, 255])
        };

        assert_eq!(info.to_pcm_i16().unwrap(), vec![-32768, 0, 32512]);
    }
}
