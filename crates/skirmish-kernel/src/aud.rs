//! AUD container parsing and decoding.
//!
//! # Overview
//!
//! An AUD file is a fixed 12-byte little-endian header followed immediately
//! by `compressed_size` bytes of payload:
//!
//! ```text
//! offset  size  field
//! 0       2     sample rate (Hz)
//! 2       4     uncompressed size (bytes)
//! 6       4     compressed size (bytes)
//! 10      1     flags (bit0 = stereo, bit1 = 16-bit)
//! 11      1     compression (0 = raw, 1 = Westwood ADPCM, 99 = IMA ADPCM)
//! ```
//!
//! Decoding is a pure function of the header and payload. Failures return a
//! [`DecodeError`] and leave nothing behind.

use thiserror::Error;

use crate::adpcm;
use crate::audio_resource::DecodedClip;

/// Size of the AUD header in bytes.
pub const AUD_HEADER_SIZE: usize = 12;

/// Highest sample rate accepted by the header check.
pub const MAX_SAMPLE_RATE: u16 = 48_000;

/// Header flag: two interleaved channels.
pub const FLAG_STEREO: u8 = 0x01;

/// Header flag: 16-bit samples (raw payloads only).
pub const FLAG_16BIT: u8 = 0x02;

/// Errors produced while decoding an AUD image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The header failed validation.
    #[error("Invalid AUD header: {reason}")]
    InvalidHeader {
        /// What was wrong with it
        reason: &'static str,
    },

    /// The buffer is shorter than the header claims, or decoded to nothing.
    #[error("Insufficient data: needed {needed} bytes, got {available}")]
    InsufficientData {
        /// Bytes required
        needed: usize,
        /// Bytes present
        available: usize,
    },

    /// The compression id is not one of 0, 1 or 99.
    #[error("Unsupported compression id {0}")]
    UnsupportedCompression(u8),
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Payload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Compression {
    /// Raw PCM, 8-bit unsigned or 16-bit signed.
    None = 0,
    /// Westwood chunked ADPCM.
    Westwood = 1,
    /// IMA continuous ADPCM.
    Ima = 99,
}

impl Compression {
    /// Maps a header compression id.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Westwood),
            99 => Some(Self::Ima),
            _ => None,
        }
    }

    /// Header id of this encoding.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "PCM",
            Self::Westwood => "Westwood ADPCM",
            Self::Ima => "IMA ADPCM",
        }
    }
}

/// Parsed AUD header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudHeader {
    /// Sample rate in Hz.
    pub sample_rate: u16,
    /// Size of the decoded PCM in bytes (informational).
    pub uncompressed_size: u32,
    /// Size of the payload following the header.
    pub compressed_size: u32,
    /// Stereo and 16-bit flags.
    pub flags: u8,
    /// Raw compression id.
    pub compression: u8,
}

impl AudHeader {
    /// Reads the header fields from the start of `bytes`.
    ///
    /// This only checks that 12 bytes are present; call
    /// [`AudHeader::validate`] before trusting the values.
    pub fn parse(bytes: &[u8]) -> DecodeResult<Self> {
        let Some(raw) = bytes.get(..AUD_HEADER_SIZE) else {
            return Err(DecodeError::InsufficientData {
                needed: AUD_HEADER_SIZE,
                available: bytes.len(),
            });
        };

        Ok(Self {
            sample_rate: u16::from_le_bytes([raw[0], raw[1]]),
            uncompressed_size: u32::from_le_bytes([raw[2], raw[3], raw[4], raw[5]]),
            compressed_size: u32::from_le_bytes([raw[6], raw[7], raw[8], raw[9]]),
            flags: raw[10],
            compression: raw[11],
        })
    }

    /// Serializes the header back to its on-disk form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; AUD_HEADER_SIZE] {
        let mut out = [0u8; AUD_HEADER_SIZE];
        out[0..2].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[2..6].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        out[6..10].copy_from_slice(&self.compressed_size.to_le_bytes());
        out[10] = self.flags;
        out[11] = self.compression;
        out
    }

    /// Checks the header against a file image of `total_len` bytes.
    pub fn validate(&self, total_len: usize) -> DecodeResult<()> {
        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(DecodeError::InvalidHeader {
                reason: "sample rate out of range",
            });
        }
        if self.compressed_size == 0 {
            return Err(DecodeError::InvalidHeader {
                reason: "compressed size is zero",
            });
        }
        let needed = AUD_HEADER_SIZE + self.compressed_size as usize;
        if total_len < needed {
            return Err(DecodeError::InsufficientData {
                needed,
                available: total_len,
            });
        }
        Ok(())
    }

    /// Whether the stereo flag is set.
    #[must_use]
    pub const fn is_stereo(&self) -> bool {
        self.flags & FLAG_STEREO != 0
    }

    /// Whether the 16-bit flag is set.
    #[must_use]
    pub const fn is_16bit(&self) -> bool {
        self.flags & FLAG_16BIT != 0
    }

    /// Channel count (1 or 2).
    #[must_use]
    pub const fn channels(&self) -> u16 {
        if self.is_stereo() {
            2
        } else {
            1
        }
    }

    /// Bits per stored sample.
    #[must_use]
    pub const fn bits_per_sample(&self) -> u16 {
        if self.is_16bit() {
            16
        } else {
            8
        }
    }

    /// Resolves the compression id.
    pub fn compression(&self) -> DecodeResult<Compression> {
        Compression::from_id(self.compression)
            .ok_or(DecodeError::UnsupportedCompression(self.compression))
    }
}

/// Validates only the header of a file image.
pub fn probe(bytes: &[u8]) -> DecodeResult<AudHeader> {
    let header = AudHeader::parse(bytes)?;
    header.validate(bytes.len())?;
    header.compression()?;
    Ok(header)
}

/// Decodes a payload described by `header`.
///
/// `payload` may be longer than `compressed_size`; extra bytes are ignored.
pub fn decode(header: &AudHeader, payload: &[u8]) -> DecodeResult<DecodedClip> {
    let compression = header.compression()?;
    let size = header.compressed_size as usize;
    let Some(payload) = payload.get(..size) else {
        return Err(DecodeError::InsufficientData {
            needed: size,
            available: payload.len(),
        });
    };

    let stereo = header.is_stereo();
    let mut samples = match compression {
        Compression::None if header.is_16bit() => decode_pcm16(payload),
        Compression::None => decode_pcm8(payload),
        Compression::Westwood => {
            if payload.len() < adpcm::WW_CHUNK_SIZE {
                return Err(DecodeError::InsufficientData {
                    needed: adpcm::WW_CHUNK_SIZE,
                    available: payload.len(),
                });
            }
            adpcm::decode_westwood(payload, stereo)
        },
        Compression::Ima => adpcm::decode_ima(payload),
    };

    // A trailing partial frame would shift the interleave of anything appended.
    let channels = usize::from(header.channels());
    samples.truncate(samples.len() - samples.len() % channels);

    if samples.is_empty() {
        return Err(DecodeError::InsufficientData {
            needed: minimum_payload(compression, header),
            available: payload.len(),
        });
    }

    Ok(DecodedClip::new(
        samples,
        header.channels(),
        u32::from(header.sample_rate),
    ))
}

/// Parses, validates and decodes a complete file image.
pub fn decode_aud(bytes: &[u8]) -> DecodeResult<DecodedClip> {
    let header = AudHeader::parse(bytes)?;
    header.validate(bytes.len())?;
    decode(&header, &bytes[AUD_HEADER_SIZE..])
}

/// Builds an uncompressed 16-bit AUD image.
///
/// `samples` is interleaved when `channels` is 2.
#[must_use]
pub fn encode_raw_pcm16(sample_rate: u16, channels: u16, samples: &[i16]) -> Vec<u8> {
    let size = (samples.len() * 2) as u32;
    let mut flags = FLAG_16BIT;
    if channels == 2 {
        flags |= FLAG_STEREO;
    }
    let header = AudHeader {
        sample_rate,
        uncompressed_size: size,
        compressed_size: size,
        flags,
        compression: Compression::None.id(),
    };

    let mut out = Vec::with_capacity(AUD_HEADER_SIZE + size as usize);
    out.extend_from_slice(&header.to_bytes());
    out.extend(samples.iter().flat_map(|s| s.to_le_bytes()));
    out
}

fn decode_pcm16(payload: &[u8]) -> Vec<i16> {
    payload
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

fn decode_pcm8(payload: &[u8]) -> Vec<i16> {
    payload
        .iter()
        .map(|&b| (i16::from(b) - 128) * 256)
        .collect()
}

const fn minimum_payload(compression: Compression, header: &AudHeader) -> usize {
    match compression {
        Compression::None if header.is_16bit() => 2 * header.channels() as usize,
        Compression::None => header.channels() as usize,
        Compression::Ima => 1,
        Compression::Westwood if header.is_stereo() => adpcm::WW_CHUNK_SIZE * 2,
        Compression::Westwood => adpcm::WW_CHUNK_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn image(header: AudHeader, payload: &[u8]) -> Vec<u8> {
        let mut out = header.to_bytes().to_vec();
        out.extend_from_slice(payload);
        out
    }

    fn header(compression: u8, flags: u8, size: u32) -> AudHeader {
        AudHeader {
            sample_rate: 22050,
            uncompressed_size: size * 4,
            compressed_size: size,
            flags,
            compression,
        }
    }

    #[test]
    fn test_header_layout_is_little_endian() {
        let h = AudHeader {
            sample_rate: 0x5622,
            uncompressed_size: 0x0102_0304,
            compressed_size: 0x0A0B_0C0D,
            flags: 0x03,
            compression: 99,
        };
        let bytes = h.to_bytes();
        assert_eq!(bytes, [0x22, 0x56, 4, 3, 2, 1, 0x0D, 0x0C, 0x0B, 0x0A, 3, 99]);
        assert_eq!(AudHeader::parse(&bytes), Ok(h));
        assert!(h.is_stereo());
        assert!(h.is_16bit());
        assert_eq!(h.channels(), 2);
        assert_eq!(h.bits_per_sample(), 16);
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert_eq!(
            AudHeader::parse(&[0u8; 11]),
            Err(DecodeError::InsufficientData {
                needed: 12,
                available: 11
            })
        );
    }

    #[test]
    fn test_header_validation() {
        let mut h = header(0, FLAG_16BIT, 4);
        assert!(h.validate(16).is_ok());
        assert!(matches!(
            h.validate(15),
            Err(DecodeError::InsufficientData { needed: 16, .. })
        ));

        h.sample_rate = 0;
        assert!(matches!(h.validate(16), Err(DecodeError::InvalidHeader { .. })));
        h.sample_rate = 48_001;
        assert!(matches!(h.validate(16), Err(DecodeError::InvalidHeader { .. })));
        h.sample_rate = 48_000;
        assert!(h.validate(16).is_ok());

        h.compressed_size = 0;
        assert!(matches!(h.validate(16), Err(DecodeError::InvalidHeader { .. })));
    }

    #[test]
    fn test_unsupported_compression() {
        let bytes = image(header(7, 0, 4), &[0; 4]);
        assert_eq!(decode_aud(&bytes), Err(DecodeError::UnsupportedCompression(7)));
        assert_eq!(probe(&bytes), Err(DecodeError::UnsupportedCompression(7)));
    }

    #[test]
    fn test_raw_pcm16_copied_verbatim() {
        let samples = [0i16, 1, -1, i16::MAX, i16::MIN, 1234];
        let bytes = encode_raw_pcm16(11025, 1, &samples);
        let clip = decode_aud(&bytes).unwrap();
        assert_eq!(clip.samples(), &samples);
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.sample_rate(), 11025);
    }

    #[test]
    fn test_raw_pcm8_is_recentred() {
        let bytes = image(header(0, 0, 4), &[0, 128, 255, 129]);
        let clip = decode_aud(&bytes).unwrap();
        assert_eq!(clip.samples(), &[-32768, 0, 32512, 256]);
    }

    #[test]
    fn test_raw_pcm16_stereo_interleave() {
        let samples = [1i16, -1, 2, -2, i16::MAX, i16::MIN];
        let bytes = encode_raw_pcm16(22050, 2, &samples);
        let header = probe(&bytes).unwrap();
        assert_eq!(header.channels(), 2);
        assert_eq!(header.compressed_size, 12);

        let clip = decode_aud(&bytes).unwrap();
        assert_eq!(clip.samples(), &samples);
        assert_eq!(clip.channels(), 2);
        assert_eq!(clip.frames(), 3);
        assert_eq!(clip.byte_size(), 12);
    }

    #[test]
    fn test_raw_pcm8_stereo_interleave() {
        let bytes = image(header(0, FLAG_STEREO, 4), &[0, 255, 128, 129]);
        let clip = decode_aud(&bytes).unwrap();
        assert_eq!(clip.samples(), &[-32768, 32512, 0, 256]);
        assert_eq!(clip.frames(), 2);
    }

    #[test]
    fn test_raw_stereo_drops_partial_frame() {
        let full = encode_raw_pcm16(22050, 2, &[10, -10, 20, -20]);
        let payload = &full[AUD_HEADER_SIZE..AUD_HEADER_SIZE + 7];
        let clip = decode_aud(&image(header(0, FLAG_STEREO | FLAG_16BIT, 7), payload)).unwrap();
        assert_eq!(clip.samples(), &[10, -10]);
        assert_eq!(clip.frames(), 1);

        let clip = decode_aud(&image(header(0, FLAG_STEREO, 3), &[128, 129, 130])).unwrap();
        assert_eq!(clip.samples(), &[0, 256]);
    }

    #[test]
    fn test_raw_stereo_without_a_whole_frame() {
        let bytes = image(header(0, FLAG_STEREO | FLAG_16BIT, 3), &[1, 0, 2]);
        assert_eq!(
            decode_aud(&bytes),
            Err(DecodeError::InsufficientData {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_westwood_payload_too_short() {
        let bytes = image(header(1, 0, 15), &[0; 15]);
        assert!(matches!(
            decode_aud(&bytes),
            Err(DecodeError::InsufficientData { needed: 16, .. })
        ));
    }

    #[test]
    fn test_westwood_stereo_needs_a_full_pair() {
        let bytes = image(header(1, FLAG_STEREO, 16), &[0; 16]);
        assert!(matches!(
            decode_aud(&bytes),
            Err(DecodeError::InsufficientData { needed: 32, .. })
        ));
    }

    #[test]
    fn test_westwood_through_container() {
        let mut payload = vec![100, 0, 0, 0];
        payload.extend_from_slice(&[0; 12]);
        let clip = decode_aud(&image(header(1, 0, 16), &payload)).unwrap();
        assert_eq!(clip.samples().len(), 25);
        assert_eq!(clip.samples()[0], 100);
    }

    #[test]
    fn test_ima_through_container() {
        let clip = decode_aud(&image(header(99, FLAG_STEREO, 2), &[0x07, 0x00])).unwrap();
        assert_eq!(clip.channels(), 2);
        assert_eq!(clip.samples().len(), 4);
        assert_eq!(clip.samples()[0], 11);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = encode_raw_pcm16(22050, 1, &[5, 6]);
        bytes.extend_from_slice(&[0xAA; 8]);
        assert_eq!(decode_aud(&bytes).unwrap().samples(), &[5, 6]);
    }

    #[test]
    fn test_decode_with_short_payload_slice() {
        let h = header(0, 0, 8);
        assert!(matches!(
            decode(&h, &[0; 4]),
            Err(DecodeError::InsufficientData { needed: 8, available: 4 })
        ));
    }

    #[test]
    fn test_compression_names() {
        assert_eq!(Compression::from_id(1), Some(Compression::Westwood));
        assert_eq!(Compression::Ima.id(), 99);
        assert_eq!(Compression::None.name(), "PCM");
        assert_eq!(Compression::from_id(2), None);
    }

    proptest! {
        #[test]
        fn prop_decode_is_deterministic(
            compression in prop_oneof![Just(0u8), Just(1u8), Just(99u8)],
            flags in 0u8..4,
            payload in proptest::collection::vec(any::<u8>(), 1..256),
        ) {
            let bytes = image(header(compression, flags, payload.len() as u32), &payload);
            prop_assert_eq!(decode_aud(&bytes), decode_aud(&bytes));
        }

        #[test]
        fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let _ = decode_aud(&bytes);
            let _ = probe(&bytes);
        }
    }
}
