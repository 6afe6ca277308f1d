//! Opus frame descriptors and the length encodings used inside packets.
//!
//! This module provides the frame descriptor type, the code 3 frame count byte,
//! and the two variable-length encodings from RFC 6716 Section 3.2: frame
//! length fields and padding length chains.

use crate::error::FramingError;

/// Largest frame size, in bytes, a packet may carry.
pub const MAX_FRAME_SIZE: usize = 1275;

/// Largest number of frames in one packet (120 ms of 2.5 ms frames).
pub const MAX_FRAMES: usize = 48;

/// Largest packet duration in 48 kHz samples (120 ms).
pub const MAX_PACKET_SAMPLES_48K: usize = 5760;

/// Frame packing modes, selected by the TOC frame count code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePacking {
    /// Code 0: Single frame
    SingleFrame,
    /// Code 1: Two equal frames
    TwoFramesEqual,
    /// Code 2: Two variable frames
    TwoFramesVariable,
    /// Code 3: Arbitrary number of frames
    ArbitraryFrames,
}

impl FramePacking {
    /// Maps the two-bit frame count code to a packing mode.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x3 {
            0 => Self::SingleFrame,
            1 => Self::TwoFramesEqual,
            2 => Self::TwoFramesVariable,
            _ => Self::ArbitraryFrames,
        }
    }
}

/// Location of one frame inside a packet buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    /// Byte offset of the frame from the start of the packet
    pub offset: usize,
    /// Frame size in bytes
    pub size: u16,
}

impl Frame {
    /// Byte range of this frame in the packet.
    #[must_use]
    pub const fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.size as usize
    }

    /// Zero-length frames signal DTX (discontinuous transmission).
    #[must_use]
    pub const fn is_dtx(&self) -> bool {
        self.size == 0
    }
}

/// Code 3 frame count byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCountByte {
    /// Frames declared by the packet (0-63)
    pub count: u8,
    /// Padding length chain follows
    pub padding: bool,
    /// Explicit per-frame lengths follow
    pub vbr: bool,
}

impl FrameCountByte {
    /// Splits a frame count byte into its fields. Validation of the count is
    /// left to the caller since it depends on the frame duration.
    #[must_use]
    pub const fn parse(byte: u8) -> Self {
        Self {
            count: byte & 0x3F,
            padding: byte & 0x40 != 0,
            vbr: byte & 0x80 != 0,
        }
    }
}

/// Decode a frame length field.
///
/// Values below 252 occupy one byte. Larger values use a second byte and
/// decode as `4 * second + first`, which caps the result at 1275.
///
/// Returns `(length, bytes_read)`.
///
/// # Errors
///
/// * `InvalidPacket` - If the data is empty or the second byte is missing
pub fn decode_frame_length(data: &[u8]) -> Result<(usize, usize), FramingError> {
    match *data {
        [] => Err(FramingError::InvalidPacket),
        [first @ 0..=251, ..] => Ok((first as usize, 1)),
        [_] => Err(FramingError::InvalidPacket),
        [first, second, ..] => Ok((4 * second as usize + first as usize, 2)),
    }
}

/// Decode a code 3 padding length chain.
///
/// Each byte of 255 adds 254 bytes of padding and continues the chain; any
/// other value adds itself and terminates it.
///
/// Returns `(padding_length, bytes_read)`. The chain bytes themselves are not
/// included in the padding length.
///
/// # Errors
///
/// * `InvalidPacket` - If the data ends before the chain terminates
pub fn decode_padding_length(data: &[u8]) -> Result<(usize, usize), FramingError> {
    let mut padding = 0_usize;

    for (i, &byte) in data.iter().enumerate() {
        if byte == 255 {
            padding += 254;
        } else {
            padding += byte as usize;
            return Ok((padding, i + 1));
        }
    }

    Err(FramingError::InvalidPacket)
}
