#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]
#![forbid(unsafe_code)]

//! # `MoosicBox` Opus Framing
//!
//! `RFC 6716` packet framing for Opus: TOC byte decoding, frame boundary
//! discovery with full bounds validation, and a decoder session that drives
//! an external frame decoder over every frame of a packet.
//!
//! ```
//! use moosicbox_opus_framing::{OpusMode, packet};
//!
//! let mut data = vec![0x80];
//! data.extend([0_u8; 40]);
//!
//! let parsed = packet::parse_packet(&data).unwrap();
//! assert_eq!(parsed.toc().mode(), OpusMode::CeltOnly);
//! assert_eq!(parsed.frame_count(), 1);
//! assert_eq!(parsed.frames()[0].size, 40);
//! ```

pub mod ctl;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod packet;
pub mod toc;

pub use ctl::{DecoderRequest, DecoderResponse};
pub use decoder::{Decoder, FrameContext, FrameDecoder, Sample, SessionState};
pub use error::{Error, FramingError, Result};
pub use frame::{Frame, FramePacking, decode_frame_length};
pub use packet::{ParsedPacket, parse, parse_packet, parse_self_delimited};
pub use toc::{Bandwidth, FrameDuration, OpusMode, Toc};

/// Channel layout of a stream or packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono = 1,
    Stereo = 2,
}

impl Channels {
    /// Number of interleaved channels
    #[must_use]
    pub const fn count(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Channels {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            _ => Err(Error::BadArgument(format!(
                "channel count must be 1 or 2, got {value}"
            ))),
        }
    }
}

/// Decoder output sample rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Hz8000 = 8000,
    Hz12000 = 12000,
    Hz16000 = 16000,
    Hz24000 = 24000,
    Hz48000 = 48000,
}

impl SampleRate {
    /// Rate in Hz
    #[must_use]
    pub const fn hz(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            8000 => Ok(Self::Hz8000),
            12000 => Ok(Self::Hz12000),
            16000 => Ok(Self::Hz16000),
            24000 => Ok(Self::Hz24000),
            48000 => Ok(Self::Hz48000),
            _ => Err(Error::BadArgument(format!(
                "unsupported sample rate: {value} Hz"
            ))),
        }
    }
}
