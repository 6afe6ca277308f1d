//! Table of Contents (TOC) byte parsing and Opus configuration types.
//!
//! This module implements the TOC byte parsing logic from RFC 6716 Section 3.1.
//! The TOC byte is the first byte of every Opus packet and encodes the coding
//! mode, audio bandwidth, frame duration, stereo flag, and frame count code.
//!
//! All accessors are total over the 256 possible byte values. Mode, bandwidth
//! and frame duration are derived directly from the bit fields; the RFC 6716
//! Table 2 lookup in [`CONFIGURATIONS`] describes the same mapping by
//! configuration number.

use crate::Channels;

/// Table of Contents (TOC) byte parsed from Opus packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toc(u8);

impl Toc {
    /// Parses TOC byte from Opus packet header
    #[must_use]
    pub const fn parse(toc_byte: u8) -> Self {
        Self(toc_byte)
    }

    /// Returns the raw TOC byte
    #[must_use]
    pub const fn byte(self) -> u8 {
        self.0
    }

    /// Returns configuration index (0-31)
    #[must_use]
    pub const fn config(self) -> u8 {
        self.0 >> 3
    }

    /// Returns channel configuration
    #[must_use]
    pub const fn channels(self) -> Channels {
        if self.0 & 0x04 == 0 {
            Channels::Mono
        } else {
            Channels::Stereo
        }
    }

    /// Returns frame count code (0-3)
    #[must_use]
    pub const fn frame_count_code(self) -> u8 {
        self.0 & 0x03
    }

    /// Returns the coding mode.
    ///
    /// The CELT-only flag (bit 7) wins; otherwise both bits 6 and 5 set select
    /// hybrid mode.
    #[must_use]
    pub const fn mode(self) -> OpusMode {
        if self.0 & 0x80 != 0 {
            OpusMode::CeltOnly
        } else if self.0 & 0x60 == 0x60 {
            OpusMode::Hybrid
        } else {
            OpusMode::SilkOnly
        }
    }

    /// Returns audio bandwidth
    #[must_use]
    pub const fn bandwidth(self) -> Bandwidth {
        let sub = (self.0 >> 5) & 0x3;
        match self.mode() {
            // Offset from mediumband, which CELT cannot code and collapses to narrowband
            OpusMode::CeltOnly => match sub {
                0 => Bandwidth::Narrowband,
                1 => Bandwidth::Wideband,
                2 => Bandwidth::SuperWideband,
                _ => Bandwidth::Fullband,
            },
            OpusMode::Hybrid => {
                if self.0 & 0x10 == 0 {
                    Bandwidth::SuperWideband
                } else {
                    Bandwidth::Fullband
                }
            }
            OpusMode::SilkOnly => match sub {
                0 => Bandwidth::Narrowband,
                1 => Bandwidth::Mediumband,
                _ => Bandwidth::Wideband,
            },
        }
    }

    /// Returns the frame duration
    #[must_use]
    pub const fn frame_duration(self) -> FrameDuration {
        let sub = (self.0 >> 3) & 0x3;
        match self.mode() {
            OpusMode::CeltOnly => match sub {
                0 => FrameDuration::Ms2_5,
                1 => FrameDuration::Ms5,
                2 => FrameDuration::Ms10,
                _ => FrameDuration::Ms20,
            },
            OpusMode::Hybrid => {
                if self.0 & 0x08 == 0 {
                    FrameDuration::Ms10
                } else {
                    FrameDuration::Ms20
                }
            }
            OpusMode::SilkOnly => match sub {
                0 => FrameDuration::Ms10,
                1 => FrameDuration::Ms20,
                2 => FrameDuration::Ms40,
                _ => FrameDuration::Ms60,
            },
        }
    }

    /// Returns the number of samples per channel in one frame at `sample_rate`.
    ///
    /// The rate does not have to match any decoder; passing 48000 yields the
    /// duration class in 48 kHz samples.
    #[must_use]
    pub const fn samples_per_frame(self, sample_rate: u32) -> usize {
        let fs = sample_rate as usize;
        let sub = ((self.0 >> 3) & 0x3) as usize;
        match self.mode() {
            OpusMode::CeltOnly => (fs << sub) / 400,
            OpusMode::Hybrid => {
                if self.0 & 0x08 == 0 {
                    fs / 100
                } else {
                    fs / 50
                }
            }
            OpusMode::SilkOnly => {
                if sub == 3 {
                    fs * 60 / 1000
                } else {
                    (fs << sub) / 100
                }
            }
        }
    }

    /// Returns complete configuration for this TOC
    #[must_use]
    pub const fn configuration(self) -> Configuration {
        CONFIGURATIONS[self.config() as usize]
    }
}

impl From<u8> for Toc {
    fn from(value: u8) -> Self {
        Self::parse(value)
    }
}

/// Opus encoding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpusMode {
    /// SILK-only mode (voice-optimized, NB/MB/WB)
    SilkOnly,
    /// Hybrid mode (SILK low frequencies + CELT high frequencies)
    Hybrid,
    /// CELT-only mode (full-spectrum, all bandwidths)
    CeltOnly,
}

/// Audio bandwidth classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bandwidth {
    /// Narrowband (4 kHz, 8 kHz sample rate)
    Narrowband,
    /// Mediumband (6 kHz, 12 kHz sample rate)
    Mediumband,
    /// Wideband (8 kHz, 16 kHz sample rate)
    Wideband,
    /// Super-wideband (12 kHz, 24 kHz sample rate)
    SuperWideband,
    /// Fullband (20 kHz, 48 kHz sample rate)
    Fullband,
}

/// Frame duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FrameDuration {
    /// 2.5 milliseconds
    Ms2_5,
    /// 5 milliseconds
    Ms5,
    /// 10 milliseconds
    Ms10,
    /// 20 milliseconds
    Ms20,
    /// 40 milliseconds
    Ms40,
    /// 60 milliseconds
    Ms60,
}

impl FrameDuration {
    /// Duration in tenths of a millisecond
    #[must_use]
    pub const fn tenths_ms(self) -> u16 {
        match self {
            Self::Ms2_5 => 25,
            Self::Ms5 => 50,
            Self::Ms10 => 100,
            Self::Ms20 => 200,
            Self::Ms40 => 400,
            Self::Ms60 => 600,
        }
    }

    /// Samples per channel covered by this duration at `sample_rate`
    #[must_use]
    pub const fn samples(self, sample_rate: u32) -> usize {
        sample_rate as usize * self.tenths_ms() as usize / 10_000
    }
}

/// Opus configuration combining mode, bandwidth, and frame duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    /// Encoding mode (SILK/CELT/Hybrid)
    pub mode: OpusMode,
    /// Audio bandwidth
    pub bandwidth: Bandwidth,
    /// Frame duration
    pub frame_duration: FrameDuration,
}

const fn entry(
    mode: OpusMode,
    bandwidth: Bandwidth,
    frame_duration: FrameDuration,
) -> Configuration {
    Configuration {
        mode,
        bandwidth,
        frame_duration,
    }
}

/// Lookup table of all 32 Opus configurations per RFC 6716 Table 2
pub const CONFIGURATIONS: [Configuration; 32] = {
    use Bandwidth::{Fullband, Mediumband, Narrowband, SuperWideband, Wideband};
    use FrameDuration::{Ms2_5, Ms5, Ms10, Ms20, Ms40, Ms60};
    use OpusMode::{CeltOnly, Hybrid, SilkOnly};

    [
        entry(SilkOnly, Narrowband, Ms10),
        entry(SilkOnly, Narrowband, Ms20),
        entry(SilkOnly, Narrowband, Ms40),
        entry(SilkOnly, Narrowband, Ms60),
        entry(SilkOnly, Mediumband, Ms10),
        entry(SilkOnly, Mediumband, Ms20),
        entry(SilkOnly, Mediumband, Ms40),
        entry(SilkOnly, Mediumband, Ms60),
        entry(SilkOnly, Wideband, Ms10),
        entry(SilkOnly, Wideband, Ms20),
        entry(SilkOnly, Wideband, Ms40),
        entry(SilkOnly, Wideband, Ms60),
        entry(Hybrid, SuperWideband, Ms10),
        entry(Hybrid, SuperWideband, Ms20),
        entry(Hybrid, Fullband, Ms10),
        entry(Hybrid, Fullband, Ms20),
        entry(CeltOnly, Narrowband, Ms2_5),
        entry(CeltOnly, Narrowband, Ms5),
        entry(CeltOnly, Narrowband, Ms10),
        entry(CeltOnly, Narrowband, Ms20),
        entry(CeltOnly, Wideband, Ms2_5),
        entry(CeltOnly, Wideband, Ms5),
        entry(CeltOnly, Wideband, Ms10),
        entry(CeltOnly, Wideband, Ms20),
        entry(CeltOnly, SuperWideband, Ms2_5),
        entry(CeltOnly, SuperWideband, Ms5),
        entry(CeltOnly, SuperWideband, Ms10),
        entry(CeltOnly, SuperWideband, Ms20),
        entry(CeltOnly, Fullband, Ms2_5),
        entry(CeltOnly, Fullband, Ms5),
        entry(CeltOnly, Fullband, Ms10),
        entry(CeltOnly, Fullband, Ms20),
    ]
};
