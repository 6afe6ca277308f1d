//! Opus packet framing (RFC 6716 Section 3.2).
//!
//! [`parse`] splits a packet into frame descriptors without copying any frame
//! data. Every length is validated against the bytes actually present, so a
//! successfully parsed packet only ever describes ranges inside its buffer.

use arrayvec::ArrayVec;
use log::{debug, trace};

use crate::{
    error::FramingError,
    frame::{
        Frame, FrameCountByte, FramePacking, MAX_FRAME_SIZE, MAX_FRAMES, MAX_PACKET_SAMPLES_48K,
        decode_frame_length, decode_padding_length,
    },
    toc::Toc,
};

/// Parsed Opus packet.
///
/// Frame descriptors index into the borrowed packet, so the parsed packet
/// cannot outlive the buffer it was parsed from.
#[derive(Debug, Clone)]
pub struct ParsedPacket<'a> {
    data: &'a [u8],
    toc: Toc,
    frames: ArrayVec<Frame, MAX_FRAMES>,
    payload_offset: usize,
    padding: usize,
    packet_len: usize,
}

impl<'a> ParsedPacket<'a> {
    /// Table of contents byte
    #[must_use]
    pub const fn toc(&self) -> Toc {
        self.toc
    }

    /// Frame descriptors in packet order
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames (1-48)
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Bytes of TOC, frame count, padding and length fields preceding the
    /// first frame
    #[must_use]
    pub const fn payload_offset(&self) -> usize {
        self.payload_offset
    }

    /// Bytes of padding data following the frames
    #[must_use]
    pub const fn padding(&self) -> usize {
        self.padding
    }

    /// Total bytes this packet occupies, including padding.
    ///
    /// For self-delimited packets this is where the next packet of a
    /// concatenated stream starts.
    #[must_use]
    pub const fn packet_len(&self) -> usize {
        self.packet_len
    }

    /// Data of the frame at `index`
    #[must_use]
    pub fn frame_data(&self, index: usize) -> Option<&'a [u8]> {
        let data = self.data;
        self.frames.get(index).and_then(|frame| data.get(frame.range()))
    }

    /// Iterates over the data of each frame in packet order
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        let data = self.data;
        self.frames
            .iter()
            .map(move |frame| data.get(frame.range()).unwrap_or_default())
    }

    /// Samples per channel in one frame at `sample_rate`
    #[must_use]
    pub const fn samples_per_frame(&self, sample_rate: u32) -> usize {
        self.toc.samples_per_frame(sample_rate)
    }

    /// Samples per channel in the whole packet at `sample_rate`
    #[must_use]
    pub fn total_samples(&self, sample_rate: u32) -> usize {
        self.frames.len() * self.samples_per_frame(sample_rate)
    }
}

fn invalid(reason: &str) -> FramingError {
    debug!("Rejecting Opus packet: {reason}");
    FramingError::InvalidPacket
}

/// Read position over the part of a packet still usable for lengths and frame
/// data. `len` excludes any padding already accounted for, so
/// `pos + len <= data.len()` always holds.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    len: usize,
}

impl Reader<'_> {
    fn remaining(&self) -> &[u8] {
        self.data
            .get(self.pos..self.pos + self.len)
            .unwrap_or_default()
    }

    fn read_count_byte(&mut self) -> Result<u8, FramingError> {
        let byte = *self
            .remaining()
            .first()
            .ok_or_else(|| invalid("missing frame count byte"))?;
        self.pos += 1;
        self.len -= 1;
        Ok(byte)
    }

    /// Reads a length field and checks the length fits in what remains.
    /// Returns `(size, bytes_read)`.
    fn read_length(&mut self) -> Result<(usize, usize), FramingError> {
        let (size, bytes) = decode_frame_length(self.remaining())?;
        self.pos += bytes;
        self.len -= bytes;
        if size > self.len {
            return Err(invalid("declared frame size exceeds packet"));
        }
        Ok((size, bytes))
    }

    /// Consumes a padding chain and reserves its padding data at the end of
    /// the packet. Returns the padding data length.
    fn read_padding(&mut self) -> Result<usize, FramingError> {
        let (padding, bytes) = decode_padding_length(self.remaining())?;
        self.pos += bytes;
        self.len -= bytes;
        self.len = self
            .len
            .checked_sub(padding)
            .ok_or_else(|| invalid("padding exceeds packet"))?;
        Ok(padding)
    }
}

/// Parse an Opus packet into frame descriptors.
///
/// With `self_delimited` set, the last frame's size is also coded explicitly
/// (RFC 6716 Appendix B) and bytes after the packet are left untouched.
///
/// # Errors
///
/// * `Empty` - If the packet has no bytes
/// * `InvalidPacket` - If the packet structure is invalid according to RFC 6716
#[allow(clippy::too_many_lines)]
pub fn parse(data: &[u8], self_delimited: bool) -> Result<ParsedPacket<'_>, FramingError> {
    let Some(&toc_byte) = data.first() else {
        return Err(FramingError::Empty);
    };

    debug!(
        "Parsing Opus packet, size: {} bytes, self-delimited: {self_delimited}",
        data.len()
    );

    let toc = Toc::parse(toc_byte);
    let frame_samples = toc.samples_per_frame(48000);

    let mut reader = Reader {
        data,
        pos: 1,
        len: data.len() - 1,
    };
    let mut sizes = [0_usize; MAX_FRAMES];
    let mut last_size = reader.len;
    let mut cbr = false;
    let mut padding = 0;

    let count = match FramePacking::from_code(toc.frame_count_code()) {
        FramePacking::SingleFrame => 1,
        FramePacking::TwoFramesEqual => {
            cbr = true;
            if !self_delimited {
                if !reader.len.is_multiple_of(2) {
                    return Err(invalid("code 1 payload must be even"));
                }
                last_size = reader.len / 2;
                sizes[0] = last_size;
            }
            2
        }
        FramePacking::TwoFramesVariable => {
            let (size, _) = reader.read_length()?;
            sizes[0] = size;
            last_size = reader.len - size;
            2
        }
        FramePacking::ArbitraryFrames => {
            let header = FrameCountByte::parse(reader.read_count_byte()?);
            let count = header.count as usize;

            if count == 0 {
                return Err(invalid("frame count must be at least 1"));
            }
            if count > MAX_FRAMES || count * frame_samples > MAX_PACKET_SAMPLES_48K {
                return Err(invalid("packet exceeds 120 ms"));
            }

            if header.padding {
                padding = reader.read_padding()?;
            }

            cbr = !header.vbr;
            if header.vbr {
                last_size = reader.len;
                for size in sizes.iter_mut().take(count - 1) {
                    let (length, bytes) = reader.read_length()?;
                    *size = length;
                    last_size = last_size
                        .checked_sub(bytes + length)
                        .ok_or_else(|| invalid("VBR frames exceed packet"))?;
                }
            } else if !self_delimited {
                if !reader.len.is_multiple_of(count) {
                    return Err(invalid("CBR payload not divisible by frame count"));
                }
                last_size = reader.len / count;
                sizes[..count - 1].fill(last_size);
            }

            count
        }
    };

    if self_delimited {
        let (size, bytes) = reader.read_length()?;
        if cbr {
            if size * count > reader.len {
                return Err(invalid("self-delimited CBR frames exceed packet"));
            }
            sizes[..count].fill(size);
        } else if bytes + size > last_size {
            return Err(invalid("self-delimited last frame exceeds packet"));
        }
        sizes[count - 1] = size;
    } else {
        if last_size > MAX_FRAME_SIZE {
            return Err(invalid("implicit frame size exceeds 1275 bytes"));
        }
        sizes[count - 1] = last_size;
    }

    let payload_offset = reader.pos;
    let mut frames = ArrayVec::<Frame, MAX_FRAMES>::new();
    let mut offset = payload_offset;

    for &size in &sizes[..count] {
        let size = u16::try_from(size)
            .ok()
            .filter(|&size| usize::from(size) <= MAX_FRAME_SIZE)
            .ok_or_else(|| invalid("frame size exceeds 1275 bytes"))?;
        trace!("Frame {} at offset {offset}, {size} bytes", frames.len());
        frames.push(Frame { offset, size });
        offset += usize::from(size);
    }

    let packet_len = offset + padding;
    if packet_len > data.len() || (!self_delimited && packet_len != data.len()) {
        return Err(invalid("frame data does not account for packet"));
    }

    Ok(ParsedPacket {
        data,
        toc,
        frames,
        payload_offset,
        padding,
        packet_len,
    })
}

/// Parse a packet whose last frame size is implicit.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_packet(data: &[u8]) -> Result<ParsedPacket<'_>, FramingError> {
    parse(data, false)
}

/// Parse a self-delimited packet from the start of `data`.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_self_delimited(data: &[u8]) -> Result<ParsedPacket<'_>, FramingError> {
    parse(data, true)
}

/// Number of frames declared by a packet, read from its header alone.
///
/// # Errors
///
/// * `Empty` - If the packet has no bytes
/// * `InvalidPacket` - If a code 3 packet is missing its frame count byte
pub fn frame_count(data: &[u8]) -> Result<usize, FramingError> {
    match data {
        [] => Err(FramingError::Empty),
        [toc, rest @ ..] => match FramePacking::from_code(*toc) {
            FramePacking::SingleFrame => Ok(1),
            FramePacking::TwoFramesEqual | FramePacking::TwoFramesVariable => Ok(2),
            FramePacking::ArbitraryFrames => rest
                .first()
                .map(|&byte| FrameCountByte::parse(byte).count as usize)
                .ok_or(FramingError::InvalidPacket),
        },
    }
}

/// Samples per channel a packet decodes to at `sample_rate`.
///
/// # Errors
///
/// * `Empty` - If the packet has no bytes
/// * `InvalidPacket` - If the header is truncated or the packet exceeds 120 ms
pub fn sample_count(data: &[u8], sample_rate: u32) -> Result<usize, FramingError> {
    let count = frame_count(data)?;
    let samples = count * Toc::parse(data[0]).samples_per_frame(sample_rate);

    if samples * 25 > sample_rate as usize * 3 {
        return Err(invalid("packet exceeds 120 ms"));
    }

    Ok(samples)
}
