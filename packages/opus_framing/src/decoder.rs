//! Opus decoder session.
//!
//! A [`Decoder`] holds the per-stream state of one Opus stream and feeds every
//! frame of each packet to a [`FrameDecoder`], the external unit that turns a
//! frame's bytes into samples. Packets must be passed in order; a missing
//! packet is concealed by passing `None`.

use log::{debug, trace};

use crate::{
    Channels, SampleRate,
    error::{Error, Result},
    packet,
    toc::{Bandwidth, OpusMode},
};

/// Parameters the session hands to the frame decoder for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContext {
    /// Coding mode of the packet, `None` when concealing before any packet
    pub mode: Option<OpusMode>,
    /// Audio bandwidth of the packet
    pub bandwidth: Option<Bandwidth>,
    /// Channels coded in the packet
    pub stream_channels: Channels,
    /// Samples per channel to produce
    pub frame_size: usize,
    /// Decode in-band forward error correction data instead of the frame
    pub decode_fec: bool,
}

/// External decode unit for single frames.
pub trait FrameDecoder {
    /// Decodes one frame into interleaved `pcm`, or conceals a lost frame when
    /// `data` is `None`.
    ///
    /// `pcm` holds exactly `ctx.frame_size` samples per output channel.
    /// Returns the number of samples per channel written.
    ///
    /// # Errors
    ///
    /// * If the frame cannot be decoded
    fn decode_frame(
        &mut self,
        data: Option<&[u8]>,
        pcm: &mut [f32],
        ctx: FrameContext,
    ) -> Result<usize>;

    /// Clears all decoding history.
    fn reset(&mut self);

    /// Final range coder state after the last decoded frame.
    fn final_range(&self) -> u32;

    /// Pitch period of the last decoded frame.
    ///
    /// # Errors
    ///
    /// * `Unimplemented` - If the decode unit does not track pitch
    fn pitch(&self) -> Result<Option<i32>> {
        Err(Error::Unimplemented("pitch"))
    }
}

/// Output sample formats.
pub trait Sample: Copy {
    /// Converts a decoded sample in `[-1.0, 1.0]` into this format.
    fn from_f32(value: f32) -> Self;
}

impl Sample for f32 {
    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl Sample for i16 {
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_f32(value: f32) -> Self {
        (value * 32768.0).clamp(-32768.0, 32767.0).round_ties_even() as Self
    }
}

/// Lifecycle state of a decoder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created or reset, no packet decoded yet
    Fresh,
    /// At least one packet decoded
    Active,
}

/// Stream state cleared on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StreamState {
    stream_channels: Channels,
    bandwidth: Option<Bandwidth>,
    mode: Option<OpusMode>,
    prev_mode: Option<OpusMode>,
    frame_size: usize,
    prev_redundancy: bool,
    final_range: u32,
}

impl StreamState {
    const fn new(sample_rate: SampleRate, channels: Channels) -> Self {
        Self {
            stream_channels: channels,
            bandwidth: None,
            mode: None,
            prev_mode: None,
            frame_size: sample_rate.hz() as usize / 400,
            prev_redundancy: false,
            final_range: 0,
        }
    }
}

/// Opus decoder session for one stream.
#[derive(Debug)]
pub struct Decoder<D: FrameDecoder> {
    unit: D,
    sample_rate: SampleRate,
    channels: Channels,
    state: StreamState,
    scratch: Vec<f32>,
}

impl<D: FrameDecoder> Decoder<D> {
    /// Creates a new decoder session around `unit`.
    ///
    /// # Errors
    ///
    /// * `AllocationFailure` - If the output scratch buffer cannot be reserved
    pub fn new(sample_rate: SampleRate, channels: Channels, unit: D) -> Result<Self> {
        // 120 ms, the longest packet
        let max_samples = sample_rate.hz() as usize * 3 / 25 * channels.count();
        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(max_samples)
            .map_err(|_| Error::AllocationFailure)?;

        debug!(
            "Creating Opus decoder: {} Hz, {} channel(s)",
            sample_rate.hz(),
            channels.count()
        );

        Ok(Self {
            unit,
            sample_rate,
            channels,
            state: StreamState::new(sample_rate, channels),
            scratch,
        })
    }

    /// Creates a new decoder session from raw parameters.
    ///
    /// # Errors
    ///
    /// * `BadArgument` - If the sample rate or channel count is unsupported
    /// * `AllocationFailure` - If the output scratch buffer cannot be reserved
    pub fn try_new(sample_rate: u32, channels: u8, unit: D) -> Result<Self> {
        Self::new(
            SampleRate::try_from(sample_rate)?,
            Channels::try_from(channels)?,
            unit,
        )
    }

    /// Decodes a packet to signed 16-bit PCM.
    ///
    /// `frame_size` is the room in `pcm` in samples per channel. Pass `None`
    /// (or an empty packet) to conceal a lost packet. Returns the number of
    /// samples per channel written.
    ///
    /// # Errors
    ///
    /// * `BadArgument` - If `pcm` is shorter than `frame_size` samples per channel
    /// * `BufferTooSmall` - If the packet decodes to more than `frame_size` samples
    /// * `InvalidPacket` - If the packet framing is invalid
    /// * `InternalError` - If the frame decoder fails
    pub fn decode(
        &mut self,
        packet: Option<&[u8]>,
        pcm: &mut [i16],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<usize> {
        self.decode_native(packet, pcm, frame_size, decode_fec, false)
            .map(|(samples, _)| samples)
    }

    /// Decodes a packet to floating point PCM.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode_float(
        &mut self,
        packet: Option<&[u8]>,
        pcm: &mut [f32],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<usize> {
        self.decode_native(packet, pcm, frame_size, decode_fec, false)
            .map(|(samples, _)| samples)
    }

    /// Decodes the self-delimited packet at the start of `data`.
    ///
    /// Returns the samples per channel written and the number of bytes the
    /// packet occupied, which is where the next packet starts.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode_self_delimited<S: Sample>(
        &mut self,
        data: &[u8],
        pcm: &mut [S],
        frame_size: usize,
    ) -> Result<(usize, usize)> {
        self.decode_native(Some(data), pcm, frame_size, false, true)
    }

    fn decode_native<S: Sample>(
        &mut self,
        packet: Option<&[u8]>,
        pcm: &mut [S],
        frame_size: usize,
        decode_fec: bool,
        self_delimited: bool,
    ) -> Result<(usize, usize)> {
        let channels = self.channels.count();
        if frame_size
            .checked_mul(channels)
            .is_none_or(|needed| pcm.len() < needed)
        {
            return Err(Error::BadArgument(format!(
                "pcm holds {} samples, {frame_size} per channel requested",
                pcm.len()
            )));
        }

        let Some(data) = packet.filter(|data| !data.is_empty()) else {
            return self.conceal(pcm, frame_size).map(|samples| (samples, 0));
        };

        let parsed = packet::parse(data, self_delimited)?;
        let toc = parsed.toc();

        let mut staged = self.state;
        staged.mode = Some(toc.mode());
        staged.bandwidth = Some(toc.bandwidth());
        staged.frame_size = toc.samples_per_frame(self.sample_rate.hz());
        staged.stream_channels = toc.channels();

        let needed = parsed.frame_count() * staged.frame_size;
        if needed > frame_size {
            return Err(Error::BufferTooSmall {
                needed,
                available: frame_size,
            });
        }

        let frame_len = staged.frame_size * channels;
        self.scratch.clear();
        self.scratch.resize(needed * channels, 0.0);

        for (index, (frame, out)) in parsed
            .iter()
            .zip(self.scratch.chunks_exact_mut(frame_len))
            .enumerate()
        {
            trace!("Decoding frame {index}: {} bytes", frame.len());
            let ctx = FrameContext {
                mode: staged.mode,
                bandwidth: staged.bandwidth,
                stream_channels: staged.stream_channels,
                frame_size: staged.frame_size,
                decode_fec: decode_fec && index == 0,
            };
            let written = self.unit.decode_frame(Some(frame), out, ctx)?;
            if written != staged.frame_size {
                return Err(Error::InternalError(format!(
                    "frame decoder produced {written} samples, expected {}",
                    staged.frame_size
                )));
            }
        }

        for (out, &sample) in pcm.iter_mut().zip(&self.scratch) {
            *out = S::from_f32(sample);
        }

        staged.prev_mode = staged.mode;
        staged.prev_redundancy = false;
        staged.final_range = self.unit.final_range();
        self.state = staged;

        Ok((needed, parsed.packet_len()))
    }

    fn conceal<S: Sample>(&mut self, pcm: &mut [S], frame_size: usize) -> Result<usize> {
        let samples = frame_size.min(self.state.frame_size);
        debug!("Concealing lost packet: {samples} samples");

        self.scratch.clear();
        self.scratch.resize(samples * self.channels.count(), 0.0);

        let ctx = FrameContext {
            mode: self.state.mode,
            bandwidth: self.state.bandwidth,
            stream_channels: self.state.stream_channels,
            frame_size: samples,
            decode_fec: false,
        };
        let written = self.unit.decode_frame(None, &mut self.scratch, ctx)?;

        for (out, &sample) in pcm.iter_mut().zip(&self.scratch) {
            *out = S::from_f32(sample);
        }

        self.state.final_range = self.unit.final_range();
        Ok(written.min(samples))
    }

    /// Samples per channel `packet` decodes to at this session's rate.
    ///
    /// # Errors
    ///
    /// * `InvalidPacket` - If the packet is empty, truncated or exceeds 120 ms
    pub fn sample_count(&self, packet: &[u8]) -> Result<usize> {
        Ok(packet::sample_count(packet, self.sample_rate.hz())?)
    }

    /// Resets the stream state, keeping the sample rate and channel count.
    pub fn reset(&mut self) {
        debug!("Resetting Opus decoder state");
        self.unit.reset();
        self.state = StreamState::new(self.sample_rate, self.channels);
    }

    /// Releases the session, returning the frame decoder.
    #[must_use]
    pub fn release(self) -> D {
        self.unit
    }

    /// Output sample rate
    #[must_use]
    pub const fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Output channels
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }

    /// Channels coded in the most recent packet
    #[must_use]
    pub const fn stream_channels(&self) -> Channels {
        self.state.stream_channels
    }

    /// Bandwidth of the most recent packet
    #[must_use]
    pub const fn bandwidth(&self) -> Option<Bandwidth> {
        self.state.bandwidth
    }

    /// Mode of the most recent packet
    #[must_use]
    pub const fn mode(&self) -> Option<OpusMode> {
        self.state.mode
    }

    /// Mode of the most recently decoded frame
    #[must_use]
    pub const fn prev_mode(&self) -> Option<OpusMode> {
        self.state.prev_mode
    }

    /// Whether the previous frame carried redundancy
    #[must_use]
    pub const fn prev_redundancy(&self) -> bool {
        self.state.prev_redundancy
    }

    /// Samples per channel in one frame of the most recent packet
    #[must_use]
    pub const fn frame_size(&self) -> usize {
        self.state.frame_size
    }

    /// Final range coder state, for comparing against an encoder
    #[must_use]
    pub const fn final_range(&self) -> u32 {
        self.state.final_range
    }

    /// Pitch of the last frame, only known after CELT-only frames.
    ///
    /// # Errors
    ///
    /// * `Unimplemented` - If the frame decoder does not track pitch
    pub fn pitch(&self) -> Result<Option<i32>> {
        if self.state.prev_mode == Some(OpusMode::CeltOnly) {
            self.unit.pitch()
        } else {
            Ok(None)
        }
    }

    /// Lifecycle state
    #[must_use]
    pub const fn session_state(&self) -> SessionState {
        if self.state.mode.is_some() {
            SessionState::Active
        } else {
            SessionState::Fresh
        }
    }

    /// Frame decoder
    #[must_use]
    pub const fn unit(&self) -> &D {
        &self.unit
    }
}
