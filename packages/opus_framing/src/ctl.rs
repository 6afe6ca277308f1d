//! Typed decoder control requests.

use crate::{
    Channels, SampleRate,
    decoder::{Decoder, FrameDecoder},
    error::Result,
    toc::Bandwidth,
};

/// Control requests accepted by [`Decoder::ctl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderRequest {
    GetBandwidth,
    GetFinalRange,
    GetPitch,
    GetSampleRate,
    GetChannels,
    ResetState,
}

/// Reply to a [`DecoderRequest`], one variant per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderResponse {
    Bandwidth(Option<Bandwidth>),
    FinalRange(u32),
    Pitch(Option<i32>),
    SampleRate(SampleRate),
    Channels(Channels),
    Reset,
}

impl<D: FrameDecoder> Decoder<D> {
    /// Dispatches a control request.
    ///
    /// # Errors
    ///
    /// * `Unimplemented` - If pitch is requested after a CELT-only frame and
    ///   the frame decoder does not track pitch
    pub fn ctl(&mut self, request: DecoderRequest) -> Result<DecoderResponse> {
        Ok(match request {
            DecoderRequest::GetBandwidth => DecoderResponse::Bandwidth(self.bandwidth()),
            DecoderRequest::GetFinalRange => DecoderResponse::FinalRange(self.final_range()),
            DecoderRequest::GetPitch => DecoderResponse::Pitch(self.pitch()?),
            DecoderRequest::GetSampleRate => DecoderResponse::SampleRate(self.sample_rate()),
            DecoderRequest::GetChannels => DecoderResponse::Channels(self.channels()),
            DecoderRequest::ResetState => {
                self.reset();
                DecoderResponse::Reset
            }
        })
    }
}
