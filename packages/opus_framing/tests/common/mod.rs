#![allow(dead_code)]

use moosicbox_opus_framing::{Error, FrameContext, FrameDecoder, Result};

/// Frame decoder that records what it was asked to decode and fills each
/// frame with the frame's first byte scaled into `[-1.0, 1.0)`.
#[derive(Debug, Default)]
pub struct RecordingDecoder {
    pub frames: Vec<Option<Vec<u8>>>,
    pub contexts: Vec<FrameContext>,
    pub resets: usize,
    pub fail_on_call: Option<usize>,
    pub pitch: Option<i32>,
    pub track_pitch: bool,
    range: u32,
}

impl RecordingDecoder {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn with_pitch(pitch: i32) -> Self {
        Self {
            pitch: Some(pitch),
            track_pitch: true,
            ..Self::default()
        }
    }
}

impl FrameDecoder for RecordingDecoder {
    fn decode_frame(
        &mut self,
        data: Option<&[u8]>,
        pcm: &mut [f32],
        ctx: FrameContext,
    ) -> Result<usize> {
        if self.fail_on_call == Some(self.frames.len()) {
            return Err(Error::InternalError("corrupt frame".to_string()));
        }

        let value = data
            .and_then(<[u8]>::first)
            .map_or(0.0, |&byte| (f32::from(byte) - 128.0) / 128.0);
        pcm.fill(value);

        self.range = self.range.wrapping_add(data.map_or(0, |data| data.len() as u32) + 1);
        self.frames.push(data.map(<[u8]>::to_vec));
        self.contexts.push(ctx);

        Ok(ctx.frame_size)
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.range = 0;
    }

    fn final_range(&self) -> u32 {
        self.range
    }

    fn pitch(&self) -> Result<Option<i32>> {
        if self.track_pitch {
            Ok(self.pitch)
        } else {
            Err(Error::Unimplemented("pitch"))
        }
    }
}

/// Builds a packet from a TOC byte followed by `payload`.
pub fn packet(toc: u8, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![toc];
    packet.extend_from_slice(payload);
    packet
}
