//! Decoder implementations.

use passgate_core::Code;
use tracing::trace;

use crate::marker::read_marker;
use crate::traits::CodeDecoder;
use crate::types::FrameBuffer;

/// Decoder for synthetic marker frames painted by simulated cameras.
///
/// # Examples
///
/// ```
/// use passgate_core::{Code, FacingMode};
/// use passgate_hardware::decoder::MarkerDecoder;
/// use passgate_hardware::marker::render_marker;
/// use passgate_hardware::traits::CodeDecoder;
/// use passgate_hardware::types::{FrameBuffer, SessionId};
///
/// let pixels = render_marker("XYZ", FrameBuffer::expected_len(4, 4)).unwrap();
/// let frame = FrameBuffer::new(SessionId::new(), FacingMode::User, 0, 4, 4, pixels).unwrap();
///
/// assert_eq!(MarkerDecoder::new().decode(&frame), Some(Code::from("XYZ")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerDecoder;

impl MarkerDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl CodeDecoder for MarkerDecoder {
    fn decode(&self, frame: &FrameBuffer) -> Option<Code> {
        let payload = read_marker(frame.data());
        trace!(
            sequence = frame.sequence(),
            found = payload.is_some(),
            "Decoded frame"
        );
        payload.map(Code::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{render_blank, render_marker};
    use crate::types::SessionId;
    use passgate_core::FacingMode;

    fn frame(pixels: Vec<u8>) -> FrameBuffer {
        FrameBuffer::new(SessionId::new(), FacingMode::Environment, 0, 4, 4, pixels).unwrap()
    }

    #[test]
    fn test_decodes_marker() {
        let pixels = render_marker("ABC123", 64).unwrap();
        assert_eq!(
            MarkerDecoder::new().decode(&frame(pixels)),
            Some(Code::from("ABC123"))
        );
    }

    #[test]
    fn test_blank_frame_is_a_miss() {
        assert_eq!(MarkerDecoder::new().decode(&frame(render_blank(64))), None);
    }

    #[test]
    fn test_noise_is_a_miss() {
        let noise: Vec<u8> = (0..64u8).map(|b| b.wrapping_mul(37)).collect();
        assert_eq!(MarkerDecoder::new().decode(&frame(noise)), None);
    }

    #[test]
    fn test_decoder_through_reference_and_box() {
        let pixels = render_marker("R", 64).unwrap();
        let frame = frame(pixels);
        let boxed: Box<dyn CodeDecoder> = Box::new(MarkerDecoder::new());
        assert_eq!(boxed.decode(&frame), Some(Code::from("R")));
        assert_eq!((&MarkerDecoder).decode(&frame), Some(Code::from("R")));
    }
}
