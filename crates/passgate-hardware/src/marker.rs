//! Synthetic marker frames.
//!
//! Simulated cameras cannot photograph a real QR code, so they paint a
//! synthetic marker straight into the RGBA buffer instead:
//!
//! ```text
//! offset 0..4    b"PGQR"             marker signature
//! offset 4..8    u32 little-endian   payload length in bytes
//! offset 8..     UTF-8 payload
//! remainder      0x80                flat grey background
//! ```
//!
//! [`MarkerDecoder`](crate::decoder::MarkerDecoder) recognizes exactly this
//! layout; every other buffer decodes as "no code".

/// Signature that opens every marker.
pub const MARKER_SIGNATURE: &[u8; 4] = b"PGQR";

/// Fill value for pixels not covered by a marker.
pub const BACKGROUND: u8 = 0x80;

const HEADER_LEN: usize = MARKER_SIGNATURE.len() + 4;

/// Paint a frame-sized buffer with nothing in view.
#[must_use]
pub fn render_blank(len: usize) -> Vec<u8> {
    vec![BACKGROUND; len]
}

/// Paint a frame-sized buffer showing `payload`.
///
/// Returns `None` if the payload does not fit in a buffer of `len` bytes.
#[must_use]
pub fn render_marker(payload: &str, len: usize) -> Option<Vec<u8>> {
    let bytes = payload.as_bytes();
    let payload_len = u32::try_from(bytes.len()).ok()?;
    if HEADER_LEN + bytes.len() > len {
        return None;
    }

    let mut buffer = render_blank(len);
    buffer[..MARKER_SIGNATURE.len()].copy_from_slice(MARKER_SIGNATURE);
    buffer[MARKER_SIGNATURE.len()..HEADER_LEN].copy_from_slice(&payload_len.to_le_bytes());
    buffer[HEADER_LEN..HEADER_LEN + bytes.len()].copy_from_slice(bytes);
    Some(buffer)
}

/// Read the payload of a marker buffer.
///
/// Missing signature, truncated payload and invalid UTF-8 all read as `None`.
#[must_use]
pub fn read_marker(data: &[u8]) -> Option<String> {
    if data.get(..MARKER_SIGNATURE.len())? != MARKER_SIGNATURE {
        return None;
    }

    let len_bytes: [u8; 4] = data.get(MARKER_SIGNATURE.len()..HEADER_LEN)?.try_into().ok()?;
    let payload_len = usize::try_from(u32::from_le_bytes(len_bytes)).ok()?;
    let end = HEADER_LEN.checked_add(payload_len)?;
    let payload = data.get(HEADER_LEN..end)?;

    String::from_utf8(payload.to_vec()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_survives_painting() {
        let buffer = render_marker("ABC123", 64).unwrap();
        assert_eq!(buffer.len(), 64);
        assert_eq!(read_marker(&buffer).as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_blank_frame_has_no_marker() {
        assert_eq!(read_marker(&render_blank(64)), None);
    }

    #[test]
    fn test_oversized_payload_is_not_painted() {
        assert!(render_marker("too long for this frame", 16).is_none());
    }

    #[test]
    fn test_truncated_payload_reads_as_miss() {
        let mut buffer = render_marker("XYZ", 16).unwrap();
        buffer[4..8].copy_from_slice(&1000u32.to_le_bytes());
        assert_eq!(read_marker(&buffer), None);
    }

    #[test]
    fn test_invalid_utf8_reads_as_miss() {
        let mut buffer = render_marker("XY", 16).unwrap();
        buffer[8] = 0xFF;
        assert_eq!(read_marker(&buffer), None);
    }

    #[test]
    fn test_short_buffer_reads_as_miss() {
        assert_eq!(read_marker(b"PG"), None);
        assert_eq!(read_marker(&[]), None);
    }
}
