#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

use moosicbox_opus_framing::{FramingError, ParsedPacket, parse_packet};
use pretty_assertions::assert_eq;

fn frame_data(parsed: &ParsedPacket<'_>) -> Vec<Vec<u8>> {
    parsed.iter().map(<[u8]>::to_vec).collect()
}

#[test_log::test]
fn test_code_3_cbr_with_simple_padding() {
    let packet = vec![
        0x03, 0x43, 5, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11, 0x22, 0x33, 0, 0, 0, 0, 0,
    ];
    let result = parse_packet(&packet).unwrap();

    assert_eq!(
        frame_data(&result),
        vec![
            vec![0xAA, 0xBB, 0xCC],
            vec![0xDD, 0xEE, 0xFF],
            vec![0x11, 0x22, 0x33]
        ]
    );
    assert_eq!(result.padding(), 5);
    assert_eq!(result.payload_offset(), 3);
    assert_eq!(result.packet_len(), packet.len());
}

#[test_log::test]
fn test_code_3_cbr_with_zero_padding() {
    let packet = vec![
        0x03, 0x43, 0, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11, 0x22, 0x33,
    ];
    let result = parse_packet(&packet).unwrap();

    assert_eq!(result.frame_count(), 3);
    assert_eq!(result.frame_data(2), Some(&[0x11, 0x22, 0x33][..]));
    assert_eq!(result.padding(), 0);
}

#[test_log::test]
fn test_code_3_vbr_with_simple_padding() {
    let packet = vec![
        0x03, 0xC3, 3, 2, 3, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11, 0, 0, 0,
    ];
    let result = parse_packet(&packet).unwrap();

    assert_eq!(
        frame_data(&result),
        vec![
            vec![0xAA, 0xBB],
            vec![0xCC, 0xDD, 0xEE],
            vec![0xFF, 0x11]
        ]
    );
    assert_eq!(result.padding(), 3);
    assert_eq!(result.payload_offset(), 5);
}

#[test_log::test]
fn test_code_3_cbr_with_two_byte_padding() {
    // 254 + 1 bytes of padding
    let mut packet = vec![
        0x03, 0x43, 255, 1, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11, 0x22, 0x33,
    ];
    packet.extend(vec![0; 255]);
    let result = parse_packet(&packet).unwrap();

    assert_eq!(result.frame_count(), 3);
    assert_eq!(result.frame_data(1), Some(&[0xDD, 0xEE, 0xFF][..]));
    assert_eq!(result.padding(), 255);
}

#[test_log::test]
fn test_code_3_vbr_with_two_byte_padding() {
    let mut packet = vec![0x03, 0xC2, 255, 0, 2];
    packet.extend(vec![0xAA, 0xBB, 0xCC, 0xDD]);
    packet.extend(vec![0; 254]);
    let result = parse_packet(&packet).unwrap();

    assert_eq!(
        frame_data(&result),
        vec![vec![0xAA, 0xBB], vec![0xCC, 0xDD]]
    );
    assert_eq!(result.padding(), 254);
}

#[test_log::test]
fn test_code_3_cbr_with_254_padding() {
    let mut packet = vec![0x03, 0x42, 254, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];
    packet.extend(vec![0; 254]);
    let result = parse_packet(&packet).unwrap();

    assert_eq!(
        frame_data(&result),
        vec![vec![0xAA, 0xBB, 0xCC], vec![0xDD, 0xEE, 0xFF]]
    );
    assert_eq!(result.padding(), 254);
}

#[test_log::test]
fn test_code_3_cbr_with_chained_255_padding() {
    let mut packet = vec![0x03, 0x42, 255, 255, 2, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];
    packet.extend(vec![0; 510]);
    let result = parse_packet(&packet).unwrap();

    assert_eq!(result.frame_count(), 2);
    assert_eq!(result.payload_offset(), 5);
    assert_eq!(result.padding(), 510);
}

#[test_log::test]
fn test_code_3_vbr_with_chained_255_padding() {
    let mut packet = vec![0x03, 0xC2, 255, 255, 255, 10, 2];
    packet.extend(vec![0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);
    packet.extend(vec![0; 772]);
    let result = parse_packet(&packet).unwrap();

    assert_eq!(
        frame_data(&result),
        vec![vec![0xAA, 0xBB], vec![0xCC, 0xDD, 0xEE]]
    );
    assert_eq!(result.padding(), 772);
}

#[test_log::test]
fn test_code_3_cbr_no_padding_flag() {
    let packet = vec![
        0x03, 0x03, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11, 0x22, 0x33,
    ];
    let result = parse_packet(&packet).unwrap();

    assert_eq!(result.frame_count(), 3);
    assert_eq!(result.frame_data(0), Some(&[0xAA, 0xBB, 0xCC][..]));
    assert_eq!(result.padding(), 0);
}

#[test_log::test]
fn test_code_3_vbr_no_padding_flag() {
    let packet = vec![0x03, 0x83, 2, 3, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11];
    let result = parse_packet(&packet).unwrap();

    assert_eq!(result.frame_count(), 3);
    assert_eq!(result.frame_data(0), Some(&[0xAA, 0xBB][..]));
    assert_eq!(result.padding(), 0);
}

#[test_log::test]
fn test_code_3_padding_too_short_fails() {
    let packet = vec![0x03, 0x43, 10];
    assert_eq!(
        parse_packet(&packet).unwrap_err(),
        FramingError::InvalidPacket
    );
}

#[test_log::test]
fn test_code_3_two_byte_padding_truncated_fails() {
    let packet = vec![0x03, 0x42, 255, 0xAA, 0xBB];
    assert_eq!(
        parse_packet(&packet).unwrap_err(),
        FramingError::InvalidPacket
    );
}

#[test_log::test]
fn test_code_3_unterminated_padding_chain_fails() {
    let packet = vec![0x03, 0x41, 255, 255];
    assert_eq!(
        parse_packet(&packet).unwrap_err(),
        FramingError::InvalidPacket
    );
}

#[test_log::test]
fn test_code_3_padding_255_10_removes_264_bytes() {
    // One CBR frame of 4 bytes after 264 bytes of padding are set aside
    let mut packet = vec![0x03, 0x41, 255, 10, 1, 2, 3, 4];
    packet.extend(vec![0; 264]);
    let result = parse_packet(&packet).unwrap();

    assert_eq!(result.padding(), 264);
    assert_eq!(result.frame_data(0), Some(&[1, 2, 3, 4][..]));

    // One byte short of holding the padding
    let short = &packet[..4 + 263];
    assert_eq!(parse_packet(short).unwrap_err(), FramingError::InvalidPacket);
}

#[test_log::test]
fn test_code_3_padding_only_zero_length_frame() {
    let packet = vec![0x03, 0x41, 3, 0, 0, 0];
    let result = parse_packet(&packet).unwrap();

    assert_eq!(result.frame_count(), 1);
    assert!(result.frames()[0].is_dtx());
    assert_eq!(result.padding(), 3);
}
