use bytes::BytesMut;
use homeserve::core::protocol::{
    is_sentinel_line, parse_redirect, LineCommandCodec, Reply, MAX_LINE_LEN,
};
use tokio_util::codec::{Decoder, Encoder};

#[test]
fn test_decodes_one_line() {
    let mut codec = LineCommandCodec::default();
    let mut buf = BytesMut::from("dirlist -a\n");
    assert_eq!(codec.decode(&mut buf).unwrap(), Some("dirlist -a".to_string()));
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
}

#[test]
fn test_strips_carriage_return() {
    let mut codec = LineCommandCodec::default();
    let mut buf = BytesMut::from("quitc\r\n");
    assert_eq!(codec.decode(&mut buf).unwrap(), Some("quitc".to_string()));
}

#[test]
fn test_partial_line_waits_for_more_input() {
    let mut codec = LineCommandCodec::default();
    let mut buf = BytesMut::from("dirli");
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
    buf.extend_from_slice(b"st -t\n");
    assert_eq!(codec.decode(&mut buf).unwrap(), Some("dirlist -t".to_string()));
}

#[test]
fn test_overlong_line_truncated_silently() {
    let mut codec = LineCommandCodec::default();
    let long = "x".repeat(MAX_LINE_LEN + 50);
    let mut buf = BytesMut::from(format!("{long}\nquitc\n").as_str());

    let truncated = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(truncated.len(), MAX_LINE_LEN);

    // The overflow is discarded, not surfaced; the next line decodes
    // normally.
    assert_eq!(codec.decode(&mut buf).unwrap(), Some("quitc".to_string()));
}

#[test]
fn test_overlong_line_across_fragments() {
    let mut codec = LineCommandCodec::default();
    let mut buf = BytesMut::new();
    buf.extend_from_slice("a".repeat(MAX_LINE_LEN + 1).as_bytes());

    let truncated = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(truncated.len(), MAX_LINE_LEN);

    // Remainder of the overlong line keeps arriving and is dropped up to
    // the newline.
    buf.extend_from_slice(b"bbbb\nw24fn x\n");
    assert_eq!(codec.decode(&mut buf).unwrap(), Some("w24fn x".to_string()));
}

#[test]
fn test_body_reply_terminated_by_lone_end_sentinel() {
    let mut codec = LineCommandCodec::default();
    let mut buf = BytesMut::new();
    let reply = Reply::Body(vec!["alpha".to_string(), "beta".to_string()]);
    codec.encode(reply, &mut buf).unwrap();
    assert_eq!(&buf[..], b"alpha\nbeta\nEND\n");
}

#[test]
fn test_empty_body_is_just_the_sentinel() {
    let mut codec = LineCommandCodec::default();
    let mut buf = BytesMut::new();
    codec.encode(Reply::Body(Vec::new()), &mut buf).unwrap();
    assert_eq!(&buf[..], b"END\n");
}

#[test]
fn test_redirect_reply_has_no_sentinel() {
    let mut codec = LineCommandCodec::default();
    let mut buf = BytesMut::new();
    codec.encode(Reply::Redirect(2025), &mut buf).unwrap();
    assert_eq!(&buf[..], b"redirect 2025\n");
}

#[test]
fn test_reader_accepts_either_sentinel_convention() {
    assert!(is_sentinel_line("END"));
    assert!(is_sentinel_line(""));
    assert!(!is_sentinel_line("END "));
    assert!(!is_sentinel_line("ENDING"));
    assert!(!is_sentinel_line("file.txt"));
}

#[test]
fn test_parse_redirect_line() {
    assert_eq!(parse_redirect("redirect 2025"), Some(2025));
    assert_eq!(parse_redirect("redirect abc"), None);
    assert_eq!(parse_redirect("redirected 2025"), None);
    assert_eq!(parse_redirect("Filename: redirect"), None);
}

#[test]
fn test_fragmented_response_reassembles_identically() {
    // A 500-line body delivered byte-by-byte decodes to the same ordered
    // line sequence as a single-fragment delivery.
    let mut encode_codec = LineCommandCodec::default();
    let mut wire = BytesMut::new();
    let lines: Vec<String> = (0..500).map(|i| format!("entry-{i:03}")).collect();
    encode_codec
        .encode(Reply::Body(lines.clone()), &mut wire)
        .unwrap();

    let mut decode_codec = LineCommandCodec::default();
    let mut buf = BytesMut::new();
    let mut decoded = Vec::new();
    for byte in wire.iter() {
        buf.extend_from_slice(&[*byte]);
        while let Some(line) = decode_codec.decode(&mut buf).unwrap() {
            decoded.push(line);
        }
    }

    assert_eq!(decoded.len(), 501);
    assert_eq!(decoded[..500], lines[..]);
    assert_eq!(decoded[500], "END");
}
