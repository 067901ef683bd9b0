use bytes::Bytes;
use redis_request::{
    decode_request, DecodeError, DecoderConfig, ProtocolError, ProtocolFormat, Request,
    RequestDecoder,
};
use std::io::{BufRead, Cursor};
use tokio::io::BufReader;
use tokio_test::io::Builder;

/// Encode a command as a multibulk frame.
fn frame(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", parts.len()).into_bytes();
    for part in parts {
        out.extend_from_slice(format!("${}\r\n", part.len()).as_bytes());
        out.extend_from_slice(part);
        out.extend_from_slice(b"\r\n");
    }
    out
}

fn args_of(req: &Request) -> Vec<&[u8]> {
    req.args().iter().map(|a| &a[..]).collect()
}

#[test]
fn test_framed_requests_of_every_arity() {
    let parts: [&[u8]; 5] = [b"RPUSH", b"list", b"a", b"", b"b c"];

    for n in 1..=parts.len() {
        let input = frame(&parts[..n]);
        let req = decode_request(&mut Cursor::new(&input)).unwrap();

        assert_eq!(req.name(), "rpush");
        assert_eq!(req.arg_count(), n - 1);
        assert_eq!(args_of(&req), parts[1..n].to_vec());
    }
}

#[test]
fn test_framed_and_inline_set_agree() {
    let framed = decode_request(&mut Cursor::new(
        &b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n"[..],
    ))
    .unwrap();
    let inline = decode_request(&mut Cursor::new(&b"SET foo bar\r\n"[..])).unwrap();

    assert_eq!(framed.name(), inline.name());
    assert_eq!(framed.args(), inline.args());
    assert_eq!(framed.format(), ProtocolFormat::Multibulk);
    assert_eq!(inline.format(), ProtocolFormat::Inline);
}

#[test]
fn test_case_normalization() {
    for name in [&b"GET"[..], b"get", b"GeT"] {
        let req = decode_request(&mut Cursor::new(frame(&[name, b"MiXeD"]))).unwrap();
        assert_eq!(req.name(), "get");
        assert_eq!(req.arg(0), Some(&Bytes::from_static(b"MiXeD")));
    }
}

#[test]
fn test_non_utf8_command_names_decode() {
    let inline = decode_request(&mut Cursor::new(&b"\xffSET k\r\n"[..])).unwrap();
    assert_eq!(inline.name(), "\u{FFFD}set");
    assert_eq!(args_of(&inline), vec![&b"k"[..]]);

    let framed = decode_request(&mut Cursor::new(frame(&[b"\xc3\x28", b"k"]))).unwrap();
    assert_eq!(framed.name(), "\u{FFFD}(");
    assert_eq!(args_of(&framed), vec![&b"k"[..]]);
}

#[test]
fn test_negative_frame_header_is_inline_command() {
    let req = decode_request(&mut Cursor::new(&b"*-1\r\n"[..])).unwrap();
    assert_eq!(req.name(), "*-1");
    assert!(req.args().is_empty());
}

#[test]
fn test_zero_frame_header_is_malformed() {
    let err = decode_request(&mut Cursor::new(&b"*0\r\n"[..])).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Protocol(ProtocolError::MalformedFraming { .. })
    ));
}

#[test]
fn test_short_payload_never_accepted() {
    let err = decode_request(&mut Cursor::new(&b"*2\r\n$3\r\nGET\r\n$5\r\nabc"[..])).unwrap_err();
    match err {
        DecodeError::Protocol(ProtocolError::TruncatedArgument { declared, got }) => {
            assert_eq!((declared, got), (5, 3));
        }
        other => panic!("Expected truncated argument, got {:?}", other),
    }
}

#[test]
fn test_payload_without_terminator() {
    let err = decode_request(&mut Cursor::new(&b"*1\r\n$3\r\nfooXY"[..])).unwrap_err();
    assert_eq!(err.protocol(), Some(&ProtocolError::MissingTrailingCRLF));
    assert!(err.to_string().contains("\\r\\n"));
}

#[test]
fn test_back_to_back_mixed_requests() {
    let mut input = frame(&[b"SET", b"k", b"v"]);
    input.extend_from_slice(b"GET k\r\n");
    input.extend_from_slice(&frame(&[b"DEL", b"k"]));
    input.extend_from_slice(b"PING\n");

    let mut source = Cursor::new(input);
    let decoder = RequestDecoder::new();

    let names: Vec<String> = std::iter::from_fn(|| decoder.next_request(&mut source).unwrap())
        .map(|req| req.name().to_string())
        .collect();
    assert_eq!(names, ["set", "get", "del", "ping"]);
}

#[test]
fn test_decode_leaves_following_bytes_unread() {
    let mut input = frame(&[b"ECHO", b"hi"]);
    let boundary = input.len();
    input.extend_from_slice(b"trailing garbage");

    let mut source = Cursor::new(input);
    decode_request(&mut source).unwrap();

    assert_eq!(source.position() as usize, boundary);
    assert_eq!(source.fill_buf().unwrap(), b"trailing garbage");
}

#[test]
fn test_custom_limits() {
    let decoder = RequestDecoder::with_config(DecoderConfig {
        max_line_len: 16,
        max_args: 3,
        max_bulk_len: 8,
    });

    assert!(decoder.decode(&mut Cursor::new(frame(&[b"SET", b"k", b"12345678"]))).is_ok());

    let err = decoder
        .decode(&mut Cursor::new(frame(&[b"SET", b"k", b"123456789"])))
        .unwrap_err();
    assert_eq!(err.protocol().map(ProtocolError::kind), Some("argument_too_large"));

    let err = decoder
        .decode(&mut Cursor::new(frame(&[b"MSET", b"a", b"1", b"b"])))
        .unwrap_err();
    assert_eq!(err.protocol().map(ProtocolError::kind), Some("too_many_arguments"));
}

#[test]
fn test_iterator_over_reader() {
    let mut input = frame(&[b"MULTI"]);
    input.extend_from_slice(&frame(&[b"INCR", b"n"]));
    input.extend_from_slice(&frame(&[b"EXEC"]));

    let decoder = RequestDecoder::new();
    let names: Vec<String> = decoder
        .requests(Cursor::new(input))
        .map(|result| result.unwrap().name().to_string())
        .collect();
    assert_eq!(names, ["multi", "incr", "exec"]);
}

#[tokio::test]
async fn test_async_matches_blocking() {
    let mut input = frame(&[b"HSET", b"h", b"f", b"\x00\x01"]);
    input.extend_from_slice(b"HGET h f\r\n");

    let blocking: Vec<Request> = RequestDecoder::new()
        .requests(Cursor::new(input.clone()))
        .collect::<Result<_, _>>()
        .unwrap();

    let mock = Builder::new().read(&input).build();
    let mut source = BufReader::new(mock);
    let decoder = RequestDecoder::new();
    let mut streamed = Vec::new();
    while let Some(req) = decoder.next_request_async(&mut source).await.unwrap() {
        streamed.push(req);
    }

    assert_eq!(streamed, blocking);
}

#[tokio::test]
async fn test_async_byte_at_a_time() {
    let input = frame(&[b"SET", b"key", b"value"]);
    let mut builder = Builder::new();
    for byte in &input {
        builder.read(std::slice::from_ref(byte));
    }
    let mut source = BufReader::new(builder.build());

    let req = RequestDecoder::new().decode_async(&mut source).await.unwrap();
    assert_eq!(req.name(), "set");
    assert_eq!(args_of(&req), vec![&b"key"[..], b"value"]);
}

#[tokio::test]
async fn test_async_connection_closed_mid_request() {
    let mock = Builder::new().read(b"*2\r\n$3\r\nGET\r\n$3\r\n").build();
    let mut source = BufReader::new(mock);

    let err = RequestDecoder::new().decode_async(&mut source).await.unwrap_err();
    assert_eq!(err.protocol(), Some(&ProtocolError::TruncatedArgument { declared: 3, got: 0 }));
}
