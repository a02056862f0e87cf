//! Minimal HTTP/1.1 framing for JSON-RPC POSTs.

use crate::instance::Instance;
use std::io;

const HEADER_END: &[u8] = b"\r\n\r\n";

pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Status code and buffered body of one HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }
}

pub fn build_http_post(instance: &Instance, body: &[u8]) -> Vec<u8> {
    let mut request = Vec::with_capacity(body.len() + 256);
    request.extend_from_slice(b"POST / HTTP/1.1\r\n");
    request.extend_from_slice(format!("Host: {}\r\n", instance.endpoint()).as_bytes());
    request.extend_from_slice(format!("Authorization: {}\r\n", instance.basic_auth()).as_bytes());
    request.extend_from_slice(b"Content-Type: application/json\r\n");
    request.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    request.extend_from_slice(b"Connection: close\r\n");
    request.extend_from_slice(b"\r\n");
    request.extend_from_slice(body);
    request
}

pub fn find_header_end(response: &[u8]) -> Option<usize> {
    response.windows(HEADER_END.len()).position(|window| window == HEADER_END)
}

pub fn parse_content_length(headers: &[u8]) -> Option<usize> {
    header_value(headers, "content-length").and_then(|value| value.parse::<usize>().ok())
}

fn is_chunked(headers: &[u8]) -> bool {
    header_value(headers, "transfer-encoding")
        .map(|value| value.to_ascii_lowercase().contains("chunked"))
        .unwrap_or(false)
}

fn header_value(headers: &[u8], name: &str) -> Option<String> {
    let text = String::from_utf8_lossy(headers);
    text.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim().to_string())
    })
}

fn parse_status_line(headers: &[u8]) -> Option<u16> {
    let text = String::from_utf8_lossy(headers);
    let line = text.lines().next()?;
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse::<u16>().ok()
}

/// `true` once `response` holds a whole reply: headers plus `Content-Length`
/// bytes, or the terminating zero-size chunk. Replies framed by neither end
/// at EOF, so they are never complete here.
pub fn response_complete(response: &[u8]) -> bool {
    let Some(header_end) = find_header_end(response) else {
        return false;
    };
    let headers = &response[..header_end];
    let rest = &response[header_end + HEADER_END.len()..];
    if is_chunked(headers) {
        return match decode_chunked(rest) {
            Ok(_) => true,
            Err(err) => err.kind() != io::ErrorKind::UnexpectedEof,
        };
    }
    if matches!(parse_status_line(headers), Some(status) if has_no_body(status)) {
        return true;
    }
    parse_content_length(headers).is_some_and(|length| rest.len() >= length)
}

fn has_no_body(status: u16) -> bool {
    (100..200).contains(&status) || status == 204 || status == 304
}

/// Parses a response buffered up to completion or EOF.
pub fn parse_http_response(response: &[u8]) -> io::Result<HttpReply> {
    let header_end = find_header_end(response)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing headers"))?;
    let headers = &response[..header_end];
    let status = parse_status_line(headers)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "invalid status line"))?;
    let rest = &response[header_end + HEADER_END.len()..];

    let body = if is_chunked(headers) {
        decode_chunked(rest)?
    } else if let Some(content_length) = parse_content_length(headers) {
        if rest.len() < content_length {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "response body incomplete"));
        }
        rest[..content_length].to_vec()
    } else {
        rest.to_vec()
    };
    Ok(HttpReply { status, body })
}

fn decode_chunked(mut input: &[u8]) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let line_end = input
            .windows(2)
            .position(|window| window == b"\r\n")
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "chunk size missing"))?;
        let size_line = String::from_utf8_lossy(&input[..line_end]);
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid chunk size"))?;
        input = &input[line_end + 2..];
        if size == 0 {
            return Ok(body);
        }
        if input.len() < size {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "chunk truncated"));
        }
        body.extend_from_slice(&input[..size]);
        input = input.get(size + 2..).unwrap_or_default();
    }
}
