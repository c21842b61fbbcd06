//! Smol utilities for logging

use std::ascii;

/// Make an Ascii-safe string
pub fn ascii_escape(s: &[u8]) -> String {
    s.iter().flat_map(|&b| ascii::escape_default(b)).map(char::from).collect()
}

/// Like `ascii_escape`, minus any trailing line terminator
pub fn escape_line(line: &[u8]) -> String {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }

    ascii_escape(&line[.. end])
}

#[test]
fn ascii_escape_leaves_printables_alone() {
    assert_eq!(ascii_escape(b"GET / HTTP/1.0"), "GET / HTTP/1.0");
}

#[test]
fn ascii_escape_escapes_control_and_high_bytes() {
    assert_eq!(ascii_escape(b"a\r\n\xff"), "a\\r\\n\\xff");
}

#[test]
fn escape_line_drops_terminator() {
    assert_eq!(escape_line(b"Host: x\r\n"), "Host: x");
    assert_eq!(escape_line(b"Host: x\n"), "Host: x");
}
