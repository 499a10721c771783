//! JSON line I/O for the CLI
//!
//! - Input: one JSON object per line; a line that is not UTF-8 is reported
//!   on its own and does not end the stream
//! - Output: one JSON object per line, UTF-8

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

/// One line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Text(String),
    /// Bytes that are not valid UTF-8, with the decoder's message
    Undecodable(String),
}

/// Non-blank lines of `input`. Only a failing reader yields `Err`.
pub fn read_lines<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<InputLine>> {
    input
        .split(b'\n')
        .map(|bytes| -> CliResult<InputLine> {
            let mut bytes = bytes?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            Ok(match String::from_utf8(bytes) {
                Ok(text) => InputLine::Text(text),
                Err(e) => InputLine::Undecodable(e.utf8_error().to_string()),
            })
        })
        .filter(|line| !matches!(line, Ok(InputLine::Text(text)) if text.trim().is_empty()))
}

pub fn ok_response(output: Value) -> Value {
    json!({
        "status": "ok",
        "output": output
    })
}

pub fn error_response(code: &str, wire_code: Option<u32>, message: &str) -> Value {
    let mut response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    if let Some(wire) = wire_code {
        response["wire_code"] = json!(wire);
    }
    response
}

pub fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
