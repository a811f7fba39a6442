//! Line-oriented header tokenizer.
//!
//! The header has no formal grammar. The first line is a format tag; every
//! following line is either `key = value` or the start of a brace-delimited
//! value that may run over several lines:
//!
//! ```text
//! ENVI
//! samples = 640
//! wavelength = {
//!  0.436, 0.442,
//!  0.449 }
//! ```
//!
//! Parsing is a small state machine: in the `Scalar` state each line is a
//! field of its own; seeing a `{` in a value switches to `Composite`, which
//! swallows lines until one contains `}`.

use crate::error::{CrismError, Result};
use crate::header::value::{HeaderRecord, HeaderValue};

/// Tokenizer state between lines.
#[derive(Debug)]
enum LineState {
    /// Next line starts a new field.
    Scalar,
    /// Inside a `{ ... }` value that started on `start_line`.
    Composite {
        key: String,
        start_line: usize,
        buffer: String,
    },
}

/// Parse header text into a record.
pub fn parse_header(text: &str) -> Result<HeaderRecord> {
    parse_lines(text.lines())
}

/// Parse a sequence of header lines into a record.
///
/// Lines may still carry their line terminator; it is stripped.
pub fn parse_lines<I, S>(lines: I) -> Result<HeaderRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter();
    let mut record = HeaderRecord::new();

    let Some(first) = lines.next() else {
        return Err(CrismError::format(1, "header is empty"));
    };
    let tag = strip_newline(first.as_ref());
    log::trace!("Header format tag: {:?}", tag);
    record.set_format_tag(tag);

    let mut state = LineState::Scalar;
    for (index, line) in lines.enumerate() {
        // Line numbers are 1-based and the tag occupies line 1
        let line_no = index + 2;
        let line = strip_newline(line.as_ref());

        state = match state {
            LineState::Scalar => start_field(&mut record, line, line_no)?,
            LineState::Composite {
                key,
                start_line,
                mut buffer,
            } => {
                buffer.push_str(line);
                if line.contains('}') {
                    finish_composite(&mut record, key, buffer, start_line);
                    LineState::Scalar
                } else {
                    LineState::Composite {
                        key,
                        start_line,
                        buffer,
                    }
                }
            }
        };
    }

    if let LineState::Composite {
        key, start_line, ..
    } = state
    {
        return Err(CrismError::format(
            start_line,
            format!("value of '{}' opens '{{' but is never closed", key),
        ));
    }

    log::debug!("Parsed header with {} fields", record.len());
    Ok(record)
}

/// Handle a line seen in the `Scalar` state.
fn start_field(record: &mut HeaderRecord, line: &str, line_no: usize) -> Result<LineState> {
    let Some(eq) = line.find('=') else {
        return Err(CrismError::format(
            line_no,
            format!("expected 'key = value', found {:?}", line),
        ));
    };
    let key = field_name(&line[..eq]);
    let value = &line[eq + 1..];

    match value.find('{') {
        Some(brace) => {
            let buffer = value[brace..].to_string();
            if buffer.contains('}') {
                finish_composite(record, key.to_string(), buffer, line_no);
                Ok(LineState::Scalar)
            } else {
                Ok(LineState::Composite {
                    key: key.to_string(),
                    start_line: line_no,
                    buffer,
                })
            }
        }
        None => {
            let value = coerce_scalar(value, line_no)?;
            log::trace!("Field {:?} = {:?}", key, value);
            insert_field(record, key.to_string(), value, line_no);
            Ok(LineState::Scalar)
        }
    }
}

fn finish_composite(record: &mut HeaderRecord, key: String, buffer: String, start_line: usize) {
    log::trace!("Composite field {:?} ({} chars)", key, buffer.len());
    insert_field(record, key, HeaderValue::Composite(buffer), start_line);
}

fn insert_field(record: &mut HeaderRecord, key: String, value: HeaderValue, line_no: usize) {
    if record.insert(key.clone(), value).is_some() {
        log::warn!(
            "Header field {:?} repeated at line {}, keeping the later value",
            key,
            line_no
        );
    }
}

/// Key text before `=`, minus the single space that separates it from `=`.
fn field_name(raw: &str) -> &str {
    raw.strip_suffix(' ').unwrap_or(raw)
}

/// Coerce a scalar value: digits-only integer, then float, then string.
fn coerce_scalar(raw: &str, line_no: usize) -> Result<HeaderValue> {
    let trimmed = raw.trim_matches(' ');

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<i64>().map(HeaderValue::Int).map_err(|_| {
            CrismError::format(
                line_no,
                format!("integer value {} does not fit in 64 bits", trimmed),
            )
        });
    }

    if let Some(v) = parse_float(raw.trim()) {
        return Ok(HeaderValue::Float(v));
    }

    Ok(HeaderValue::Str(raw.trim().to_string()))
}

/// Float parse that also accepts `_` digit separators (`1_000.5`).
///
/// Each `_` must sit between two ASCII digits.
fn parse_float(text: &str) -> Option<f64> {
    if !text.contains('_') {
        return text.parse().ok();
    }
    let bytes = text.as_bytes();
    let separators_ok = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !separators_ok {
        return None;
    }
    text.replace('_', "").parse().ok()
}

fn strip_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = "TYPE\nsamples = 10\nlines = 5\nbands = 3\ndata type = 4\ncat input files = x.img\ncat history =  hist\n";

    #[test]
    fn test_parse_scene_header() {
        let record = parse_header(SCENE).unwrap();

        assert_eq!(record.format_tag(), Some("TYPE"));
        assert_eq!(record.get("samples"), Some(&HeaderValue::Int(10)));
        assert_eq!(record.get("lines"), Some(&HeaderValue::Int(5)));
        assert_eq!(record.get("bands"), Some(&HeaderValue::Int(3)));
        assert_eq!(record.get("data type"), Some(&HeaderValue::Int(4)));
        assert_eq!(
            record.get("cat input files"),
            Some(&HeaderValue::Str("x.img".to_string()))
        );
        assert_eq!(
            record.get("cat history"),
            Some(&HeaderValue::Str("hist".to_string()))
        );
        assert_eq!(record.len(), 7);
    }

    #[test]
    fn test_empty_header_fails() {
        assert!(matches!(
            parse_header(""),
            Err(CrismError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn test_tag_only_header() {
        let record = parse_header("CRISM\n").unwrap();
        assert_eq!(record.format_tag(), Some("CRISM"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_line_without_equals_fails() {
        let result = parse_header("ENVI\nsamples = 3\njust some words\n");
        match result {
            Err(CrismError::Format { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_coercion() {
        let record = parse_header(
            "ENVI\nbig = 12345678901\nneg = -3\nratio = 0.25\nexp = 1e-3\nname = CRISM FRT\nempty =\n",
        )
        .unwrap();

        assert_eq!(record.get("big"), Some(&HeaderValue::Int(12_345_678_901)));
        // A sign is not a digit, so negative numbers go through the float parser
        assert_eq!(record.get("neg"), Some(&HeaderValue::Float(-3.0)));
        assert_eq!(record.get("ratio"), Some(&HeaderValue::Float(0.25)));
        assert_eq!(record.get("exp"), Some(&HeaderValue::Float(0.001)));
        assert_eq!(
            record.get("name"),
            Some(&HeaderValue::Str("CRISM FRT".to_string()))
        );
        assert_eq!(record.get("empty"), Some(&HeaderValue::Str(String::new())));
    }

    #[test]
    fn test_digit_separators_in_floats() {
        let record = parse_header(
            "ENVI\nscaled = 1_000.5\ngrouped = 1_000\nleading = _1.5\ndouble = 1__0.5\ntrailing = 1_.5\n",
        )
        .unwrap();

        assert_eq!(record.get("scaled"), Some(&HeaderValue::Float(1000.5)));
        // Not digits only, so not an integer
        assert_eq!(record.get("grouped"), Some(&HeaderValue::Float(1000.0)));
        for key in ["leading", "double", "trailing"] {
            assert!(
                matches!(record.get(key), Some(HeaderValue::Str(_))),
                "{}",
                key
            );
        }
    }

    #[test]
    fn test_type_line_keeps_format_tag() {
        let record = parse_header("ENVI\ntype = 5\nsamples = 3\n").unwrap();

        assert_eq!(record.format_tag(), Some("ENVI"));
        assert_eq!(record.get("type"), Some(&HeaderValue::Int(5)));

        let reparsed = parse_header(&record.to_header_string()).unwrap();
        assert_eq!(reparsed, record);
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let result = parse_header("ENVI\nhuge = 99999999999999999999999\n");
        assert!(matches!(result, Err(CrismError::Format { line: 2, .. })));
    }

    #[test]
    fn test_key_keeps_inner_text() {
        let record = parse_header("ENVI\nkey=1\n spaced key = 2\n").unwrap();
        assert_eq!(record.get("key"), Some(&HeaderValue::Int(1)));
        assert_eq!(record.get(" spaced key"), Some(&HeaderValue::Int(2)));
    }

    #[test]
    fn test_single_line_composite() {
        let record = parse_header("ENVI\ndefault bands = {1, 2, 3}\n").unwrap();
        assert_eq!(
            record.get("default bands"),
            Some(&HeaderValue::Composite("{1, 2, 3}".to_string()))
        );
    }

    #[test]
    fn test_multi_line_composite() {
        let text = "ENVI\nwavelength = {\n 0.436, 0.442,\n 0.449 }\nsamples = 2\n";
        let record = parse_header(text).unwrap();

        assert_eq!(
            record.get("wavelength"),
            Some(&HeaderValue::Composite("{ 0.436, 0.442, 0.449 }".to_string()))
        );
        assert_eq!(record.get("samples"), Some(&HeaderValue::Int(2)));
        assert_eq!(
            record.float_list("wavelength").unwrap(),
            Some(vec![0.436, 0.442, 0.449])
        );
    }

    #[test]
    fn test_composite_reassembled_for_any_span() {
        for n in 1..8 {
            let mut text = String::from("ENVI\nlist = {");
            let mut expected = String::from("{");
            for i in 0..n {
                text.push_str(&format!("item{},\n", i));
                expected.push_str(&format!("item{},", i));
            }
            text.push_str("}\nafter = 1\n");
            expected.push('}');

            let record = parse_header(&text).unwrap();
            assert_eq!(
                record.get("list"),
                Some(&HeaderValue::Composite(expected)),
                "span of {} lines",
                n + 1
            );
            assert_eq!(record.get("after"), Some(&HeaderValue::Int(1)));
        }
    }

    #[test]
    fn test_unterminated_composite_fails() {
        let result = parse_header("ENVI\nsamples = 4\nband names = {\n a,\n b\n");
        match result {
            Err(CrismError::Format { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("band names"));
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_brace_in_key_is_not_composite() {
        let record = parse_header("ENVI\nodd{key = 7\n").unwrap();
        assert_eq!(record.get("odd{key"), Some(&HeaderValue::Int(7)));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let record = parse_header("ENVI\nbands = 3\nbands = 4\n").unwrap();
        assert_eq!(record.get("bands"), Some(&HeaderValue::Int(4)));
    }

    #[test]
    fn test_crlf_line_endings() {
        let record = parse_header("ENVI\r\nsamples = 10\r\nname = abc\r\n").unwrap();
        assert_eq!(record.format_tag(), Some("ENVI"));
        assert_eq!(record.get("samples"), Some(&HeaderValue::Int(10)));
        assert_eq!(record.get("name"), Some(&HeaderValue::Str("abc".to_string())));
    }

    #[test]
    fn test_parse_lines_with_terminators() {
        let lines = vec!["ENVI\n", "samples = 3\n", "lines = 2\n"];
        let record = parse_lines(lines).unwrap();
        assert_eq!(record.format_tag(), Some("ENVI"));
        assert_eq!(record.require_int("lines").unwrap(), 2);
    }

    #[test]
    fn test_reserialized_scalars_roundtrip() {
        let text = "ENVI\nsamples = 640\nlines = 480\nscale = 3.0\noffset = -12.5\nsensor = L\nwavelength = {1.0, 2.0}\n";
        let record = parse_header(text).unwrap();
        let reparsed = parse_header(&record.to_header_string()).unwrap();

        assert_eq!(reparsed, record);
        for key in ["samples", "lines", "scale", "offset"] {
            assert_eq!(
                reparsed.get(key).and_then(HeaderValue::as_float),
                record.get(key).and_then(HeaderValue::as_float),
                "field {}",
                key
            );
        }
    }
}
