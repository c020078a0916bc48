use std::collections::hash_map;
use std::collections::HashMap;

use crate::http::parser::ParseError;

const CRLF: &[u8] = b"\r\n";

/// Lookup table for the RFC 7230 `tchar` class, built once at compile time.
static TOKEN_CHARS: [bool; 256] = token_table();

const fn token_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut b = 0;
    while b < 256 {
        let c = b as u8;
        table[b] = c.is_ascii_alphanumeric()
            || matches!(
                c,
                b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'.' | b'^' | b'_' | b'`'
                    | b'|' | b'~' | b'-'
            );
        b += 1;
    }
    table
}

/// Returns true if `name` is a non-empty HTTP token.
pub fn is_token(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| TOKEN_CHARS[b as usize])
}

/// Header fields keyed by lower-cased name.
///
/// Repeated names are folded into one entry, values joined with `", "` in the
/// order they were seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a header, ignoring ASCII case of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Inserts or replaces a header.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Adds a value, joining it onto any existing value for the same name.
    pub fn append(&mut self, name: impl AsRef<str>, value: &str) {
        match self.fields.entry(name.as_ref().to_ascii_lowercase()) {
            hash_map::Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(value);
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(value.to_string());
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses as many complete header lines from `data` as are available.
    ///
    /// Returns the number of bytes consumed and whether the blank line that
    /// ends the block was reached. A block terminator is only recognized when
    /// `data` starts with it; lines before it are consumed first and the
    /// caller is expected to call again with the remaining bytes.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        if data.starts_with(CRLF) {
            return Ok((CRLF.len(), true));
        }

        let mut consumed = 0;

        loop {
            let rest = &data[consumed..];
            let line_end = match find_crlf(rest) {
                // Incomplete line, or the terminator for the next call
                None | Some(0) => break,
                Some(i) => i,
            };

            self.parse_line(&rest[..line_end])?;
            consumed += line_end + CRLF.len();
        }

        Ok((consumed, false))
    }

    fn parse_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::MalformedHeader)?;
        let line = line.trim_matches(' ');

        let (name, value) = line.split_once(':').ok_or(ParseError::MalformedHeader)?;

        if name.ends_with(' ') {
            return Err(ParseError::MalformedHeader);
        }

        let name = name.to_ascii_lowercase();
        if !is_token(&name) {
            return Err(ParseError::InvalidHeaderName(name));
        }

        self.append(&name, value.trim_matches(' '));
        Ok(())
    }
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}
