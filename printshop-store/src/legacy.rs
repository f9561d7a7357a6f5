//! Reader for attribute metadata the legacy shop stored in PHP `serialize()`
//! format, e.g. `a:1:{i:12;a:2:{i:0;s:2:"34";i:1;s:2:"35";}}`.
//!
//! Only the subset the legacy shop produced is supported: arrays, strings,
//! integers, floats, booleans and null. Parsing happens once when models are
//! loaded; the calculator only ever sees typed [`AttributeSelector`]s.

use printshop_shared::{AttributeId, AttributeSelector};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LegacyParseError {
    #[error("Unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),

    #[error("Unexpected byte {found:?} at {pos}, expected {expected}")]
    Unexpected { pos: usize, found: char, expected: &'static str },

    #[error("Invalid number at byte {0}")]
    InvalidNumber(usize),

    #[error("String at byte {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    #[error("Trailing data at byte {0}")]
    TrailingData(usize),

    #[error("Unsupported attribute layout: {0}")]
    Layout(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<(PhpValue, PhpValue)>),
}

impl PhpValue {
    /// Scalar rendered the way PHP would use it as an array key or term id
    fn as_key(&self) -> Option<String> {
        match self {
            PhpValue::Int(i) => Some(i.to_string()),
            PhpValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Reader {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<u8, LegacyParseError> {
        let byte = self.peek().ok_or(LegacyParseError::UnexpectedEnd(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, wanted: u8, expected: &'static str) -> Result<(), LegacyParseError> {
        let pos = self.pos;
        let found = self.bump()?;
        if found != wanted {
            return Err(LegacyParseError::Unexpected {
                pos,
                found: found as char,
                expected,
            });
        }
        Ok(())
    }

    /// Bytes up to (not including) `terminator`, which is consumed
    fn read_until(&mut self, terminator: u8) -> Result<&'a str, LegacyParseError> {
        let start = self.pos;
        while self.bump()? != terminator {}
        std::str::from_utf8(&self.input[start..self.pos - 1]).map_err(|_| LegacyParseError::InvalidUtf8(start))
    }

    fn read_int(&mut self, terminator: u8) -> Result<i64, LegacyParseError> {
        let start = self.pos;
        self.read_until(terminator)?
            .parse()
            .map_err(|_| LegacyParseError::InvalidNumber(start))
    }

    fn read_value(&mut self) -> Result<PhpValue, LegacyParseError> {
        let pos = self.pos;
        match self.bump()? {
            b'N' => {
                self.expect(b';', "';'")?;
                Ok(PhpValue::Null)
            }
            b'b' => {
                self.expect(b':', "':'")?;
                Ok(PhpValue::Bool(self.read_int(b';')? != 0))
            }
            b'i' => {
                self.expect(b':', "':'")?;
                Ok(PhpValue::Int(self.read_int(b';')?))
            }
            b'd' => {
                self.expect(b':', "':'")?;
                let start = self.pos;
                let value = self
                    .read_until(b';')?
                    .parse()
                    .map_err(|_| LegacyParseError::InvalidNumber(start))?;
                Ok(PhpValue::Float(value))
            }
            b's' => {
                self.expect(b':', "':'")?;
                let len_pos = self.pos;
                let len = usize::try_from(self.read_int(b':')?).map_err(|_| LegacyParseError::InvalidNumber(len_pos))?;
                self.expect(b'"', "'\"'")?;
                let start = self.pos;
                let end = start
                    .checked_add(len)
                    .filter(|end| *end <= self.input.len())
                    .ok_or(LegacyParseError::UnexpectedEnd(self.input.len()))?;
                let text = std::str::from_utf8(&self.input[start..end]).map_err(|_| LegacyParseError::InvalidUtf8(start))?;
                self.pos = end;
                self.expect(b'"', "'\"'")?;
                self.expect(b';', "';'")?;
                Ok(PhpValue::Str(text.to_string()))
            }
            b'a' => {
                self.expect(b':', "':'")?;
                let count_pos = self.pos;
                let count = usize::try_from(self.read_int(b':')?).map_err(|_| LegacyParseError::InvalidNumber(count_pos))?;
                self.expect(b'{', "'{'")?;
                let mut items = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    let key = self.read_value()?;
                    let value = self.read_value()?;
                    items.push((key, value));
                }
                self.expect(b'}', "'}'")?;
                Ok(PhpValue::Array(items))
            }
            other => Err(LegacyParseError::Unexpected {
                pos,
                found: other as char,
                expected: "a type tag (N, b, i, d, s, a)",
            }),
        }
    }
}

/// Parses one PHP-serialized value; the whole input must be consumed.
pub fn parse_php_value(input: &str) -> Result<PhpValue, LegacyParseError> {
    let mut reader = Reader::new(input.trim());
    let value = reader.read_value()?;
    if reader.peek().is_some() {
        return Err(LegacyParseError::TrailingData(reader.pos));
    }
    Ok(value)
}

/// Turns legacy `dimension => [term, ...]` metadata into selectors.
///
/// Dimension order follows the serialized array. The first listed term
/// becomes the default; candidate terms are attached later from the
/// attribute term table.
pub fn parse_legacy_attributes(input: &str) -> Result<Vec<AttributeSelector>, LegacyParseError> {
    let items = match parse_php_value(input)? {
        PhpValue::Array(items) => items,
        PhpValue::Null => return Ok(Vec::new()),
        other => return Err(LegacyParseError::Layout(format!("expected an array, got {:?}", other))),
    };

    let mut selectors = Vec::with_capacity(items.len());
    for (key, value) in items {
        let dimension_id: AttributeId = key
            .as_key()
            .and_then(|k| k.trim().parse().ok())
            .ok_or_else(|| LegacyParseError::Layout(format!("invalid dimension key {:?}", key)))?;

        let term_keys: Vec<String> = match value {
            PhpValue::Array(terms) => terms.into_iter().filter_map(|(_, term)| term.as_key()).collect(),
            PhpValue::Null => Vec::new(),
            scalar => scalar.as_key().into_iter().collect(),
        };

        let mut selector = AttributeSelector::new(dimension_id);
        selector.default_term = term_keys.into_iter().find(|k| !k.trim().is_empty());
        selectors.push(selector);
    }

    Ok(selectors)
}
