//! Line parser for the private key container body
//!
//! Each `name: value` line is fed through a byte-level state machine. The
//! machine resolves the name against the field registry, then hands the raw
//! value to that field's converter. The record is shared across all lines
//! of one container.

use crate::record::PrivateKeyRecord;
use crate::registry::{self, FieldKind, FieldSpec};
use crate::{KeyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Name,
    ColonExpected,
    Value,
    SpaceSkip { resume: Resume },
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Name,
    Value,
}

/// Parses container lines into a [`PrivateKeyRecord`]
pub struct LineParser<'r> {
    record: &'r mut PrivateKeyRecord,
}

impl<'r> LineParser<'r> {
    /// Parser that fills `record`
    pub fn new(record: &'r mut PrivateKeyRecord) -> Self {
        Self { record }
    }

    /// Feed one line, terminator included
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the line is not a well-formed
    /// `name: value` pair for a known field, or the value fails conversion.
    pub fn feed(&mut self, line: &[u8]) -> Result<()> {
        let mut state = State::SpaceSkip {
            resume: Resume::Name,
        };
        let mut field: Option<&'static FieldSpec> = None;
        let mut token = 0;
        let mut pos = 0;
        let mut failure: Option<KeyError> = None;

        while pos < line.len() {
            let byte = line[pos];
            match state {
                State::Name => {
                    if byte == b':' {
                        if pos > token {
                            field = registry::lookup(&line[token..pos]);
                            state = match field {
                                Some(_) => State::ColonExpected,
                                None => {
                                    failure = Some(KeyError::format(format!(
                                        "unknown field `{}`",
                                        String::from_utf8_lossy(&line[token..pos])
                                    )));
                                    State::Error
                                }
                            };
                        } else {
                            state = State::Error;
                        }
                    } else if !byte.is_ascii_graphic() {
                        state = State::Error;
                    } else {
                        pos += 1;
                    }
                }
                State::ColonExpected => {
                    if byte == b':' {
                        pos += 1;
                        state = State::SpaceSkip {
                            resume: Resume::Value,
                        };
                    } else {
                        state = State::Error;
                    }
                }
                State::Value => match field {
                    None => state = State::Error,
                    Some(spec) if byte == b'\n' => {
                        match spec.apply(&line[token..pos], self.record) {
                            Ok(()) => {
                                state = State::SpaceSkip {
                                    resume: Resume::Name,
                                };
                            }
                            Err(e) => {
                                failure = Some(e);
                                state = State::Error;
                            }
                        }
                    }
                    Some(spec) if spec.kind == FieldKind::Unsigned && !byte.is_ascii_digit() => {
                        state = State::Error;
                    }
                    Some(_) => pos += 1,
                },
                State::SpaceSkip { resume } => {
                    if byte.is_ascii_whitespace() {
                        pos += 1;
                    } else {
                        token = pos;
                        state = match resume {
                            Resume::Name => State::Name,
                            Resume::Value => State::Value,
                        };
                        if resume == Resume::Name {
                            field = None;
                        }
                    }
                }
                State::Error => break,
            }
        }

        match state {
            State::SpaceSkip {
                resume: Resume::Value,
            } => match field {
                // `name:` with nothing after it
                Some(spec) => spec.apply(b"", self.record),
                None => Err(KeyError::format("missing field name")),
            },
            State::SpaceSkip {
                resume: Resume::Name,
            } => Ok(()),
            State::Error => Err(failure.unwrap_or_else(|| KeyError::format("malformed line"))),
            State::Name | State::ColonExpected | State::Value => {
                Err(KeyError::format("unterminated line"))
            }
        }
    }
}

/// Feed a single line into `record`
///
/// # Errors
///
/// See [`LineParser::feed`].
pub fn parse_line(line: &[u8], record: &mut PrivateKeyRecord) -> Result<()> {
    LineParser::new(record).feed(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn parse(lines: &[&str]) -> Result<PrivateKeyRecord> {
        let mut record = PrivateKeyRecord::new();
        let mut parser = LineParser::new(&mut record);
        for line in lines {
            parser.feed(line.as_bytes())?;
        }
        Ok(record)
    }

    #[test]
    fn test_parses_each_field_kind() {
        let record = parse(&["version: 1\n", "kdf: pbkdf2-sha256\n", "id: 0102030405060708\n"])
            .expect("valid lines");
        assert_eq!(record.version(), Some(1));
        assert_eq!(record.pbkdf_algorithm(), Some("pbkdf2-sha256"));
        assert_eq!(record.id(), Some(&[1u8, 2, 3, 4, 5, 6, 7, 8][..]));
    }

    #[test]
    fn test_whitespace_after_colon_is_optional() {
        let record = parse(&["rounds:42\n", "version:  \t7\n"]).expect("valid lines");
        assert_eq!(record.rounds(), Some(42));
        assert_eq!(record.version(), Some(7));
    }

    #[test]
    fn test_blank_line_is_accepted() {
        let record = parse(&["\n", "  \n"]).expect("blank lines");
        assert_eq!(record, PrivateKeyRecord::new());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = parse(&["colour: blue\n"]).expect_err("unknown field");
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        assert!(parse(&["Version: 1\n"]).is_err());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(parse(&[": 1\n"]).is_err());
    }

    #[test]
    fn test_space_inside_name_is_rejected() {
        assert!(parse(&["ver sion: 1\n"]).is_err());
    }

    #[test]
    fn test_missing_colon_is_rejected() {
        assert!(parse(&["version 1\n"]).is_err());
        assert!(parse(&["version\n"]).is_err());
    }

    #[test]
    fn test_double_colon_is_rejected() {
        assert!(parse(&["version:: 1\n"]).is_err());
    }

    #[test]
    fn test_non_digit_in_unsigned_value_is_rejected() {
        assert!(parse(&["rounds: 12a4\n"]).is_err());
        assert!(parse(&["rounds: 12 \n"]).is_err());
        assert!(parse(&["rounds: -1\n"]).is_err());
    }

    #[test]
    fn test_unterminated_value_is_rejected() {
        assert!(parse(&["version: 1"]).is_err());
    }

    #[test]
    fn test_empty_value_handling() {
        let record = parse(&["kdf:\n"]).expect("empty text");
        assert_eq!(record.pbkdf_algorithm(), Some(""));
        assert!(parse(&["rounds:\n"]).is_err());
        assert!(parse(&["salt: \n"]).is_err());
    }

    #[test]
    fn test_text_value_keeps_inner_spaces() {
        let record = parse(&["kdf: some kdf \n"]).expect("text");
        assert_eq!(record.pbkdf_algorithm(), Some("some kdf "));
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let err = parse(&["version: 1\n", "version: 1\n"]).expect_err("duplicate");
        assert!(err.to_string().contains("already set"));
    }

    #[test]
    fn test_record_survives_failed_line() {
        let mut record = PrivateKeyRecord::new();
        let mut parser = LineParser::new(&mut record);
        parser.feed(b"version: 1\n").expect("version");
        assert!(parser.feed(b"bogus\n").is_err());
        assert_eq!(record.version(), Some(1));
    }
}
