//! Object-literal values, a permissive parser for them, and their canonical text form.
//!
//! The grammar is the union of what models tend to emit for a GraphQL `where` argument: JSON,
//! JavaScript object literals (bare keys, single quotes, trailing commas, comments) and GraphQL
//! input values (optional commas, bare enum values). Nothing is evaluated.

use std::fmt::{self, Display, Formatter, Write};

use crate::filter::FilterParseError;

const MAX_NESTING_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
	/// Entries keep insertion order. A repeated key replaces the earlier value in place.
	Object(Vec<(String, Literal)>),
	Array(Vec<Literal>),
	String(String),
	/// The numeric lexeme exactly as written.
	Number(String),
	Bool(bool),
	Null,
	/// A bare word in value position, e.g. a GraphQL enum such as `insensitive`.
	Ident(String),
}
impl Literal {
	pub fn entries(&self) -> Option<&[(String, Literal)]> {
		match self {
			Self::Object(entries) => Some(entries),
			_ => None,
		}
	}

	pub fn get(&self, key: &str) -> Option<&Literal> {
		self.entries()?.iter().find(|(k, _)| k == key).map(|(_, value)| value)
	}

	pub fn has_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// Sets `key`, keeping the position of an existing entry.
	pub fn insert(entries: &mut Vec<(String, Literal)>, key: String, value: Literal) {
		match entries.iter_mut().find(|(k, _)| *k == key) {
			Some((_, slot)) => *slot = value,
			None => entries.push((key, value)),
		}
	}

	pub fn single(key: impl Into<String>, value: Literal) -> Self {
		Self::Object(vec![(key.into(), value)])
	}
}
impl Display for Literal {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Object(entries) => {
				f.write_str("{ ")?;

				for (index, (key, value)) in entries.iter().enumerate() {
					if index > 0 {
						f.write_str(", ")?;
					}
					if is_identifier(key) {
						f.write_str(key)?;
					} else {
						write_quoted(f, key)?;
					}

					write!(f, ": {value}")?;
				}

				f.write_str(" }")
			},
			Self::Array(items) => {
				f.write_char('[')?;

				for (index, item) in items.iter().enumerate() {
					if index > 0 {
						f.write_str(", ")?;
					}

					write!(f, "{item}")?;
				}

				f.write_char(']')
			},
			Self::String(value) => write_quoted(f, value),
			Self::Number(raw) | Self::Ident(raw) => f.write_str(raw),
			Self::Bool(value) => write!(f, "{value}"),
			Self::Null => f.write_str("null"),
		}
	}
}

pub fn parse(src: &str) -> Result<Literal, FilterParseError> {
	let mut parser = Parser { src, pos: 0 };

	parser.skip_trivia()?;

	let value = parser.parse_value(0)?;

	parser.skip_trivia()?;

	if parser.pos < src.len() {
		return Err(parser.error("unexpected trailing content after the filter object"));
	}

	Ok(value)
}

struct Parser<'a> {
	src: &'a str,
	pos: usize,
}
impl<'a> Parser<'a> {
	fn peek(&self) -> Option<char> {
		self.src[self.pos..].chars().next()
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;

		self.pos += ch.len_utf8();

		Some(ch)
	}

	fn error(&self, message: impl Into<String>) -> FilterParseError {
		FilterParseError { offset: self.pos, message: message.into() }
	}

	fn skip_trivia(&mut self) -> Result<(), FilterParseError> {
		loop {
			let rest = &self.src[self.pos..];

			if let Some(ch) = rest.chars().next()
				&& ch.is_whitespace()
			{
				self.pos += ch.len_utf8();
			} else if rest.starts_with("//") {
				self.pos += rest.find('\n').unwrap_or(rest.len());
			} else if rest.starts_with("/*") {
				let Some(end) = rest[2..].find("*/") else {
					return Err(self.error("unterminated block comment"));
				};

				self.pos += end + 4;
			} else {
				return Ok(());
			}
		}
	}

	fn skip_separators(&mut self) -> Result<(), FilterParseError> {
		self.skip_trivia()?;

		while self.peek() == Some(',') {
			self.pos += 1;
			self.skip_trivia()?;
		}

		Ok(())
	}

	fn parse_value(&mut self, depth: usize) -> Result<Literal, FilterParseError> {
		if depth > MAX_NESTING_DEPTH {
			return Err(self.error(format!("nesting exceeds {MAX_NESTING_DEPTH} levels")));
		}

		match self.peek() {
			Some('{') => self.parse_object(depth),
			Some('[') => self.parse_array(depth),
			Some(quote @ ('"' | '\'')) => self.parse_string(quote).map(Literal::String),
			Some(ch) if ch == '-' || ch == '+' || ch == '.' || ch.is_ascii_digit() =>
				self.parse_number(),
			Some(ch) if is_ident_start(ch) => {
				let word = self.parse_identifier();

				Ok(match word {
					"true" => Literal::Bool(true),
					"false" => Literal::Bool(false),
					"null" => Literal::Null,
					_ => Literal::Ident(word.to_string()),
				})
			},
			Some(ch) => Err(self.error(format!("unexpected character '{ch}'"))),
			None => Err(self.error("unexpected end of input, expected a value")),
		}
	}

	fn parse_object(&mut self, depth: usize) -> Result<Literal, FilterParseError> {
		self.pos += 1;

		let mut entries = Vec::new();

		loop {
			self.skip_separators()?;

			match self.peek() {
				Some('}') => {
					self.pos += 1;

					return Ok(Literal::Object(entries));
				},
				None => return Err(self.error("unterminated object, expected '}'")),
				_ => {},
			}

			let key = self.parse_key()?;

			self.skip_trivia()?;

			if self.bump() != Some(':') {
				return Err(self.error(format!("expected ':' after key '{key}'")));
			}

			self.skip_trivia()?;

			let value = self.parse_value(depth + 1)?;

			Literal::insert(&mut entries, key, value);
		}
	}

	fn parse_array(&mut self, depth: usize) -> Result<Literal, FilterParseError> {
		self.pos += 1;

		let mut items = Vec::new();

		loop {
			self.skip_separators()?;

			match self.peek() {
				Some(']') => {
					self.pos += 1;

					return Ok(Literal::Array(items));
				},
				None => return Err(self.error("unterminated array, expected ']'")),
				_ => items.push(self.parse_value(depth + 1)?),
			}
		}
	}

	fn parse_key(&mut self) -> Result<String, FilterParseError> {
		match self.peek() {
			Some(quote @ ('"' | '\'')) => self.parse_string(quote),
			Some(ch) if is_ident_start(ch) => Ok(self.parse_identifier().to_string()),
			Some(ch) if ch.is_ascii_digit() => Ok(self.take_while(|c| c.is_ascii_digit()).to_string()),
			Some(ch) => Err(self.error(format!("unexpected character '{ch}', expected a key"))),
			None => Err(self.error("unexpected end of input, expected a key")),
		}
	}

	fn parse_identifier(&mut self) -> &'a str {
		self.take_while(is_ident_continue)
	}

	fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
		let src = self.src;
		let start = self.pos;

		while let Some(ch) = self.peek()
			&& predicate(ch)
		{
			self.pos += ch.len_utf8();
		}

		&src[start..self.pos]
	}

	fn parse_string(&mut self, quote: char) -> Result<String, FilterParseError> {
		let start = self.pos;

		self.pos += 1;

		let mut out = String::new();

		loop {
			let Some(ch) = self.bump() else {
				return Err(FilterParseError {
					offset: start,
					message: "unterminated string literal".to_string(),
				});
			};

			match ch {
				c if c == quote => return Ok(out),
				'\\' => {
					let Some(escaped) = self.bump() else {
						continue;
					};

					match escaped {
						'n' => out.push('\n'),
						't' => out.push('\t'),
						'r' => out.push('\r'),
						'b' => out.push('\u{0008}'),
						'f' => out.push('\u{000C}'),
						'u' => out.push(self.parse_unicode_escape()?),
						other => out.push(other),
					}
				},
				c => out.push(c),
			}
		}
	}

	fn parse_unicode_escape(&mut self) -> Result<char, FilterParseError> {
		let digits = self.src.get(self.pos..self.pos + 4).unwrap_or_default();

		if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
			return Err(self.error("invalid \\u escape, expected four hex digits"));
		}

		let code = u32::from_str_radix(digits, 16).map_err(|err| self.error(err.to_string()))?;

		self.pos += 4;

		Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
	}

	fn parse_number(&mut self) -> Result<Literal, FilterParseError> {
		let start = self.pos;

		if matches!(self.peek(), Some('-' | '+')) {
			self.pos += 1;
		}

		let int_digits = self.take_while(|c| c.is_ascii_digit()).len();
		let mut frac_digits = 0;

		if self.peek() == Some('.') {
			self.pos += 1;
			frac_digits = self.take_while(|c| c.is_ascii_digit()).len();
		}
		if int_digits + frac_digits == 0 {
			return Err(FilterParseError {
				offset: start,
				message: "malformed number".to_string(),
			});
		}
		if matches!(self.peek(), Some('e' | 'E')) {
			self.pos += 1;

			if matches!(self.peek(), Some('-' | '+')) {
				self.pos += 1;
			}
			if self.take_while(|c| c.is_ascii_digit()).is_empty() {
				return Err(self.error("malformed number exponent"));
			}
		}

		let raw = self.src[start..self.pos].trim_start_matches('+');

		Ok(Literal::Number(raw.to_string()))
	}
}

fn is_ident_start(ch: char) -> bool {
	ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

fn is_identifier(key: &str) -> bool {
	let mut chars = key.chars();

	chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue)
}

fn write_quoted(f: &mut Formatter<'_>, value: &str) -> fmt::Result {
	f.write_char('"')?;

	for ch in value.chars() {
		match ch {
			'"' => f.write_str("\\\"")?,
			'\\' => f.write_str("\\\\")?,
			'\n' => f.write_str("\\n")?,
			'\r' => f.write_str("\\r")?,
			'\t' => f.write_str("\\t")?,
			c => f.write_char(c)?,
		}
	}

	f.write_char('"')
}
