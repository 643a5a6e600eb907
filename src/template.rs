//! Compact placeholder templates: `%N`, optional bracket fallbacks.
//!
//! The grammar is literal text interspersed with `%<N>` placeholders
//! (1-based indices into caller-supplied fragments), each optionally followed
//! by up to two balanced `[...]` groups: a fallback name, then a fallback
//! text. Escapes are `%%` → `%`, `%[` → `[`, `%]` → `]`. Parsing is
//! accepting (a stray `%x` or a bare bracket is literal text); serialization
//! is normalizing (always escapes), which gives
//! `parse(stringify(parse(f))) == parse(f)` for every `f` that parses.

use std::collections::HashSet;

use crate::error::{I18nError, I18nResult};

/// How bracket-group contents are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseMode {
	/// Bracket contents are opaque text; nested brackets must balance but
	/// are not interpreted.
	Opaque,
	/// Fallback text is re-parsed with the full grammar and re-serialized
	/// to one flattened, escaped level.
	Recursive,
}

/// One token of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
	/// Literal text, adjacent runs coalesced.
	Literal(String),
	/// A `%N` placeholder.
	Placeholder {
		/// 1-based index into the caller's fragments.
		index: usize,
		/// Optional name for the substituted value.
		fallback_name: Option<String>,
		/// Optional text used when the caller supplies no fragment.
		fallback_text: Option<String>,
	},
}

/// A parsed template: an ordered token sequence.
///
/// # Examples
///
/// ```
/// use grappelli::{ParseMode, Template};
///
/// let template = Template::parse("Hello %1[name], 100%% sure", ParseMode::Opaque).unwrap();
/// assert_eq!(template.render(&["Django"]).unwrap(), "Hello Django, 100% sure");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
	tokens: std::sync::Arc<[TemplateToken]>,
}

impl Template {
	/// Wraps plain text with no placeholders.
	pub fn from_literal(text: &str) -> Self {
		let tokens: Vec<TemplateToken> = if text.is_empty() {
			Vec::new()
		} else {
			vec![TemplateToken::Literal(text.to_string())]
		};
		Self {
			tokens: tokens.into(),
		}
	}

	/// Parses `format` into a token sequence.
	///
	/// Fails with [`I18nError::TemplateSyntax`] on an unterminated bracket
	/// group or a `%0` placeholder.
	pub fn parse(format: &str, mode: ParseMode) -> I18nResult<Self> {
		if !format.contains('%') {
			return Ok(Self::from_literal(format));
		}
		let mut tokens: Vec<TemplateToken> = Vec::new();
		let mut literal = String::new();
		let mut pos = 0;
		while let Some(ch) = char_at(format, pos) {
			if ch != '%' {
				literal.push(ch);
				pos += ch.len_utf8();
				continue;
			}
			match char_at(format, pos + 1) {
				Some(escaped @ ('%' | '[' | ']')) => {
					literal.push(escaped);
					pos += 2;
				}
				Some(digit) if digit.is_ascii_digit() => {
					let start = pos;
					pos += 1;
					let digits_end = format[pos..]
						.find(|c: char| !c.is_ascii_digit())
						.map_or(format.len(), |offset| pos + offset);
					let index: usize =
						format[pos..digits_end]
							.parse()
							.map_err(|_| I18nError::TemplateSyntax {
								reason: "placeholder index out of range".to_string(),
								position: start,
							})?;
					if index == 0 {
						return Err(I18nError::TemplateSyntax {
							reason: "placeholder index must be positive".to_string(),
							position: start,
						});
					}
					pos = digits_end;
					let mut groups: Vec<String> = Vec::new();
					while groups.len() < 2 && char_at(format, pos) == Some('[') {
						let (content, after) = scan_bracket(format, pos)?;
						groups.push(content);
						pos = after;
					}
					let mut groups = groups.into_iter();
					let fallback_name = groups.next();
					let fallback_text = match groups.next() {
						Some(text) if mode == ParseMode::Recursive => {
							// Flatten nested structure to one escaped level.
							Some(Template::parse(&text, ParseMode::Recursive)?.stringify())
						}
						other => other,
					};
					flush_literal(&mut tokens, &mut literal);
					tokens.push(TemplateToken::Placeholder {
						index,
						fallback_name,
						fallback_text,
					});
				}
				// Stray '%': accepting parse keeps it as literal text.
				_ => {
					literal.push('%');
					pos += 1;
				}
			}
		}
		flush_literal(&mut tokens, &mut literal);
		Ok(Self {
			tokens: tokens.into(),
		})
	}

	/// The parsed token sequence.
	pub fn tokens(&self) -> &[TemplateToken] {
		&self.tokens
	}

	/// Canonical re-serialization: every `%`, `[`, `]` in literal or group
	/// content is escaped.
	pub fn stringify(&self) -> String {
		let mut out = String::new();
		for token in self.tokens.iter() {
			match token {
				TemplateToken::Literal(text) => escape_into(&mut out, text),
				TemplateToken::Placeholder {
					index,
					fallback_name,
					fallback_text,
				} => {
					out.push('%');
					out.push_str(&index.to_string());
					if fallback_name.is_some() || fallback_text.is_some() {
						out.push('[');
						if let Some(name) = fallback_name {
							escape_into(&mut out, name);
						}
						out.push(']');
					}
					if let Some(text) = fallback_text {
						out.push('[');
						escape_into(&mut out, text);
						out.push(']');
					}
				}
			}
		}
		out
	}

	/// Substitutes caller `fragments` into the template.
	///
	/// Each placeholder index may be used once; an index beyond the fragment
	/// list falls back to its fallback text; fragments that are never
	/// referenced, reused indices, and out-of-range indices without fallback
	/// are [`I18nError::TemplateSyntax`] errors.
	pub fn render(&self, fragments: &[&str]) -> I18nResult<String> {
		let mut used = vec![false; fragments.len()];
		let mut seen: HashSet<usize> = HashSet::new();
		let mut out = String::new();
		for token in self.tokens.iter() {
			match token {
				TemplateToken::Literal(text) => out.push_str(text),
				TemplateToken::Placeholder {
					index,
					fallback_text,
					..
				} => {
					if !seen.insert(*index) {
						return Err(I18nError::TemplateSyntax {
							reason: format!("placeholder %{index} is used more than once"),
							position: 0,
						});
					}
					if let Some(fragment) = fragments.get(index - 1) {
						used[index - 1] = true;
						out.push_str(fragment);
					} else if let Some(text) = fallback_text {
						out.push_str(text);
					} else {
						return Err(I18nError::TemplateSyntax {
							reason: format!(
								"placeholder %{index} has no fragment and no fallback"
							),
							position: 0,
						});
					}
				}
			}
		}
		if let Some(unused) = used.iter().position(|&used| !used) {
			return Err(I18nError::TemplateSyntax {
				reason: format!("fragment {} is never referenced", unused + 1),
				position: 0,
			});
		}
		Ok(out)
	}
}

fn char_at(text: &str, pos: usize) -> Option<char> {
	text.get(pos..)?.chars().next()
}

fn flush_literal(tokens: &mut Vec<TemplateToken>, literal: &mut String) {
	if literal.is_empty() {
		return;
	}
	// Coalesce with a preceding literal; escapes can split runs.
	if let Some(TemplateToken::Literal(last)) = tokens.last_mut() {
		last.push_str(literal);
	} else {
		tokens.push(TemplateToken::Literal(std::mem::take(literal)));
		return;
	}
	literal.clear();
}

/// Scans a balanced `[...]` group starting at `open`, returning the decoded
/// content and the position after the closing bracket.
fn scan_bracket(format: &str, open: usize) -> I18nResult<(String, usize)> {
	let mut depth = 1usize;
	let mut content = String::new();
	let mut pos = open + 1;
	while let Some(ch) = char_at(format, pos) {
		if ch == '%'
			&& let Some(escaped @ ('%' | '[' | ']')) = char_at(format, pos + 1)
		{
			content.push(escaped);
			pos += 2;
			continue;
		}
		match ch {
			'[' => {
				depth += 1;
				content.push('[');
			}
			']' => {
				depth -= 1;
				if depth == 0 {
					return Ok((content, pos + 1));
				}
				content.push(']');
			}
			other => content.push(other),
		}
		pos += ch.len_utf8();
	}
	Err(I18nError::TemplateSyntax {
		reason: "unterminated bracket group".to_string(),
		position: open,
	})
}

fn escape_into(out: &mut String, text: &str) {
	for ch in text.chars() {
		match ch {
			'%' => out.push_str("%%"),
			'[' => out.push_str("%["),
			']' => out.push_str("%]"),
			other => out.push(other),
		}
	}
}
