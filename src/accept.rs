//! Hardened Accept-Language parsing for untrusted input.
//!
//! The header is length-capped, split on commas, and each term parsed as
//! `tag[;q=float]`. Nothing here ever fails the caller: a term with a
//! malformed or out-of-range quality parameter is dropped, a tag that fails
//! canonicalization is dropped, and a fully malformed header yields the
//! empty stack. Canonicalization is always uncached so attacker-controlled
//! tags cannot poison the trusted-tag cache.

use std::cmp::Reverse;

use crate::stack::{LanguageStack, StackInterner};
use crate::tag::LanguageTag;

/// Default cap on the header length, in bytes.
pub const DEFAULT_MAX_HEADER_LEN: usize = 200;

/// Parses an Accept-Language header into an interned preference stack.
///
/// Only the first `max_len` bytes are considered. Surviving tags are
/// stable-sorted by descending quality and interned, highest quality most
/// preferred.
///
/// # Examples
///
/// ```
/// use grappelli::{StackInterner, parse_accept_language, DEFAULT_MAX_HEADER_LEN};
///
/// let interner = StackInterner::new();
/// let stack = parse_accept_language(
///     "en-AU;q=0.8,en-GB;q=0.9",
///     DEFAULT_MAX_HEADER_LEN,
///     &interner,
/// );
/// let tags: Vec<&str> = stack.tags().iter().map(|t| t.as_str()).collect();
/// assert_eq!(tags, ["en-GB", "en-AU"]);
/// ```
pub fn parse_accept_language(
	header: &str,
	max_len: usize,
	interner: &StackInterner,
) -> LanguageStack {
	let capped = cap_at_char_boundary(header, max_len);
	let mut entries: Vec<(LanguageTag, u32)> = Vec::new();
	for term in capped.split(',') {
		let term = term.trim();
		if term.is_empty() {
			continue;
		}
		let (tag_part, quality) = match term.split_once(';') {
			None => (term, QUALITY_ONE),
			Some((tag, params)) => match parse_quality(params) {
				Some(quality) => (tag.trim(), quality),
				None => {
					tracing::debug!(term, "dropping Accept-Language term: bad quality parameter");
					continue;
				}
			},
		};
		match LanguageTag::parse(tag_part) {
			Ok(tag) => entries.push((tag, quality)),
			Err(err) => {
				tracing::debug!(term, %err, "dropping unparseable Accept-Language term");
			}
		}
	}
	// Stable sort: equal qualities keep header order. Interning pushes the
	// least preferred tag first, so feed the sorted list in reverse.
	entries.sort_by_key(|(_, quality)| Reverse(*quality));
	let additions: Vec<LanguageTag> = entries.into_iter().rev().map(|(tag, _)| tag).collect();
	interner.resolve(interner.root(), &additions)
}

/// Quality in thousandths, so sorting needs no float ordering. HTTP allows
/// at most three decimal places.
const QUALITY_ONE: u32 = 1000;

fn parse_quality(params: &str) -> Option<u32> {
	let value = params.trim().strip_prefix("q=")?.trim();
	let quality: f32 = value.parse().ok()?;
	if !(0.0..=1.0).contains(&quality) {
		return None;
	}
	Some((quality * 1000.0).round() as u32)
}

fn cap_at_char_boundary(header: &str, max_len: usize) -> &str {
	if header.len() <= max_len {
		return header;
	}
	let mut end = max_len;
	while !header.is_char_boundary(end) {
		end -= 1;
	}
	&header[..end]
}
