//! Error types for the translation engine.
//!
//! Every failure the engine can report is a variant of [`I18nError`]. All of
//! them are synchronous programmer/content errors; the Accept-Language parser
//! filters bad entries instead of raising them.

use thiserror::Error;

/// Result type for translation-engine operations.
pub type I18nResult<T> = Result<T, I18nError>;

/// Translation-engine errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum I18nError {
	/// Dictionary value is not a valid namespace or translation leaf.
	#[error("invalid dictionary: {reason}")]
	InvalidDictionary {
		/// Why the value was rejected.
		reason: String,
	},

	/// Dictionary lookup hit a missing key, or a leaf where a namespace was
	/// expected.
	#[error("unknown tag: {key}")]
	UnknownTag {
		/// The key that failed to resolve.
		key: String,
	},

	/// Resolution was attempted against an empty translation dict.
	#[error("no translation available")]
	NoTranslationAvailable,

	/// Language tag failed BCP-47 canonicalization or exceeds the length
	/// limit.
	#[error("invalid language tag '{tag}': {reason}")]
	InvalidLanguage {
		/// The offending tag.
		tag: String,
		/// Why canonicalization rejected it.
		reason: String,
	},

	/// A plural map lacks a category CLDR requires for its language.
	#[error("missing plural category '{category}' for language '{language}'")]
	MissingPluralCategory {
		/// Language whose plural rules were consulted.
		language: String,
		/// The absent category name.
		category: String,
	},

	/// Strict validation found a plural-map key CLDR does not use for its
	/// language.
	#[error("unknown plural category '{category}' for language '{language}'")]
	UnknownPluralCategory {
		/// Language whose plural rules were consulted.
		language: String,
		/// The unexpected category name.
		category: String,
	},

	/// Template format string or render call is malformed.
	#[error("template error at byte {position}: {reason}")]
	TemplateSyntax {
		/// What was wrong.
		reason: String,
		/// Byte offset in the format string (0 for render-time errors).
		position: usize,
	},
}
