//! Canonical BCP-47 language tags.
//!
//! [`LanguageTag`] is the only way language identifiers enter the engine:
//! the constructor canonicalizes through ICU4X (case folding and subtag
//! reordering; deprecated-tag substitution is out of scope) and enforces the
//! length limit, so every tag held by a stack or dictionary key is already in
//! canonical form and two equal tags compare equal as strings.

use std::fmt;

use icu_locale_core::Locale;

use crate::error::{I18nError, I18nResult};

/// Maximum accepted length of a language tag, in bytes.
pub const MAX_TAG_LEN: usize = 35;

/// A canonicalized BCP-47 language tag.
///
/// # Examples
///
/// ```
/// use grappelli::LanguageTag;
///
/// let tag = LanguageTag::parse("EN-gb").unwrap();
/// assert_eq!(tag.as_str(), "en-GB");
///
/// let private = LanguageTag::parse("en-US-x-foo").unwrap();
/// assert_eq!(private.as_str(), "en-US-x-foo");
///
/// assert!(LanguageTag::parse("b0rk").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
	/// Canonicalizes `tag` into a [`LanguageTag`].
	///
	/// Rejects tags longer than [`MAX_TAG_LEN`] bytes, the reserved wildcard
	/// `"*"`, and anything ICU4X cannot parse as a BCP-47 tag.
	pub fn parse(tag: &str) -> I18nResult<Self> {
		if tag.len() > MAX_TAG_LEN {
			return Err(I18nError::InvalidLanguage {
				tag: tag.to_string(),
				reason: format!("longer than {MAX_TAG_LEN} bytes"),
			});
		}
		if tag == "*" {
			return Err(I18nError::InvalidLanguage {
				tag: tag.to_string(),
				reason: "wildcard is not a language tag".to_string(),
			});
		}
		let locale = Locale::try_from_str(tag).map_err(|err| I18nError::InvalidLanguage {
			tag: tag.to_string(),
			reason: err.to_string(),
		})?;
		Ok(Self(locale.to_string()))
	}

	/// Returns the canonical form of the tag.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for LanguageTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for LanguageTag {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
