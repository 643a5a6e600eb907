//! Composition root owning every process-wide cache.
//!
//! There are no hidden globals: an [`I18nContext`] carries the stack
//! interner, the shape-based resolution cache, the merge cache, the template
//! cache, and the trusted-tag canonicalization cache, so the engine is
//! instantiable and test-isolatable. All cached values are pure functions of
//! their keys; concurrent callers can at worst duplicate work.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use parking_lot::RwLock;
use serde_json::Value;

use crate::accept::{self, DEFAULT_MAX_HEADER_LEN};
use crate::dictionary::Dictionary;
use crate::error::I18nResult;
use crate::stack::{LanguageStack, StackInterner};
use crate::tag::LanguageTag;
use crate::template::{ParseMode, Template};
use crate::translatable::{ResolutionCache, Translatable};

/// Merge-cache key: the identity of the `(base, overlay)` pair. Holding the
/// dictionaries pins them, so the pointer key can never be reused while the
/// entry lives.
struct MergeKey(Dictionary, Dictionary);

impl PartialEq for MergeKey {
	fn eq(&self, other: &Self) -> bool {
		Dictionary::ptr_eq(&self.0, &other.0) && Dictionary::ptr_eq(&self.1, &other.1)
	}
}

impl Eq for MergeKey {}

impl Hash for MergeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.node_id().hash(state);
		self.1.node_id().hash(state);
	}
}

/// The engine's composition root.
///
/// # Examples
///
/// ```
/// use grappelli::I18nContext;
/// use serde_json::json;
///
/// # fn main() -> grappelli::I18nResult<()> {
/// let ctx = I18nContext::new().with_default_language("en")?;
/// let dict = ctx.load_dictionary(&json!({
///     "$dict": true,
///     "greeting": { "en": "Hello", "fr": "Bonjour" },
/// }))?;
///
/// let stack = ctx.parse_accept_language("fr-CA, en;q=0.5");
/// let greeting = dict.translation(&["greeting"])?;
/// let localized = ctx.localize(&greeting, &stack)?;
/// assert_eq!(localized.language(), Some("fr"));
/// assert_eq!(localized.to_text()?, "Bonjour");
/// # Ok(())
/// # }
/// ```
pub struct I18nContext {
	interner: StackInterner,
	resolution: ResolutionCache,
	merges: RwLock<HashMap<MergeKey, Dictionary>>,
	templates: RwLock<HashMap<(String, ParseMode), Template>>,
	trusted_tags: RwLock<HashMap<String, LanguageTag>>,
	default_language: Option<LanguageTag>,
	strict_plurals: bool,
	max_header_len: usize,
}

impl I18nContext {
	/// Creates a context with empty caches and default settings.
	pub fn new() -> Self {
		Self {
			interner: StackInterner::new(),
			resolution: ResolutionCache::new(),
			merges: RwLock::new(HashMap::new()),
			templates: RwLock::new(HashMap::new()),
			trusted_tags: RwLock::new(HashMap::new()),
			default_language: None,
			strict_plurals: false,
			max_header_len: DEFAULT_MAX_HEADER_LEN,
		}
	}

	/// Sets the fallback language used when no explicit base stack is
	/// supplied.
	pub fn with_default_language(mut self, tag: &str) -> I18nResult<Self> {
		self.default_language = Some(LanguageTag::parse(tag)?);
		Ok(self)
	}

	/// Enables strict plural validation: dictionaries and localized values
	/// are checked against the CLDR category sets of their languages.
	pub fn with_strict_plurals(mut self, strict: bool) -> Self {
		self.strict_plurals = strict;
		self
	}

	/// Sets the Accept-Language length cap (default 200 bytes).
	pub fn with_max_header_len(mut self, max_len: usize) -> Self {
		self.max_header_len = max_len;
		self
	}

	/// The context's stack interner.
	pub fn interner(&self) -> &StackInterner {
		&self.interner
	}

	/// The stack used when a scope supplies no explicit preference: the
	/// default language, or the empty stack if none is configured.
	pub fn default_stack(&self) -> LanguageStack {
		match &self.default_language {
			Some(tag) => self
				.interner
				.resolve(self.interner.root(), std::slice::from_ref(tag)),
			None => self.interner.root().clone(),
		}
	}

	/// Extends a preference stack with explicit preferences, most preferred
	/// first. With no base, extension starts from [`Self::default_stack`].
	///
	/// Preferences are trusted configuration, so canonicalization goes
	/// through the cached canonicalizer; an invalid tag is an error, not a
	/// drop.
	pub fn extend(
		&self,
		base: Option<&LanguageStack>,
		preferences: &[&str],
	) -> I18nResult<LanguageStack> {
		let base = match base {
			Some(stack) => stack.clone(),
			None => self.default_stack(),
		};
		let mut additions = Vec::with_capacity(preferences.len());
		for preference in preferences.iter().rev() {
			additions.push(self.canonical_tag(preference)?);
		}
		Ok(self.interner.resolve(&base, &additions))
	}

	/// Canonicalizes a trusted tag through the context's memo. Untrusted
	/// input must go through [`Self::parse_accept_language`] instead.
	pub fn canonical_tag(&self, tag: &str) -> I18nResult<LanguageTag> {
		if let Some(hit) = self.trusted_tags.read().get(tag) {
			return Ok(hit.clone());
		}
		let parsed = LanguageTag::parse(tag)?;
		self.trusted_tags
			.write()
			.entry(tag.to_string())
			.or_insert_with(|| parsed.clone());
		Ok(parsed)
	}

	/// Ingests and validates a JSON dictionary; in strict mode every plural
	/// map is also checked against its language's CLDR categories.
	pub fn load_dictionary(&self, value: &Value) -> I18nResult<Dictionary> {
		let dict = Dictionary::from_json(value)?;
		if self.strict_plurals {
			dict.check_plural_forms()?;
		}
		Ok(dict)
	}

	/// Looks up the leaf at `path` and wraps it as an unresolved
	/// [`Translatable`].
	pub fn lookup(&self, dict: &Dictionary, path: &[&str]) -> I18nResult<Translatable> {
		dict.translation(path)
	}

	/// Resolves `value` against `preference` using the shared resolution
	/// cache.
	pub fn localize(
		&self,
		value: &Translatable,
		preference: &LanguageStack,
	) -> I18nResult<Translatable> {
		if self.strict_plurals {
			value.check_plural_forms()?;
		}
		value.to_lang(preference, &self.resolution)
	}

	/// Parses a format string in opaque mode, cached per distinct string.
	pub fn template(&self, format: &str) -> I18nResult<Template> {
		self.template_with(format, ParseMode::Opaque)
	}

	/// Parses a format string, cached per `(string, mode)`. Strings without
	/// `%` bypass tokenization and the cache entirely.
	pub fn template_with(&self, format: &str, mode: ParseMode) -> I18nResult<Template> {
		if !format.contains('%') {
			return Ok(Template::from_literal(format));
		}
		if let Some(hit) = self.templates.read().get(&(format.to_string(), mode)) {
			return Ok(hit.clone());
		}
		let parsed = Template::parse(format, mode)?;
		let mut cache = self.templates.write();
		let entry = cache
			.entry((format.to_string(), mode))
			.or_insert_with(|| parsed.clone());
		Ok(entry.clone())
	}

	/// Merges `overlay` over `base`, cached by the identity of the pair so
	/// repeated context-layering returns the identical dictionary.
	pub fn merge(&self, base: &Dictionary, overlay: &Dictionary) -> Dictionary {
		let key = MergeKey(base.clone(), overlay.clone());
		if let Some(hit) = self.merges.read().get(&key) {
			return hit.clone();
		}
		tracing::trace!("merging dictionary pair");
		let merged = base.merge(overlay);
		let mut cache = self.merges.write();
		let entry = cache.entry(key).or_insert_with(|| merged.clone());
		entry.clone()
	}

	/// Parses an untrusted Accept-Language header into an interned stack.
	/// Never fails; malformed entries are dropped.
	pub fn parse_accept_language(&self, header: &str) -> LanguageStack {
		accept::parse_accept_language(header, self.max_header_len, &self.interner)
	}
}

impl Default for I18nContext {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_extend_from_default_language() {
		let ctx = I18nContext::new().with_default_language("en").unwrap();
		let stack = ctx.extend(None, &["fr-CA", "de"]).unwrap();
		let tags: Vec<&str> = stack.tags().iter().map(|t| t.as_str()).collect();
		assert_eq!(tags, ["fr-CA", "de", "en"]);
	}

	#[test]
	fn test_extend_rejects_bad_tag() {
		let ctx = I18nContext::new();
		assert!(ctx.extend(None, &["b0rk"]).is_err());
	}

	#[test]
	fn test_extend_interns_equal_content() {
		let ctx = I18nContext::new();
		let a = ctx.extend(None, &["en", "fr"]).unwrap();
		let base = ctx.extend(None, &["fr"]).unwrap();
		let b = ctx.extend(Some(&base), &["en"]).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn test_merge_cache_returns_identical_dictionary() {
		let ctx = I18nContext::new();
		let base = ctx
			.load_dictionary(&json!({ "$dict": true, "a": { "en": "A" } }))
			.unwrap();
		let overlay = ctx
			.load_dictionary(&json!({ "$dict": true, "b": { "en": "B" } }))
			.unwrap();
		let first = ctx.merge(&base, &overlay);
		let second = ctx.merge(&base, &overlay);
		assert!(Dictionary::ptr_eq(&first, &second));
	}

	#[test]
	fn test_template_cache_returns_shared_parse() {
		let ctx = I18nContext::new();
		let first = ctx.template("Hello %1").unwrap();
		let second = ctx.template("Hello %1").unwrap();
		assert_eq!(first, second);
		assert_eq!(first.render(&["world"]).unwrap(), "Hello world");
	}

	#[test]
	fn test_strict_mode_rejects_incomplete_plurals() {
		let ctx = I18nContext::new().with_strict_plurals(true);
		let result = ctx.load_dictionary(&json!({
			"$dict": true,
			"items": { "cy": { "one": "eitem", "other": "eitemau" } },
		}));
		assert!(result.is_err());
	}

	#[test]
	fn test_fast_mode_accepts_incomplete_plurals() {
		let ctx = I18nContext::new();
		let result = ctx.load_dictionary(&json!({
			"$dict": true,
			"items": { "cy": { "one": "eitem", "other": "eitemau" } },
		}));
		assert!(result.is_ok());
	}
}
