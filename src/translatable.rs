//! Translatable "fat" strings: one logical text in several languages.
//!
//! A [`Translatable`] pairs a shared translation dict with an optionally
//! resolved language. Resolution against a preference stack walks a fixed
//! ladder (direct hit, best-locale search, wildcard promotion, fallback) and
//! memoizes the stack-dependent steps per dictionary *shape*, so structurally
//! identical dicts share one lookup table.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{I18nError, I18nResult};
use crate::negotiation::best_locale;
use crate::plural::{self, PluralCategory, PluralCount};
use crate::stack::{LanguageStack, StackNode};
use crate::tag::LanguageTag;

/// Wildcard dict key matching any requested language.
pub const WILDCARD: &str = "*";

/// Separator for shape strings. Canonical tags and the wildcard never
/// contain it.
const SHAPE_SEP: char = '\u{1F}';

/// One rendering of a text: a literal, or one string per plural category.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
	/// A plain string.
	Text(String),
	/// Per-plural-category strings.
	Plural(BTreeMap<PluralCategory, String>),
}

/// A per-language map of [`Variant`]s, keyed by canonical tag or [`WILDCARD`].
#[derive(Debug)]
pub struct TransDict {
	entries: BTreeMap<String, Variant>,
	shape: OnceCell<Arc<str>>,
}

impl TransDict {
	/// Builds a dict from already-canonical entries.
	pub fn from_entries(entries: BTreeMap<String, Variant>) -> Self {
		Self {
			entries,
			shape: OnceCell::new(),
		}
	}

	/// Parses a JSON object mapping language tags to strings or
	/// plural-category objects.
	///
	/// Keys are canonicalized; `"*"` is kept as the wildcard. Anything else
	/// is an [`I18nError::InvalidDictionary`].
	pub fn from_json(value: &Value) -> I18nResult<Self> {
		let object = value.as_object().ok_or_else(|| I18nError::InvalidDictionary {
			reason: format!("translation must be an object, got {}", kind_of(value)),
		})?;
		let mut entries = BTreeMap::new();
		for (key, entry) in object {
			let tag = if key == WILDCARD {
				WILDCARD.to_string()
			} else {
				LanguageTag::parse(key)
					.map_err(|err| I18nError::InvalidDictionary {
						reason: format!("bad language key '{key}': {err}"),
					})?
					.as_str()
					.to_string()
			};
			entries.insert(tag, variant_from_json(key, entry)?);
		}
		Ok(Self::from_entries(entries))
	}

	/// The variant stored under `tag`, if any.
	pub fn get(&self, tag: &str) -> Option<&Variant> {
		self.entries.get(tag)
	}

	/// Whether `tag` is a key of the dict.
	pub fn contains(&self, tag: &str) -> bool {
		self.entries.contains_key(tag)
	}

	/// The dict's keys, in sorted order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the dict has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The dict's shape: its sorted key list as a single string, computed
	/// once per dict object.
	pub fn shape(&self) -> Arc<str> {
		self.shape
			.get_or_init(|| {
				let mut shape = String::new();
				for key in self.entries.keys() {
					if !shape.is_empty() {
						shape.push(SHAPE_SEP);
					}
					shape.push_str(key);
				}
				shape.into()
			})
			.clone()
	}

	/// Checks every plural map against the CLDR category set of its
	/// language, reporting missing and unknown names.
	pub fn check_plural_forms(&self) -> I18nResult<()> {
		for (tag, variant) in &self.entries {
			let Variant::Plural(forms) = variant else {
				continue;
			};
			if tag == WILDCARD {
				// No language to validate against.
				continue;
			}
			let required = plural::required_categories(&LanguageTag::parse(tag)?)?;
			for category in &required {
				if !forms.contains_key(category) {
					return Err(I18nError::MissingPluralCategory {
						language: tag.clone(),
						category: category.as_str().to_string(),
					});
				}
			}
			for category in forms.keys() {
				if !required.contains(category) {
					return Err(I18nError::UnknownPluralCategory {
						language: tag.clone(),
						category: category.as_str().to_string(),
					});
				}
			}
		}
		Ok(())
	}

	/// Per-language merge of two leaves; plural maps merge per category,
	/// anything else the overlay wins.
	pub(crate) fn merged(base: &TransDict, overlay: &TransDict) -> TransDict {
		let mut entries = base.entries.clone();
		for (tag, over) in &overlay.entries {
			let merged = match (entries.get(tag), over) {
				(Some(Variant::Plural(b)), Variant::Plural(o)) => {
					let mut forms = b.clone();
					forms.extend(o.iter().map(|(k, v)| (*k, v.clone())));
					Variant::Plural(forms)
				}
				_ => over.clone(),
			};
			entries.insert(tag.clone(), merged);
		}
		TransDict::from_entries(entries)
	}
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

fn variant_from_json(key: &str, value: &Value) -> I18nResult<Variant> {
	match value {
		Value::String(text) => Ok(Variant::Text(text.clone())),
		Value::Object(forms) => {
			let mut map = BTreeMap::new();
			for (name, text) in forms {
				let category =
					PluralCategory::from_key(name).ok_or_else(|| I18nError::InvalidDictionary {
						reason: format!("'{name}' under '{key}' is not a plural category"),
					})?;
				let text = text.as_str().ok_or_else(|| I18nError::InvalidDictionary {
					reason: format!(
						"plural form '{name}' under '{key}' must be a string, got {}",
						kind_of(text)
					),
				})?;
				map.insert(category, text.to_string());
			}
			Ok(Variant::Plural(map))
		}
		other => Err(I18nError::InvalidDictionary {
			reason: format!(
				"translation under '{key}' must be a string or plural object, got {}",
				kind_of(other)
			),
		}),
	}
}

/// Cached outcome of the stack-dependent resolution steps, valid for every
/// dict of the same shape.
#[derive(Debug, Clone)]
enum Resolution {
	/// Best-locale search found this key.
	Select(String),
	/// No key matched but the dict has a wildcard; promote it under the
	/// stack head.
	Promote,
	/// Nothing matched; fall back to the already-set language or an
	/// arbitrary key.
	Fallback,
}

/// Memo for [`Translatable::to_lang`], partitioned by dictionary shape.
///
/// Keys are `(shape, stack identity)`; values are pure functions of their
/// keys, so a racing duplicate computation is wasted work, never a wrong
/// answer. The cache holds only a [`Weak`] handle to each stack, so a memo
/// entry never keeps an interned stack alive; entries for dead stacks are
/// pruned on the next insert. While an entry's weak handle exists, its
/// node's address cannot be reused, so a pointer key matching a live stack
/// always refers to that stack.
#[derive(Debug, Default)]
pub struct ResolutionCache {
	entries: RwLock<HashMap<(Arc<str>, usize), (Weak<StackNode>, Resolution)>>,
}

impl ResolutionCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	fn decide(&self, dict: &TransDict, stack: &LanguageStack) -> Resolution {
		let key = (dict.shape(), stack.node_id());
		if let Some((liveness, hit)) = self.entries.read().get(&key)
			&& liveness.strong_count() > 0
		{
			return hit.clone();
		}
		let decision = if dict.len() > 1
			&& let Some(found) = best_locale(dict.keys(), stack)
		{
			Resolution::Select(found)
		} else if dict.contains(WILDCARD) && stack.head().is_some() {
			Resolution::Promote
		} else {
			Resolution::Fallback
		};
		let mut entries = self.entries.write();
		entries.retain(|_, (liveness, _)| liveness.strong_count() > 0);
		entries.insert(key, (stack.downgrade(), decision.clone()));
		decision
	}
}

/// A translatable string: a shared dict plus an optionally resolved
/// language.
///
/// Invariant: a set language is always a key of the dict. Cloning is cheap;
/// the dict is shared.
///
/// # Examples
///
/// ```
/// use grappelli::{LanguageTag, ResolutionCache, StackInterner, Translatable};
///
/// let interner = StackInterner::new();
/// let cache = ResolutionCache::new();
/// let hello = Translatable::literal("Hello", "en").unwrap();
///
/// // No French entry: the already-selected language is kept.
/// let fr = interner.stack_of(&[LanguageTag::parse("fr").unwrap()]);
/// let resolved = hello.to_lang(&fr, &cache).unwrap();
/// assert_eq!(resolved.language(), Some("en"));
/// assert_eq!(resolved.to_text().unwrap(), "Hello");
/// ```
#[derive(Debug, Clone)]
pub struct Translatable {
	dict: Arc<TransDict>,
	lang: Option<String>,
}

impl Translatable {
	/// Wraps `dict`, validating that a supplied `lang` is one of its keys.
	pub fn new(dict: Arc<TransDict>, lang: Option<&str>) -> I18nResult<Self> {
		let lang = match lang {
			None => None,
			Some(lang) => {
				let canonical = canonical_key(lang)?;
				if !dict.contains(&canonical) {
					return Err(I18nError::UnknownTag { key: canonical });
				}
				Some(canonical)
			}
		};
		Ok(Self { dict, lang })
	}

	/// Wraps an unresolved dict.
	pub fn from_dict(dict: Arc<TransDict>) -> Self {
		Self { dict, lang: None }
	}

	/// A single-language literal, already resolved to `lang`.
	pub fn literal(text: &str, lang: &str) -> I18nResult<Self> {
		let tag = LanguageTag::parse(lang)?;
		let mut entries = BTreeMap::new();
		entries.insert(tag.as_str().to_string(), Variant::Text(text.to_string()));
		Ok(Self {
			dict: Arc::new(TransDict::from_entries(entries)),
			lang: Some(tag.as_str().to_string()),
		})
	}

	/// Parses a raw JSON translation dict, optionally pre-resolved to
	/// `lang`.
	pub fn from_json(value: &Value, lang: Option<&str>) -> I18nResult<Self> {
		Self::new(Arc::new(TransDict::from_json(value)?), lang)
	}

	/// Re-resolves an existing instance, sharing its dict.
	pub fn with_lang(&self, lang: Option<&str>) -> I18nResult<Self> {
		Self::new(self.dict.clone(), lang)
	}

	/// The shared translation dict.
	pub fn dict(&self) -> &Arc<TransDict> {
		&self.dict
	}

	/// The resolved language, if any.
	pub fn language(&self) -> Option<&str> {
		self.lang.as_deref()
	}

	/// Resolves the best language for `preference`.
	///
	/// The ladder: an already-matching selection is returned as-is; a direct
	/// key hit on the stack head selects it; otherwise a best-locale search
	/// over the dict keys, then wildcard promotion under the head, then the
	/// existing selection, then an arbitrary key. An empty dict fails with
	/// [`I18nError::NoTranslationAvailable`].
	pub fn to_lang(
		&self,
		preference: &LanguageStack,
		cache: &ResolutionCache,
	) -> I18nResult<Translatable> {
		if self.dict.is_empty() {
			return Err(I18nError::NoTranslationAvailable);
		}
		let head = preference.head().map(LanguageTag::as_str);
		if head.is_some() && head == self.lang.as_deref() {
			return Ok(self.clone());
		}
		if let Some(head) = head
			&& self.dict.contains(head)
		{
			return Ok(self.select(head));
		}
		match cache.decide(&self.dict, preference) {
			Resolution::Select(tag) => Ok(self.select(&tag)),
			Resolution::Promote => {
				let head = head.unwrap_or_else(|| {
					unreachable!("promotion is only decided for non-empty stacks")
				});
				self.promote_wildcard(head)
			}
			Resolution::Fallback => {
				if self.lang.is_some() {
					Ok(self.clone())
				} else {
					// Arbitrary but deterministic: first non-wildcard key.
					let key = self
						.dict
						.keys()
						.find(|key| *key != WILDCARD)
						.unwrap_or(WILDCARD)
						.to_string();
					Ok(self.select(&key))
				}
			}
		}
	}

	/// Returns the text of the selected variant, with a plural count of 1.
	pub fn to_text(&self) -> I18nResult<&str> {
		self.to_text_with(PluralCount::Int(1))
	}

	/// Returns the text of the selected variant for `count`.
	///
	/// A plural variant selects the CLDR category for the resolved language
	/// and fails with [`I18nError::MissingPluralCategory`] if the map lacks
	/// that entry.
	pub fn to_text_with(&self, count: impl Into<PluralCount>) -> I18nResult<&str> {
		let lang = match self.lang.as_deref() {
			Some(lang) => lang,
			// Unresolved: fall back to an arbitrary key.
			None => self
				.dict
				.keys()
				.find(|key| *key != WILDCARD)
				.or_else(|| self.dict.keys().next())
				.ok_or(I18nError::NoTranslationAvailable)?,
		};
		let variant = self
			.dict
			.get(lang)
			.ok_or(I18nError::NoTranslationAvailable)?;
		match variant {
			Variant::Text(text) => Ok(text),
			Variant::Plural(forms) => {
				let category = plural::select_category(&LanguageTag::parse(lang)?, count.into())?;
				forms
					.get(&category)
					.map(String::as_str)
					.ok_or_else(|| I18nError::MissingPluralCategory {
						language: lang.to_string(),
						category: category.as_str().to_string(),
					})
			}
		}
	}

	/// Strict-mode check of every plural map in the dict.
	pub fn check_plural_forms(&self) -> I18nResult<()> {
		self.dict.check_plural_forms()
	}

	fn select(&self, tag: &str) -> Translatable {
		Translatable {
			dict: self.dict.clone(),
			lang: Some(tag.to_string()),
		}
	}

	/// Materializes a copy with the wildcard value promoted under `head`, so
	/// future lookups for the same head hit the direct-key step.
	fn promote_wildcard(&self, head: &str) -> I18nResult<Translatable> {
		let wildcard = self
			.dict
			.get(WILDCARD)
			.unwrap_or_else(|| unreachable!("promotion is only decided for wildcard dicts"))
			.clone();
		tracing::trace!(language = head, "promoting wildcard translation");
		let mut entries = self.dict.entries.clone();
		entries.insert(head.to_string(), wildcard);
		Ok(Translatable {
			dict: Arc::new(TransDict::from_entries(entries)),
			lang: Some(head.to_string()),
		})
	}
}

fn canonical_key(lang: &str) -> I18nResult<String> {
	if lang == WILDCARD {
		Ok(WILDCARD.to_string())
	} else {
		Ok(LanguageTag::parse(lang)?.as_str().to_string())
	}
}
