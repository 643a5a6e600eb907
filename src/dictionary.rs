//! Persistent, mergeable nested translation dictionaries.
//!
//! A [`Dictionary`] is an immutable tree of namespaces and translation
//! leaves, ingested from JSON. Every namespace object must carry the
//! reserved [`DICT_MARKER`] key, which is what distinguishes "nested
//! namespace" from "leaf translation". Merging is copy-on-write: unchanged
//! subtrees are shared by `Arc`, and nothing is ever mutated in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{I18nError, I18nResult};
use crate::translatable::{TransDict, Translatable};

/// Reserved key marking a JSON object as a namespace: `"$dict": true`.
pub const DICT_MARKER: &str = "$dict";

/// One entry of a dictionary namespace.
#[derive(Debug, Clone)]
pub enum DictEntry {
	/// A nested namespace.
	Namespace(Dictionary),
	/// A leaf translation dict.
	Leaf(Arc<TransDict>),
}

#[derive(Debug)]
struct DictNode {
	entries: BTreeMap<String, DictEntry>,
}

/// An immutable nested dictionary of translations.
///
/// # Examples
///
/// ```
/// use grappelli::{DictEntry, Dictionary};
/// use serde_json::json;
///
/// let dict = Dictionary::from_json(&json!({
///     "$dict": true,
///     "greeting": { "en": "Hello", "fr": "Bonjour" },
///     "errors": {
///         "$dict": true,
///         "not_found": { "en": "Not found" },
///     },
/// }))
/// .unwrap();
///
/// assert!(matches!(
///     dict.lookup(&["errors", "not_found"]).unwrap(),
///     DictEntry::Leaf(_)
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct Dictionary(Arc<DictNode>);

impl Dictionary {
	/// Validates and ingests a JSON namespace tree.
	///
	/// Fails with [`I18nError::InvalidDictionary`] if the namespace marker
	/// is absent or not `true`, or if any leaf does not parse as a
	/// translation dict.
	pub fn from_json(value: &Value) -> I18nResult<Self> {
		let object = value.as_object().ok_or_else(|| I18nError::InvalidDictionary {
			reason: "dictionary must be an object".to_string(),
		})?;
		match object.get(DICT_MARKER) {
			Some(Value::Bool(true)) => {}
			Some(_) => {
				return Err(I18nError::InvalidDictionary {
					reason: format!("namespace marker '{DICT_MARKER}' must be true"),
				});
			}
			None => {
				return Err(I18nError::InvalidDictionary {
					reason: format!("namespace marker '{DICT_MARKER}' is missing"),
				});
			}
		}
		let mut entries = BTreeMap::new();
		for (key, entry) in object {
			if key == DICT_MARKER {
				continue;
			}
			let parsed = match entry {
				// An object carrying the marker is a nested namespace;
				// anything else must be a translation leaf.
				Value::Object(map) if map.contains_key(DICT_MARKER) => {
					DictEntry::Namespace(Self::from_json(entry)?)
				}
				_ => DictEntry::Leaf(Arc::new(TransDict::from_json(entry).map_err(|err| {
					match err {
						I18nError::InvalidDictionary { reason } => I18nError::InvalidDictionary {
							reason: format!("under '{key}': {reason}"),
						},
						other => other,
					}
				})?)),
			};
			entries.insert(key.clone(), parsed);
		}
		Ok(Self(Arc::new(DictNode { entries })))
	}

	/// The entry stored under `key`.
	pub fn get(&self, key: &str) -> I18nResult<&DictEntry> {
		self.0.entries.get(key).ok_or_else(|| I18nError::UnknownTag {
			key: key.to_string(),
		})
	}

	/// Walks `path` through nested namespaces.
	///
	/// Descending into a leaf, like a missing key, is an
	/// [`I18nError::UnknownTag`].
	pub fn lookup(&self, path: &[&str]) -> I18nResult<&DictEntry> {
		let (first, rest) = path.split_first().ok_or_else(|| I18nError::UnknownTag {
			key: String::new(),
		})?;
		let entry = self.get(first)?;
		if rest.is_empty() {
			return Ok(entry);
		}
		match entry {
			DictEntry::Namespace(inner) => inner.lookup(rest),
			DictEntry::Leaf(_) => Err(I18nError::UnknownTag {
				key: (*first).to_string(),
			}),
		}
	}

	/// Looks up a leaf at `path` and wraps it as an unresolved
	/// [`Translatable`].
	pub fn translation(&self, path: &[&str]) -> I18nResult<Translatable> {
		match self.lookup(path)? {
			DictEntry::Leaf(leaf) => Ok(Translatable::from_dict(leaf.clone())),
			DictEntry::Namespace(_) => Err(I18nError::UnknownTag {
				key: path.join("."),
			}),
		}
	}

	/// The namespace's keys, in sorted order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.entries.keys().map(String::as_str)
	}

	/// Number of entries in this namespace.
	pub fn len(&self) -> usize {
		self.0.entries.len()
	}

	/// Whether this namespace has no entries.
	pub fn is_empty(&self) -> bool {
		self.0.entries.is_empty()
	}

	/// Recursive structural merge, `other` over `self`.
	///
	/// Namespaces merge with namespaces and leaves with leaves (per
	/// language, plural maps per category); in any other pairing the
	/// overlay's value wins outright. Unchanged subtrees are shared.
	pub fn merge(&self, overlay: &Dictionary) -> Dictionary {
		if Arc::ptr_eq(&self.0, &overlay.0) || overlay.is_empty() {
			return self.clone();
		}
		if self.is_empty() {
			return overlay.clone();
		}
		let mut entries = self.0.entries.clone();
		for (key, over) in &overlay.0.entries {
			let merged = match (entries.get(key), over) {
				(Some(DictEntry::Namespace(base)), DictEntry::Namespace(overlay)) => {
					DictEntry::Namespace(base.merge(overlay))
				}
				(Some(DictEntry::Leaf(base)), DictEntry::Leaf(overlay)) => {
					DictEntry::Leaf(Arc::new(TransDict::merged(base, overlay)))
				}
				_ => over.clone(),
			};
			entries.insert(key.clone(), merged);
		}
		Dictionary(Arc::new(DictNode { entries }))
	}

	/// Whether two handles point at the identical dictionary node.
	pub fn ptr_eq(a: &Dictionary, b: &Dictionary) -> bool {
		Arc::ptr_eq(&a.0, &b.0)
	}

	/// Stable identity of the node, used by the merge cache.
	pub(crate) fn node_id(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}

	/// Strict-mode plural validation of every leaf in the tree.
	pub fn check_plural_forms(&self) -> I18nResult<()> {
		for entry in self.0.entries.values() {
			match entry {
				DictEntry::Namespace(inner) => inner.check_plural_forms()?,
				DictEntry::Leaf(leaf) => leaf.check_plural_forms()?,
			}
		}
		Ok(())
	}
}
