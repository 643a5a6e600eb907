//! End-to-end translation tests: resolution ladder, plurals, dictionaries,
//! merging, and template rendering.

use grappelli::{DictEntry, Dictionary, I18nContext, I18nError, Translatable};
use rstest::rstest;
use serde_json::json;

#[test]
fn test_literal_keeps_language_when_preference_is_unavailable() {
	// Arrange
	let ctx = I18nContext::new();
	let hello = Translatable::literal("Hello", "en").unwrap();

	// Act: ask for French, which the dict does not carry.
	let stack = ctx.extend(None, &["fr"]).unwrap();
	let resolved = ctx.localize(&hello, &stack).unwrap();

	// Assert: fallback keeps the existing selection.
	assert_eq!(resolved.to_text().unwrap(), "Hello");
	assert_eq!(resolved.language(), Some("en"));
}

#[test]
fn test_resolution_prefers_direct_key_over_search() {
	let ctx = I18nContext::new();
	let value = json!({"en": "Hello", "en-GB": "Good day", "fr": "Bonjour"});
	let text = Translatable::from_json(&value, None).unwrap();
	let stack = ctx.extend(None, &["en-GB"]).unwrap();
	let resolved = ctx.localize(&text, &stack).unwrap();
	assert_eq!(resolved.to_text().unwrap(), "Good day");
}

#[test]
fn test_wildcard_promotion_selects_requested_language() {
	let ctx = I18nContext::new();
	let value = json!({"*": "1977"});
	let text = Translatable::from_json(&value, None).unwrap();
	let stack = ctx.extend(None, &["nl"]).unwrap();
	let resolved = ctx.localize(&text, &stack).unwrap();
	assert_eq!(resolved.language(), Some("nl"));
	assert_eq!(resolved.to_text().unwrap(), "1977");
}

#[rstest]
#[case(0, "dim")]
#[case(1, "un")]
#[case(2, "dau")]
#[case(3, "tri")]
#[case(6, "chwech")]
#[case(42, "llawer")]
fn test_welsh_plural_integer_counts(#[case] count: i64, #[case] expected: &str) {
	let value = json!({"cy": {
		"zero": "dim",
		"one": "un",
		"two": "dau",
		"few": "tri",
		"many": "chwech",
		"other": "llawer",
	}});
	let text = Translatable::from_json(&value, Some("cy")).unwrap();
	assert_eq!(text.to_text_with(count).unwrap(), expected);
}

#[test]
fn test_welsh_fractional_count_uses_cldr_other() {
	let value = json!({"cy": {
		"zero": "dim", "one": "un", "two": "dau",
		"few": "tri", "many": "chwech", "other": "llawer",
	}});
	let text = Translatable::from_json(&value, Some("cy")).unwrap();
	// CLDR cy rules place 1.5 in "other".
	assert_eq!(text.to_text_with(1.5).unwrap(), "llawer");
}

#[test]
fn test_strict_mode_reports_plural_shape_mismatch() {
	let ctx = I18nContext::new().with_strict_plurals(true);
	let incomplete = Translatable::from_json(&json!({"cy": {"one": "un"}}), None).unwrap();
	let stack = ctx.extend(None, &["cy"]).unwrap();
	assert!(matches!(
		ctx.localize(&incomplete, &stack),
		Err(I18nError::MissingPluralCategory { .. })
	));

	let extra = Translatable::from_json(
		&json!({"en": {"one": "a", "two": "b", "other": "c"}}),
		None,
	)
	.unwrap();
	let stack = ctx.extend(None, &["en"]).unwrap();
	assert!(matches!(
		ctx.localize(&extra, &stack),
		Err(I18nError::UnknownPluralCategory { .. })
	));
}

#[test]
fn test_dictionary_lookup_and_localize() {
	let ctx = I18nContext::new().with_default_language("en").unwrap();
	let dict = ctx
		.load_dictionary(&json!({
			"$dict": true,
			"nav": {
				"$dict": true,
				"home": { "en": "Home", "fr": "Accueil" },
			},
		}))
		.unwrap();
	let stack = ctx.parse_accept_language("fr-CA,en;q=0.3");
	let home = dict.translation(&["nav", "home"]).unwrap();
	let resolved = ctx.localize(&home, &stack).unwrap();
	assert_eq!(resolved.to_text().unwrap(), "Accueil");
}

#[test]
fn test_dictionary_without_marker_is_invalid() {
	let ctx = I18nContext::new();
	assert!(matches!(
		ctx.load_dictionary(&json!({ "greeting": { "en": "Hello" } })),
		Err(I18nError::InvalidDictionary { .. })
	));
}

#[test]
fn test_merge_cache_identity_and_union() {
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
	assert_eq!(first.keys().collect::<Vec<_>>(), ["a", "b"]);

	// A different pair is a different cache entry.
	let swapped = ctx.merge(&overlay, &base);
	assert!(!Dictionary::ptr_eq(&first, &swapped));
}

#[test]
fn test_scope_layering_shares_unchanged_namespaces() {
	let ctx = I18nContext::new();
	let parent = ctx
		.load_dictionary(&json!({
			"$dict": true,
			"shared": { "$dict": true, "ok": { "en": "OK" } },
			"title": { "en": "Parent" },
		}))
		.unwrap();
	let child = ctx
		.load_dictionary(&json!({
			"$dict": true,
			"title": { "en": "Child", "fr": "Enfant" },
		}))
		.unwrap();

	let merged = ctx.merge(&parent, &child);
	let (DictEntry::Namespace(before), DictEntry::Namespace(after)) =
		(parent.get("shared").unwrap(), merged.get("shared").unwrap())
	else {
		panic!("expected namespaces");
	};
	assert!(Dictionary::ptr_eq(before, after));

	let DictEntry::Leaf(title) = merged.get("title").unwrap() else {
		panic!("expected leaf");
	};
	assert!(title.contains("fr"));
}

#[test]
fn test_localized_plural_through_template() {
	let ctx = I18nContext::new();
	let value = json!({
		"en": { "one": "%1 reply", "other": "%1 replies" },
		"ru": { "one": "%1 ответ", "few": "%1 ответа", "many": "%1 ответов", "other": "%1 ответа" },
	});
	let text = Translatable::from_json(&value, None).unwrap();
	let stack = ctx.parse_accept_language("ru-RU,en;q=0.1");
	let resolved = ctx.localize(&text, &stack).unwrap();
	assert_eq!(resolved.language(), Some("ru"));

	let format = resolved.to_text_with(5).unwrap();
	let rendered = ctx.template(format).unwrap().render(&["5"]).unwrap();
	assert_eq!(rendered, "5 ответов");
}

#[test]
fn test_template_fallback_text_round_trip() {
	let ctx = I18nContext::new();
	let template = ctx.template("Welcome back, %1[user][guest]!").unwrap();
	assert_eq!(template.render(&["Stéphane"]).unwrap(), "Welcome back, Stéphane!");
	assert_eq!(template.render(&[]).unwrap(), "Welcome back, guest!");
}

#[test]
fn test_empty_translation_fails() {
	let ctx = I18nContext::new();
	let empty = Translatable::from_json(&json!({}), None).unwrap();
	let stack = ctx.extend(None, &["en"]).unwrap();
	assert!(matches!(
		ctx.localize(&empty, &stack),
		Err(I18nError::NoTranslationAvailable)
	));
}
