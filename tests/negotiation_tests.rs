//! End-to-end negotiation tests: interning, search order, best-locale, and
//! Accept-Language parsing.

use grappelli::{
	I18nContext, LanguageStack, LanguageTag, StackInterner, best_locale, search_order,
};
use rstest::rstest;

fn tags(list: &[&str]) -> Vec<LanguageTag> {
	list.iter()
		.map(|tag| LanguageTag::parse(tag).unwrap())
		.collect()
}

fn content(stack: &LanguageStack) -> Vec<String> {
	stack
		.tags()
		.iter()
		.map(|tag| tag.as_str().to_string())
		.collect()
}

#[test]
fn test_interning_identity_across_histories() {
	// Arrange
	let interner = StackInterner::new();

	// Act: two push histories with the same deduplicated outcome.
	let spliced = interner.resolve(interner.root(), &tags(&["en", "fr", "en"]));
	let direct = interner.resolve(interner.root(), &tags(&["fr", "en"]));

	// Assert: identity, not just content.
	assert_eq!(spliced, direct);
	assert_eq!(content(&spliced), ["en", "fr"]);
}

#[test]
fn test_interning_identity_via_context_extension() {
	let ctx = I18nContext::new();
	let layered = {
		let base = ctx.extend(None, &["fr-CA", "en"]).unwrap();
		ctx.extend(Some(&base), &["de"]).unwrap()
	};
	let flat = ctx.extend(None, &["de", "fr-CA", "en"]).unwrap();
	assert_eq!(layered, flat);
	assert_eq!(content(&layered), ["de", "fr-CA", "en"]);
}

#[test]
fn test_search_order_regional_tag() {
	let interner = StackInterner::new();
	let stack = interner.stack_of(&tags(&["en-GB"]));
	assert_eq!(&*search_order(&stack), ["en-GB", "en"]);
}

#[test]
fn test_search_order_mixed_stack() {
	let interner = StackInterner::new();
	let stack = interner.stack_of(&tags(&["en-US-x-foo", "en-GB", "fr-CA", "en-US-x-bar"]));
	assert_eq!(
		&*search_order(&stack),
		["en-US-x-foo", "en-US", "en-GB", "en", "fr-CA", "fr", "en-US-x-bar"]
	);
}

#[test]
fn test_best_locale_falls_back_through_ancestors() {
	let interner = StackInterner::new();
	let stack = interner.stack_of(&tags(&["en-AU", "fr-BE"]));
	assert_eq!(
		best_locale(["en", "en-GB", "fr", "fr-BE"], &stack),
		Some("en".to_string())
	);
}

#[test]
fn test_best_locale_without_expansion_beyond_direct_keys() {
	let interner = StackInterner::new();
	let stack = interner.stack_of(&tags(&["de", "de-AT"]));
	assert_eq!(best_locale(["de", "de-AT"], &stack), Some("de".to_string()));
	assert_eq!(best_locale(["sv"], &stack), None);
}

#[rstest]
#[case("en-AU;q=0.8,en-GB;q=0.9", &["en-GB", "en-AU"])]
#[case("fr;b=9,en-GB;q=0.9,en-AU;q=0.8", &["en-GB", "en-AU"])]
#[case("b0rk", &[])]
fn test_accept_language_examples(#[case] header: &str, #[case] expected: &[&str]) {
	let ctx = I18nContext::new();
	let stack = ctx.parse_accept_language(header);
	assert_eq!(content(&stack), expected);
}

#[test]
fn test_accept_language_stacks_are_interned() {
	let ctx = I18nContext::new();
	// Same preference content from an untrusted header and from trusted
	// configuration resolves to the identical stack.
	let from_header = ctx.parse_accept_language("en-GB,fr;q=0.7");
	let from_config = ctx.extend(None, &["en-GB", "fr"]).unwrap();
	assert_eq!(from_header, from_config);
}

#[test]
fn test_accept_language_respects_length_cap() {
	let ctx = I18nContext::new().with_max_header_len(5);
	let stack = ctx.parse_accept_language("de,fr,en-GB,ja");
	// Only "de,fr" fits under the cap.
	assert_eq!(content(&stack), ["de", "fr"]);
}

#[test]
fn test_overlong_tag_is_invalid() {
	let ctx = I18nContext::new();
	let long = "en-".to_string() + &"x-aaaaaaaa-".repeat(4);
	assert!(ctx.extend(None, &[&long]).is_err());
	// The same tag in an untrusted header is dropped, not raised.
	let stack = ctx.parse_accept_language(&format!("{long},fr"));
	assert_eq!(content(&stack), ["fr"]);
}
