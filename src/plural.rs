//! CLDR plural categories and cardinal category selection.
//!
//! Category selection and the per-language required-category sets are backed
//! by the CLDR cardinal rules shipped with `icu_plurals`. Rule sets are cheap
//! to build from compiled data, so they are constructed per call rather than
//! cached.

use std::fmt;

use fixed_decimal::{Decimal, FloatPrecision};
use icu_locale_core::Locale;
use icu_plurals::{PluralCategory as CldrCategory, PluralOperands, PluralRuleType, PluralRules};

use crate::error::{I18nError, I18nResult};
use crate::tag::LanguageTag;

/// One of the six CLDR plural categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluralCategory {
	/// CLDR `zero`.
	Zero,
	/// CLDR `one`.
	One,
	/// CLDR `two`.
	Two,
	/// CLDR `few`.
	Few,
	/// CLDR `many`.
	Many,
	/// CLDR `other`; every language uses it as the residual category.
	Other,
}

impl PluralCategory {
	/// All six categories, in canonical CLDR order.
	pub const ALL: [PluralCategory; 6] = [
		PluralCategory::Zero,
		PluralCategory::One,
		PluralCategory::Two,
		PluralCategory::Few,
		PluralCategory::Many,
		PluralCategory::Other,
	];

	/// Returns the CLDR name of the category.
	pub fn as_str(&self) -> &'static str {
		match self {
			PluralCategory::Zero => "zero",
			PluralCategory::One => "one",
			PluralCategory::Two => "two",
			PluralCategory::Few => "few",
			PluralCategory::Many => "many",
			PluralCategory::Other => "other",
		}
	}

	/// Parses a CLDR category name.
	pub fn from_key(key: &str) -> Option<Self> {
		match key {
			"zero" => Some(PluralCategory::Zero),
			"one" => Some(PluralCategory::One),
			"two" => Some(PluralCategory::Two),
			"few" => Some(PluralCategory::Few),
			"many" => Some(PluralCategory::Many),
			"other" => Some(PluralCategory::Other),
			_ => None,
		}
	}
}

impl fmt::Display for PluralCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A count driving plural selection.
///
/// Fractional counts matter: CLDR distinguishes `1` from `1.5` in most
/// languages, so the integer and float cases are kept apart instead of
/// collapsing everything to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PluralCount {
	/// A whole-number count.
	Int(i64),
	/// A fractional count.
	Float(f64),
}

impl From<i64> for PluralCount {
	fn from(value: i64) -> Self {
		PluralCount::Int(value)
	}
}

impl From<i32> for PluralCount {
	fn from(value: i32) -> Self {
		PluralCount::Int(value.into())
	}
}

impl From<u32> for PluralCount {
	fn from(value: u32) -> Self {
		PluralCount::Int(value.into())
	}
}

impl From<usize> for PluralCount {
	fn from(value: usize) -> Self {
		PluralCount::Int(value as i64)
	}
}

impl From<f64> for PluralCount {
	fn from(value: f64) -> Self {
		PluralCount::Float(value)
	}
}

impl From<f32> for PluralCount {
	fn from(value: f32) -> Self {
		PluralCount::Float(value.into())
	}
}

/// Selects the CLDR cardinal category for `count` in `language`.
///
/// # Examples
///
/// ```
/// use grappelli::{LanguageTag, PluralCategory, PluralCount, select_category};
///
/// let en = LanguageTag::parse("en").unwrap();
/// assert_eq!(
///     select_category(&en, PluralCount::Int(1)).unwrap(),
///     PluralCategory::One
/// );
/// assert_eq!(
///     select_category(&en, PluralCount::Int(2)).unwrap(),
///     PluralCategory::Other
/// );
///
/// let ru = LanguageTag::parse("ru").unwrap();
/// assert_eq!(
///     select_category(&ru, PluralCount::Int(5)).unwrap(),
///     PluralCategory::Many
/// );
/// ```
pub fn select_category(language: &LanguageTag, count: PluralCount) -> I18nResult<PluralCategory> {
	let rules = rules_for(language)?;
	let category = match count {
		PluralCount::Int(n) => rules.category_for(n),
		PluralCount::Float(x) => rules.category_for(operands_for_float(x)),
	};
	Ok(from_cldr(category))
}

/// Returns the categories CLDR requires for `language`, in rule order.
///
/// Strict plural validation compares a plural map's key set against this.
pub fn required_categories(language: &LanguageTag) -> I18nResult<Vec<PluralCategory>> {
	let rules = rules_for(language)?;
	Ok(rules.categories().map(from_cldr).collect())
}

fn rules_for(language: &LanguageTag) -> I18nResult<PluralRules> {
	let locale =
		Locale::try_from_str(language.as_str()).map_err(|err| I18nError::InvalidLanguage {
			tag: language.as_str().to_string(),
			reason: err.to_string(),
		})?;
	PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into()).map_err(|err| {
		I18nError::InvalidLanguage {
			tag: language.as_str().to_string(),
			reason: err.to_string(),
		}
	})
}

/// CLDR plural operands of a float count, read from its shortest
/// round-trip decimal rendering. A count with no decimal form (non-finite
/// or out of range) selects like zero.
fn operands_for_float(x: f64) -> PluralOperands {
	if !x.is_finite() {
		return PluralOperands::from(&Decimal::from(0));
	}
	let decimal =
		Decimal::try_from_f64(x, FloatPrecision::RoundTrip).unwrap_or_else(|_| Decimal::from(0));
	PluralOperands::from(&decimal)
}

fn from_cldr(category: CldrCategory) -> PluralCategory {
	match category {
		CldrCategory::Zero => PluralCategory::Zero,
		CldrCategory::One => PluralCategory::One,
		CldrCategory::Two => PluralCategory::Two,
		CldrCategory::Few => PluralCategory::Few,
		CldrCategory::Many => PluralCategory::Many,
		CldrCategory::Other => PluralCategory::Other,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn tag(s: &str) -> LanguageTag {
		LanguageTag::parse(s).unwrap()
	}

	#[rstest]
	#[case("en", 1, PluralCategory::One)]
	#[case("en", 0, PluralCategory::Other)]
	#[case("en", 2, PluralCategory::Other)]
	#[case("ja", 1, PluralCategory::Other)]
	#[case("ru", 1, PluralCategory::One)]
	#[case("ru", 2, PluralCategory::Few)]
	#[case("ru", 5, PluralCategory::Many)]
	#[case("ar", 0, PluralCategory::Zero)]
	#[case("ar", 2, PluralCategory::Two)]
	fn test_integer_categories(
		#[case] language: &str,
		#[case] count: i64,
		#[case] expected: PluralCategory,
	) {
		let got = select_category(&tag(language), PluralCount::Int(count)).unwrap();
		assert_eq!(got, expected);
	}

	#[test]
	fn test_non_finite_count_selects_like_zero() {
		let got = select_category(&tag("ar"), PluralCount::Float(f64::NAN)).unwrap();
		assert_eq!(got, PluralCategory::Zero);
	}

	#[rstest]
	#[case("en", 1.5, PluralCategory::Other)]
	#[case("fr", 1.5, PluralCategory::One)]
	fn test_fractional_categories(
		#[case] language: &str,
		#[case] count: f64,
		#[case] expected: PluralCategory,
	) {
		let got = select_category(&tag(language), PluralCount::Float(count)).unwrap();
		assert_eq!(got, expected);
	}

	#[test]
	fn test_required_categories_english() {
		let categories = required_categories(&tag("en")).unwrap();
		assert!(categories.contains(&PluralCategory::One));
		assert!(categories.contains(&PluralCategory::Other));
		assert_eq!(categories.len(), 2);
	}

	#[test]
	fn test_required_categories_welsh() {
		let categories = required_categories(&tag("cy")).unwrap();
		assert_eq!(categories.len(), 6);
	}

	#[test]
	fn test_regional_tag_uses_base_language_rules() {
		let got = select_category(&tag("ru-RU"), PluralCount::Int(2)).unwrap();
		assert_eq!(got, PluralCategory::Few);
	}

	#[test]
	fn test_category_name_round_trip() {
		for category in PluralCategory::ALL {
			assert_eq!(PluralCategory::from_key(category.as_str()), Some(category));
		}
	}
}
