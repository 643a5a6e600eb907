//! Language-preference negotiation and translation resolution.
//!
//! `grappelli` resolves, for a piece of content available in several
//! languages, the best match against an ordered client preference list, and
//! renders the matched text with CLDR plural selection and placeholder
//! substitution.
//!
//! # Architecture
//!
//! - [`stack`] — interned preference stacks: canonicalized, deduplicated
//!   lists where equal content is guaranteed to be the identical object, so
//!   stacks can key every other cache by identity.
//! - [`negotiation`] — BCP-47 specificity expansion ([`search_order`]) and
//!   best-match selection ([`best_locale`]).
//! - [`translatable`] — "fat" strings holding per-language (and per-plural-
//!   category) renderings, resolved through a shape-partitioned cache.
//! - [`dictionary`] — persistent nested translation dictionaries with
//!   copy-on-write structural merge.
//! - [`template`] — the `%N[...]` placeholder codec.
//! - [`accept`] — hardened Accept-Language parsing for untrusted input.
//! - [`context`] — the composition root owning every cache; no hidden
//!   globals.
//!
//! # Quick start
//!
//! ```
//! use grappelli::I18nContext;
//! use serde_json::json;
//!
//! # fn main() -> grappelli::I18nResult<()> {
//! let ctx = I18nContext::new().with_default_language("en")?;
//! let dict = ctx.load_dictionary(&json!({
//!     "$dict": true,
//!     "inbox": {
//!         "en": { "one": "%1 message", "other": "%1 messages" },
//!         "fr": { "one": "%1 message", "many": "%1 de messages", "other": "%1 messages" },
//!     },
//! }))?;
//!
//! let stack = ctx.parse_accept_language("fr-CH,en;q=0.5");
//! let inbox = ctx.localize(&dict.translation(&["inbox"])?, &stack)?;
//! assert_eq!(inbox.language(), Some("fr"));
//!
//! let template = ctx.template(inbox.to_text_with(3)?)?;
//! assert_eq!(template.render(&["3"])?, "3 messages");
//! # Ok(())
//! # }
//! ```

pub mod accept;
pub mod context;
pub mod dictionary;
pub mod error;
pub mod negotiation;
pub mod plural;
pub mod stack;
pub mod tag;
pub mod template;
pub mod translatable;

pub use accept::{DEFAULT_MAX_HEADER_LEN, parse_accept_language};
pub use context::I18nContext;
pub use dictionary::{DICT_MARKER, DictEntry, Dictionary};
pub use error::{I18nError, I18nResult};
pub use negotiation::{best_locale, expand_tag, search_order};
pub use plural::{PluralCategory, PluralCount, required_categories, select_category};
pub use stack::{LanguageStack, StackInterner};
pub use tag::{LanguageTag, MAX_TAG_LEN};
pub use template::{ParseMode, Template, TemplateToken};
pub use translatable::{ResolutionCache, TransDict, Translatable, Variant, WILDCARD};
