//! BCP-47 specificity expansion and best-match selection.
//!
//! A preference stack expands into a "search order": the fully expanded,
//! specificity-descending tag sequence in which candidate translations are
//! tried. Expansion strips trailing subtags one segment at a time, keeping a
//! singleton (e.g. the `x` private-use marker) attached to its payload, and
//! merges the per-preference chains so that more specific variants always
//! precede their own ancestors while a bare tag appears exactly once.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{I18nError, I18nResult};
use crate::stack::LanguageStack;
use crate::tag::{LanguageTag, MAX_TAG_LEN};

/// Expands `tag` into its specificity chain, least specific first.
///
/// Rejects tags longer than [`MAX_TAG_LEN`] bytes; no other validation is
/// performed, since tags normally arrive here already canonicalized.
///
/// # Examples
///
/// ```
/// use grappelli::expand_tag;
///
/// assert_eq!(expand_tag("en-GB").unwrap(), ["en", "en-GB"]);
/// assert_eq!(
///     expand_tag("en-US-x-foo").unwrap(),
///     ["en", "en-US", "en-US-x-foo"]
/// );
/// ```
pub fn expand_tag(tag: &str) -> I18nResult<Vec<String>> {
	if tag.len() > MAX_TAG_LEN {
		return Err(I18nError::InvalidLanguage {
			tag: tag.to_string(),
			reason: format!("longer than {MAX_TAG_LEN} bytes"),
		});
	}
	Ok(expansion_chain(tag))
}

/// Specificity chain of a length-checked tag, least specific first.
fn expansion_chain(tag: &str) -> Vec<String> {
	let mut chain = vec![tag.to_string()];
	let mut current = tag;
	while let Some(next) = strip_once(current) {
		chain.push(next.to_string());
		current = next;
	}
	chain.reverse();
	chain
}

/// Strips the trailing `-` segment, taking a single-character segment (a
/// BCP-47 singleton such as `x`) together with its payload.
fn strip_once(tag: &str) -> Option<&str> {
	let split = tag.rfind('-')?;
	let head = &tag[..split];
	match head.rfind('-') {
		Some(prev) if split - prev == 2 => Some(&tag[..prev]),
		None if head.len() == 1 => None,
		_ => Some(head),
	}
}

/// One node of the merged per-preference expansion forest.
struct OrderNode {
	tag: String,
	children: Vec<OrderNode>,
}

/// Expands `stack` into its search order, most specific variants first.
///
/// The result is memoized on the stack node, so repeated calls for the same
/// interned stack return the same slice.
///
/// # Examples
///
/// ```
/// use grappelli::{LanguageTag, StackInterner, search_order};
///
/// let interner = StackInterner::new();
/// let stack = interner.stack_of(&[LanguageTag::parse("en-GB").unwrap()]);
/// assert_eq!(&*search_order(&stack), ["en-GB", "en"]);
/// ```
pub fn search_order(stack: &LanguageStack) -> Arc<[String]> {
	stack
		.search_order_cell()
		.get_or_init(|| compute_search_order(stack.tags()))
		.clone()
}

fn compute_search_order(tags: &[LanguageTag]) -> Arc<[String]> {
	let forest: Vec<OrderNode> = tags
		.iter()
		.map(|tag| {
			// Fold the chain, least specific outermost, into a linear spine.
			let chain = expansion_chain(tag.as_str());
			let mut node: Option<OrderNode> = None;
			for link in chain.into_iter().rev() {
				node = Some(OrderNode {
					tag: link,
					children: node.into_iter().collect(),
				});
			}
			node.unwrap_or_else(|| unreachable!("expansion chain is never empty"))
		})
		.collect();

	let merged = merge_siblings(forest);
	let mut out = Vec::new();
	let mut seen = HashSet::new();
	render(&merged, &mut out, &mut seen);
	out.into()
}

/// Groups adjacent same-depth siblings that share a tag value, provided the
/// earlier occurrence already has descendants. A bare tag with no children of
/// its own stays separate, so a plain preference is not swallowed by a later,
/// more specific one.
fn merge_siblings(nodes: Vec<OrderNode>) -> Vec<OrderNode> {
	let mut merged: Vec<OrderNode> = Vec::new();
	for node in nodes {
		if let Some(last) = merged.last_mut()
			&& last.tag == node.tag
			&& !last.children.is_empty()
		{
			last.children.extend(node.children);
		} else {
			merged.push(node);
		}
	}
	for node in &mut merged {
		node.children = merge_siblings(std::mem::take(&mut node.children));
	}
	merged
}

/// Depth-first, children before parent, each tag emitted once.
fn render(nodes: &[OrderNode], out: &mut Vec<String>, seen: &mut HashSet<String>) {
	for node in nodes {
		render(&node.children, out, seen);
		if seen.insert(node.tag.clone()) {
			out.push(node.tag.clone());
		}
	}
}

/// Finds the first search-order entry of `preference` that is
/// case-insensitively present in `available`, returning the available tag's
/// own spelling.
///
/// # Examples
///
/// ```
/// use grappelli::{LanguageTag, StackInterner, best_locale};
///
/// let interner = StackInterner::new();
/// let stack = interner.stack_of(&[
///     LanguageTag::parse("en-AU").unwrap(),
///     LanguageTag::parse("fr-BE").unwrap(),
/// ]);
/// let available = ["en", "en-GB", "fr", "fr-BE"];
/// assert_eq!(best_locale(available, &stack), Some("en".to_string()));
/// ```
pub fn best_locale<'a, I>(available: I, preference: &LanguageStack) -> Option<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let available: Vec<&str> = available.into_iter().collect();
	for wanted in search_order(preference).iter() {
		if let Some(found) = available
			.iter()
			.find(|candidate| candidate.eq_ignore_ascii_case(wanted))
		{
			return Some((*found).to_string());
		}
	}
	None
}
