//! Interned language-preference stacks.
//!
//! A [`LanguageStack`] is an ordered, deduplicated preference list, most
//! preferred first. Stacks are interned in a trie owned by a
//! [`StackInterner`]: each node links strongly to its parent (the stack with
//! the head removed) and weakly to its children, keyed by the tag pushed to
//! the front. Any two construction histories producing the same content yield
//! the same node, so stacks can key other caches by identity instead of
//! value. Dropping every external handle to a suffix makes its nodes
//! reclaimable; dead weak entries are pruned when the same child is next
//! requested.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::tag::LanguageTag;

pub(crate) struct StackNode {
	/// Ordered, deduplicated tags, most preferred first. Empty at the root.
	tags: Vec<LanguageTag>,
	/// The stack with the head removed. `None` only at the root.
	parent: Option<Arc<StackNode>>,
	/// Child index keyed by the tag pushed to the front.
	children: RwLock<HashMap<LanguageTag, Weak<StackNode>>>,
	/// Lazily computed search order, owned by the node so it is reclaimed
	/// with it.
	search_order: OnceCell<Arc<[String]>>,
}

/// An interned, immutable preference stack.
///
/// Equality and hashing are by interned identity: two stacks compare equal
/// exactly when they are the same trie node, which the interner guarantees
/// coincides with content equality.
///
/// # Examples
///
/// ```
/// use grappelli::{LanguageTag, StackInterner};
///
/// let interner = StackInterner::new();
/// let en = LanguageTag::parse("en").unwrap();
/// let fr = LanguageTag::parse("fr").unwrap();
///
/// // Pushing re-orders instead of duplicating: both histories intern to the
/// // same node.
/// let a = interner.resolve(interner.root(), &[en.clone(), fr.clone(), en.clone()]);
/// let b = interner.resolve(interner.root(), &[fr, en]);
/// assert_eq!(a, b);
/// assert_eq!(a.tags().len(), 2);
/// assert_eq!(a.head().unwrap().as_str(), "en");
/// ```
#[derive(Clone)]
pub struct LanguageStack(Arc<StackNode>);

impl LanguageStack {
	/// The tags of the stack, most preferred first.
	pub fn tags(&self) -> &[LanguageTag] {
		&self.0.tags
	}

	/// The most-preferred tag, if any.
	pub fn head(&self) -> Option<&LanguageTag> {
		self.0.tags.first()
	}

	/// Whether the stack holds no tags.
	pub fn is_empty(&self) -> bool {
		self.0.tags.is_empty()
	}

	/// Number of tags in the stack.
	pub fn len(&self) -> usize {
		self.0.tags.len()
	}

	/// Whether `tag` occurs anywhere in the stack.
	pub fn contains(&self, tag: &LanguageTag) -> bool {
		self.0.tags.contains(tag)
	}

	pub(crate) fn search_order_cell(&self) -> &OnceCell<Arc<[String]>> {
		&self.0.search_order
	}

	/// Stable identity of the interned node, for caches keyed by stack.
	pub(crate) fn node_id(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}

	/// A non-owning handle, so caches can observe the node's liveness
	/// without pinning it.
	pub(crate) fn downgrade(&self) -> Weak<StackNode> {
		Arc::downgrade(&self.0)
	}

	fn node(&self) -> &Arc<StackNode> {
		&self.0
	}
}

impl PartialEq for LanguageStack {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for LanguageStack {}

impl Hash for LanguageStack {
	fn hash<H: Hasher>(&self, state: &mut H) {
		(Arc::as_ptr(&self.0) as usize).hash(state);
	}
}

impl fmt::Debug for LanguageStack {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.0.tags.iter().map(LanguageTag::as_str))
			.finish()
	}
}

/// Interning engine for preference stacks.
///
/// Owns the empty root stack; every other node is created lazily under it.
pub struct StackInterner {
	root: LanguageStack,
}

impl StackInterner {
	/// Creates an interner with an empty root stack.
	pub fn new() -> Self {
		Self {
			root: LanguageStack(Arc::new(StackNode {
				tags: Vec::new(),
				parent: None,
				children: RwLock::new(HashMap::new()),
				search_order: OnceCell::new(),
			})),
		}
	}

	/// The empty stack.
	pub fn root(&self) -> &LanguageStack {
		&self.root
	}

	/// Pushes `additions` onto `base` in order, so the last addition ends up
	/// most preferred.
	///
	/// Pushing a tag already in the stack splices it to the front: the tags
	/// above its old position keep their relative order, and no duplicate is
	/// created.
	pub fn resolve(&self, base: &LanguageStack, additions: &[LanguageTag]) -> LanguageStack {
		let mut current = base.clone();
		for tag in additions {
			current = self.push(&current, tag);
		}
		current
	}

	/// Interns a single stack from `tags`, most preferred first.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli::{LanguageTag, StackInterner};
	///
	/// let interner = StackInterner::new();
	/// let stack = interner.stack_of(&[
	///     LanguageTag::parse("en-GB").unwrap(),
	///     LanguageTag::parse("fr").unwrap(),
	/// ]);
	/// assert_eq!(stack.head().unwrap().as_str(), "en-GB");
	/// ```
	pub fn stack_of(&self, tags: &[LanguageTag]) -> LanguageStack {
		let mut current = self.root.clone();
		for tag in tags.iter().rev() {
			current = self.push(&current, tag);
		}
		current
	}

	fn push(&self, stack: &LanguageStack, tag: &LanguageTag) -> LanguageStack {
		if stack.head() == Some(tag) {
			return stack.clone();
		}
		if !stack.contains(tag) {
			return self.child(stack, tag);
		}
		// Splice: walk up to the node that introduced `tag`, then re-apply
		// the heads collected on the way, oldest first, onto that node's
		// parent, and push `tag` last.
		let mut heads: Vec<LanguageTag> = Vec::new();
		let mut node: &Arc<StackNode> = stack.node();
		while node.tags.first() != Some(tag) {
			heads.push(node.tags[0].clone());
			node = node
				.parent
				.as_ref()
				.unwrap_or_else(|| unreachable!("tag present in stack but not on any ancestor"));
		}
		let parent = node
			.parent
			.as_ref()
			.unwrap_or_else(|| unreachable!("introducing node always has a parent"));
		let mut current = LanguageStack(parent.clone());
		for head in heads.iter().rev() {
			current = self.child(&current, head);
		}
		self.child(&current, tag)
	}

	/// Memoized child step: `[tag, ...parent]`. Double-checks under the write
	/// lock so a race can never mint two nodes for one key.
	fn child(&self, parent: &LanguageStack, tag: &LanguageTag) -> LanguageStack {
		{
			let children = parent.node().children.read();
			if let Some(weak) = children.get(tag)
				&& let Some(node) = weak.upgrade()
			{
				return LanguageStack(node);
			}
		}
		let mut children = parent.node().children.write();
		if let Some(node) = children.get(tag).and_then(Weak::upgrade) {
			return LanguageStack(node);
		}
		let mut tags = Vec::with_capacity(parent.len() + 1);
		tags.push(tag.clone());
		tags.extend_from_slice(parent.tags());
		let node = Arc::new(StackNode {
			tags,
			parent: Some(parent.node().clone()),
			children: RwLock::new(HashMap::new()),
			search_order: OnceCell::new(),
		});
		children.insert(tag.clone(), Arc::downgrade(&node));
		LanguageStack(node)
	}
}

impl Default for StackInterner {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for StackInterner {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StackInterner").finish_non_exhaustive()
	}
}
