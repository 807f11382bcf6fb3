/// Core domain types for reference resolution and suggestions.
use serde::Serialize;

use crate::fetch::ObjectRow;
use crate::model::{Organization, Section};

/// Result of resolving one reference. The chain is filled from the root
/// down; deeper fields stay `None` when token matching fell back at that
/// level. A reference whose organization token fails to match resolves
/// to nothing at all, so the organization itself is always present here.
#[derive(Debug, Clone)]
pub struct HyperlinkReference<'a> {
    /// Dynamic object of an issues section, when one was matched.
    pub object: Option<ObjectRow>,
    /// The matched organization.
    pub organization: &'a Organization,
    /// The deepest matched section, possibly nested.
    pub section: Option<&'a Section>,
    /// Widget-level resolution, when the tokens reached a widget.
    pub widget_hash: Option<WidgetHash>,
}

/// A resolved widget-level target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetHash {
    /// DOM anchor id the link jumps to.
    pub hash: String,
    /// Human-readable label for the rendered link.
    pub text: String,
    /// Literal content value overriding `text` when the widget resolved
    /// to its content (a text box) rather than an item label.
    pub value: Option<String>,
}

/// Everything a widget-level resolution strategy needs to know about
/// where it sits in the tree. Passed explicitly so the registry has no
/// ambient state to reach for.
#[derive(Debug, Clone)]
pub struct ScopeContext<'a> {
    /// Whether the resolved section chain contains an issues section.
    pub is_issues: bool,
    /// Dynamic object in scope, if any.
    pub object: Option<ObjectRow>,
    /// The resolved organization.
    pub organization: &'a Organization,
    /// The full configuration tree, for cross-organization lookups
    /// (element rows render their owning organization's display name).
    pub organizations: &'a [Organization],
    /// The deepest resolved section, if any.
    pub section: Option<&'a Section>,
}

impl ScopeContext<'_> {
    /// Id of the object in scope, if any.
    pub fn object_id(&self) -> Option<&str> {
        return self.object.as_ref().map(|o| o.id.as_str());
    }

    /// Id of the section in scope, if any.
    pub fn section_id(&self) -> Option<&str> {
        return self.section.map(|s| s.id.as_str());
    }
}

/// Options extracted from the matched message substring.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// The widget's literal content is wanted as the link text.
    pub is_value_needed: bool,
    /// The reference body, without symbol, delimiters, or option.
    pub reference: String,
}

/// Flags threaded into widget-level resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// The widget's literal content is wanted as the link text.
    pub is_value_needed: bool,
}

/// One autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionData {
    /// Identifier the composer uses to build the next reference segment.
    pub id: String,
    /// Display label.
    pub text: String,
}

/// The candidate set returned for one composer keystroke.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestionsData {
    /// Ranked candidates; empty when no completion applies.
    pub suggestions: Vec<SuggestionData>,
}

impl SuggestionsData {
    /// The empty candidate set.
    pub fn empty() -> Self {
        return Self::default();
    }

    /// Wrap a candidate list.
    pub fn new(suggestions: Vec<SuggestionData>) -> Self {
        return Self { suggestions };
    }
}
