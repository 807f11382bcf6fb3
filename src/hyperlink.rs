//! Message hyperlinker: finds reference matches in a chat message,
//! resolves each one, and substitutes markdown links in a single pass.
//!
//! Substitution is keyed by matched text, so two identical literal
//! matches necessarily rewrite identically. A match that fails to
//! resolve is left byte-for-byte as the user typed it.

use std::collections::HashMap;

use regex::Regex;

use crate::config::Settings;
use crate::fetch::{DataFetcher, ObjectRow};
use crate::lexer::{TokenCursor, display_reference, lex_reference, parse_match};
use crate::model::{Organization, format_name};
use crate::resolver::Resolver;
use crate::suggest::SuggestionEngine;
use crate::types::{HyperlinkReference, ParseOptions, SuggestionData, SuggestionsData};

/// Path segment under which organization pages live.
const ORGANIZATIONS_PATH: &str = "organizations";
/// Query parameter carrying the owning section of an object page.
const PARENT_ID_PARAM: &str = "parentId";

/// Explicit stand-in for the ambient side-panel state: the channel the
/// message is composed in and the object that channel discusses. A
/// reference starting with the scoped object's name is relative and gets
/// expanded to a fully qualified one before resolution.
#[derive(Debug, Clone)]
pub struct SidePanelScope {
    /// Channel the message is posted in.
    pub channel_name: String,
    /// The object the side panel is focused on.
    pub object: ObjectRow,
    /// Organization owning the focused object's section.
    pub organization_name: String,
    /// Section owning the focused object.
    pub section_name: String,
    /// Team the channel belongs to.
    pub team_name: String,
}

impl SidePanelScope {
    /// Expand a relative reference (first token names the scoped
    /// object) into a fully qualified token sequence.
    pub fn expand_tokens(&self, tokens: &[String]) -> Option<Vec<String>> {
        if tokens.first().map(String::as_str) != Some(self.object.name.as_str()) {
            return None;
        }
        let mut expanded = vec![
            format_name(&self.organization_name),
            format_name(&self.section_name),
        ];
        expanded.extend(tokens.iter().cloned());
        return Some(expanded);
    }

    /// The scoped object as an extra completion candidate while its
    /// name is only partially typed.
    pub fn partial_object_suggestion(&self, tokens: &[String]) -> Option<SuggestionData> {
        let first = tokens.first()?;
        if first.is_empty() || !self.object.name.contains(first.as_str()) {
            return None;
        }
        return Some(SuggestionData {
            id: self.object.id.clone(),
            text: self.object.name.clone(),
        });
    }
}

/// Suggestions for a reference composed in a side panel: relative
/// references are expanded first, and the scoped object itself is
/// offered while partially typed.
pub fn side_panel_suggestions<F: DataFetcher>(
    engine: &SuggestionEngine<'_, F>,
    scope: &SidePanelScope,
    tokens: &[String],
    reference: &str,
) -> SuggestionsData {
    if let Some(expanded) = scope.expand_tokens(tokens) {
        return engine.get_suggestions(&expanded, reference);
    }
    let mut data = engine.get_suggestions(tokens, reference);
    if let Some(extra) = scope.partial_object_suggestion(tokens) {
        data.suggestions.push(extra);
    }
    return data;
}

/// The message pattern for a reference symbol: the delimited form
/// `SYMBOL(reference)` with an optional option suffix, or the bare form
/// running to the next whitespace.
///
/// # Panics
///
/// Panics if the hardcoded pattern template is invalid (compile-time
/// invariant).
pub fn message_pattern(symbol: &str) -> Regex {
    let sym = regex::escape(symbol);
    let pattern = format!(r"{sym}\(.+?\)(?:\.\S+)?|{sym}[^\s(][^\s]*");
    return Regex::new(&pattern).expect("valid pattern");
}

/// Rewrites chat messages, replacing references with markdown links.
pub struct Hyperlinker<'a, F: DataFetcher> {
    fetcher: &'a F,
    organizations: &'a [Organization],
    settings: &'a Settings,
}

impl<'a, F: DataFetcher> Hyperlinker<'a, F> {
    /// Bind a hyperlinker to a configuration tree, fetch adapter, and
    /// link settings.
    pub fn new(
        organizations: &'a [Organization],
        fetcher: &'a F,
        settings: &'a Settings,
    ) -> Self {
        return Self { fetcher, organizations, settings };
    }

    /// Whether a message contains anything worth rewriting.
    pub fn has_references(&self, message: &str) -> bool {
        return message_pattern(&self.settings.symbol).is_match(message);
    }

    /// Rewrite every reference match in a message. Each distinct match
    /// text resolves once; the substitution itself is a single pass.
    pub fn hyperlink_message(
        &self,
        message: &str,
        side_panel: Option<&SidePanelScope>,
    ) -> String {
        let pattern = message_pattern(&self.settings.symbol);
        let mut links: HashMap<String, String> = HashMap::new();
        for found in pattern.find_iter(message) {
            let matched = found.as_str();
            if links.contains_key(matched) {
                continue;
            }
            links.insert(matched.to_string(), self.hyperlink_match(matched, side_panel));
        }

        return pattern
            .replace_all(message, |caps: &regex::Captures<'_>| {
                let matched = caps.get(0).map_or("", |m| m.as_str());
                return links
                    .get(matched)
                    .cloned()
                    .unwrap_or_else(|| matched.to_string());
            })
            .into_owned();
    }

    /// Resolve one matched substring into a markdown link, or hand the
    /// literal text back when nothing resolves.
    pub fn hyperlink_match(&self, matched: &str, side_panel: Option<&SidePanelScope>) -> String {
        let Some(options) = parse_match(matched, &self.settings.symbol) else {
            return matched.to_string();
        };

        let tokens = lex_reference(&options.reference);
        // A reference relative to the side panel's object expands to a
        // fully qualified one and links into the channel instead of the
        // organization page.
        let expanded = side_panel.and_then(|scope| {
            return scope.expand_tokens(&tokens).map(|expanded_tokens| (scope, expanded_tokens));
        });
        let (channel_scope, tokens) = match expanded {
            Some((scope, expanded_tokens)) => (Some(scope), expanded_tokens),
            None => (None, tokens),
        };

        let resolver = Resolver::new(self.organizations, self.fetcher);
        let mut cursor = TokenCursor::new(tokens);
        let parse_options = ParseOptions { is_value_needed: options.is_value_needed };
        let Some(reference) = resolver.resolve(&mut cursor, &parse_options) else {
            return matched.to_string();
        };

        let display = display_reference(&options.reference);
        if let Some(scope) = channel_scope {
            return self.channel_link(scope, &reference, display);
        }
        return self.organization_page_link(&reference, display);
    }

    /// `[text](siteUrl/defaultPath/organizations/...)` for a reference
    /// resolved against an organization page.
    fn organization_page_link(
        &self,
        reference: &HyperlinkReference<'_>,
        display: &str,
    ) -> String {
        let mut url = format!(
            "{}/{}/{ORGANIZATIONS_PATH}/{}",
            self.settings.site_url, self.settings.default_path, reference.organization.id
        );

        let Some(section) = reference.section else {
            let Some(hash) = &reference.widget_hash else {
                return markdown_link(&reference.organization.name, &url);
            };
            url = format!("{url}#{}", hash.hash);
            return markdown_link(link_text(hash.value.as_deref(), &hash.text), &url);
        };

        url = format!("{url}/{}", format_name(&section.name));
        if let Some(object) = &reference.object {
            url = format!("{url}/{}?{PARENT_ID_PARAM}={}", object.id, section.id);
        }
        let Some(hash) = &reference.widget_hash else {
            return markdown_link(display, &url);
        };
        url = format!("{url}#{}", hash.hash);
        return markdown_link(link_text(hash.value.as_deref(), &hash.text), &url);
    }

    /// `[text](siteUrl/team/channels/channel#...)` for a reference
    /// resolved inside a side panel. The displayed reference is made
    /// absolute so backlinks stay traceable.
    fn channel_link(
        &self,
        scope: &SidePanelScope,
        reference: &HyperlinkReference<'_>,
        display: &str,
    ) -> String {
        let base = format!(
            "{}/{}/channels/{}#",
            self.settings.site_url, scope.team_name, scope.channel_name
        );
        let absolute = format!(
            "{}.{}.{display}",
            reference.organization.name,
            reference.section.map_or("", |s| s.name.as_str()),
        );

        let Some(hash) = &reference.widget_hash else {
            let object_id = reference
                .object
                .as_ref()
                .map_or(scope.object.id.as_str(), |o| o.id.as_str());
            return markdown_link(&absolute, &format!("{base}_{object_id}"));
        };
        let url = format!("{base}{}", hash.hash);
        return markdown_link(link_text(hash.value.as_deref(), &hash.text), &url);
    }
}

/// A widget hash renders its literal value when one was resolved, the
/// element label otherwise.
fn link_text<'t>(value: Option<&'t str>, text: &'t str) -> &'t str {
    return value.unwrap_or(text);
}

fn markdown_link(text: &str, url: &str) -> String {
    return format!("[{text}]({url})");
}
