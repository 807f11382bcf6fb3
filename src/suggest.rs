//! Suggestion engine: the same staged walk as the reference resolver,
//! producing candidate completions at each token boundary instead of a
//! final resolution.
//!
//! Two modes fall out of the token shape. A trailing separator puts the
//! walk in no-hint mode (list every valid next token at the current
//! depth); a trailing partial token puts it in with-hint mode (filter
//! that set by substring containment, case-sensitive against the source
//! field's native casing). Intermediate tokens must match exactly for
//! the walk to descend, mirroring the resolver stage by stage.

use crate::fetch::{DataFetcher, SectionInfo, fetched};
use crate::lexer::{TOKEN_SEPARATOR, TokenCursor};
use crate::model::{
    ISSUE_ATTACHMENTS_WIDGET, ISSUE_ELEMENTS_FIELDS, ISSUE_ELEMENTS_WIDGET,
    ISSUE_OUTCOMES_WIDGET, ISSUE_ROLES_FIELDS, ISSUE_ROLES_WIDGET, Organization, Section,
    Widget, WidgetKind, find_nested_section, find_organization, find_section, find_widget,
    organization_by_id,
};
use crate::resolver::scoped_widgets;
use crate::types::{ScopeContext, SuggestionData, SuggestionsData};
use crate::widgets::{NODE_INFO_SECTIONS, node_info_anchor, scoped_section_info, scoped_url};

/// Maximum widget-internal token depth per kind; beyond it, further
/// disambiguation is not supported and the candidate set is empty.
const GRAPH_MAX_TOKENS: usize = 2;
/// List items cannot be disambiguated further.
const LIST_MAX_TOKENS: usize = 1;
/// Column plus row value.
const PAGINATED_TABLE_MAX_TOKENS: usize = 2;
/// Header plus cell value.
const TABLE_MAX_TOKENS: usize = 2;
/// Timeline items cannot be disambiguated further.
const TIMELINE_MAX_TOKENS: usize = 1;

/// Candidate texts longer than this render with a trailing ellipsis.
const MAX_SUGGESTION_LENGTH: usize = 94;

/// Produces completion candidates against an immutable configuration
/// tree, fetching widget payloads on demand.
pub struct SuggestionEngine<'a, F: DataFetcher> {
    fetcher: &'a F,
    organizations: &'a [Organization],
}

impl<'a, F: DataFetcher> SuggestionEngine<'a, F> {
    /// Bind an engine to a configuration tree and a fetch adapter.
    pub fn new(organizations: &'a [Organization], fetcher: &'a F) -> Self {
        return Self { fetcher, organizations };
    }

    /// Candidates for a partially typed reference. Called on every
    /// composer keystroke; never fails, at worst the set is empty.
    pub fn get_suggestions(&self, tokens: &[String], reference: &str) -> SuggestionsData {
        let mut tokens = tokens.to_vec();
        // A reference ending on the separator means "list the next
        // level", represented as a trailing empty token if the caller's
        // lexer did not already preserve one.
        if reference.ends_with(TOKEN_SEPARATOR) && tokens.last().is_none_or(|t| !t.is_empty()) {
            tokens.push(String::new());
        }
        let mut cursor = TokenCursor::new(tokens);

        // Organization stage.
        let Some(token) = cursor.take() else {
            return organization_candidates(self.organizations, None);
        };
        if token.is_empty() {
            return organization_candidates(self.organizations, None);
        }
        let mut last = organization_candidates(self.organizations, Some(&token));
        let Some(organization) = find_organization(self.organizations, &token) else {
            return last;
        };

        // Section stage, descending nested sections exactly like the
        // resolver does.
        let Some(token) = cursor.take() else {
            return last;
        };
        if token.is_empty() {
            return section_candidates(&organization.sections, None);
        }
        last = section_candidates(&organization.sections, Some(&token));
        let Some(first) = find_section(organization, &token) else {
            return last;
        };
        let mut section = first;
        let mut is_issues = first.is_issues;
        loop {
            let Some(next) = cursor.peek() else {
                return last;
            };
            if next.is_empty() {
                cursor.take();
                if is_issues {
                    return self.object_candidates(section, None).unwrap_or(last);
                }
                return self.section_boundary_candidates(organization, section, None);
            }
            let Some(child) = find_nested_section(section, next) else {
                break;
            };
            last = section_candidates(&section.sections, Some(next));
            cursor.take();
            is_issues = is_issues || child.is_issues;
            section = child;
        }

        // Object stage, only inside an issues section.
        let mut object = None;
        if is_issues {
            let Some(token) = cursor.take() else {
                return last;
            };
            let Some(candidates) = self.object_candidates(section, Some(&token)) else {
                return last;
            };
            last = candidates;
            let Some(data) = fetched(self.fetcher.objects(&section.url)) else {
                return last;
            };
            object = data
                .rows
                .into_iter()
                .find(|row| row.name == token || row.id == token);
            if object.is_none() || cursor.is_empty() {
                return last;
            }
        }

        // Widget stage.
        let ctx = ScopeContext {
            is_issues,
            object,
            organization,
            organizations: self.organizations,
            section: Some(section),
        };
        let widgets = scoped_widgets(&ctx);
        let Some(token) = cursor.take() else {
            return last;
        };
        if token.is_empty() {
            return widget_candidates(&widgets, None);
        }
        // Outside an issues object the boundary also offers child
        // sections, so the partial-token filter covers the same set.
        last = if is_issues {
            widget_candidates(&widgets, Some(&token))
        } else {
            self.section_boundary_candidates(organization, section, Some(&token))
        };
        let Some(widget) = find_widget(&widgets, &token) else {
            return last;
        };
        if cursor.is_empty() {
            return last;
        }

        // Widget element stage: the remaining tokens belong to the
        // widget's own candidate space.
        let rest = cursor.rest();
        let (prior, hint) = match rest.split_last() {
            Some((tail, prior)) if tail.is_empty() => (prior, None),
            Some((tail, prior)) => (prior, Some(tail.as_str())),
            None => (rest, None),
        };
        return self.widget_element_candidates(&ctx, widget, prior, hint);
    }

    /// All (or hint-filtered) object names of an issues section.
    /// `None` when the object list cannot be fetched.
    fn object_candidates(
        &self,
        section: &Section,
        hint: Option<&str>,
    ) -> Option<SuggestionsData> {
        let data = fetched(self.fetcher.objects(&section.url))?;
        let suggestions = data
            .rows
            .into_iter()
            .filter(|row| hint.is_none_or(|h| row.name.contains(h)))
            .map(|row| SuggestionData { id: row.id, text: row.name })
            .collect();
        return Some(SuggestionsData::new(suggestions));
    }

    /// Candidates at a section boundary: child sections plus the
    /// section's widget names, optionally filtered by a partial token.
    fn section_boundary_candidates(
        &self,
        organization: &Organization,
        section: &Section,
        hint: Option<&str>,
    ) -> SuggestionsData {
        let ctx = ScopeContext {
            is_issues: false,
            object: None,
            organization,
            organizations: self.organizations,
            section: Some(section),
        };
        let mut candidates = section_candidates(&section.sections, hint);
        candidates
            .suggestions
            .extend(widget_candidates(&scoped_widgets(&ctx), hint).suggestions);
        return candidates;
    }

    /// Dispatch the widget-internal candidate space by kind, mirroring
    /// the resolver registry.
    fn widget_element_candidates(
        &self,
        ctx: &ScopeContext<'_>,
        widget: &Widget,
        prior: &[String],
        hint: Option<&str>,
    ) -> SuggestionsData {
        if exceeds_depth_cap(widget.kind, prior, hint) {
            return SuggestionsData::empty();
        }
        return match widget.kind {
            WidgetKind::Graph => self.graph_candidates(ctx, widget, prior, hint),
            WidgetKind::List => self.list_candidates(ctx, widget, hint),
            WidgetKind::PaginatedTable => {
                self.paginated_table_candidates(ctx, widget, prior, hint)
            },
            WidgetKind::Table => self.table_candidates(ctx, widget, prior, hint),
            WidgetKind::TextBox => SuggestionsData::empty(),
            WidgetKind::Timeline => self.timeline_candidates(ctx, widget, hint),
        };
    }

    // ── Table ─────────────────────────────────────────────────────────

    fn table_candidates(
        &self,
        ctx: &ScopeContext<'_>,
        widget: &Widget,
        prior: &[String],
        hint: Option<&str>,
    ) -> SuggestionsData {
        let Some(url) = scoped_url(ctx, widget) else {
            return SuggestionsData::empty();
        };
        let Some(data) = fetched(self.fetcher.table(&url)) else {
            return SuggestionsData::empty();
        };

        let header_candidates = |filter: Option<&str>| {
            let suggestions = data
                .headers
                .iter()
                .filter(|h| filter.is_none_or(|f| h.name.contains(f)))
                .map(|h| SuggestionData { id: h.name.clone(), text: h.name.clone() })
                .collect();
            return SuggestionsData::new(suggestions);
        };
        let cell_candidates = |header: &str, filter: Option<&str>| {
            let Some(index) = data.headers.iter().position(|h| h.name == header) else {
                return SuggestionsData::empty();
            };
            let suggestions = data
                .rows
                .iter()
                .filter_map(|row| {
                    let cell = row.values.get(index)?;
                    if filter.is_some_and(|f| !cell.value.contains(f)) {
                        return None;
                    }
                    return Some(SuggestionData {
                        id: row.id.clone(),
                        text: cell.value.clone(),
                    });
                })
                .collect();
            return SuggestionsData::new(suggestions);
        };

        return match (prior.last(), hint) {
            (None, filter) => header_candidates(filter),
            (Some(prev), Some(h)) => cell_candidates(prev, Some(h)),
            (Some(prev), None) => {
                if data.headers.iter().any(|hd| hd.name == *prev) {
                    cell_candidates(prev, None)
                } else if data.rows.iter().any(|r| r.name == *prev) {
                    // A fully typed row value: nothing deeper to offer.
                    SuggestionsData::empty()
                } else {
                    header_candidates(None)
                }
            },
        };
    }

    // ── Paginated table ───────────────────────────────────────────────

    fn paginated_table_candidates(
        &self,
        ctx: &ScopeContext<'_>,
        widget: &Widget,
        prior: &[String],
        hint: Option<&str>,
    ) -> SuggestionsData {
        if !ctx.is_issues {
            return SuggestionsData::empty();
        }
        let Some(info) = scoped_section_info(self.fetcher, ctx) else {
            return SuggestionsData::empty();
        };
        let columns: &[&str] = match widget.name.to_lowercase().as_str() {
            ISSUE_ROLES_WIDGET => &ISSUE_ROLES_FIELDS,
            ISSUE_ELEMENTS_WIDGET => &ISSUE_ELEMENTS_FIELDS,
            _ => return SuggestionsData::empty(),
        };

        let column_candidates = |filter: Option<&str>| {
            let suggestions = columns
                .iter()
                .filter(|c| filter.is_none_or(|f| c.contains(f)))
                .map(|c| SuggestionData { id: (*c).to_string(), text: (*c).to_string() })
                .collect();
            return SuggestionsData::new(suggestions);
        };
        let row_candidates = |column: &str, filter: Option<&str>| {
            return field_row_candidates(
                self.organizations,
                &info,
                &widget.name.to_lowercase(),
                &column.to_lowercase(),
                filter,
            );
        };

        return match (prior.last(), hint) {
            (None, filter) => column_candidates(filter),
            (Some(prev), Some(h)) => row_candidates(prev, Some(h)),
            (Some(prev), None) => {
                if columns.contains(&prev.to_lowercase().as_str()) {
                    row_candidates(prev, None)
                } else {
                    column_candidates(None)
                }
            },
        };
    }

    // ── List ──────────────────────────────────────────────────────────

    fn list_candidates(
        &self,
        ctx: &ScopeContext<'_>,
        widget: &Widget,
        hint: Option<&str>,
    ) -> SuggestionsData {
        if ctx.is_issues {
            let Some(info) = scoped_section_info(self.fetcher, ctx) else {
                return SuggestionsData::empty();
            };
            return issue_list_candidates(&info, &widget.name.to_lowercase(), hint);
        }

        let Some(url) = scoped_url(ctx, widget) else {
            return SuggestionsData::empty();
        };
        let Some(data) = fetched(self.fetcher.list(&url)) else {
            return SuggestionsData::empty();
        };
        let suggestions = data
            .items
            .iter()
            .filter(|i| hint.is_none_or(|h| i.text.contains(h)))
            .map(|i| SuggestionData { id: i.id.clone(), text: ellipsize(&i.text) })
            .collect();
        return SuggestionsData::new(suggestions);
    }

    // ── Timeline ──────────────────────────────────────────────────────

    fn timeline_candidates(
        &self,
        ctx: &ScopeContext<'_>,
        widget: &Widget,
        hint: Option<&str>,
    ) -> SuggestionsData {
        let Some(url) = scoped_url(ctx, widget) else {
            return SuggestionsData::empty();
        };
        let Some(data) = fetched(self.fetcher.timeline(&url)) else {
            return SuggestionsData::empty();
        };

        let mut suggestions: Vec<SuggestionData> = data
            .items
            .iter()
            .filter(|i| hint.is_none_or(|h| i.label.contains(h)))
            .map(|i| SuggestionData { id: format!("{}_label", i.id), text: i.label.clone() })
            .collect();
        suggestions.extend(
            data.items
                .iter()
                .filter(|i| hint.is_none_or(|h| i.text.contains(h)))
                .map(|i| SuggestionData { id: format!("{}_text", i.id), text: i.text.clone() }),
        );
        return SuggestionsData::new(suggestions);
    }

    // ── Graph ─────────────────────────────────────────────────────────

    fn graph_candidates(
        &self,
        ctx: &ScopeContext<'_>,
        widget: &Widget,
        prior: &[String],
        hint: Option<&str>,
    ) -> SuggestionsData {
        let Some(url) = scoped_url(ctx, widget) else {
            return SuggestionsData::empty();
        };
        let Some(data) = fetched(self.fetcher.graph(&url)) else {
            return SuggestionsData::empty();
        };

        // Depth 1: node labels plus the description name.
        let Some(node_token) = prior.last() else {
            let mut suggestions: Vec<SuggestionData> = data
                .nodes
                .iter()
                .filter(|n| hint.is_none_or(|h| n.label.contains(h)))
                .map(|n| SuggestionData { id: n.id.clone(), text: n.label.clone() })
                .collect();
            let description = data
                .description
                .as_ref()
                .filter(|d| hint.is_none_or(|h| d.name.contains(h)));
            if let Some(description) = description {
                suggestions.push(SuggestionData {
                    id: description.name.clone(),
                    text: description.name.clone(),
                });
            }
            return SuggestionsData::new(suggestions);
        };

        // Depth 2: info sections of the already-named node.
        let Some(node) = data.nodes.iter().find(|n| n.label.contains(node_token)) else {
            return SuggestionsData::empty();
        };
        let suggestions = NODE_INFO_SECTIONS
            .iter()
            .filter(|label| hint.is_none_or(|h| label.contains(h)))
            .map(|label| SuggestionData {
                id: node_info_anchor(&node.id, ctx),
                text: (*label).to_string(),
            })
            .collect();
        return SuggestionsData::new(suggestions);
    }
}

/// Whether the typed widget-internal depth is past the kind's cap.
fn exceeds_depth_cap(kind: WidgetKind, prior: &[String], hint: Option<&str>) -> bool {
    let cap = match kind {
        WidgetKind::Graph => GRAPH_MAX_TOKENS,
        WidgetKind::List => LIST_MAX_TOKENS,
        WidgetKind::PaginatedTable => PAGINATED_TABLE_MAX_TOKENS,
        WidgetKind::Table => TABLE_MAX_TOKENS,
        WidgetKind::TextBox => 0,
        WidgetKind::Timeline => TIMELINE_MAX_TOKENS,
    };
    let depth = prior.len() + usize::from(hint.is_some());
    return match hint {
        Some(_) => depth > cap,
        None => depth >= cap,
    };
}

/// Organization candidates, optionally filtered by a partial token.
fn organization_candidates(
    organizations: &[Organization],
    hint: Option<&str>,
) -> SuggestionsData {
    let suggestions = organizations
        .iter()
        .filter(|o| hint.is_none_or(|h| o.name.contains(h)))
        .map(|o| SuggestionData { id: o.id.clone(), text: o.name.clone() })
        .collect();
    return SuggestionsData::new(suggestions);
}

/// Section candidates, optionally filtered by a partial token.
fn section_candidates(sections: &[Section], hint: Option<&str>) -> SuggestionsData {
    let suggestions = sections
        .iter()
        .filter(|s| hint.is_none_or(|h| s.name.contains(h)))
        .map(|s| SuggestionData { id: s.id.clone(), text: s.name.clone() })
        .collect();
    return SuggestionsData::new(suggestions);
}

/// Widget-name candidates, optionally filtered by a partial token.
fn widget_candidates(widgets: &[Widget], hint: Option<&str>) -> SuggestionsData {
    let suggestions = widgets
        .iter()
        .filter(|w| !w.name.is_empty())
        .filter(|w| hint.is_none_or(|h| w.name.contains(h)))
        .map(|w| SuggestionData {
            id: format!("{}-{}", w.name, w.kind.as_str()),
            text: w.name.clone(),
        })
        .collect();
    return SuggestionsData::new(suggestions);
}

/// Row-value candidates for one column of a well-known issue table.
fn field_row_candidates(
    organizations: &[Organization],
    info: &SectionInfo,
    widget_name: &str,
    column: &str,
    hint: Option<&str>,
) -> SuggestionsData {
    let passes = |text: &str| hint.is_none_or(|h| text.contains(h));
    let mut suggestions = Vec::new();

    if widget_name == ISSUE_ROLES_WIDGET {
        if column == ISSUE_ROLES_FIELDS[0] {
            suggestions = info
                .roles
                .iter()
                .filter(|r| passes(&r.user_id))
                .map(|r| SuggestionData { id: r.user_id.clone(), text: r.user_id.clone() })
                .collect();
        }
        if column == ISSUE_ROLES_FIELDS[1] {
            suggestions = info
                .roles
                .iter()
                .flat_map(|r| r.roles.iter())
                .filter(|name| passes(name))
                .map(|name| SuggestionData { id: name.clone(), text: name.clone() })
                .collect();
        }
    }

    if widget_name == ISSUE_ELEMENTS_WIDGET {
        if column == ISSUE_ELEMENTS_FIELDS[0] {
            suggestions = info
                .elements
                .iter()
                .filter_map(|e| {
                    let owner = organization_by_id(organizations, &e.organization_id)?;
                    if !passes(&owner.name) {
                        return None;
                    }
                    return Some(SuggestionData { id: e.id.clone(), text: owner.name.clone() });
                })
                .collect();
        }
        if column == ISSUE_ELEMENTS_FIELDS[1] {
            suggestions = info
                .elements
                .iter()
                .filter(|e| passes(&e.name))
                .map(|e| SuggestionData { id: e.id.clone(), text: e.name.clone() })
                .collect();
        }
        if column == ISSUE_ELEMENTS_FIELDS[2] {
            suggestions = info
                .elements
                .iter()
                .filter_map(|e| {
                    let description = e.description.as_deref().filter(|d| !d.is_empty())?;
                    if !passes(description) {
                        return None;
                    }
                    return Some(SuggestionData {
                        id: e.id.clone(),
                        text: description.to_string(),
                    });
                })
                .collect();
        }
    }

    return SuggestionsData::new(suggestions);
}

/// Outcome/attachment candidates of the object in scope.
fn issue_list_candidates(
    info: &SectionInfo,
    widget_name: &str,
    hint: Option<&str>,
) -> SuggestionsData {
    let mut suggestions = Vec::new();
    if widget_name == ISSUE_OUTCOMES_WIDGET {
        suggestions = info
            .outcomes
            .iter()
            .filter(|o| hint.is_none_or(|h| o.outcome.contains(h)))
            .map(|o| SuggestionData { id: o.id.clone(), text: ellipsize(&o.outcome) })
            .collect();
    }
    if widget_name == ISSUE_ATTACHMENTS_WIDGET {
        suggestions = info
            .attachments
            .iter()
            .filter(|a| hint.is_none_or(|h| a.attachment.contains(h)))
            .map(|a| SuggestionData { id: a.id.clone(), text: ellipsize(&a.attachment) })
            .collect();
    }
    return SuggestionsData::new(suggestions);
}

/// Truncate long candidate texts on a char boundary with a trailing
/// ellipsis.
fn ellipsize(text: &str) -> String {
    if text.chars().count() < MAX_SUGGESTION_LENGTH {
        return text.to_string();
    }
    let truncated: String = text.chars().take(MAX_SUGGESTION_LENGTH).collect();
    return format!("{}...", truncated.trim_end());
}
