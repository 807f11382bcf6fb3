//! Widget resolver registry: one resolution strategy per widget kind.
//!
//! Each strategy consumes the tokens it understands from the cursor and
//! inspects the widget's fetched payload. Returning `None` signals "not
//! enough information at this depth" and makes the reference resolver
//! fall back to the widget-level anchor. Fetch failures are collapsed
//! into the same outcome through [`fetched`].

use crate::fetch::{
    DataFetcher, Element, Role, SectionInfo, fetched, object_url,
};
use crate::lexer::TokenCursor;
use crate::model::{
    ISSUE_ATTACHMENTS_WIDGET, ISSUE_ELEMENTS_FIELDS, ISSUE_ELEMENTS_WIDGET,
    ISSUE_OUTCOMES_WIDGET, ISSUE_ROLES_FIELDS, ISSUE_ROLES_WIDGET, Widget, WidgetKind,
    format_name, organization_by_id,
};
use crate::types::{ParseOptions, ScopeContext, WidgetHash};

/// Labels of the per-node info sections a graph reference may target.
pub const NODE_INFO_SECTIONS: [&str; 1] = ["Description"];

/// Anchor segment identifying a node info section.
const NODE_INFO_SEGMENT: &str = "node-info";

/// Resolve the tokens remaining after a widget token against the
/// widget's payload. Dispatch is exhaustive over the widget kinds.
pub fn resolve_widget<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
    widget: &Widget,
    cursor: &mut TokenCursor,
    options: &ParseOptions,
) -> Option<WidgetHash> {
    return match widget.kind {
        WidgetKind::Graph => resolve_graph(fetcher, ctx, widget, cursor),
        WidgetKind::List => resolve_list(fetcher, ctx, widget, cursor),
        WidgetKind::PaginatedTable => resolve_paginated_table(fetcher, ctx, widget, cursor),
        WidgetKind::Table => resolve_table(fetcher, ctx, widget, cursor),
        WidgetKind::TextBox => resolve_text_box(fetcher, ctx, widget, options),
        WidgetKind::Timeline => resolve_timeline(fetcher, ctx, widget, cursor),
    };
}

/// Anchor of the widget container itself: the widget-level fallback
/// target when no deeper element can be identified.
pub fn widget_anchor(ctx: &ScopeContext<'_>, widget: &Widget) -> String {
    return container_anchor(&format_name(&widget.name), ctx);
}

/// Build a `{slug}[-{objectId}][-{sectionId}]-widget` anchor, omitting
/// the scope segments that are not present.
fn container_anchor(slug: &str, ctx: &ScopeContext<'_>) -> String {
    let mut parts = vec![slug];
    if let Some(object_id) = ctx.object_id() {
        parts.push(object_id);
    }
    if let Some(section_id) = ctx.section_id() {
        parts.push(section_id);
    }
    parts.push("widget");
    return parts.join("-");
}

/// The widget's fetch URL with the in-scope object substituted in.
pub(crate) fn scoped_url(ctx: &ScopeContext<'_>, widget: &Widget) -> Option<String> {
    let url = widget.url.as_deref()?;
    return Some(object_url(url, ctx.object.as_ref()));
}

/// The section-info payload of the object in scope.
pub(crate) fn scoped_section_info<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
) -> Option<SectionInfo> {
    let object = ctx.object.as_ref()?;
    let section = ctx.section?;
    return fetched(fetcher.section_info(&object.id, &section.url));
}

// ── Table ─────────────────────────────────────────────────────────────

/// Two tokens: header name, then cell value. The row whose value under
/// that header equals the cell token wins; first match in row order.
fn resolve_table<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
    widget: &Widget,
    cursor: &mut TokenCursor,
) -> Option<WidgetHash> {
    if cursor.remaining() < 2 {
        return None;
    }
    let header = cursor.take_nonempty()?;
    let value = cursor.take_nonempty()?;

    let data = fetched(fetcher.table(&scoped_url(ctx, widget)?))?;
    let index = data.headers.iter().position(|h| h.name == header)?;
    let row = data
        .rows
        .iter()
        .find(|r| r.values.get(index).is_some_and(|cell| cell.value == value))?;

    return Some(WidgetHash {
        hash: format!("table-row-{}", row.id),
        text: value,
        value: None,
    });
}

// ── Paginated table ───────────────────────────────────────────────────

/// Two tokens: column name, then row value, interpreted through the
/// field semantics of the well-known issue tables. Only issues objects
/// carry these tables; outside an issues scope the reference stays at
/// the widget level.
fn resolve_paginated_table<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
    widget: &Widget,
    cursor: &mut TokenCursor,
) -> Option<WidgetHash> {
    if !ctx.is_issues || cursor.remaining() < 2 {
        return None;
    }
    let column = cursor.take_nonempty()?.to_lowercase();
    let value = cursor.take_nonempty()?;

    let info = scoped_section_info(fetcher, ctx)?;
    return match widget.name.to_lowercase().as_str() {
        ISSUE_ROLES_WIDGET => resolve_roles_row(&info.roles, &column, &value),
        ISSUE_ELEMENTS_WIDGET => resolve_elements_row(ctx, &info.elements, &column, &value),
        _ => None,
    };
}

/// Match a roles row by user id or by role membership.
fn resolve_roles_row(roles: &[Role], column: &str, value: &str) -> Option<WidgetHash> {
    let (id, text) = if column == ISSUE_ROLES_FIELDS[0] {
        let role = roles.iter().find(|r| r.user_id == value)?;
        (role.id.clone(), role.user_id.clone())
    } else if column == ISSUE_ROLES_FIELDS[1] {
        let role = roles.iter().find(|r| r.roles.iter().any(|name| name == value))?;
        (role.id.clone(), value.to_string())
    } else {
        return None;
    };

    return Some(WidgetHash {
        hash: format!("paginated-table-row-{id}"),
        text,
        value: None,
    });
}

/// Match an elements row by owning organization display name, element
/// name, or description prefix.
fn resolve_elements_row(
    ctx: &ScopeContext<'_>,
    elements: &[Element],
    column: &str,
    value: &str,
) -> Option<WidgetHash> {
    let (id, text) = if column == ISSUE_ELEMENTS_FIELDS[0] {
        let element = elements.iter().find(|e| {
            organization_by_id(ctx.organizations, &e.organization_id)
                .is_some_and(|o| o.name == value)
        })?;
        let owner = organization_by_id(ctx.organizations, &element.organization_id)?;
        (element.id.clone(), owner.name.clone())
    } else if column == ISSUE_ELEMENTS_FIELDS[1] {
        let element = elements.iter().find(|e| e.name == value)?;
        (element.id.clone(), element.name.clone())
    } else if column == ISSUE_ELEMENTS_FIELDS[2] {
        let element = elements
            .iter()
            .find(|e| e.description.as_deref().is_some_and(|d| d.starts_with(value)))?;
        let description = element.description.clone()?;
        (element.id.clone(), description)
    } else {
        return None;
    };

    return Some(WidgetHash {
        hash: format!("paginated-table-row-{id}"),
        text,
        value: None,
    });
}

// ── List ──────────────────────────────────────────────────────────────

/// One token: an item text prefix. Issues objects resolve against their
/// section-info outcomes/attachments instead of a fetched list payload.
fn resolve_list<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
    widget: &Widget,
    cursor: &mut TokenCursor,
) -> Option<WidgetHash> {
    let item_text = cursor.take_nonempty()?;
    if ctx.is_issues {
        return resolve_issue_list_item(fetcher, ctx, widget, &item_text);
    }

    let data = fetched(fetcher.list(&scoped_url(ctx, widget)?))?;
    let item = data.items.iter().find(|i| i.text.starts_with(&item_text))?;
    return Some(WidgetHash {
        hash: format!("list-item-{}", item.id),
        text: item.text.clone(),
        value: None,
    });
}

/// Match an outcome or attachment of the object in scope by prefix,
/// depending on which well-known list this widget is.
fn resolve_issue_list_item<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
    widget: &Widget,
    item_text: &str,
) -> Option<WidgetHash> {
    let info = scoped_section_info(fetcher, ctx)?;
    let (id, text) = match widget.name.to_lowercase().as_str() {
        ISSUE_OUTCOMES_WIDGET => {
            let outcome = info.outcomes.iter().find(|o| o.outcome.starts_with(item_text))?;
            (outcome.id.clone(), outcome.outcome.clone())
        },
        ISSUE_ATTACHMENTS_WIDGET => {
            let attachment = info
                .attachments
                .iter()
                .find(|a| a.attachment.starts_with(item_text))?;
            (attachment.id.clone(), attachment.attachment.clone())
        },
        _ => return None,
    };

    return Some(WidgetHash {
        hash: format!("list-item-{id}"),
        text,
        value: None,
    });
}

// ── Timeline ──────────────────────────────────────────────────────────

/// One token, matched against either the label or the text of an event.
fn resolve_timeline<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
    widget: &Widget,
    cursor: &mut TokenCursor,
) -> Option<WidgetHash> {
    let content = cursor.take_nonempty()?;
    let data = fetched(fetcher.timeline(&scoped_url(ctx, widget)?))?;
    let item = data
        .items
        .iter()
        .find(|i| i.label == content || i.text == content)?;

    return Some(WidgetHash {
        hash: format!("timeline-item-{}", item.id),
        text: item.text.clone(),
        value: None,
    });
}

// ── Text box ──────────────────────────────────────────────────────────

/// Zero tokens: the whole widget is the value. Resolves beyond the
/// widget level only when the caller asked for the literal content.
fn resolve_text_box<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
    widget: &Widget,
    options: &ParseOptions,
) -> Option<WidgetHash> {
    if !options.is_value_needed {
        return None;
    }

    if ctx.is_issues {
        let info = scoped_section_info(fetcher, ctx)?;
        return Some(WidgetHash {
            hash: widget_anchor(ctx, widget),
            text: widget.name.clone(),
            value: info.objectives,
        });
    }

    let data = fetched(fetcher.text_box(&scoped_url(ctx, widget)?))?;
    return Some(WidgetHash {
        hash: widget_anchor(ctx, widget),
        text: widget.name.clone(),
        value: Some(data.text),
    });
}

// ── Graph ─────────────────────────────────────────────────────────────

/// One or two tokens: a node label or the description name, optionally
/// followed by a node info section label.
fn resolve_graph<F: DataFetcher>(
    fetcher: &F,
    ctx: &ScopeContext<'_>,
    widget: &Widget,
    cursor: &mut TokenCursor,
) -> Option<WidgetHash> {
    let target = cursor.take_nonempty()?;
    let data = fetched(fetcher.graph(&scoped_url(ctx, widget)?))?;

    let description = data.description.as_ref().filter(|d| d.name == target);
    let (id, text, is_description) = match description {
        Some(d) => (format_name(&d.name), d.name.clone(), true),
        None => {
            let node = data.nodes.iter().find(|n| n.label == target)?;
            (node.id.clone(), node.label.clone(), false)
        },
    };

    // A single remaining token may select a node info section.
    if cursor.remaining() == 1 {
        let label = cursor.take_nonempty()?;
        if !NODE_INFO_SECTIONS.contains(&label.as_str()) {
            return None;
        }
        return Some(WidgetHash {
            hash: node_info_anchor(&id, ctx),
            text: label,
            value: None,
        });
    }

    let mut parts = vec![id.as_str()];
    if let Some(object_id) = ctx.object_id() {
        parts.push(object_id);
    }
    if let Some(section_id) = ctx.section_id() {
        parts.push(section_id);
    }
    let hash = if is_description {
        format!("graph-{}-widget", parts.join("-"))
    } else {
        parts.join("-")
    };

    return Some(WidgetHash { hash, text, value: None });
}

/// Anchor of a node's info section:
/// `{nodeId}[-{sectionId}][-{objectId}]-node-info-widget`.
pub fn node_info_anchor(node_id: &str, ctx: &ScopeContext<'_>) -> String {
    let mut parts = vec![node_id];
    if let Some(section_id) = ctx.section_id() {
        parts.push(section_id);
    }
    if let Some(object_id) = ctx.object_id() {
        parts.push(object_id);
    }
    parts.push(NODE_INFO_SEGMENT);
    parts.push("widget");
    return parts.join("-");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Organization;
    use crate::testutil::{FakeFetcher, sample_organizations};

    fn cursor(tokens: &[&str]) -> TokenCursor {
        return TokenCursor::new(tokens.iter().map(|t| t.to_string()).collect());
    }

    fn plain_ctx(organizations: &[Organization]) -> ScopeContext<'_> {
        let organization = &organizations[0];
        let section = organization.sections.first();
        return ScopeContext {
            is_issues: false,
            object: None,
            organization,
            organizations,
            section,
        };
    }

    fn policies_widget(ctx: &ScopeContext<'_>, name: &str) -> Widget {
        return ctx
            .section
            .unwrap()
            .widgets
            .iter()
            .find(|w| w.name == name)
            .cloned()
            .unwrap();
    }

    #[test]
    fn table_row_resolves_by_header_and_cell_value() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "Observed Data");

        let mut tokens = cursor(&["Source", "sensor-2"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut tokens, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "table-row-row-2");
        assert_eq!(hash.text, "sensor-2");
    }

    #[test]
    fn table_with_unknown_cell_falls_back_to_widget_level() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "Observed Data");

        let mut tokens = cursor(&["Source", "no-such-sensor"]);
        assert!(
            resolve_widget(&fetcher, &ctx, &widget, &mut tokens, &ParseOptions::default())
                .is_none()
        );
    }

    #[test]
    fn table_with_one_token_is_not_enough_information() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "Observed Data");

        let mut tokens = cursor(&["Source"]);
        assert!(
            resolve_widget(&fetcher, &ctx, &widget, &mut tokens, &ParseOptions::default())
                .is_none()
        );
    }

    #[test]
    fn duplicate_cell_values_resolve_to_first_row() {
        // Known limitation: first match in iteration order wins, ties
        // are not disambiguated further.
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "Observed Data");

        let mut tokens = cursor(&["Status", "active"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut tokens, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "table-row-row-1");
    }

    #[test]
    fn list_item_resolves_by_text_prefix() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "Action Items");

        let mut tokens = cursor(&["Rotate"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut tokens, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "list-item-item-2");
        assert_eq!(hash.text, "Rotate credentials quarterly");
    }

    #[test]
    fn timeline_item_matches_label_or_text() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "Events");

        let mut by_label = cursor(&["breach"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut by_label, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "timeline-item-ev-1");

        let mut by_text = cursor(&["Vendor audit completed"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut by_text, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "timeline-item-ev-2");
    }

    #[test]
    fn graph_node_and_description_resolve() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "System");

        let mut node = cursor(&["server-1"]);
        let hash = resolve_widget(&fetcher, &ctx, &widget, &mut node, &ParseOptions::default())
            .unwrap();
        assert_eq!(hash.hash, "node-1-sec-1");
        assert_eq!(hash.text, "server-1");

        let mut description = cursor(&["Overview"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut description, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "graph-overview-sec-1-widget");
    }

    #[test]
    fn graph_node_info_section_resolves_and_unknown_label_falls_back() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "System");

        let mut info = cursor(&["server-1", "Description"]);
        let hash = resolve_widget(&fetcher, &ctx, &widget, &mut info, &ParseOptions::default())
            .unwrap();
        assert_eq!(hash.hash, "node-1-sec-1-node-info-widget");
        assert_eq!(hash.text, "Description");

        let mut unknown = cursor(&["server-1", "Internals"]);
        assert!(
            resolve_widget(&fetcher, &ctx, &widget, &mut unknown, &ParseOptions::default())
                .is_none()
        );
    }

    #[test]
    fn text_box_resolves_only_when_value_is_needed() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = policies_widget(&ctx, "Summary");

        let mut no_value = cursor(&[]);
        assert!(
            resolve_widget(&fetcher, &ctx, &widget, &mut no_value, &ParseOptions::default())
                .is_none()
        );

        let mut with_value = cursor(&[]);
        let options = ParseOptions { is_value_needed: true };
        let hash = resolve_widget(&fetcher, &ctx, &widget, &mut with_value, &options).unwrap();
        assert_eq!(hash.value.as_deref(), Some("Quarterly security summary."));
        assert_eq!(hash.hash, "summary-sec-1-widget");
    }

    #[test]
    fn issue_roles_row_resolves_by_user_and_by_role() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = crate::testutil::issue_ctx(&organizations);
        let widget = crate::model::issue_object_widgets(ctx.section.unwrap())
            .into_iter()
            .find(|w| w.name == "Participants And Roles")
            .unwrap();

        let mut by_user = cursor(&["user", "u123"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut by_user, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "paginated-table-row-role-1");
        assert_eq!(hash.text, "u123");

        let mut by_role = cursor(&["roles", "reviewer"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut by_role, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "paginated-table-row-role-2");
        assert_eq!(hash.text, "reviewer");
    }

    #[test]
    fn issue_elements_row_resolves_by_owner_name_and_description_prefix() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = crate::testutil::issue_ctx(&organizations);
        let widget = crate::model::issue_object_widgets(ctx.section.unwrap())
            .into_iter()
            .find(|w| w.name == "Support Technology Data")
            .unwrap();

        let mut by_owner = cursor(&["organization", "Globex"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut by_owner, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "paginated-table-row-el-2");
        assert_eq!(hash.text, "Globex");

        let mut by_description = cursor(&["description", "Edge"]);
        let hash = resolve_widget(
            &fetcher,
            &ctx,
            &widget,
            &mut by_description,
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(hash.hash, "paginated-table-row-el-1");
    }

    #[test]
    fn issue_outcome_resolves_by_prefix() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = crate::testutil::issue_ctx(&organizations);
        let widget = crate::model::issue_object_widgets(ctx.section.unwrap())
            .into_iter()
            .find(|w| w.name == "Outcomes")
            .unwrap();

        let mut tokens = cursor(&["Containment"]);
        let hash =
            resolve_widget(&fetcher, &ctx, &widget, &mut tokens, &ParseOptions::default())
                .unwrap();
        assert_eq!(hash.hash, "list-item-out-1");
        assert_eq!(hash.text, "Containment completed within SLA");
    }

    #[test]
    fn paginated_table_outside_issues_scope_stays_at_widget_level() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let ctx = plain_ctx(&organizations);
        let widget = Widget {
            chart_type: None,
            kind: WidgetKind::PaginatedTable,
            name: "Inventory".to_string(),
            url: Some("/widgets/inventory".to_string()),
        };

        let mut tokens = cursor(&["name", "anything"]);
        assert!(
            resolve_widget(&fetcher, &ctx, &widget, &mut tokens, &ParseOptions::default())
                .is_none()
        );
    }
}
