//! Reference resolver: the staged walk from an organization token down
//! to a widget-internal element.
//!
//! Each stage consumes zero or more leading tokens from the cursor and
//! advances only on success. A stage that cannot interpret the upcoming
//! token leaves it unconsumed and resolution falls back to the deepest
//! level already reached; nothing below ever surfaces an error to the
//! caller.

use crate::fetch::{DataFetcher, ObjectRow, fetched};
use crate::lexer::TokenCursor;
use crate::model::{
    Organization, Section, Widget, find_nested_section, find_organization, find_section,
    find_widget, issue_object_widgets,
};
use crate::types::{HyperlinkReference, ParseOptions, ScopeContext, WidgetHash};
use crate::widgets::{resolve_widget, widget_anchor};

/// The deepest resolved section plus whether the path to it crossed an
/// issues section.
struct SectionMatch<'a> {
    is_issues: bool,
    section: &'a Section,
}

/// Resolves references against an immutable configuration tree, fetching
/// widget payloads on demand.
pub struct Resolver<'a, F: DataFetcher> {
    fetcher: &'a F,
    organizations: &'a [Organization],
}

impl<'a, F: DataFetcher> Resolver<'a, F> {
    /// Bind a resolver to a configuration tree and a fetch adapter.
    pub fn new(organizations: &'a [Organization], fetcher: &'a F) -> Self {
        return Self { fetcher, organizations };
    }

    /// Resolve a token sequence into a reference chain.
    ///
    /// Returns `None` only when the organization token itself fails to
    /// match; the caller then leaves the literal text untouched. Every
    /// later failure degrades to a shallower chain instead.
    pub fn resolve(
        &self,
        cursor: &mut TokenCursor,
        options: &ParseOptions,
    ) -> Option<HyperlinkReference<'a>> {
        let organization_token = cursor.take_nonempty()?;
        let organization = find_organization(self.organizations, &organization_token)?;

        let section_match = self.resolve_section_chain(organization, cursor);
        let (section, is_issues) = match &section_match {
            Some(m) => (Some(m.section), m.is_issues),
            None => (None, false),
        };

        // Inside an issues section the next token names a dynamic
        // object. A failed object lookup (including a failed fetch)
        // terminates at the section level: the remaining tokens are
        // dropped rather than reinterpreted as widget tokens.
        let object = match (is_issues, section) {
            (true, Some(section)) if cursor.peek().is_some() => {
                match self.resolve_object(section, cursor) {
                    Some(found) => Some(found),
                    None => {
                        return Some(HyperlinkReference {
                            object: None,
                            organization,
                            section: Some(section),
                            widget_hash: None,
                        });
                    },
                }
            },
            _ => None,
        };

        let ctx = ScopeContext {
            is_issues,
            object: object.clone(),
            organization,
            organizations: self.organizations,
            section,
        };
        let widget_hash = self.resolve_widget_stage(&ctx, cursor, options);

        return Some(HyperlinkReference { object, organization, section, widget_hash });
    }

    /// Consume one token as a direct section, then keep descending into
    /// nested sections while the upcoming token matches a child. The
    /// first non-matching token stays in the cursor for the next stage.
    fn resolve_section_chain(
        &self,
        organization: &'a Organization,
        cursor: &mut TokenCursor,
    ) -> Option<SectionMatch<'a>> {
        let first = find_section(organization, cursor.peek()?)?;
        cursor.take();

        let mut current = first;
        let mut is_issues = first.is_issues;
        while let Some(next) = cursor.peek() {
            let Some(child) = find_nested_section(current, next) else {
                break;
            };
            cursor.take();
            is_issues = is_issues || child.is_issues;
            current = child;
        }

        return Some(SectionMatch { is_issues, section: current });
    }

    /// Consume one token as an object of an issues section, matched
    /// against the fetched object list by display name (exact,
    /// case-sensitive) or id.
    fn resolve_object(&self, section: &Section, cursor: &mut TokenCursor) -> Option<ObjectRow> {
        let token = cursor.take_nonempty()?;
        let data = fetched(self.fetcher.objects(&section.url))?;
        return data
            .rows
            .into_iter()
            .find(|row| row.name == token || row.id == token);
    }

    /// Consume one token as a widget of the current scope and delegate
    /// the rest to the per-kind strategy. A strategy that signals "not
    /// enough information" yields the widget-level anchor instead.
    fn resolve_widget_stage(
        &self,
        ctx: &ScopeContext<'_>,
        cursor: &mut TokenCursor,
        options: &ParseOptions,
    ) -> Option<WidgetHash> {
        let token = cursor.peek().filter(|t| !t.is_empty())?.to_string();
        let widgets = scoped_widgets(ctx);
        let widget = find_widget(&widgets, &token)?;
        cursor.take();

        let resolved = resolve_widget(self.fetcher, ctx, widget, cursor, options);
        return Some(resolved.unwrap_or_else(|| WidgetHash {
            hash: widget_anchor(ctx, widget),
            text: widget.name.clone(),
            value: None,
        }));
    }
}

/// The widget list a reference is scoped to: the issue object's widget
/// set (well-known issue widgets plus the section's own), the section's
/// widgets, or the organization's when no section matched.
pub fn scoped_widgets(ctx: &ScopeContext<'_>) -> Vec<Widget> {
    if ctx.object.is_some() {
        let Some(section) = ctx.section else {
            return Vec::new();
        };
        let mut widgets = issue_object_widgets(section);
        widgets.extend(section.widgets.iter().cloned());
        return widgets;
    }
    if let Some(section) = ctx.section {
        return section.widgets.clone();
    }
    return ctx.organization.widgets.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeFetcher, sample_organizations};

    fn resolve_tokens<'a>(
        organizations: &'a [Organization],
        fetcher: &'a FakeFetcher,
        tokens: &[&str],
    ) -> Option<HyperlinkReference<'a>> {
        let resolver = Resolver::new(organizations, fetcher);
        let mut cursor = TokenCursor::new(tokens.iter().map(|t| t.to_string()).collect());
        return resolver.resolve(&mut cursor, &ParseOptions::default());
    }

    #[test]
    fn unknown_organization_resolves_to_nothing() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        assert!(resolve_tokens(&organizations, &fetcher, &["initech", "policies"]).is_none());
    }

    #[test]
    fn organization_matches_by_id_or_normalized_name() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let by_id = resolve_tokens(&organizations, &fetcher, &["acme"]).unwrap();
        assert_eq!(by_id.organization.name, "Acme");
        let by_name = resolve_tokens(&organizations, &fetcher, &["Acme"]).unwrap();
        assert_eq!(by_name.organization.id, "acme");
    }

    #[test]
    fn widget_reference_gets_container_anchor_and_widget_name() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let reference =
            resolve_tokens(&organizations, &fetcher, &["acme", "policies", "observed-data"])
                .unwrap();
        let hash = reference.widget_hash.unwrap();
        assert!(hash.hash.ends_with("-widget"));
        assert_eq!(hash.hash, "observed-data-sec-1-widget");
        assert_eq!(hash.text, "Observed Data");
    }

    #[test]
    fn nested_sections_are_descended_token_by_token() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let reference = resolve_tokens(
            &organizations,
            &fetcher,
            &["acme", "reports", "quarterly", "metrics", "Metric", "uptime"],
        )
        .unwrap();
        assert_eq!(reference.section.unwrap().id, "sec-3");
        assert_eq!(reference.widget_hash.unwrap().hash, "table-row-m-1");
    }

    #[test]
    fn failed_section_token_is_not_reconsumed_by_later_stages() {
        // "archive" matches no section: it must reach the widget stage
        // unconsumed, fail there too, and leave the chain at the
        // organization level with nothing deeper filled in.
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let reference =
            resolve_tokens(&organizations, &fetcher, &["acme", "archive", "observed-data"])
                .unwrap();
        assert!(reference.section.is_none());
        assert!(reference.object.is_none());
        assert!(reference.widget_hash.is_none());
    }

    #[test]
    fn organization_level_widget_resolves_without_a_section() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let reference =
            resolve_tokens(&organizations, &fetcher, &["acme", "roadmap", "Expand"]).unwrap();
        assert!(reference.section.is_none());
        assert_eq!(reference.widget_hash.unwrap().hash, "list-item-rm-1");
    }

    #[test]
    fn issue_object_resolves_by_name_or_id() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let by_name =
            resolve_tokens(&organizations, &fetcher, &["acme", "issues", "Phishing Incident"])
                .unwrap();
        assert_eq!(by_name.object.unwrap().id, "obj-1");

        let by_id = resolve_tokens(&organizations, &fetcher, &["acme", "issues", "obj-2"])
            .unwrap();
        assert_eq!(by_id.object.unwrap().name, "Outage");
    }

    #[test]
    fn unknown_object_falls_back_to_section_level_and_drops_the_rest() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let reference = resolve_tokens(
            &organizations,
            &fetcher,
            &["acme", "issues", "Nonexistent", "outcomes", "Containment"],
        )
        .unwrap();
        assert_eq!(reference.section.unwrap().id, "sec-9");
        assert!(reference.object.is_none());
        assert!(reference.widget_hash.is_none());
    }

    #[test]
    fn issue_widget_resolves_through_the_well_known_set() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let reference = resolve_tokens(
            &organizations,
            &fetcher,
            &["acme", "issues", "Phishing Incident", "participants-and-roles", "user", "u123"],
        )
        .unwrap();
        let hash = reference.widget_hash.unwrap();
        assert_eq!(hash.hash, "paginated-table-row-role-1");
        assert_eq!(hash.text, "u123");
    }

    #[test]
    fn unknown_issue_row_falls_back_to_the_widget_container() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let reference = resolve_tokens(
            &organizations,
            &fetcher,
            &["acme", "issues", "Phishing Incident", "participants-and-roles", "user", "u999"],
        )
        .unwrap();
        let hash = reference.widget_hash.unwrap();
        assert_eq!(hash.hash, "participants-and-roles-obj-1-sec-9-widget");
        assert_eq!(hash.text, "Participants And Roles");
    }

    #[test]
    fn fetch_failure_degrades_instead_of_erroring() {
        // An empty fetcher has no object list for the issues section.
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::default();
        let reference =
            resolve_tokens(&organizations, &fetcher, &["acme", "issues", "obj-1", "outcomes"])
                .unwrap();
        assert_eq!(reference.section.unwrap().id, "sec-9");
        assert!(reference.object.is_none());
        assert!(reference.widget_hash.is_none());
    }

    #[test]
    fn empty_token_stops_resolution_at_its_position() {
        let organizations = sample_organizations();
        let fetcher = FakeFetcher::sample();
        let reference =
            resolve_tokens(&organizations, &fetcher, &["acme", "", "observed-data"]).unwrap();
        assert!(reference.section.is_none());
        assert!(reference.widget_hash.is_none());
    }
}
