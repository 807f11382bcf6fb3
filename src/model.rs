/// Organization tree: the immutable configuration the resolver walks.
use serde::Deserialize;

/// Placeholder in widget URL templates, substituted with an object id
/// when the widget is scoped to a dynamic object.
pub const OBJECT_ID_TOKEN: &str = ":id";

/// Well-known widgets every issues object carries, identified by their
/// lowercased display names.
pub const ISSUE_OBJECTIVES_WIDGET: &str = "objectives and research area";
/// Outcomes list of an issues object.
pub const ISSUE_OUTCOMES_WIDGET: &str = "outcomes";
/// Participant roles table of an issues object.
pub const ISSUE_ROLES_WIDGET: &str = "participants and roles";
/// Supporting elements table of an issues object.
pub const ISSUE_ELEMENTS_WIDGET: &str = "support technology data";
/// Attachments list of an issues object.
pub const ISSUE_ATTACHMENTS_WIDGET: &str = "attachments";

/// Column names of the roles table, in display order.
pub const ISSUE_ROLES_FIELDS: [&str; 2] = ["user", "roles"];
/// Column names of the elements table, in display order.
pub const ISSUE_ELEMENTS_FIELDS: [&str; 3] = ["organization", "name", "description"];

/// Root of the configuration tree. Loaded once, immutable for the session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Stable identifier used in page URLs.
    pub id: String,
    /// The single organization acting as the cross-organization
    /// aggregation view.
    #[serde(default)]
    pub is_ecosystem: bool,
    /// Display name; referenced in normalized form.
    pub name: String,
    /// Direct sections.
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Organization-level widgets, outside any section.
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// A section groups widgets and possibly nested sections under an
/// organization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Stable identifier used in anchors and `parentId` query params.
    pub id: String,
    /// Visibility/edit actions restricted to members of the owning
    /// organization.
    #[serde(default)]
    pub internal: bool,
    /// Children of this section are dynamically created issue objects
    /// rather than configured content.
    #[serde(default)]
    pub is_issues: bool,
    /// Display name; referenced in normalized form.
    pub name: String,
    /// Nested sections.
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Backend URL the section's data hangs off.
    pub url: String,
    /// Widgets rendered under this section.
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// A configured UI element bound to a backend URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// Chart flavor for graph-like widgets; opaque to the resolver.
    #[serde(default)]
    pub chart_type: Option<String>,
    /// Widget kind, driving per-type resolution and suggestions.
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    /// Display name; referenced in normalized form.
    pub name: String,
    /// Backend URL template, possibly containing [`OBJECT_ID_TOKEN`].
    #[serde(default)]
    pub url: Option<String>,
}

/// The closed set of widget kinds the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WidgetKind {
    /// Node/edge graph with an optional description block.
    #[serde(rename = "graph")]
    Graph,
    /// Flat item list.
    #[serde(rename = "list")]
    List,
    /// Server-paged table; rows resolved through field semantics.
    #[serde(rename = "paginated-table")]
    PaginatedTable,
    /// Header/row table.
    #[serde(rename = "table")]
    Table,
    /// Single block of text.
    #[serde(rename = "text-box")]
    TextBox,
    /// Ordered event timeline.
    #[serde(rename = "timeline")]
    Timeline,
}

impl WidgetKind {
    /// The wire name of the kind, as used in configuration and in
    /// suggestion ids.
    pub fn as_str(self) -> &'static str {
        return match self {
            WidgetKind::Graph => "graph",
            WidgetKind::List => "list",
            WidgetKind::PaginatedTable => "paginated-table",
            WidgetKind::Table => "table",
            WidgetKind::TextBox => "text-box",
            WidgetKind::Timeline => "timeline",
        };
    }
}

/// Normalize a display name into its reference-segment form:
/// lowercase, every whitespace character and apostrophe replaced with `-`.
pub fn format_name(name: &str) -> String {
    return name
        .chars()
        .map(|c| if c.is_whitespace() || c == '\'' { '-' } else { c })
        .collect::<String>()
        .to_lowercase();
}

/// Title-case a lowercased well-known widget name for display
/// ("participants and roles" -> "Participants And Roles").
pub fn format_capitalize(name: &str) -> String {
    return name
        .split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ");
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    return first.to_uppercase().chain(chars).collect();
}

// ── Lookups ───────────────────────────────────────────────────────────

/// Find an organization by id or normalized name.
pub fn find_organization<'a>(
    organizations: &'a [Organization],
    token: &str,
) -> Option<&'a Organization> {
    return organizations
        .iter()
        .find(|o| o.id == token || format_name(&o.name) == format_name(token));
}

/// Find an organization by id.
pub fn organization_by_id<'a>(
    organizations: &'a [Organization],
    id: &str,
) -> Option<&'a Organization> {
    return organizations.iter().find(|o| o.id == id);
}

/// The single ecosystem organization, if configured.
pub fn ecosystem(organizations: &[Organization]) -> Option<&Organization> {
    return organizations.iter().find(|o| o.is_ecosystem);
}

/// Find a direct section of an organization by normalized name
/// (case-insensitive: both sides go through [`format_name`]).
pub fn find_section<'a>(organization: &'a Organization, token: &str) -> Option<&'a Section> {
    return organization
        .sections
        .iter()
        .find(|s| format_name(&s.name) == format_name(token));
}

/// Find a direct child of a section by normalized name.
pub fn find_nested_section<'a>(section: &'a Section, token: &str) -> Option<&'a Section> {
    return section
        .sections
        .iter()
        .find(|s| format_name(&s.name) == format_name(token));
}

/// Find a widget in a scoped widget list by normalized name.
pub fn find_widget<'a>(widgets: &'a [Widget], token: &str) -> Option<&'a Widget> {
    return widgets
        .iter()
        .find(|w| format_name(&w.name) == format_name(token));
}

/// The widget set every issues object carries, scoped to the object via
/// the section URL plus the id placeholder.
pub fn issue_object_widgets(section: &Section) -> Vec<Widget> {
    let url = format!("{}/{OBJECT_ID_TOKEN}", section.url);
    let widget = |name: &str, kind: WidgetKind| Widget {
        chart_type: None,
        kind,
        name: format_capitalize(name),
        url: Some(url.clone()),
    };
    return vec![
        widget(ISSUE_OBJECTIVES_WIDGET, WidgetKind::TextBox),
        widget(ISSUE_OUTCOMES_WIDGET, WidgetKind::List),
        widget(ISSUE_ROLES_WIDGET, WidgetKind::PaginatedTable),
        widget(ISSUE_ELEMENTS_WIDGET, WidgetKind::PaginatedTable),
        widget(ISSUE_ATTACHMENTS_WIDGET, WidgetKind::List),
    ];
}
