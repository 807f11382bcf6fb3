//! Shared fixtures for unit tests: a small configuration tree and an
//! in-memory fetcher with matching payloads.

use std::collections::HashMap;

use crate::fetch::{
    Attachment, DataFetcher, Element, FetchResult, GraphData, GraphDescription, GraphNode,
    ListData, ListItem, ObjectListData, ObjectRow, Outcome, Role, SectionInfo, TableCell,
    TableData, TableHeader, TableRow, TextBoxData, TimelineData, TimelineItem,
};
use crate::model::{Organization, Section, Widget, WidgetKind};
use crate::types::ScopeContext;

/// In-memory fetcher keyed by URL (section-info keyed by object id and
/// section URL).
#[derive(Default)]
pub struct FakeFetcher {
    pub graphs: HashMap<String, GraphData>,
    pub lists: HashMap<String, ListData>,
    pub objects: HashMap<String, ObjectListData>,
    pub section_infos: HashMap<(String, String), SectionInfo>,
    pub tables: HashMap<String, TableData>,
    pub text_boxes: HashMap<String, TextBoxData>,
    pub timelines: HashMap<String, TimelineData>,
}

impl DataFetcher for FakeFetcher {
    fn graph(&self, url: &str) -> FetchResult<GraphData> {
        return Ok(self.graphs.get(url).cloned());
    }

    fn list(&self, url: &str) -> FetchResult<ListData> {
        return Ok(self.lists.get(url).cloned());
    }

    fn objects(&self, url: &str) -> FetchResult<ObjectListData> {
        return Ok(self.objects.get(url).cloned());
    }

    fn section_info(&self, object_id: &str, section_url: &str) -> FetchResult<SectionInfo> {
        let key = (object_id.to_string(), section_url.to_string());
        return Ok(self.section_infos.get(&key).cloned());
    }

    fn table(&self, url: &str) -> FetchResult<TableData> {
        return Ok(self.tables.get(url).cloned());
    }

    fn text_box(&self, url: &str) -> FetchResult<TextBoxData> {
        return Ok(self.text_boxes.get(url).cloned());
    }

    fn timeline(&self, url: &str) -> FetchResult<TimelineData> {
        return Ok(self.timelines.get(url).cloned());
    }
}

impl FakeFetcher {
    /// Payloads matching [`sample_organizations`].
    pub fn sample() -> Self {
        let mut fetcher = Self::default();

        fetcher.tables.insert(
            "/widgets/observed-data".to_string(),
            TableData {
                headers: vec![
                    TableHeader { name: "Source".to_string() },
                    TableHeader { name: "Status".to_string() },
                ],
                rows: vec![
                    table_row("row-1", &["sensor-1", "active"]),
                    table_row("row-2", &["sensor-2", "active"]),
                ],
            },
        );
        fetcher.tables.insert(
            "/widgets/metrics".to_string(),
            TableData {
                headers: vec![TableHeader { name: "Metric".to_string() }],
                rows: vec![table_row("m-1", &["uptime"])],
            },
        );

        fetcher.lists.insert(
            "/widgets/action-items".to_string(),
            ListData {
                items: vec![
                    list_item("item-1", "Review firewall rules"),
                    list_item("item-2", "Rotate credentials quarterly"),
                ],
            },
        );
        fetcher.lists.insert(
            "/widgets/roadmap".to_string(),
            ListData {
                items: vec![list_item("rm-1", "Expand to new regions")],
            },
        );

        fetcher.timelines.insert(
            "/widgets/events".to_string(),
            TimelineData {
                items: vec![
                    timeline_item("ev-1", "breach", "Initial breach detected"),
                    timeline_item("ev-2", "audit", "Vendor audit completed"),
                ],
            },
        );

        fetcher.graphs.insert(
            "/widgets/system".to_string(),
            GraphData {
                description: Some(GraphDescription { name: "Overview".to_string() }),
                nodes: vec![
                    GraphNode { id: "node-1".to_string(), label: "server-1".to_string() },
                    GraphNode { id: "node-2".to_string(), label: "server-2".to_string() },
                ],
            },
        );

        fetcher.text_boxes.insert(
            "/widgets/summary".to_string(),
            TextBoxData { text: "Quarterly security summary.".to_string() },
        );

        fetcher.objects.insert(
            "/orgs/acme/issues".to_string(),
            ObjectListData {
                rows: vec![
                    ObjectRow { id: "obj-1".to_string(), name: "Phishing Incident".to_string() },
                    ObjectRow { id: "obj-2".to_string(), name: "Outage".to_string() },
                ],
            },
        );

        fetcher.section_infos.insert(
            ("obj-1".to_string(), "/orgs/acme/issues".to_string()),
            SectionInfo {
                attachments: vec![Attachment {
                    attachment: "forensics-report.pdf".to_string(),
                    id: "att-1".to_string(),
                }],
                elements: vec![
                    Element {
                        description: Some("Edge detection suite".to_string()),
                        id: "el-1".to_string(),
                        name: "EDR".to_string(),
                        organization_id: "acme".to_string(),
                    },
                    Element {
                        description: Some("Log aggregation".to_string()),
                        id: "el-2".to_string(),
                        name: "SIEM".to_string(),
                        organization_id: "globex".to_string(),
                    },
                ],
                id: "obj-1".to_string(),
                name: "Phishing Incident".to_string(),
                objectives: Some("Contain and eradicate.".to_string()),
                outcomes: vec![
                    Outcome {
                        id: "out-1".to_string(),
                        outcome: "Containment completed within SLA".to_string(),
                    },
                    Outcome {
                        id: "out-2".to_string(),
                        outcome: "Credentials rotated".to_string(),
                    },
                ],
                roles: vec![
                    Role {
                        id: "role-1".to_string(),
                        roles: vec!["owner".to_string()],
                        user_id: "u123".to_string(),
                    },
                    Role {
                        id: "role-2".to_string(),
                        roles: vec!["reviewer".to_string(), "scribe".to_string()],
                        user_id: "u456".to_string(),
                    },
                ],
            },
        );

        return fetcher;
    }
}

/// Two organizations: Acme with a widget-bearing section, an issues
/// section, and a nested section pair; Globex with nothing but a name.
pub fn sample_organizations() -> Vec<Organization> {
    let policies = Section {
        id: "sec-1".to_string(),
        internal: false,
        is_issues: false,
        name: "Policies".to_string(),
        sections: Vec::new(),
        url: "/orgs/acme/policies".to_string(),
        widgets: vec![
            widget("Observed Data", WidgetKind::Table, "/widgets/observed-data"),
            widget("Action Items", WidgetKind::List, "/widgets/action-items"),
            widget("Events", WidgetKind::Timeline, "/widgets/events"),
            widget("System", WidgetKind::Graph, "/widgets/system"),
            widget("Summary", WidgetKind::TextBox, "/widgets/summary"),
        ],
    };
    let issues = Section {
        id: "sec-9".to_string(),
        internal: false,
        is_issues: true,
        name: "Issues".to_string(),
        sections: Vec::new(),
        url: "/orgs/acme/issues".to_string(),
        widgets: Vec::new(),
    };
    let reports = Section {
        id: "sec-2".to_string(),
        internal: false,
        is_issues: false,
        name: "Reports".to_string(),
        sections: vec![Section {
            id: "sec-3".to_string(),
            internal: false,
            is_issues: false,
            name: "Quarterly".to_string(),
            sections: Vec::new(),
            url: "/orgs/acme/reports/quarterly".to_string(),
            widgets: vec![widget("Metrics", WidgetKind::Table, "/widgets/metrics")],
        }],
        url: "/orgs/acme/reports".to_string(),
        widgets: Vec::new(),
    };

    return vec![
        Organization {
            id: "acme".to_string(),
            is_ecosystem: false,
            name: "Acme".to_string(),
            sections: vec![policies, issues, reports],
            widgets: vec![widget("Roadmap", WidgetKind::List, "/widgets/roadmap")],
        },
        Organization {
            id: "globex".to_string(),
            is_ecosystem: false,
            name: "Globex".to_string(),
            sections: Vec::new(),
            widgets: Vec::new(),
        },
    ];
}

/// Scope inside Acme's issues section, focused on the first object.
pub fn issue_ctx(organizations: &[Organization]) -> ScopeContext<'_> {
    let organization = &organizations[0];
    let section = organization
        .sections
        .iter()
        .find(|s| s.is_issues)
        .unwrap();
    return ScopeContext {
        is_issues: true,
        object: Some(ObjectRow {
            id: "obj-1".to_string(),
            name: "Phishing Incident".to_string(),
        }),
        organization,
        organizations,
        section: Some(section),
    };
}

fn widget(name: &str, kind: WidgetKind, url: &str) -> Widget {
    return Widget {
        chart_type: None,
        kind,
        name: name.to_string(),
        url: Some(url.to_string()),
    };
}

fn table_row(id: &str, values: &[&str]) -> TableRow {
    return TableRow {
        id: id.to_string(),
        name: String::new(),
        values: values
            .iter()
            .map(|v| TableCell { value: v.to_string() })
            .collect(),
    };
}

fn list_item(id: &str, text: &str) -> ListItem {
    return ListItem { id: id.to_string(), text: text.to_string() };
}

fn timeline_item(id: &str, label: &str, text: &str) -> TimelineItem {
    return TimelineItem {
        id: id.to_string(),
        label: label.to_string(),
        text: text.to_string(),
    };
}
