//! Data fetch adapter: typed widget payloads and the contract for
//! retrieving them. Fetch failures are a typed `Result` so the resolver's
//! deliberate degrade-on-error paths stay visible in the signatures.

use std::path::PathBuf;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::OBJECT_ID_TOKEN;

/// Failure while retrieving or decoding a widget payload.
///
/// The resolver never propagates these: any fetch failure means "cannot
/// resolve at this depth" and resolution degrades to the deepest level
/// already reached.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Payload was retrieved but is not valid for its expected shape.
    #[error("decode failed for {url}: {reason}")]
    Decode {
        /// Description of the decode failure.
        reason: String,
        /// URL the payload came from.
        url: String,
    },

    /// Underlying I/O failure while retrieving the payload.
    #[error("fetch failed for {url}: {source}")]
    Io {
        /// The wrapped I/O error.
        source: std::io::Error,
        /// URL that was being fetched.
        url: String,
    },
}

/// `Ok(None)` means absent/empty content, a normal outcome distinct
/// from a fetch failure.
pub type FetchResult<T> = Result<Option<T>, FetchError>;

/// Substitute the object-id placeholder in a widget URL template when a
/// dynamic object is in scope.
pub fn object_url(url: &str, object: Option<&ObjectRow>) -> String {
    return match object {
        Some(o) => url.replace(OBJECT_ID_TOKEN, &o.id),
        None => url.to_string(),
    };
}

/// Collapse a fetch outcome to the payload, treating both failure and
/// absence as "nothing to resolve against". This is the single point
/// where fetch errors are deliberately dropped.
pub fn fetched<T>(result: FetchResult<T>) -> Option<T> {
    return result.ok().flatten();
}

// ── Payload shapes ────────────────────────────────────────────────────

/// Table payload: ordered headers and rows of positional cell values.
#[derive(Debug, Clone, Deserialize)]
pub struct TableData {
    /// Column headers, in display order.
    pub headers: Vec<TableHeader>,
    /// Rows; `values` are positionally aligned with `headers`.
    pub rows: Vec<TableRow>,
}

/// A single table column header.
#[derive(Debug, Clone, Deserialize)]
pub struct TableHeader {
    /// Column display name, matched exactly by references.
    pub name: String,
}

/// A single table row.
#[derive(Debug, Clone, Deserialize)]
pub struct TableRow {
    /// Row identifier, used to build the row anchor.
    pub id: String,
    /// Row display name, if the table names its rows.
    #[serde(default)]
    pub name: String,
    /// Cell values aligned with the table headers.
    pub values: Vec<TableCell>,
}

/// A single table cell.
#[derive(Debug, Clone, Deserialize)]
pub struct TableCell {
    /// Rendered cell value.
    pub value: String,
}

/// List payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ListData {
    /// Items in insertion order.
    pub items: Vec<ListItem>,
}

/// A single list item.
#[derive(Debug, Clone, Deserialize)]
pub struct ListItem {
    /// Item identifier, used to build the item anchor.
    pub id: String,
    /// Item text, matched by prefix.
    pub text: String,
}

/// Timeline payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineData {
    /// Events in display order.
    pub items: Vec<TimelineItem>,
}

/// A single timeline event.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineItem {
    /// Event identifier, used to build the item anchor.
    pub id: String,
    /// Short event label.
    pub label: String,
    /// Full event text.
    pub text: String,
}

/// Graph payload: nodes plus an optional description block.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphData {
    /// Description block rendered beside the graph.
    #[serde(default)]
    pub description: Option<GraphDescription>,
    /// Graph nodes in insertion order.
    pub nodes: Vec<GraphNode>,
}

/// The graph's description block.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDescription {
    /// Description title, matched exactly by references.
    pub name: String,
}

/// A single graph node.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphNode {
    /// Node identifier, used to build the node anchor.
    pub id: String,
    /// Node label, matched exactly by references.
    pub label: String,
}

/// Text-box payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TextBoxData {
    /// The whole content of the text box.
    pub text: String,
}

/// Object list of an issues section: one row per dynamically created
/// object.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectListData {
    /// Objects in creation order.
    pub rows: Vec<ObjectRow>,
}

/// A dynamically created object of an issues section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectRow {
    /// Object identifier, used in page URLs and anchors.
    pub id: String,
    /// Object display name, matched exactly (case-sensitive).
    pub name: String,
}

/// Detail payload of one issues object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    /// Attachments of the object.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Supporting elements of the object.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Object identifier.
    pub id: String,
    /// Object display name.
    pub name: String,
    /// Free-text objectives, the content behind the objectives text-box.
    #[serde(default)]
    pub objectives: Option<String>,
    /// Outcomes of the object.
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    /// Participant roles of the object.
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// A single outcome entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Outcome {
    /// Outcome identifier, used to build the item anchor.
    pub id: String,
    /// Outcome text, matched by prefix.
    pub outcome: String,
}

/// A single attachment entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment text, matched by prefix.
    pub attachment: String,
    /// Attachment identifier, used to build the item anchor.
    pub id: String,
}

/// A participant role row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Row identifier, used to build the row anchor.
    pub id: String,
    /// Role names held by the user.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Identifier of the participating user.
    pub user_id: String,
}

/// A supporting element row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Free-text description, matched by prefix.
    #[serde(default)]
    pub description: Option<String>,
    /// Row identifier, used to build the row anchor.
    pub id: String,
    /// Element name, matched exactly.
    pub name: String,
    /// Owning organization, rendered through its display name.
    pub organization_id: String,
}

// ── Contract ──────────────────────────────────────────────────────────

/// Retrieval of typed widget payloads. One method per payload shape; all
/// return `Ok(None)` for absent content rather than an error.
pub trait DataFetcher {
    /// Graph payload for a graph widget URL.
    fn graph(&self, url: &str) -> FetchResult<GraphData>;
    /// List payload for a list widget URL.
    fn list(&self, url: &str) -> FetchResult<ListData>;
    /// Object list of an issues section.
    fn objects(&self, url: &str) -> FetchResult<ObjectListData>;
    /// Detail payload of one issues object under its section URL.
    fn section_info(&self, object_id: &str, section_url: &str) -> FetchResult<SectionInfo>;
    /// Table payload for a table widget URL.
    fn table(&self, url: &str) -> FetchResult<TableData>;
    /// Text-box payload for a text-box widget URL.
    fn text_box(&self, url: &str) -> FetchResult<TextBoxData>;
    /// Timeline payload for a timeline widget URL.
    fn timeline(&self, url: &str) -> FetchResult<TimelineData>;
}

/// File-backed fetcher: maps a widget URL to `{data_dir}/{url}.json`.
/// Used by the CLI and by integration tests; a deployment embedding the
/// engine supplies its own `DataFetcher` over the platform's HTTP client.
pub struct FileFetcher {
    data_dir: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher rooted at a payload directory.
    pub fn new(data_dir: PathBuf) -> Self {
        return Self { data_dir };
    }

    /// Read and decode one payload file. A missing file is absent
    /// content (`Ok(None)`), mirroring a backend's empty response.
    fn read<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let trimmed = url.trim_start_matches('/');
        let path = self.data_dir.join(format!("{trimmed}.json"));
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FetchError::Io {
                    source: e,
                    url: url.to_string(),
                });
            },
        };

        return match serde_json::from_str(&content) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) => Err(FetchError::Decode {
                reason: e.to_string(),
                url: url.to_string(),
            }),
        };
    }
}

impl DataFetcher for FileFetcher {
    fn graph(&self, url: &str) -> FetchResult<GraphData> {
        return self.read(url);
    }

    fn list(&self, url: &str) -> FetchResult<ListData> {
        return self.read(url);
    }

    fn objects(&self, url: &str) -> FetchResult<ObjectListData> {
        return self.read(url);
    }

    fn section_info(&self, object_id: &str, section_url: &str) -> FetchResult<SectionInfo> {
        return self.read(&format!("{section_url}/{object_id}"));
    }

    fn table(&self, url: &str) -> FetchResult<TableData> {
        return self.read(url);
    }

    fn text_box(&self, url: &str) -> FetchResult<TextBoxData> {
        return self.read(url);
    }

    fn timeline(&self, url: &str) -> FetchResult<TimelineData> {
        return self.read(url);
    }
}
