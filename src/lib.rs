//! orgref resolves dotted-token references to organizational data
//! (sections, widgets, table rows, list items, graph nodes) into deep
//! links, and offers completion candidates for partially typed
//! references over the same tree walk.
//!
//! The engine is read-only and failure-tolerant by design: a token that
//! matches nothing truncates resolution to the deepest level already
//! reached, and a message keeps its literal reference text wherever no
//! link can be formed.

pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod hyperlink;
pub mod lexer;
pub mod model;
pub mod resolver;
pub mod suggest;
#[cfg(test)]
pub(crate) mod testutil;
pub mod types;
pub mod widgets;

pub use crate::error::Error;
pub use crate::fetch::{DataFetcher, FetchError, FetchResult};
pub use crate::hyperlink::Hyperlinker;
pub use crate::resolver::Resolver;
pub use crate::suggest::SuggestionEngine;
pub use crate::types::{HyperlinkReference, SuggestionsData, WidgetHash};
