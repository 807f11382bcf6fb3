//! CLI command bodies: thin drivers over the library surface.

use std::path::PathBuf;

use crate::config::{self, Settings, SidePanelSettings};
use crate::error::Error;
use crate::fetch::{FileFetcher, ObjectRow};
use crate::hyperlink::{Hyperlinker, SidePanelScope, side_panel_suggestions};
use crate::lexer::lex_reference;
use crate::model::{Organization, ecosystem};
use crate::suggest::SuggestionEngine;

/// Settings, organization tree, and fetcher for one command run.
struct Workspace {
    fetcher: FileFetcher,
    organizations: Vec<Organization>,
    settings: Settings,
}

/// Load everything a command needs from the current directory.
///
/// # Errors
///
/// Returns errors from settings or platform configuration loading.
fn load_workspace() -> Result<Workspace, Error> {
    let root = PathBuf::from(".");
    let settings = Settings::load(&root)?;
    let organizations = config::load_organizations(&settings.config_path)?;
    let fetcher = FileFetcher::new(settings.data_dir.clone());
    return Ok(Workspace { fetcher, organizations, settings });
}

/// Side-panel scope from settings, if one is configured.
fn side_panel_scope(settings: &Settings) -> Option<SidePanelScope> {
    let configured: &SidePanelSettings = settings.side_panel.as_ref()?;
    return Some(SidePanelScope {
        channel_name: configured.channel_name.clone(),
        object: ObjectRow {
            id: configured.object_id.clone(),
            name: configured.object_name.clone(),
        },
        organization_name: configured.organization_name.clone(),
        section_name: configured.section_name.clone(),
        team_name: configured.team_name.clone(),
    });
}

/// Resolve a single reference and print the markdown link it produces.
/// An unresolvable reference prints back literally, exactly as it would
/// stay in a message.
///
/// # Errors
///
/// Returns errors from workspace loading.
pub fn cmd_resolve(reference: &str) -> Result<(), Error> {
    let workspace = load_workspace()?;
    let linker = Hyperlinker::new(
        &workspace.organizations,
        &workspace.fetcher,
        &workspace.settings,
    );
    let scope = side_panel_scope(&workspace.settings);

    let symbol = &workspace.settings.symbol;
    let matched = if reference.starts_with(symbol) {
        reference.to_string()
    } else {
        format!("{symbol}{reference}")
    };

    println!("{}", linker.hyperlink_match(&matched, scope.as_ref()));
    Ok(())
}

/// Print completion candidates for a partially typed reference, one
/// `id<TAB>text` pair per line.
///
/// # Errors
///
/// Returns errors from workspace loading.
pub fn cmd_suggest(reference: &str) -> Result<(), Error> {
    let workspace = load_workspace()?;
    let engine = SuggestionEngine::new(&workspace.organizations, &workspace.fetcher);
    let scope = side_panel_scope(&workspace.settings);

    let tokens = lex_reference(reference);
    let data = match &scope {
        Some(scope) => side_panel_suggestions(&engine, scope, &tokens, reference),
        None => engine.get_suggestions(&tokens, reference),
    };

    if data.suggestions.is_empty() {
        println!("No suggestions.");
        return Ok(());
    }
    for suggestion in &data.suggestions {
        println!("{}\t{}", suggestion.id, suggestion.text);
    }
    Ok(())
}

/// Rewrite a whole message, hyperlinking every reference match, and
/// print the result.
///
/// # Errors
///
/// Returns errors from workspace loading.
pub fn cmd_post(message: &str) -> Result<(), Error> {
    let workspace = load_workspace()?;
    let linker = Hyperlinker::new(
        &workspace.organizations,
        &workspace.fetcher,
        &workspace.settings,
    );
    let scope = side_panel_scope(&workspace.settings);

    println!("{}", linker.hyperlink_message(message, scope.as_ref()));
    Ok(())
}

/// List the configured organizations with their section counts.
///
/// # Errors
///
/// Returns errors from workspace loading.
pub fn cmd_orgs() -> Result<(), Error> {
    let workspace = load_workspace()?;
    if workspace.organizations.is_empty() {
        println!("No organizations configured.");
        return Ok(());
    }

    let ecosystem_id = ecosystem(&workspace.organizations).map(|o| o.id.as_str());
    for organization in &workspace.organizations {
        let marker = if Some(organization.id.as_str()) == ecosystem_id {
            " (ecosystem)"
        } else {
            ""
        };
        println!(
            "{} [{}]{marker}: {} sections",
            organization.name,
            organization.id,
            organization.sections.len()
        );
    }
    Ok(())
}
