use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!(
            "\
# Error: Config Not Found

`{}` does not exist.

## Fix

Point the `config` key in `.orgref.toml` at the platform configuration
JSON exported for this workspace.
",
            path.display()
        ),

        Error::ConfigInvalid { path, reason } => format!(
            "\
# Error: Config Invalid

Could not parse `{}`: {reason}

## Fix

The file must contain an `organizations` array of the platform's
organization tree.
",
            path.display()
        ),

        Error::TomlDe(e) => format!(
            "\
# Error: Invalid Settings

`.orgref.toml` is not valid TOML: {e}
"
        ),

        Error::Io(e) => format!(
            "\
# Error: I/O

{e}
"
        ),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn config_not_found_names_the_path() {
        let rendered = render_error(&Error::ConfigNotFound {
            path: PathBuf::from("platform.json"),
        });
        assert!(rendered.contains("platform.json"));
        assert!(rendered.starts_with("# Error: Config Not Found"));
    }
}
