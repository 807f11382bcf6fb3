use crate::types::MatchOptions;

/// Separator between reference segments.
pub const TOKEN_SEPARATOR: char = '.';
/// Opening delimiter of the explicit reference form.
pub const START_DELIMITER: char = '(';
/// Closing delimiter of the explicit reference form.
pub const END_DELIMITER: char = ')';
/// Option suffix requesting the literal content of a text widget.
const VALUE_OPTION: &str = "value";

/// Split a reference body into its ordered token sequence.
///
/// Empty tokens (consecutive separators, or a trailing separator) are
/// preserved positionally: position determines whether a token plays the
/// organization, section, object, widget, or item role, so dropping one
/// would shift every later token into the wrong role. Consumers treat an
/// empty token as "no token here".
pub fn lex_reference(reference: &str) -> Vec<String> {
    if reference.is_empty() {
        return Vec::new();
    }
    return reference.split(TOKEN_SEPARATOR).map(str::to_string).collect();
}

/// Parse a matched message substring into the reference body plus its
/// options.
///
/// Two forms are accepted: the bare form `SYMBOLorg.section...` running
/// to the end of the match, and the delimited form `SYMBOL(reference)`
/// with an optional `.value` option after the closing delimiter. Returns
/// `None` for a structurally empty match (no reference body), which the
/// hyperlinker leaves as literal text.
pub fn parse_match(matched: &str, symbol: &str) -> Option<MatchOptions> {
    let rest = matched.strip_prefix(symbol)?;

    if let Some(body) = rest.strip_prefix(START_DELIMITER) {
        let (reference, option) = match body.split_once(END_DELIMITER) {
            Some((inner, after)) => (inner, after),
            None => (body, ""),
        };
        if reference.is_empty() {
            return None;
        }
        let is_value_needed = option
            .strip_prefix(TOKEN_SEPARATOR)
            .is_some_and(|o| o == VALUE_OPTION);
        return Some(MatchOptions {
            is_value_needed,
            reference: reference.to_string(),
        });
    }

    if rest.is_empty() {
        return None;
    }
    return Some(MatchOptions {
        is_value_needed: false,
        reference: rest.to_string(),
    });
}

/// The display fallback for a reference: the body with a single trailing
/// separator removed, so `acme.policies.` renders as `acme.policies`.
pub fn display_reference(reference: &str) -> &str {
    return reference
        .strip_suffix(TOKEN_SEPARATOR)
        .unwrap_or(reference);
}

/// Forward-only cursor over a token sequence.
///
/// Consumption is strictly left-to-right and monotonic by construction:
/// there is no way to step back, so no stage can re-examine a token an
/// earlier stage consumed. A stage that cannot interpret the upcoming
/// token peeks without taking it, leaving it for the next stage.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    position: usize,
    tokens: Vec<String>,
}

impl TokenCursor {
    /// Wrap a lexed token sequence.
    pub fn new(tokens: Vec<String>) -> Self {
        return Self { position: 0, tokens };
    }

    /// The upcoming token, without consuming it.
    pub fn peek(&self) -> Option<&str> {
        return self.tokens.get(self.position).map(String::as_str);
    }

    /// Consume and return the upcoming token.
    pub fn take(&mut self) -> Option<String> {
        let token = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        return Some(token);
    }

    /// Consume the upcoming token; an empty token counts as "no token"
    /// (it is still consumed, but yields `None`).
    pub fn take_nonempty(&mut self) -> Option<String> {
        let token = self.take()?;
        if token.is_empty() {
            return None;
        }
        return Some(token);
    }

    /// Number of tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        return self.tokens.len().saturating_sub(self.position);
    }

    /// Whether every token has been consumed.
    pub fn is_empty(&self) -> bool {
        return self.remaining() == 0;
    }

    /// The not-yet-consumed tail of the sequence.
    pub fn rest(&self) -> &[String] {
        return self.tokens.get(self.position..).unwrap_or(&[]);
    }
}
