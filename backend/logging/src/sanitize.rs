//! Escaping for untrusted log fields.
//!
//! `NodePublic` and `Source` come straight from the network. Control
//! characters are escaped so a caller cannot break a console line, forge a
//! second record, or smuggle ANSI sequences into an operator's terminal.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static CONTROL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F]").expect("static regex"));

/// Returns `input` with every ASCII control character escaped.
/// Borrows when there is nothing to escape.
pub fn sanitize_field(input: &str) -> Cow<'_, str> {
    CONTROL_RE.replace_all(input, |caps: &Captures| {
        caps[0].chars().flat_map(char::escape_default).collect::<String>()
    })
}
