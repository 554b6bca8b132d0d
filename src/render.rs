// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML email body rendering.
//!
//! The rendered document is sent as an email body and may be opened by
//! arbitrary mail clients, so every field value passes through
//! [`sanitize`] before interpolation. That strip is the sole injection
//! defense on this path.

use crate::validator::Submission;
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();
    TAG_PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"))
}

/// Remove every `<...>` run from a field value.
///
/// An unterminated `<tag` survives, which mail clients show as inert
/// text since the tag never closes.
pub fn sanitize(input: &str) -> String {
    tag_pattern().replace_all(input, "").into_owned()
}

/// Render the labeled-table email body for a validated submission.
/// Empty values render as a literal `-`.
pub fn render_email(submission: &Submission) -> String {
    let rows: [(&str, String); 11] = [
        ("NOME", sanitize(&submission.name)),
        ("CIDADE", sanitize(&submission.city)),
        ("TELEFONE", sanitize(&submission.phone)),
        ("ÍNICIA EM", sanitize(&submission.start_date)),
        ("CONTRATO", sanitize(&submission.contract_type)),
        ("CARGO DE", sanitize(&submission.role_title)),
        ("TURNO", sanitize(&submission.shift)),
        ("VALOR VT", sanitize(&submission.transit_allowance)),
        ("CHAVE PIX", sanitize(&submission.pix_key)),
        ("BANCO", sanitize(&submission.bank)),
        ("SUPERVISOR RESPONSÁVEL", sanitize(&submission.supervisor_name)),
    ];

    let mut html = String::new();
    html.push_str("<div style=\"font-family: -apple-system, Segoe UI, Roboto, Arial;\">\n");
    html.push_str("<h2 style=\"margin:0 0 12px;\">Cadastro de Candidato</h2>\n");
    html.push_str(
        "<table cellpadding=\"8\" cellspacing=\"0\" style=\"border-collapse: collapse; width: 100%;\">\n",
    );

    for (label, value) in &rows {
        let value = if value.is_empty() { "-" } else { value };
        let _ = write!(
            html,
            "<tr>\
             <td style=\"border:1px solid #e5e5e5; background:#fafafa; width: 40%; font-weight:600;\">{}</td>\
             <td style=\"border:1px solid #e5e5e5;\">{}</td>\
             </tr>\n",
            label, value
        );
    }

    html.push_str("</table>\n</div>\n");
    html
}
