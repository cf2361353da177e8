//! Naming utilities for ddlforge
//!
//! Identifier comparison, quoting, truncation and deterministic constraint
//! naming shared by every dialect.

use crate::dialect::DialectProfile;

/// Compare two identifiers under the given case sensitivity
pub fn names_equal(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

/// Check if a name is a reserved SQL keyword
pub fn is_sql_keyword(name: &str) -> bool {
    // Common SQL keywords across databases
    const SQL_KEYWORDS: &[&str] = &[
        "add", "all", "alter", "and", "any", "as", "asc", "backup", "begin", "between",
        "by", "case", "check", "column", "constraint", "create", "database", "default",
        "delete", "desc", "distinct", "drop", "else", "end", "except", "exec", "exists",
        "foreign", "from", "full", "group", "having", "in", "index", "inner", "insert",
        "intersect", "into", "is", "join", "key", "left", "like", "limit", "not",
        "null", "on", "or", "order", "outer", "primary", "procedure", "right",
        "rownum", "select", "set", "table", "top", "truncate", "union", "unique",
        "update", "values", "view", "where", "with"
    ];

    SQL_KEYWORDS.contains(&name.to_lowercase().as_str())
}

/// Whether an identifier can be emitted without quoting
fn is_safe_unquoted(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote an identifier for the given dialect.
///
/// Quoting is applied when the dialect always quotes, when the name collides
/// with a reserved word, or when it contains characters that are unsafe
/// unquoted.
pub fn quote_identifier(name: &str, profile: &DialectProfile) -> String {
    let reserved = profile
        .reserved_words
        .iter()
        .any(|w| w.eq_ignore_ascii_case(name))
        || is_sql_keyword(name);

    if profile.always_quote || reserved || !is_safe_unquoted(name) {
        format!("{}{}{}", profile.quote_open, name, profile.quote_close)
    } else {
        name.to_string()
    }
}

/// Truncate an identifier to fit database limits
pub fn truncate_identifier(name: &str, max_length: usize) -> String {
    if name.len() <= max_length {
        name.to_string()
    } else {
        // Calculate how much of the original name we can keep
        // We need space for the hash (8 chars) and the underscore (1 char)
        let keep_length = max_length.saturating_sub(9);

        // Generate hash of the full name for uniqueness
        let hash = format!("{:x}", md5::compute(name.as_bytes()));

        let prefix = if keep_length < name.len() {
            &name[0..keep_length]
        } else {
            name
        };

        format!("{}_{}", prefix, &hash[0..8])
    }
}

/// Build a deterministic constraint name from a table, a short tag and the
/// affected columns.
///
/// Repeated generation runs over the same model must produce identical names,
/// so the name is a pure function of its inputs: parts joined by underscores,
/// truncated with a hash suffix when the dialect's identifier limit is
/// exceeded.
pub fn constraint_name(table: &str, tag: &str, parts: &[&str], max_length: usize) -> String {
    let mut pieces = vec![table, tag];
    pieces.extend_from_slice(parts);
    truncate_identifier(&pieces.join("_"), max_length)
}

/// The name under which a foreign key is created: its explicit name when
/// present, otherwise one derived from table, local columns and target table
pub fn foreign_key_name(
    table: &str,
    fk: &crate::model::ForeignKey,
    max_length: usize,
) -> String {
    match &fk.name {
        Some(name) => truncate_identifier(name, max_length),
        None => {
            let mut parts: Vec<&str> = fk.references.iter().map(|r| r.local.as_str()).collect();
            parts.push(fk.foreign_table.as_str());
            constraint_name(table, "fk", &parts, max_length)
        }
    }
}

/// The deterministic name of the primary key constraint of a table
pub fn primary_key_name(table: &str, max_length: usize) -> String {
    constraint_name(table, "pk", &[], max_length)
}
