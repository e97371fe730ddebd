use crate::dbc::types::database::DatabaseDBC;

/// Decode the `VERSION "x.y"` header line.
pub(crate) fn decode(db: &mut DatabaseDBC, line: &str) {
    let rest: &str = line.trim();
    let rest: &str = rest
        .strip_prefix("VERSION")
        .or_else(|| rest.strip_prefix("version"))
        .unwrap_or(rest);
    db.version = rest.trim().trim_matches('"').to_string();
}
