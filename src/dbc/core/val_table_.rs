use crate::dbc::core::val_;
use crate::dbc::types::database::DatabaseDBC;

/// Parse a named value-table definition:
/// `VAL_TABLE_ <TableName> <value> "<desc>" ... ;`
pub(crate) fn decode(db: &mut DatabaseDBC, line: &str) {
    let mut tokens = line.split_ascii_whitespace();
    if tokens.next() != Some("VAL_TABLE_") {
        return;
    }
    let table_name: &str = match tokens.next() {
        Some(n) => n,
        None => return,
    };

    let table = val_::collect_pairs(tokens);
    if !table.is_empty() {
        db.value_tables.insert(table_name.to_string(), table);
    }
}
