use std::collections::BTreeMap;

use crate::dbc::core::can_id;
use crate::dbc::types::database::DatabaseDBC;

/// Parse a VAL_ line that defines a value table for a specific signal:
/// `VAL_ <RawMessageID> <SignalName> <value> "<desc>" ... ;`
pub(crate) fn decode(db: &mut DatabaseDBC, line: &str) {
    let mut tokens = line.split_ascii_whitespace();
    if tokens.next() != Some("VAL_") {
        return;
    }
    let raw_id: u32 = match tokens.next().and_then(|t| t.parse::<u32>().ok()) {
        Some(v) => v,
        None => return,
    };
    let (message_id, _) = can_id::convert_raw_id(raw_id);
    let signal_name: &str = match tokens.next() {
        Some(n) => n,
        None => return,
    };

    let table: BTreeMap<i64, String> = collect_pairs(tokens);
    if table.is_empty() {
        return;
    }

    if let Some(msg) = db.get_message_by_id(message_id)
        && let Some(&sig_key) = msg.signals.iter().find(|&&sig_key| {
            db.get_sig_by_key(sig_key)
                .is_some_and(|s| s.name == signal_name)
        })
        && let Some(s) = db.get_sig_by_key_mut(sig_key)
    {
        s.value_table = table;
    }
}

/// Collect `<value> "<desc>"` pairs; descriptions may span several tokens.
pub(crate) fn collect_pairs<'a>(tokens: impl Iterator<Item = &'a str>) -> BTreeMap<i64, String> {
    let mut table: BTreeMap<i64, String> = BTreeMap::new();
    let mut t = tokens.peekable();
    while let Some(val_tok) = t.next() {
        if val_tok.starts_with(';') {
            break;
        }
        let val: i64 = match val_tok.parse::<i64>() {
            Ok(v) => v,
            Err(_) => break,
        };
        // The closing quote may carry the statement's ';' glued to it.
        let closed = |s: &str| {
            let t: &str = s.trim_end_matches(';');
            t.len() >= 2 && t.ends_with('"')
        };
        let mut desc = String::new();
        match t.next() {
            Some(d) if d.starts_with('"') => {
                desc.push_str(d);
                while !closed(&desc) {
                    if let Some(nxt) = t.next() {
                        desc.push(' ');
                        desc.push_str(nxt);
                    } else {
                        break;
                    }
                }
                desc = desc.trim_end_matches(';').trim_matches('"').to_string();
            }
            _ => break, // unexpected token; stop
        }
        table.insert(val, desc);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::message::IdFormat;
    use crate::dbc::types::signal::{Endianness, Signess};

    #[test]
    fn value_table_lands_on_the_signal() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        let mk = db.add_message_if_absent("Motor_01", 0x16A9_549D, IdFormat::Extended, 8, "Motor");
        db.add_signal_if_absent(
            mk, "Status", 61, 1, Endianness::Intel, Signess::Unsigned, 1.0, 0.0, 0.0, 1.0, "",
            Vec::new(),
        )
        .unwrap();
        decode(&mut db, r#"VAL_ 2527679645 Status 1 "On" 0 "Off" ;"#);
        let sig = db.get_signal_by_name("Status").unwrap();
        assert_eq!(sig.value_text(1), "On");
        assert_eq!(sig.value_text(0), "Off");
        assert_eq!(sig.value_text(7), "");
    }

    #[test]
    fn descriptions_with_spaces() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        let mk = db.add_message_if_absent("M", 0x100, IdFormat::Standard, 8, "ECU");
        db.add_signal_if_absent(
            mk, "Overheat", 62, 1, Endianness::Intel, Signess::Unsigned, 1.0, 0.0, 0.0, 1.0, "",
            Vec::new(),
        )
        .unwrap();
        decode(&mut db, r#"VAL_ 256 Overheat 1 "Overheat failure" 0 "No Overheat" ;"#);
        let sig = db.get_signal_by_name("Overheat").unwrap();
        assert_eq!(sig.value_text(1), "Overheat failure");
    }
}
