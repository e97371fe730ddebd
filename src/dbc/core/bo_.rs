use crate::dbc::core::can_id;
use crate::dbc::types::database::DatabaseDBC;
use crate::dbc::types::message::IdFormat;

/// Decode a `BO_` line robustly using `:` as separator between name and length.
/// Accepts both: `BO_ 123 NAME: 8 Node` and `BO_ 123 NAME : 8 Node`.
pub(crate) fn decode(db: &mut DatabaseDBC, line: &str) {
    let line: &str = line.trim();
    if !line.starts_with("BO_") {
        return;
    }

    // Strip leading "BO_"
    let after: &str = line.trim_start_matches("BO_").trim();

    // 1) raw ID (first token)
    let mut split_once = after.splitn(2, char::is_whitespace);
    let id_str: &str = split_once.next().unwrap_or("");
    let rest: &str = split_once.next().unwrap_or("").trim();
    let raw_id: u32 = match id_str.parse::<u32>() {
        Ok(v) => v,
        Err(_) => return,
    };

    // 2) NAME (everything up to the first ':')
    let colon_pos: usize = match rest.find(':') {
        Some(p) => p,
        None => return,
    };
    let name: &str = rest[..colon_pos].trim().trim_end_matches(':');
    if name.is_empty() {
        return;
    }

    // 3) After ':' → <len> <sender?>
    let mut it = rest[colon_pos + 1..].trim().split_ascii_whitespace();
    let byte_length: u16 = it.next().and_then(|t| t.parse::<u16>().ok()).unwrap_or(0);
    let sender_name: &str = it.next().unwrap_or("").trim_end_matches(';');

    // Tool-internal "unbound signal" placeholders never enter the database;
    // clearing current_msg drops their SG_ lines with them.
    if name.contains("INDEPENDENT_SIG_MSG") || raw_id >= can_id::PLACEHOLDER_ID_FLOOR {
        db.current_msg = None;
        return;
    }

    let (id, id_format) = can_id::convert_raw_id(raw_id);
    if id_format == IdFormat::Extended && id > can_id::MAX_EXTENDED_ID {
        db.current_msg = None;
        return;
    }

    db.add_message_if_absent(name, id, id_format, byte_length, sender_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_standard_message() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        decode(&mut db, "BO_ 708 ZV_04: 8 Gateway");
        let msg = db.get_message_by_id(708).expect("message missing");
        assert_eq!(msg.name, "ZV_04");
        assert_eq!(msg.id_format, IdFormat::Standard);
        assert_eq!(msg.byte_length, 8);
        assert_eq!(msg.id_hex, "0x2C4");
        assert!(db.get_node_by_name("Gateway").is_some());
    }

    #[test]
    fn canonical_extended_message() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        decode(&mut db, "BO_ 2527679645 Motor_01: 8 Motor");
        // 2527679645 = 0x96A9549D → actual 0x16A9549D, extended
        let msg = db.get_message_by_id(0x16A9_549D).expect("message missing");
        assert_eq!(msg.id_format, IdFormat::Extended);
        assert_eq!(msg.raw_id(), 2527679645);
    }

    #[test]
    fn placeholder_messages_are_discarded() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        decode(&mut db, "BO_ 3221225472 VECTOR__INDEPENDENT_SIG_MSG: 0 Vector__XXX");
        assert!(db.messages.is_empty());
        assert!(db.current_msg.is_none());

        decode(&mut db, "BO_ 3221225473 Whatever: 8 ECU");
        assert!(db.messages.is_empty());
    }

    #[test]
    fn out_of_range_extended_ids_are_discarded() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        // 0x20000000 is above the 29-bit ceiling in the simplified encoding.
        decode(&mut db, "BO_ 536870912 TooBig: 8 ECU");
        assert!(db.messages.is_empty());
    }
}
