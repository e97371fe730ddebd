use crate::dbc::core::{can_id, strings};
use crate::dbc::types::database::DatabaseDBC;

/// Parse a message attribute assignment. Only the transmission-period
/// attribute is extracted; every other attribute is ignored:
/// `BA_ "GenMsgCycleTime" BO_ <RawMessageID> <milliseconds>;`
pub(crate) fn decode(db: &mut DatabaseDBC, line: &str) {
    let attr_name: String = match strings::collect_all_quoted(line).into_iter().next() {
        Some(n) => n,
        None => return,
    };
    if attr_name != "GenMsgCycleTime" {
        return;
    }

    // Tokens after the quoted name: BO_ <raw id> <value>;
    let tail: &str = match line.split('"').nth(2) {
        Some(t) => t,
        None => return,
    };
    let mut it = tail.split_ascii_whitespace();
    if it.next() != Some("BO_") {
        return;
    }
    let raw_id: u32 = match it.next().and_then(|t| t.parse::<u32>().ok()) {
        Some(v) => v,
        None => return,
    };
    let (id, _) = can_id::convert_raw_id(raw_id);

    let cycle_time: u32 = it
        .next()
        .map(|t| t.trim_end_matches(';'))
        .and_then(|t| t.parse::<u32>().ok())
        .unwrap_or(0);

    if let Some(msg) = db.get_message_by_id_mut(id) {
        msg.cycle_time = cycle_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::message::IdFormat;

    #[test]
    fn cycle_time_lands_on_the_message() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        db.add_message_if_absent("Motor_01", 0x123, IdFormat::Extended, 8, "Motor");
        decode(&mut db, r#"BA_ "GenMsgCycleTime" BO_ 2147483939 100;"#);
        // 2147483939 = 0x123 + 0x80000000
        assert_eq!(db.get_message_by_id(0x123).unwrap().cycle_time, 100);
    }

    #[test]
    fn other_attributes_are_ignored() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        db.add_message_if_absent("Motor_01", 0x123, IdFormat::Standard, 8, "Motor");
        decode(&mut db, r#"BA_ "GenMsgSendType" BO_ 291 1;"#);
        assert_eq!(db.get_message_by_id(0x123).unwrap().cycle_time, 0);
    }
}
