use crate::dbc::core::can_id;
use crate::dbc::types::database::{DatabaseDBC, SignalKey};

// CM_ statements embed the same raw identifier encoding as BO_ lines, so the
// identical transform runs before any lookup.

/// Parse a node-level comment:
/// `CM_ BU_ <NodeName> "Comment...";`
pub(crate) fn decode_node(db: &mut DatabaseDBC, text: &str) {
    let parts: Vec<&str> = text.split_ascii_whitespace().collect();
    if parts.len() < 3 {
        return;
    }
    let node_name: &str = parts[2];
    let Some(comment) = quoted_body(text) else {
        return;
    };
    if let Some(node) = db.get_node_by_name_mut(node_name) {
        node.comment = comment;
    }
}

/// Parse a message-level comment:
/// `CM_ BO_ <RawMessageID> "Comment...";`
pub(crate) fn decode_message(db: &mut DatabaseDBC, text: &str) {
    let parts: Vec<&str> = text.split_ascii_whitespace().collect();
    if parts.len() < 3 {
        return;
    }
    let raw_id: u32 = match parts[2].parse::<u32>() {
        Ok(v) => v,
        Err(_) => return,
    };
    let (id, _) = can_id::convert_raw_id(raw_id);
    let Some(comment) = quoted_body(text) else {
        return;
    };
    if let Some(msg) = db.get_message_by_id_mut(id) {
        msg.comment = comment;
    }
}

/// Parse a signal-level comment:
/// `CM_ SG_ <RawMessageID> <SignalName> "Comment...";`
pub(crate) fn decode_signal(db: &mut DatabaseDBC, text: &str) {
    let parts: Vec<&str> = text.split_ascii_whitespace().collect();
    if parts.len() < 4 {
        return;
    }
    let raw_id: u32 = match parts[2].parse::<u32>() {
        Ok(v) => v,
        Err(_) => return,
    };
    let (id, _) = can_id::convert_raw_id(raw_id);
    let signal_name: &str = parts[3];

    // Resolve the SignalKey by name within the message, keeping the
    // immutable borrow confined to this block.
    let sig_key_opt: Option<SignalKey> = {
        let msg = match db.get_message_by_id(id) {
            Some(m) => m,
            None => return,
        };
        msg.signals.iter().copied().find(|&sig_key| {
            db.get_sig_by_key(sig_key)
                .is_some_and(|s| s.name.eq_ignore_ascii_case(signal_name))
        })
    };

    if let Some(sig_key) = sig_key_opt
        && let Some(comment) = quoted_body(text)
        && let Some(s) = db.get_sig_by_key_mut(sig_key)
    {
        s.comment = comment;
    }
}

// Comment body between the first and last double quote.
fn quoted_body(text: &str) -> Option<String> {
    let first: usize = text.find('"')?;
    let last: usize = text.rfind('"')?;
    if last > first {
        Some(text[first + 1..last].to_string())
    } else {
        None
    }
}
