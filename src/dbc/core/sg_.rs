use crate::dbc::types::database::{DatabaseDBC, MessageKey, NodeKey};
use crate::dbc::types::signal::{Endianness, Signess};

/// Decode a `SG_` line belonging to the **current message** (the last kept BO_).
/// Format (typical):
/// SG_ <name> [M|mX] : <bit_start>|<bit_length>@<endian><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers...>
///
/// A multiplex tag after the name is tolerated and skipped; multiplex
/// expansion is not modeled.
pub(crate) fn decode(db: &mut DatabaseDBC, line: &str) {
    let msg_key: MessageKey = match db.current_msg {
        Some(k) => k,
        None => return,
    };

    let line: &str = line.trim_start().trim_end_matches(';');
    let mut split_colon = line.splitn(2, ':');
    let left: &str = split_colon.next().unwrap_or("").trim(); // "SG_ NAME [M|mX]"
    let right: &str = split_colon.next().unwrap_or("").trim();

    // Left part analysis: SG_ NAME [M|mX]
    let mut left_it = left.split_ascii_whitespace();
    let _sg: &str = left_it.next().unwrap_or(""); // "SG_"
    let name: &str = left_it.next().unwrap_or("");
    if name.is_empty() || right.is_empty() {
        return;
    }

    // Right part analysis: <bit_start>|<bit_length>@<endian><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers...>
    let mut it = right.split_ascii_whitespace();

    // 1) bit info: "63|1@1+"
    let bit_info: &str = it.next().unwrap_or("");
    let mut bit_and_rest = bit_info.split('@');
    let bit_pos_len: &str = bit_and_rest.next().unwrap_or(""); // "63|1"
    let es: &str = bit_and_rest.next().unwrap_or(""); // "1+"
    let mut pos_len = bit_pos_len.split('|');
    let bit_start: u16 = pos_len.next().unwrap_or("0").parse().unwrap_or(0);
    let bit_length: u16 = pos_len.next().unwrap_or("0").parse().unwrap_or(0);
    if bit_length == 0 {
        return;
    }
    let endian: Endianness = match es.chars().next().unwrap_or('1') {
        '0' => Endianness::Motorola,
        _ => Endianness::Intel,
    };
    let sign: Signess = if es.chars().nth(1).unwrap_or('+') == '-' {
        Signess::Signed
    } else {
        Signess::Unsigned
    };

    // 2) "(factor,offset)"
    let mut factor: f64 = 1.0;
    let mut offset: f64 = 0.0;
    if let Some(paren) = it.next()
        && paren.starts_with('(')
    {
        let mut acc = String::from(paren);
        // Might be split across tokens; gather until ')'
        while !acc.ends_with(')') {
            if let Some(tok) = it.next() {
                acc.push(' ');
                acc.push_str(tok);
            } else {
                break;
            }
        }
        let inner: &str = acc.trim_start_matches('(').trim_end_matches(')');
        let mut nums = inner.split(',').map(|s| s.trim());
        factor = nums.next().unwrap_or("1").parse().unwrap_or(1.0);
        offset = nums.next().unwrap_or("0").parse().unwrap_or(0.0);
    }

    // 3) "[min|max]"
    let mut min: f64 = 0.0;
    let mut max: f64 = 0.0;
    let bounds_token: &str = it.next().unwrap_or("");
    let (mut seen_bounds, mut next_tok_cache) = (false, String::new());
    if bounds_token.starts_with('[') && bounds_token.contains('|') {
        seen_bounds = true;
        let mut b = String::from(bounds_token);
        while !b.ends_with(']') {
            if let Some(tok) = it.next() {
                b.push(' ');
                b.push_str(tok);
            } else {
                break;
            }
        }
        let inner: &str = b.trim_start_matches('[').trim_end_matches(']');
        let mut nums = inner.split('|').map(|s| s.trim());
        min = nums.next().unwrap_or("0").parse().unwrap_or(0.0);
        max = nums.next().unwrap_or("0").parse().unwrap_or(0.0);
    } else {
        next_tok_cache = bounds_token.to_string();
    }

    // 4) "unit"
    let unit_token: Option<&str> = if seen_bounds {
        it.next()
    } else {
        Some(next_tok_cache.as_str())
    };
    let unit_raw: &str = unit_token.unwrap_or("").trim();
    let unit: String = if unit_raw.starts_with('"') && !(unit_raw.len() >= 2 && unit_raw.ends_with('"')) {
        // gather full quoted unit split across tokens
        let mut acc: String = String::from(unit_raw);
        while !acc.ends_with('"') {
            if let Some(tok) = it.next() {
                acc.push(' ');
                acc.push_str(tok);
            } else {
                break;
            }
        }
        acc.trim_matches('"').to_string()
    } else {
        unit_raw.trim_matches('"').to_string()
    };

    // 5) receivers (comma-separated; empty or Vector__XXX means unbound)
    let mut receiver_nodes: Vec<NodeKey> = Vec::new();
    if let Some(recv) = it.next() {
        for node_name in recv.split(',') {
            let node_name: &str = node_name.trim();
            if node_name.is_empty() || node_name == "Vector__XXX" {
                continue;
            }
            if let Some(key) = db.get_node_key_by_name(node_name) {
                receiver_nodes.push(key);
            }
        }
    }

    let _ = db.add_signal_if_absent(
        msg_key,
        name,
        bit_start,
        bit_length,
        endian,
        sign,
        factor,
        offset,
        min,
        max,
        &unit,
        receiver_nodes,
    );
}
