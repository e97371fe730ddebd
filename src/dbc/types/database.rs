//! DatabaseDBC model (SlotMap-backed).
//!
//! In-memory **CAN database** used by the DBC parser and the authoring path.
//! Storage uses **SlotMap** arenas with **stable keys**: [`NodeKey`],
//! [`MessageKey`], [`SignalKey`]. Public iteration follows **order vectors**
//! (file/authoring order) via `iter_nodes()`, `iter_messages()`,
//! `iter_signals()`.
//!
//! **Lookups** are normalized and O(1): `get_message_by_id/_hex/_name`,
//! `get_node_by_name`, `get_signal_by_name`. Names are case-insensitive;
//! hexadecimal IDs use uppercase `0x...` form. On duplicate ids or names the
//! first entry wins.

use slotmap::{SlotMap, new_key_type};
use std::collections::{BTreeMap, HashMap};

use crate::dbc::types::{
    message::{IdFormat, MessageDBC},
    node::NodeDBC,
    signal::{Endianness, SignalDBC, Signess},
};

// --- Stable keys (SlotMap) ---
new_key_type! { pub struct NodeKey; }
new_key_type! { pub struct MessageKey; }
new_key_type! { pub struct SignalKey; }

/// In-memory representation of a CAN database (DBC).
///
/// Holds the version string, the arenas of nodes/messages/signals (SlotMaps
/// with stable keys), order vectors controlling iteration order, the named
/// value tables (`VAL_TABLE_`), and normalized lookup maps for efficient
/// queries. Built once by the parser, or incrementally by an editing session
/// feeding the writer.
#[derive(Default, Clone, Debug)]
pub struct DatabaseDBC {
    /// Database version string (DBC `VERSION` line).
    pub version: String,

    // --- Main storage (stable-key maps) ---
    pub nodes: SlotMap<NodeKey, NodeDBC>,
    pub messages: SlotMap<MessageKey, MessageDBC>,
    pub signals: SlotMap<SignalKey, SignalDBC>,

    // --- Order "views" (file/authoring order) ---
    pub nodes_order: Vec<NodeKey>,
    pub messages_order: Vec<MessageKey>,
    pub signals_order: Vec<SignalKey>,

    /// Named value tables (DBC `VAL_TABLE_` section): name → value → label.
    pub value_tables: BTreeMap<String, BTreeMap<i64, String>>,

    // --- Lookups (case-normalized) ---
    pub(crate) node_key_by_name: HashMap<String, NodeKey>, // lower(name) → NodeKey
    pub(crate) msg_key_by_id: HashMap<u32, MessageKey>,    // actual id → MessageKey
    pub(crate) msg_key_by_hex: HashMap<String, MessageKey>, // "0x..." uppercase → MessageKey
    pub(crate) msg_key_by_name: HashMap<String, MessageKey>, // lower(name) → MessageKey

    // Global map for signals by (lower) name. Beware of collisions if two BO_
    // carry the same SG_ name: the first keeps the slot.
    pub(crate) sig_key_by_name: HashMap<String, SignalKey>,

    // Parsing state: last kept message (scopes subsequent SG_ lines).
    pub(crate) current_msg: Option<MessageKey>,
}

impl DatabaseDBC {
    // --------- Nodes --------

    /// Adds a node to the database if not already present and returns the
    /// corresponding `NodeKey`.
    pub fn add_node_if_absent(&mut self, name: &str) -> NodeKey {
        if let Some(r) = self.get_node_key_by_name(name) {
            return r;
        }
        let key: NodeKey = self.nodes.insert(NodeDBC {
            name: name.to_string(),
            ..Default::default()
        });
        self.nodes_order.push(key);
        self.node_key_by_name.insert(name.to_lowercase(), key);
        key
    }

    pub fn get_node_key_by_name(&self, name: &str) -> Option<NodeKey> {
        self.node_key_by_name.get(&name.to_lowercase()).copied()
    }

    pub fn get_node_by_key(&self, key: NodeKey) -> Option<&NodeDBC> {
        self.nodes.get(key)
    }

    pub fn get_node_by_key_mut(&mut self, key: NodeKey) -> Option<&mut NodeDBC> {
        self.nodes.get_mut(key)
    }

    /// Returns a `&NodeDBC` given the name (case-insensitive).
    pub fn get_node_by_name(&self, name: &str) -> Option<&NodeDBC> {
        let key: NodeKey = *self.node_key_by_name.get(&name.to_lowercase())?;
        self.get_node_by_key(key)
    }

    /// Returns a `&mut NodeDBC` given the name (case-insensitive).
    pub fn get_node_by_name_mut(&mut self, name: &str) -> Option<&mut NodeDBC> {
        let key: NodeKey = *self.node_key_by_name.get(&name.to_lowercase())?;
        self.get_node_by_key_mut(key)
    }

    // ------------- Messages ------------

    /// Adds a message and indexes its id/name. Also sets `current_msg` so
    /// subsequent `SG_` lines attach to it. On a duplicate name the existing
    /// message is returned unchanged.
    pub fn add_message_if_absent(
        &mut self,
        name: &str,
        id: u32,
        id_format: IdFormat,
        byte_length: u16,
        sender_name: &str,
    ) -> MessageKey {
        if let Some(r) = self.get_msg_key_by_name(name) {
            self.current_msg = Some(r);
            return r;
        }

        let sender_node_key: Option<NodeKey> = if !sender_name.is_empty() {
            Some(self.add_node_if_absent(sender_name))
        } else {
            None
        };

        let id_hex: String = format!("0x{:X}", id);
        let msg_key: MessageKey = self.messages.insert(MessageDBC {
            id_format,
            id,
            id_hex: id_hex.clone(),
            name: name.to_string(),
            byte_length,
            cycle_time: 0,
            sender_nodes: sender_node_key.into_iter().collect(),
            signals: Vec::new(),
            comment: String::new(),
        });

        self.messages_order.push(msg_key);

        self.msg_key_by_id.entry(id).or_insert(msg_key);
        self.msg_key_by_hex.entry(id_hex).or_insert(msg_key);
        self.msg_key_by_name.insert(name.to_lowercase(), msg_key);

        if let Some(nk) = sender_node_key
            && let Some(n) = self.nodes.get_mut(nk)
        {
            n.messages_sent.push(msg_key);
        }

        self.current_msg = Some(msg_key);
        msg_key
    }

    pub fn get_msg_key_by_name(&self, name: &str) -> Option<MessageKey> {
        self.msg_key_by_name.get(&name.to_lowercase()).copied()
    }

    pub fn get_msg_key_by_id(&self, id: u32) -> Option<MessageKey> {
        self.msg_key_by_id.get(&id).copied()
    }

    pub fn get_message_by_key(&self, key: MessageKey) -> Option<&MessageDBC> {
        self.messages.get(key)
    }

    pub fn get_message_by_key_mut(&mut self, key: MessageKey) -> Option<&mut MessageDBC> {
        self.messages.get_mut(key)
    }

    /// Returns a `&MessageDBC` given the actual numeric CAN ID (first match wins).
    pub fn get_message_by_id(&self, id: u32) -> Option<&MessageDBC> {
        let key: MessageKey = self.get_msg_key_by_id(id)?;
        self.get_message_by_key(key)
    }

    /// Returns a `&mut MessageDBC` given the actual numeric CAN ID.
    pub fn get_message_by_id_mut(&mut self, id: u32) -> Option<&mut MessageDBC> {
        let key: MessageKey = self.get_msg_key_by_id(id)?;
        self.get_message_by_key_mut(key)
    }

    /// Returns a `&MessageDBC` given a hexadecimal ID (case-insensitive).
    ///
    /// The argument may come in various forms, e.g., `"12dd54e3"`,
    /// `"0x12dd54e3"`, `"12DD54E3x"`; it is normalized internally to
    /// `"0x12DD54E3"`.
    pub fn get_message_by_id_hex(&self, id_hex: &str) -> Option<&MessageDBC> {
        let key: MessageKey = *self.msg_key_by_hex.get(&normalize_id_hex(id_hex))?;
        self.get_message_by_key(key)
    }

    /// Returns a `&MessageDBC` given the name (case-insensitive).
    pub fn get_message_by_name(&self, name: &str) -> Option<&MessageDBC> {
        let key: MessageKey = self.get_msg_key_by_name(name)?;
        self.get_message_by_key(key)
    }

    /// Returns a `&mut MessageDBC` given the name (case-insensitive).
    pub fn get_message_by_name_mut(&mut self, name: &str) -> Option<&mut MessageDBC> {
        let key: MessageKey = self.get_msg_key_by_name(name)?;
        self.get_message_by_key_mut(key)
    }

    // -------------- Signals ------------

    /// Adds a signal to `msg_key` if the message does not already contain one
    /// with the same name and returns the corresponding `SignalKey`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_signal_if_absent(
        &mut self,
        msg_key: MessageKey,
        name: &str,
        bit_start: u16,
        bit_length: u16,
        endian: Endianness,
        sign: Signess,
        factor: f64,
        offset: f64,
        min: f64,
        max: f64,
        unit: &str,
        receiver_nodes: Vec<NodeKey>,
    ) -> Option<SignalKey> {
        let existing: Option<SignalKey> = {
            let msg: &MessageDBC = self.get_message_by_key(msg_key)?;
            msg.signals.iter().copied().find(|&sk| {
                self.get_sig_by_key(sk)
                    .is_some_and(|s| s.name.eq_ignore_ascii_case(name))
            })
        };
        if existing.is_some() {
            return existing;
        }

        let sig: SignalDBC = SignalDBC {
            message: msg_key,
            name: name.to_string(),
            bit_start,
            bit_length,
            endian,
            sign,
            factor,
            offset,
            min,
            max,
            unit_of_measurement: unit.to_string(),
            receiver_nodes,
            comment: String::new(),
            value_table: BTreeMap::new(),
        };

        let sig_key: SignalKey = self.signals.insert(sig);
        self.signals_order.push(sig_key);

        if let Some(m) = self.messages.get_mut(msg_key) {
            m.signals.push(sig_key);
        }

        self.sig_key_by_name
            .entry(name.to_lowercase())
            .or_insert(sig_key);
        Some(sig_key)
    }

    pub fn get_sig_key_by_name(&self, name: &str) -> Option<SignalKey> {
        self.sig_key_by_name.get(&name.to_lowercase()).copied()
    }

    pub fn get_sig_by_key(&self, key: SignalKey) -> Option<&SignalDBC> {
        self.signals.get(key)
    }

    pub fn get_sig_by_key_mut(&mut self, key: SignalKey) -> Option<&mut SignalDBC> {
        self.signals.get_mut(key)
    }

    /// Returns a `&SignalDBC` given the name (case-insensitive).
    pub fn get_signal_by_name(&self, name: &str) -> Option<&SignalDBC> {
        let key: SignalKey = *self.sig_key_by_name.get(&name.to_lowercase())?;
        self.get_sig_by_key(key)
    }

    /// Returns a `&mut SignalDBC` given the name (case-insensitive).
    pub fn get_signal_by_name_mut(&mut self, name: &str) -> Option<&mut SignalDBC> {
        let key: SignalKey = *self.sig_key_by_name.get(&name.to_lowercase())?;
        self.get_sig_by_key_mut(key)
    }

    // -------------- Iteration ------------

    /// Iterate nodes following `nodes_order`.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &NodeDBC> + '_ {
        self.nodes_order.iter().filter_map(|&k| self.nodes.get(k))
    }

    /// Iterate messages following `messages_order`.
    pub fn iter_messages(&self) -> impl Iterator<Item = &MessageDBC> + '_ {
        self.messages_order
            .iter()
            .filter_map(|&k| self.messages.get(k))
    }

    /// Iterate signals following `signals_order`.
    pub fn iter_signals(&self) -> impl Iterator<Item = &SignalDBC> + '_ {
        self.signals_order
            .iter()
            .filter_map(|&k| self.signals.get(k))
    }

    /// Clear the database.
    pub fn clear(&mut self) {
        *self = DatabaseDBC::default();
    }
}

// --- helpers ---

/// Normalizes a hexadecimal ID string.
///
/// Converts variants like `"12DD54E3x"`, `"0x12dd54e3"`, `"12dd54e3"` into
/// the canonical `"0x12DD54E3"` form.
pub(crate) fn normalize_id_hex(s: &str) -> String {
    let t: &str = s.trim();
    let t: &str = t
        .strip_suffix('x')
        .or_else(|| t.strip_suffix('X'))
        .unwrap_or(t);
    let t: &str = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .unwrap_or(t);
    format!("0x{}", t.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_hex_variants() {
        assert_eq!(normalize_id_hex("12dd54e3"), "0x12DD54E3");
        assert_eq!(normalize_id_hex("0x12dd54e3"), "0x12DD54E3");
        assert_eq!(normalize_id_hex("12DD54E3x"), "0x12DD54E3");
    }

    #[test]
    fn duplicate_message_names_keep_the_first() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        let first = db.add_message_if_absent("Motor_01", 0x100, IdFormat::Standard, 8, "Motor");
        let second = db.add_message_if_absent("Motor_01", 0x200, IdFormat::Standard, 8, "Motor");
        assert_eq!(first, second);
        assert_eq!(db.messages.len(), 1);
        assert_eq!(db.get_message_by_id(0x100).unwrap().name, "Motor_01");
    }

    #[test]
    fn signal_names_are_scoped_to_their_message() {
        let mut db: DatabaseDBC = DatabaseDBC::default();
        let m1 = db.add_message_if_absent("A", 0x100, IdFormat::Standard, 8, "ECU");
        let m2 = db.add_message_if_absent("B", 0x200, IdFormat::Standard, 8, "ECU");
        let s1 = db
            .add_signal_if_absent(
                m1, "Speed", 0, 8, Endianness::Intel, Signess::Unsigned, 1.0, 0.0, 0.0, 255.0,
                "", Vec::new(),
            )
            .unwrap();
        // Same name in another message is a distinct signal.
        let s2 = db
            .add_signal_if_absent(
                m2, "Speed", 8, 8, Endianness::Intel, Signess::Unsigned, 1.0, 0.0, 0.0, 255.0,
                "", Vec::new(),
            )
            .unwrap();
        assert_ne!(s1, s2);
        // Same name in the same message returns the existing one.
        let again = db
            .add_signal_if_absent(
                m1, "speed", 0, 4, Endianness::Intel, Signess::Unsigned, 1.0, 0.0, 0.0, 15.0,
                "", Vec::new(),
            )
            .unwrap();
        assert_eq!(again, s1);
        assert_eq!(db.get_message_by_key(m1).unwrap().signals.len(), 1);
    }
}
