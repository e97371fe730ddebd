use crate::dbc::types::{
    database::{DatabaseDBC, NodeKey, SignalKey},
    signal::SignalDBC,
};

/// CAN message defined in the database.
///
/// Maintains the actual numeric ID (`id`, after extended-frame disambiguation),
/// the normalized hexadecimal ID (`id_hex`), the `name`, payload length
/// (`byte_length`), the cycle time, the transmitting nodes (`sender_nodes`)
/// and the list of composing signals (`signals`).
#[derive(Default, Clone, PartialEq, Debug)]
pub struct MessageDBC {
    /// ID format (Standard or Extended).
    pub id_format: IdFormat,
    /// Actual numeric CAN ID, without the raw-encoding flag bit.
    pub id: u32,
    /// **Normalized** hexadecimal CAN ID (`"0x..."`, uppercase).
    pub id_hex: String,
    /// Message name.
    pub name: String,
    /// Payload length in bytes (DLC, 0..=8 for classic CAN).
    pub byte_length: u16,
    /// Cycle time in milliseconds (`GenMsgCycleTime`; 0 = unknown/aperiodic).
    pub cycle_time: u32,
    /// Transmitting nodes (ECUs) for this message.
    pub sender_nodes: Vec<NodeKey>,
    /// Signals that belong to this message, in file/authoring order.
    pub signals: Vec<SignalKey>,
    /// Associated comment (DBC `CM_ BO_` section).
    pub comment: String,
}

impl MessageDBC {
    /// Resets all fields to their default values.
    pub fn clear(&mut self) {
        *self = MessageDBC::default();
    }

    /// Convenience iterator over the `SignalDBC`s belonging to this message.
    pub fn signals<'a>(&'a self, db: &'a DatabaseDBC) -> impl Iterator<Item = &'a SignalDBC> + 'a {
        self.signals
            .iter()
            .filter_map(move |&key| db.get_sig_by_key(key))
    }

    /// Raw identifier as written on a `BO_` line: extended messages carry the
    /// canonical `actual + 0x8000_0000` encoding.
    pub fn raw_id(&self) -> u32 {
        match self.id_format {
            IdFormat::Extended => self.id + 0x8000_0000,
            IdFormat::Standard => self.id,
        }
    }
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
pub enum IdFormat {
    #[default]
    Standard,
    Extended,
}

impl IdFormat {
    pub fn to_str(&self) -> String {
        match self {
            IdFormat::Standard => "Standard".to_string(),
            IdFormat::Extended => "Extended".to_string(),
        }
    }
}
