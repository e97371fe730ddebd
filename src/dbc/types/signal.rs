use std::collections::BTreeMap;

use crate::codec::{self, SignalLayout};
use crate::dbc::types::{
    database::{DatabaseDBC, MessageKey, NodeKey},
    errors::CodecError,
    node::NodeDBC,
};

/// Definition of a signal within a CAN message (DBC).
///
/// Describes position/bit-length, endianness, sign, scaling (factor/offset),
/// documented range, unit of measure, value tables, and receiver nodes.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct SignalDBC {
    /// Parent message key.
    pub message: MessageKey,
    /// Signal name.
    pub name: String,
    /// Bit start in the payload (bit 0 = LSB of the first byte).
    pub bit_start: u16,
    /// Bit length.
    pub bit_length: u16,
    /// Endianness.
    pub endian: Endianness,
    /// Sign.
    pub sign: Signess,
    /// Scaling factor.
    pub factor: f64,
    /// Scaling offset.
    pub offset: f64,
    /// Minimum physical value (documented, not enforced at decode time).
    pub min: f64,
    /// Maximum physical value (documented, not enforced at decode time).
    pub max: f64,
    /// Unit of measure.
    pub unit_of_measurement: String,
    /// Receiver nodes. Empty means unbound (`Vector__XXX` on write).
    pub receiver_nodes: Vec<NodeKey>,
    /// Associated comment (DBC `CM_ SG_` section).
    pub comment: String,
    /// Value-to-text mapping (value table).
    pub value_table: BTreeMap<i64, String>,
}

impl SignalDBC {
    /// Returns an immutable reference to a receiver node by name (case-insensitive).
    pub fn get_receiver_nodes_by_name<'a>(
        &self,
        db: &'a DatabaseDBC,
        name: &str,
    ) -> Option<&'a NodeDBC> {
        let key = name.to_lowercase();
        self.receiver_nodes
            .iter()
            .filter_map(|&node_key| db.get_node_by_key(node_key))
            .find(|node| node.name.to_lowercase() == key)
    }

    /// Bit layout and scaling of this signal, in the shape the codec consumes.
    pub fn layout(&self) -> SignalLayout {
        SignalLayout {
            bit_start: self.bit_start,
            bit_length: self.bit_length,
            endian: self.endian,
            sign: self.sign,
            factor: self.factor,
            offset: self.offset,
        }
    }

    /// Extracts the raw integer value of this signal from a frame payload.
    #[inline]
    pub fn extract_raw(&self, payload: &[u8]) -> Result<i64, CodecError> {
        codec::extract_raw_i64(payload, self.bit_start, self.bit_length, self.endian, self.sign)
    }

    /// Decodes this signal from a frame payload into a physical value.
    #[inline]
    pub fn decode(&self, payload: &[u8]) -> Result<f64, CodecError> {
        Ok(codec::to_physical(
            self.extract_raw(payload)?,
            self.factor,
            self.offset,
        ))
    }

    /// Text mapped from the value table for a raw value, empty when absent.
    pub fn value_text(&self, raw: i64) -> String {
        self.value_table.get(&raw).cloned().unwrap_or_default()
    }

    /// Resets all fields to their default values.
    pub fn clear(&mut self) {
        *self = SignalDBC::default();
    }
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
pub enum Endianness {
    #[default]
    Motorola, // @0
    Intel, // @1
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
pub enum Signess {
    #[default]
    Unsigned, // +
    Signed, // -
}
