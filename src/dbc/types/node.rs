use crate::dbc::types::database::MessageKey;

/// Node/ECU defined in the database.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct NodeDBC {
    /// Node/ECU name.
    pub name: String,
    /// Associated comment (DBC `CM_ BU_` section).
    pub comment: String,
    /// Messages transmitted by this node.
    pub messages_sent: Vec<MessageKey>,
}

impl NodeDBC {
    /// Resets all fields to their default values.
    pub fn clear(&mut self) {
        *self = NodeDBC::default();
    }
}
