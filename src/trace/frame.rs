/// A single timestamped frame from a CAN trace.
///
/// Produced by an external log reader. The analyzer only assumes that
/// timestamps within one identifier's substream are usable for interval
/// computation; frames are stable-sorted per identifier on ingestion, so the
/// source log does not have to be globally time-sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRecord {
    /// Relative timestamp in seconds since trace start.
    pub timestamp: f64,
    /// Actual numeric CAN identifier.
    pub id: u32,
    /// Payload bytes (length = DLC, up to 8 for classic CAN).
    pub payload: Vec<u8>,
}

impl FrameRecord {
    pub fn new(timestamp: f64, id: u32, payload: Vec<u8>) -> Self {
        FrameRecord {
            timestamp,
            id,
            payload,
        }
    }
}
