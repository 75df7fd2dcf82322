// Broadcast channel names and the JSON envelope sent over the socket
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Synthetic beacon positions
    Coords,
    /// One message per matching database change
    FlightCoords,
}

impl Channel {
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Coords => "coords",
            Channel::FlightCoords => "flight_coords",
        }
    }
}

#[derive(Serialize)]
struct OutgoingEnvelope<'a, T> {
    event: Channel,
    data: &'a T,
}

/// A decoded envelope as seen by a client: `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelMessage {
    pub event: Channel,
    pub data: Value,
}

/// Serialize a payload into a text frame for the given channel
pub fn encode_message<T: Serialize>(channel: Channel, data: &T) -> serde_json::Result<String> {
    serde_json::to_string(&OutgoingEnvelope {
        event: channel,
        data,
    })
}

impl ChannelMessage {
    pub fn decode(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
