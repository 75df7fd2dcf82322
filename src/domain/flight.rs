// Flight domain models - raw change-feed records and the broadcast payload
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One change notification from the feed. Deletions carry no `new_val`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEvent {
    #[serde(default)]
    pub new_val: Option<FlightRecord>,
    #[serde(default)]
    pub old_val: Option<FlightRecord>,
}

/// A row of the flights table, with the column spelling the database uses
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlightRecord {
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub icao: Option<String>,
    pub op: Option<String>,
    pub op_icao: Option<String>,
    pub post_time: Option<Value>,
}

/// Payload of the `flight_coords` channel. Missing fields are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightCoords {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
}

impl From<FlightRecord> for FlightCoords {
    fn from(record: FlightRecord) -> Self {
        Self {
            lat: record.lat,
            lng: record.long,
            from: record.from,
            to: record.to,
            icao: record.icao,
            op: record.op,
            time: record.post_time,
        }
    }
}

impl ChangeEvent {
    /// Flatten the new value into a broadcast payload, if the change has one
    pub fn into_coords(self) -> Option<FlightCoords> {
        self.new_val.map(FlightCoords::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_event_to_payload() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "new_val": {
                "Lat": 40.1,
                "Long": -3.7,
                "Icao": "IBE123",
                "From": "MAD",
                "To": "LHR",
                "PostTime": 1000
            },
            "old_val": null
        }))
        .unwrap();

        let coords = event.into_coords().unwrap();
        assert_eq!(
            serde_json::to_value(&coords).unwrap(),
            json!({
                "lat": 40.1,
                "lng": -3.7,
                "icao": "IBE123",
                "from": "MAD",
                "to": "LHR",
                "time": 1000
            })
        );
    }

    #[test]
    fn test_operator_is_copied_when_present() {
        let record: FlightRecord = serde_json::from_value(json!({
            "Lat": 51.47,
            "Long": -0.45,
            "Icao": "3C6444",
            "Op": "Iberia",
            "OpIcao": "IBE",
            "PostTime": "1473156000000",
            "Spd": 420.0
        }))
        .unwrap();
        assert_eq!(record.op_icao.as_deref(), Some("IBE"));

        let coords = FlightCoords::from(record);
        assert_eq!(coords.op.as_deref(), Some("Iberia"));
        assert_eq!(coords.time, Some(json!("1473156000000")));
    }

    #[test]
    fn test_deletion_has_no_payload() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "new_val": null,
            "old_val": { "Icao": "IBE123", "Lat": 1.0, "Long": 2.0 }
        }))
        .unwrap();

        assert!(event.old_val.is_some());
        assert!(event.into_coords().is_none());
    }
}
