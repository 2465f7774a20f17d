//! Journey result documents.
//!
//! These are the documents the journey cache stores and the API returns:
//! a journey is an ordered list of legs, each leg a ride on one service or
//! a walk between nearby stops. Field names serialize in camelCase to
//! match the persisted cache document format.

use serde::{Deserialize, Serialize};

/// A stop passed through without alighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateStop {
    pub stop_name: String,
    /// Arrival time as local epoch seconds.
    pub arrival_time: i64,
}

/// One leg of a journey: a ride on a single service, or a walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyLeg {
    pub from_stop_id: String,
    pub from_stop_name: String,
    pub to_stop_id: String,
    pub to_stop_name: String,
    /// Departure time as local epoch seconds.
    pub departure_time: i64,
    /// Arrival time as local epoch seconds.
    pub arrival_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_color: Option<String>,
    pub is_walking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub intermediate_stops: Vec<IntermediateStop>,
}

impl JourneyLeg {
    /// Leg duration in seconds.
    pub fn duration_secs(&self) -> i64 {
        self.arrival_time - self.departure_time
    }
}

/// A complete journey from origin to destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResult {
    /// Departure time as local epoch seconds.
    pub departure_time: i64,
    /// Arrival time as local epoch seconds.
    pub arrival_time: i64,
    pub legs: Vec<JourneyLeg>,
}

impl JourneyResult {
    /// Total journey duration in seconds.
    pub fn duration_secs(&self) -> i64 {
        self.arrival_time - self.departure_time
    }

    /// Number of boardings (non-walking legs).
    pub fn boardings(&self) -> usize {
        self.legs.iter().filter(|leg| !leg.is_walking).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(from: &str, to: &str, dep: i64, arr: i64, walking: bool) -> JourneyLeg {
        JourneyLeg {
            from_stop_id: format!("stop:{from}"),
            from_stop_name: from.to_string(),
            to_stop_id: format!("stop:{to}"),
            to_stop_name: to.to_string(),
            departure_time: dep,
            arrival_time: arr,
            route_name: None,
            route_color: None,
            is_walking: walking,
            direction: None,
            intermediate_stops: Vec::new(),
        }
    }

    #[test]
    fn durations_and_boardings() {
        let journey = JourneyResult {
            departure_time: 1000,
            arrival_time: 1700,
            legs: vec![
                leg("Perrache", "Bellecour", 1000, 1300, false),
                leg("Bellecour", "Part-Dieu", 1300, 1700, false),
            ],
        };

        assert_eq!(journey.duration_secs(), 700);
        assert_eq!(journey.boardings(), 2);
        assert_eq!(journey.legs[0].duration_secs(), 300);
    }

    #[test]
    fn walking_legs_are_not_boardings() {
        let journey = JourneyResult {
            departure_time: 0,
            arrival_time: 420,
            legs: vec![
                leg("Bellecour A", "Bellecour D", 0, 120, true),
                leg("Bellecour D", "Guillotière", 120, 420, false),
            ],
        };

        assert_eq!(journey.boardings(), 1);
    }

    #[test]
    fn serializes_in_camel_case() {
        let journey = JourneyResult {
            departure_time: 10,
            arrival_time: 20,
            legs: vec![leg("A", "B", 10, 20, false)],
        };

        let json = serde_json::to_string(&journey).unwrap();
        assert!(json.contains("\"departureTime\":10"));
        assert!(json.contains("\"fromStopName\":\"A\""));
        assert!(json.contains("\"isWalking\":false"));
        assert!(json.contains("\"intermediateStops\":[]"));
        // absent options are omitted entirely
        assert!(!json.contains("routeName"));
    }

    #[test]
    fn deserializes_document_with_optional_fields() {
        let json = r##"[{
            "departureTime": 100,
            "arrivalTime": 800,
            "legs": [{
                "fromStopId": "s1", "fromStopName": "Perrache",
                "toStopId": "s2", "toStopName": "Bellecour",
                "departureTime": 100, "arrivalTime": 400,
                "routeName": "A", "routeColor": "#E74C3C",
                "isWalking": false, "direction": "Vaulx-en-Velin",
                "intermediateStops": [{"stopName": "Ampère", "arrivalTime": 250}]
            }]
        }]"##;

        let journeys: Vec<JourneyResult> = serde_json::from_str(json).unwrap();
        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].legs[0].route_name.as_deref(), Some("A"));
        assert_eq!(journeys[0].legs[0].intermediate_stops[0].stop_name, "Ampère");

        // optional fields may be absent
        let json = r#"[{
            "departureTime": 100,
            "arrivalTime": 400,
            "legs": [{
                "fromStopId": "s1", "fromStopName": "Perrache",
                "toStopId": "s2", "toStopName": "Bellecour",
                "departureTime": 100, "arrivalTime": 400,
                "isWalking": true,
                "intermediateStops": []
            }]
        }]"#;

        let journeys: Vec<JourneyResult> = serde_json::from_str(json).unwrap();
        assert!(journeys[0].legs[0].route_name.is_none());
        assert!(journeys[0].legs[0].is_walking);
    }
}
