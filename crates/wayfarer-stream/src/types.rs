//! Wire events and session data types.
//!
//! [`StreamEvent`] mirrors the JSON records carried by `data:` frames.
//! [`Session`] is the evolving result the assembler builds from them; its
//! [`SessionData`] variant always matches the session's [`Domain`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Placeholder id the generator uses for items without a stable identity.
pub const ZERO_UUID: &str = "00000000-0000-0000-0000-000000000000";

// ─────────────────────────────────────────────────────────────────────────────
// Domains and channels
// ─────────────────────────────────────────────────────────────────────────────

/// Active conversational intent; decides the shape of [`SessionData`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[default]
    General,
    Itinerary,
    Accommodation,
    Dining,
    Activities,
}

impl Domain {
    /// Domains that share the city / POI / itinerary result shape.
    pub fn is_general(&self) -> bool {
        matches!(self, Domain::General | Domain::Itinerary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::General => "general",
            Domain::Itinerary => "itinerary",
            Domain::Accommodation => "accommodation",
            Domain::Dining => "dining",
            Domain::Activities => "activities",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Domain::General),
            "itinerary" => Ok(Domain::Itinerary),
            "accommodation" => Ok(Domain::Accommodation),
            "dining" => Ok(Domain::Dining),
            "activities" => Ok(Domain::Activities),
            other => Err(format!("unknown domain '{}'", other)),
        }
    }
}

/// A named logical sub-document multiplexed within one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    CityData,
    GeneralPois,
    Itinerary,
    Hotels,
    Restaurants,
    Activities,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::CityData => "city_data",
            Channel::GeneralPois => "general_pois",
            Channel::Itinerary => "itinerary",
            Channel::Hotels => "hotels",
            Channel::Restaurants => "restaurants",
            Channel::Activities => "activities",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stream events
// ─────────────────────────────────────────────────────────────────────────────

/// One event decoded from a `data:` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A new session begins.
    Start {
        #[serde(default)]
        data: Option<StartPayload>,
    },
    /// A fragment of some channel's JSON document.
    Chunk { data: ChunkPayload },
    /// Whole city data payload.
    CityData {
        #[serde(default)]
        data: Value,
    },
    /// Whole general points-of-interest payload.
    GeneralPois {
        #[serde(default)]
        data: Value,
    },
    /// Whole itinerary payload.
    Itinerary {
        #[serde(default)]
        data: Value,
    },
    /// Whole hotels payload (`{"hotels": [...]}`).
    Hotels {
        #[serde(default)]
        data: Value,
    },
    /// Whole restaurants payload (`{"restaurants": [...]}`).
    Restaurants {
        #[serde(default)]
        data: Value,
    },
    /// Whole activities payload (`{"activities": [...]}`).
    Activities {
        #[serde(default)]
        data: Value,
    },
    /// In-place refinement of the current result; keeps the domain.
    Nearby {
        #[serde(default)]
        data: Value,
    },
    /// The generator finished.
    Complete {
        #[serde(default)]
        data: Option<Value>,
    },
    /// The generator failed.
    Error {
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        data: Option<Value>,
    },
    /// Any other event type; ignored.
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Decode one `data:` payload.
    pub fn from_json(payload: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Build a chunk event.
    pub fn chunk(part: Channel, chunk: impl Into<String>) -> Self {
        StreamEvent::Chunk {
            data: ChunkPayload {
                chunk: chunk.into(),
                part,
            },
        }
    }

    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::Chunk { .. } => "chunk",
            StreamEvent::CityData { .. } => "city_data",
            StreamEvent::GeneralPois { .. } => "general_pois",
            StreamEvent::Itinerary { .. } => "itinerary",
            StreamEvent::Hotels { .. } => "hotels",
            StreamEvent::Restaurants { .. } => "restaurants",
            StreamEvent::Activities { .. } => "activities",
            StreamEvent::Nearby { .. } => "nearby",
            StreamEvent::Complete { .. } => "complete",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Unknown => "unknown",
        }
    }

    /// Split a whole-payload channel event into its channel and value.
    ///
    /// Returns the event unchanged when it is not a direct channel payload.
    pub fn into_direct(self) -> std::result::Result<(Channel, Value), Self> {
        match self {
            StreamEvent::CityData { data } => Ok((Channel::CityData, data)),
            StreamEvent::GeneralPois { data } => Ok((Channel::GeneralPois, data)),
            StreamEvent::Itinerary { data } => Ok((Channel::Itinerary, data)),
            StreamEvent::Hotels { data } => Ok((Channel::Hotels, data)),
            StreamEvent::Restaurants { data } => Ok((Channel::Restaurants, data)),
            StreamEvent::Activities { data } => Ok((Channel::Activities, data)),
            other => Err(other),
        }
    }

    /// Message carried by an error event.
    pub fn error_message(&self) -> Option<String> {
        match self {
            StreamEvent::Error { error, data } => Some(
                error
                    .clone()
                    .or_else(|| {
                        data.as_ref()
                            .and_then(|d| d.get("message"))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| "Unknown stream error".to_string()),
            ),
            _ => None,
        }
    }
}

/// Payload of a `start` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartPayload {
    #[serde(default, alias = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl StartPayload {
    /// Resolved domain; unknown or missing values fall back to `general`.
    pub fn domain(&self) -> Domain {
        match self.domain.as_deref().map(str::parse::<Domain>) {
            Some(Ok(domain)) => domain,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Unrecognised start domain, using general");
                Domain::General
            }
            None => Domain::General,
        }
    }
}

/// Payload of a `chunk` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub chunk: String,
    pub part: Channel,
}

// ─────────────────────────────────────────────────────────────────────────────
// Result records
// ─────────────────────────────────────────────────────────────────────────────

/// A point of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub llm_interaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Distance from the user, present on nearby results.
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Fields not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Poi {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A hotel recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub llm_interaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A restaurant recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub llm_interaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub price_level: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// City-level context for a general discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub center_latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub center_longitude: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A generated itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub itinerary_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub overall_description: String,
    #[serde(default, deserialize_with = "lenient_items")]
    pub points_of_interest: Vec<Poi>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItineraryResponse {
    pub fn is_empty(&self) -> bool {
        self.itinerary_name.is_empty()
            && self.overall_description.is_empty()
            && self.points_of_interest.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Result shape for the `general` and `itinerary` domains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_city_data: Option<CityData>,
    #[serde(default)]
    pub points_of_interest: Vec<Poi>,
    #[serde(default)]
    pub itinerary_response: ItineraryResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Result shape for the `accommodation` domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccommodationData {
    #[serde(default)]
    pub hotels: Vec<Hotel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Result shape for the `dining` domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiningData {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Result shape for the `activities` domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitiesData {
    #[serde(default)]
    pub activities: Vec<Poi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Session result, tagged by the domain family it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum SessionData {
    General(GeneralData),
    Accommodation(AccommodationData),
    Dining(DiningData),
    Activities(ActivitiesData),
}

impl SessionData {
    /// Empty result of the shape `domain` requires.
    pub fn empty(domain: Domain, session_id: Option<String>) -> Self {
        match domain {
            Domain::General | Domain::Itinerary => SessionData::General(GeneralData {
                session_id,
                ..Default::default()
            }),
            Domain::Accommodation => SessionData::Accommodation(AccommodationData {
                session_id,
                ..Default::default()
            }),
            Domain::Dining => SessionData::Dining(DiningData {
                session_id,
                ..Default::default()
            }),
            Domain::Activities => SessionData::Activities(ActivitiesData {
                session_id,
                ..Default::default()
            }),
        }
    }

    /// Domain this shape belongs to; general-shaped data reads as `general`.
    pub fn domain(&self) -> Domain {
        match self {
            SessionData::General(_) => Domain::General,
            SessionData::Accommodation(_) => Domain::Accommodation,
            SessionData::Dining(_) => Domain::Dining,
            SessionData::Activities(_) => Domain::Activities,
        }
    }

    /// Whether this variant is the shape `domain` requires.
    pub fn matches(&self, domain: Domain) -> bool {
        match self {
            SessionData::General(_) => domain.is_general(),
            SessionData::Accommodation(_) => domain == Domain::Accommodation,
            SessionData::Dining(_) => domain == Domain::Dining,
            SessionData::Activities(_) => domain == Domain::Activities,
        }
    }

    /// Number of items across all collections.
    pub fn item_count(&self) -> usize {
        match self {
            SessionData::General(g) => {
                g.points_of_interest.len() + g.itinerary_response.points_of_interest.len()
            }
            SessionData::Accommodation(a) => a.hotels.len(),
            SessionData::Dining(d) => d.restaurants.len(),
            SessionData::Activities(a) => a.activities.len(),
        }
    }
}

impl Default for SessionData {
    fn default() -> Self {
        SessionData::General(GeneralData::default())
    }
}

/// The evolving result of one discovery stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub data: SessionData,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Session {
    pub fn new(session_id: impl Into<String>, domain: Domain) -> Self {
        let session_id = session_id.into();
        Self {
            data: SessionData::empty(domain, Some(session_id.clone())),
            session_id,
            domain,
            city: None,
            is_complete: false,
            error: None,
        }
    }

    /// General-shaped data, when the session is in a general domain.
    pub fn general(&self) -> Option<&GeneralData> {
        match &self.data {
            SessionData::General(g) if self.domain.is_general() => Some(g),
            _ => None,
        }
    }

    pub fn general_mut(&mut self) -> Option<&mut GeneralData> {
        match &mut self.data {
            SessionData::General(g) if self.domain.is_general() => Some(g),
            _ => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(String::new(), Domain::General)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient field decoding
// ─────────────────────────────────────────────────────────────────────────────

/// Ids sometimes arrive as numbers; anything else is treated as absent.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Optional text. Scalars are stringified and lists of scalars are joined
/// with `", "`; objects and empty lists read as absent.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    })
}

/// Optional number. Numeric strings such as `"4.5"` are parsed; anything
/// else reads as absent.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// List of records, skipping entries that are not readable as `T`.
fn lenient_items<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_domain_round_trip_names() {
        for domain in [
            Domain::General,
            Domain::Itinerary,
            Domain::Accommodation,
            Domain::Dining,
            Domain::Activities,
        ] {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
        }
        assert!("spa".parse::<Domain>().is_err());
    }

    #[test]
    fn test_chunk_event_decodes() {
        let event = StreamEvent::from_json(
            r#"{"type":"chunk","data":{"chunk":"{\"a\"","part":"general_pois"}}"#,
        )
        .unwrap();
        assert_eq!(event, StreamEvent::chunk(Channel::GeneralPois, "{\"a\""));
    }

    #[test]
    fn test_unknown_event_type_is_tolerated() {
        let event = StreamEvent::from_json(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(event, StreamEvent::Unknown);
    }

    #[test]
    fn test_start_payload_accepts_camel_case_session_id() {
        let event = StreamEvent::from_json(
            r#"{"type":"start","data":{"sessionId":"s-1","domain":"dining","city":"Lyon"}}"#,
        )
        .unwrap();
        let StreamEvent::Start { data: Some(start) } = event else {
            panic!("expected start event");
        };
        assert_eq!(start.session_id.as_deref(), Some("s-1"));
        assert_eq!(start.domain(), Domain::Dining);
        assert_eq!(start.city.as_deref(), Some("Lyon"));
    }

    #[test]
    fn test_start_payload_unknown_domain_defaults_to_general() {
        let start = StartPayload {
            domain: Some("spa".into()),
            ..Default::default()
        };
        assert_eq!(start.domain(), Domain::General);
    }

    #[test]
    fn test_error_message_falls_back_to_data_message() {
        let event =
            StreamEvent::from_json(r#"{"type":"error","data":{"message":"model overloaded"}}"#)
                .unwrap();
        assert_eq!(event.error_message().as_deref(), Some("model overloaded"));

        let bare = StreamEvent::from_json(r#"{"type":"error"}"#).unwrap();
        assert_eq!(bare.error_message().as_deref(), Some("Unknown stream error"));
    }

    #[test]
    fn test_into_direct_splits_channel_events() {
        let event = StreamEvent::Hotels {
            data: json!({"hotels": []}),
        };
        let (channel, value) = event.into_direct().unwrap();
        assert_eq!(channel, Channel::Hotels);
        assert_eq!(value, json!({"hotels": []}));

        assert!(StreamEvent::Unknown.into_direct().is_err());
    }

    #[test]
    fn test_poi_preserves_unknown_fields_and_numeric_ids() {
        let poi: Poi = serde_json::from_value(json!({
            "id": 42,
            "name": "Tower",
            "latitude": 48,
            "opening_hours": "9-17"
        }))
        .unwrap();
        assert_eq!(poi.id.as_deref(), Some("42"));
        assert_eq!(poi.latitude, Some(48.0));
        assert_eq!(poi.extra.get("opening_hours"), Some(&json!("9-17")));
    }

    #[test]
    fn test_mistyped_fields_do_not_drop_records() {
        let poi: Poi = serde_json::from_value(json!({
            "name": "Belém Tower",
            "latitude": "38.69",
            "longitude": -9.21,
            "rating": "4.5",
            "category": ["landmark", "museum"],
            "distance": {"km": 2},
            "llm_interaction_id": 7
        }))
        .unwrap();
        assert_eq!(poi.latitude, Some(38.69));
        assert_eq!(poi.longitude, Some(-9.21));
        assert_eq!(poi.category.as_deref(), Some("landmark, museum"));
        assert_eq!(poi.distance, None);
        assert_eq!(poi.llm_interaction_id.as_deref(), Some("7"));
        assert_eq!(poi.extra.get("rating"), Some(&json!("4.5")));

        let hotel: Hotel =
            serde_json::from_value(json!({"name": "Ritz", "rating": "4.2", "latitude": "n/a"}))
                .unwrap();
        assert_eq!(hotel.rating, Some(4.2));
        assert_eq!(hotel.latitude, None);
    }

    #[test]
    fn test_itinerary_keeps_extra_fields_and_skips_unreadable_stops() {
        let itinerary: ItineraryResponse = serde_json::from_value(json!({
            "itinerary_name": "A day by the river",
            "points_of_interest": [{"name": "Belém Tower", "latitude": "38.69"}, "lunch"],
            "duration_days": 1
        }))
        .unwrap();
        assert_eq!(itinerary.points_of_interest.len(), 1);
        assert_eq!(itinerary.points_of_interest[0].latitude, Some(38.69));
        assert_eq!(itinerary.extra.get("duration_days"), Some(&json!(1)));
    }

    #[test]
    fn test_session_data_serializes_domain_tag() {
        let data = SessionData::empty(Domain::Accommodation, Some("s-1".into()));
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            json!({"domain": "accommodation", "hotels": [], "session_id": "s-1"})
        );
        assert!(data.matches(Domain::Accommodation));
        assert!(!data.matches(Domain::General));
        assert_eq!(data.domain(), Domain::Accommodation);
    }

    #[test]
    fn test_general_accessor_respects_domain() {
        let mut session = Session::new("s-1", Domain::Itinerary);
        assert!(session.general_mut().is_some());

        session.domain = Domain::Dining;
        session.data = SessionData::empty(Domain::Dining, None);
        assert!(session.general().is_none());
    }
}
