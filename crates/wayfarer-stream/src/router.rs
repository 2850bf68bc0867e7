//! Routing of completed channel values into the session.
//!
//! Values reach the router the same way whether they were reconstructed
//! from fragments or arrived as a direct payload. Pivot channels (hotels,
//! restaurants, activities) switch the session's domain and replace its
//! data wholesale; the general channels only write into general-shaped data.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::merge::merge;
use crate::types::{
    AccommodationData, ActivitiesData, Channel, CityData, DiningData, Domain, GeneralData,
    ItineraryResponse, Session, SessionData,
};

/// Route a completed `value` for `channel` into `session`.
pub fn route(session: &mut Session, channel: Channel, value: Value) {
    tracing::debug!(
        channel = %channel,
        domain = %session.domain,
        session_id = %session.session_id,
        "Routing channel value"
    );

    match channel {
        Channel::CityData => route_city_data(session, value),
        Channel::GeneralPois => {
            let pois = read_collection(&value, "points_of_interest", channel);
            match session.general_mut() {
                Some(general) => general.points_of_interest = pois,
                None => skip(session, channel),
            }
        }
        Channel::Itinerary => {
            let Some(itinerary) = read_object::<ItineraryResponse>(value, channel) else {
                return;
            };
            match session.general_mut() {
                Some(general) => general.itinerary_response = itinerary,
                None => skip(session, channel),
            }
        }
        Channel::Hotels => {
            let hotels = read_collection(&value, "hotels", channel);
            let session_id = Some(session.session_id.clone());
            pivot(
                session,
                Domain::Accommodation,
                SessionData::Accommodation(AccommodationData { hotels, session_id }),
            );
        }
        Channel::Restaurants => {
            let restaurants = read_collection(&value, "restaurants", channel);
            let session_id = Some(session.session_id.clone());
            pivot(
                session,
                Domain::Dining,
                SessionData::Dining(DiningData {
                    restaurants,
                    session_id,
                }),
            );
        }
        Channel::Activities => {
            let activities = read_collection(&value, "activities", channel);
            let session_id = Some(session.session_id.clone());
            pivot(
                session,
                Domain::Activities,
                SessionData::Activities(ActivitiesData {
                    activities,
                    session_id,
                }),
            );
        }
    }
}

/// Apply a nearby refinement without changing the session's domain.
///
/// The payload is read in the shape of the current domain. Collections it
/// carries are merged into the stored ones (newer entries win); fields it
/// does not carry keep their stored values.
pub fn apply_nearby(session: &mut Session, value: Value) {
    tracing::debug!(
        domain = %session.domain,
        session_id = %session.session_id,
        "Applying nearby refinement"
    );

    if !value.is_object() {
        tracing::warn!(session_id = %session.session_id, "Ignoring non-object nearby payload");
        return;
    }

    match &mut session.data {
        SessionData::General(general) => {
            if let Some(city) = value.get("general_city_data")
                && let Some(city) = read_object::<CityData>(city.clone(), Channel::CityData)
            {
                general.general_city_data = Some(city);
            }
            if value.get("points_of_interest").is_some() {
                let incoming = read_collection(&value, "points_of_interest", Channel::GeneralPois);
                let previous = std::mem::take(&mut general.points_of_interest);
                general.points_of_interest = merge(previous, incoming);
            }
            if let Some(itinerary) = value.get("itinerary_response")
                && let Some(itinerary) =
                    read_object::<ItineraryResponse>(itinerary.clone(), Channel::Itinerary)
            {
                general.itinerary_response = itinerary;
            }
        }
        SessionData::Accommodation(data) => {
            if value.get("hotels").is_some() {
                let incoming = read_collection(&value, "hotels", Channel::Hotels);
                data.hotels = merge(std::mem::take(&mut data.hotels), incoming);
            }
        }
        SessionData::Dining(data) => {
            if value.get("restaurants").is_some() {
                let incoming = read_collection(&value, "restaurants", Channel::Restaurants);
                data.restaurants = merge(std::mem::take(&mut data.restaurants), incoming);
            }
        }
        SessionData::Activities(data) => {
            if value.get("activities").is_some() {
                let incoming = read_collection(&value, "activities", Channel::Activities);
                data.activities = merge(std::mem::take(&mut data.activities), incoming);
            }
        }
    }
}

fn route_city_data(session: &mut Session, value: Value) {
    let Some(city) = read_object::<CityData>(value, Channel::CityData) else {
        return;
    };
    let session_id = session.session_id.clone();
    match session.general_mut() {
        // First city for this session starts a fresh general result.
        Some(general) if general.general_city_data.is_none() => {
            *general = GeneralData {
                general_city_data: Some(city),
                session_id: Some(session_id),
                ..Default::default()
            };
        }
        Some(general) => general.general_city_data = Some(city),
        None => skip(session, Channel::CityData),
    }
}

fn pivot(session: &mut Session, domain: Domain, data: SessionData) {
    if session.domain != domain {
        tracing::info!(
            from = %session.domain,
            to = %domain,
            session_id = %session.session_id,
            "Session pivoted to new domain"
        );
    }
    session.domain = domain;
    session.data = data;
}

fn skip(session: &Session, channel: Channel) {
    tracing::debug!(
        channel = %channel,
        domain = %session.domain,
        "Channel does not apply to current domain, skipping"
    );
}

/// Read `value[key]` as a list, dropping entries that cannot be read.
fn read_collection<T: DeserializeOwned>(value: &Value, key: &str, channel: Channel) -> Vec<T> {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!(channel = %channel, error = %e, "Dropping unreadable item");
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            tracing::warn!(
                channel = %channel,
                key,
                found = json_kind(other),
                "Expected a list, defaulting to empty"
            );
            Vec::new()
        }
    }
}

fn read_object<T: DeserializeOwned>(value: Value, channel: Channel) -> Option<T> {
    match serde_json::from_value::<T>(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(channel = %channel, error = %e, "Ignoring unreadable channel payload");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Poi, ZERO_UUID};
    use serde_json::json;

    fn general_session() -> Session {
        Session::new("s-1", Domain::General)
    }

    #[test]
    fn test_city_data_sets_general_city_data() {
        let mut session = general_session();
        route(
            &mut session,
            Channel::CityData,
            json!({"city": "Lisbon", "country": "Portugal", "population": 545000}),
        );

        let general = session.general().unwrap();
        let city = general.general_city_data.as_ref().unwrap();
        assert_eq!(city.city, "Lisbon");
        assert_eq!(city.country.as_deref(), Some("Portugal"));
        assert_eq!(city.extra.get("population"), Some(&json!(545000)));
        assert_eq!(general.session_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_first_city_data_resets_siblings() {
        let mut session = general_session();
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [{"id": "1", "name": "Tower"}]}),
        );
        route(
            &mut session,
            Channel::Itinerary,
            json!({"itinerary_name": "Stale plan"}),
        );
        route(&mut session, Channel::CityData, json!({"city": "Paris"}));

        let general = session.general().unwrap();
        assert!(general.points_of_interest.is_empty());
        assert!(general.itinerary_response.is_empty());
        assert_eq!(general.session_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_later_city_data_keeps_siblings() {
        let mut session = general_session();
        route(&mut session, Channel::CityData, json!({"city": "Paris"}));
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [{"id": "1", "name": "Tower"}]}),
        );
        route(&mut session, Channel::CityData, json!({"city": "Paris, FR"}));

        let general = session.general().unwrap();
        assert_eq!(general.points_of_interest.len(), 1);
        assert_eq!(general.general_city_data.as_ref().unwrap().city, "Paris, FR");
    }

    #[test]
    fn test_mistyped_fields_keep_items_and_payloads() {
        let mut session = general_session();
        route(
            &mut session,
            Channel::CityData,
            json!({"city": "Lisbon", "center_latitude": "38.72", "center_longitude": -9.14}),
        );
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [
                {"name": "Belém Tower", "latitude": "38.69", "longitude": "-9.21", "rating": "4.5"}
            ]}),
        );
        route(
            &mut session,
            Channel::Itinerary,
            json!({
                "itinerary_name": "A day by the river",
                "points_of_interest": [{"name": "Jerónimos", "latitude": "38.70"}]
            }),
        );

        let general = session.general().unwrap();
        let city = general.general_city_data.as_ref().unwrap();
        assert_eq!(city.center_latitude, Some(38.72));
        assert_eq!(general.points_of_interest.len(), 1);
        assert_eq!(general.points_of_interest[0].latitude, Some(38.69));
        assert_eq!(general.itinerary_response.itinerary_name, "A day by the river");
        assert_eq!(general.itinerary_response.points_of_interest[0].latitude, Some(38.70));

        route(
            &mut session,
            Channel::Hotels,
            json!({"hotels": [{"name": "Ritz", "rating": "4.2", "llm_interaction_id": 99}]}),
        );
        let SessionData::Accommodation(data) = &session.data else {
            panic!("expected accommodation data");
        };
        assert_eq!(data.hotels.len(), 1);
        assert_eq!(data.hotels[0].rating, Some(4.2));
        assert_eq!(data.hotels[0].llm_interaction_id.as_deref(), Some("99"));
    }

    #[test]
    fn test_general_pois_replace_rather_than_merge() {
        let mut session = general_session();
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [{"name": "A"}, {"name": "B"}]}),
        );
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [{"name": "C"}]}),
        );
        let names: Vec<&str> = session
            .general()
            .unwrap()
            .points_of_interest
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["C"]);
    }

    #[test]
    fn test_general_pois_missing_field_defaults_to_empty() {
        let mut session = general_session();
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [{"name": "A"}]}),
        );
        route(&mut session, Channel::GeneralPois, json!({"unexpected": true}));
        assert!(session.general().unwrap().points_of_interest.is_empty());
    }

    #[test]
    fn test_itinerary_sets_response() {
        let mut session = Session::new("s-1", Domain::Itinerary);
        route(
            &mut session,
            Channel::Itinerary,
            json!({
                "itinerary_name": "Two days in Rome",
                "overall_description": "Ancient and modern",
                "points_of_interest": [{"name": "Colosseum"}]
            }),
        );
        let itinerary = &session.general().unwrap().itinerary_response;
        assert_eq!(itinerary.itinerary_name, "Two days in Rome");
        assert_eq!(itinerary.points_of_interest[0].name, "Colosseum");
    }

    #[test]
    fn test_pivot_replaces_shape() {
        let mut session = general_session();
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [{"name": "Tower"}]}),
        );
        route(
            &mut session,
            Channel::Hotels,
            json!({"hotels": [{"id": "h1", "name": "Grand"}]}),
        );

        assert_eq!(session.domain, Domain::Accommodation);
        assert_eq!(
            serde_json::to_value(&session.data).unwrap(),
            json!({
                "domain": "accommodation",
                "hotels": [{"id": "h1", "name": "Grand"}],
                "session_id": "s-1"
            })
        );
    }

    #[test]
    fn test_pivot_with_malformed_payload_defaults_to_empty() {
        let mut session = general_session();
        route(&mut session, Channel::Restaurants, json!({"restaurants": "oops"}));
        assert_eq!(session.domain, Domain::Dining);
        match &session.data {
            SessionData::Dining(d) => assert!(d.restaurants.is_empty()),
            other => panic!("unexpected data {:?}", other),
        }

        route(&mut session, Channel::Activities, json!(null));
        assert_eq!(session.domain, Domain::Activities);
        assert!(session.data.matches(Domain::Activities));
    }

    #[test]
    fn test_general_channels_ignored_outside_general_domain() {
        let mut session = general_session();
        route(&mut session, Channel::Hotels, json!({"hotels": [{"name": "Grand"}]}));
        route(&mut session, Channel::CityData, json!({"city": "Oslo"}));
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [{"name": "Fjord"}]}),
        );

        assert_eq!(session.domain, Domain::Accommodation);
        assert_eq!(session.data.item_count(), 1);
    }

    #[test]
    fn test_nearby_merges_and_preserves_domain() {
        let mut session = general_session();
        route(
            &mut session,
            Channel::GeneralPois,
            json!({"points_of_interest": [
                {"id": ZERO_UUID, "name": "Café Foo"},
                {"name": "Library"}
            ]}),
        );
        apply_nearby(
            &mut session,
            json!({"points_of_interest": [
                {"id": "7d3c2f1e-9a4b-4c8d-8e2f-1a2b3c4d5e6f", "name": "Café Foo", "distance": 120.5},
                {"name": "Harbour"}
            ]}),
        );

        assert_eq!(session.domain, Domain::General);
        let pois: &Vec<Poi> = &session.general().unwrap().points_of_interest;
        let names: Vec<&str> = pois.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Café Foo", "Library", "Harbour"]);
        assert_eq!(pois[0].distance, Some(120.5));
    }

    #[test]
    fn test_nearby_in_pivoted_domain_merges_collection() {
        let mut session = general_session();
        route(&mut session, Channel::Hotels, json!({"hotels": [{"name": "Grand"}]}));
        apply_nearby(&mut session, json!({"hotels": [{"name": "grand"}, {"name": "Inn"}]}));

        assert_eq!(session.domain, Domain::Accommodation);
        assert_eq!(session.data.item_count(), 2);
    }

    #[test]
    fn test_nearby_ignores_non_object_payload() {
        let mut session = general_session();
        apply_nearby(&mut session, json!([1, 2, 3]));
        assert_eq!(session, general_session());
    }
}
