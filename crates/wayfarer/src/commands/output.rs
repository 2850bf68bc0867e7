//! Rendering of sessions and updates for the terminal.

use anyhow::Result;
use console::Style;
use wayfarer_stream::{Hotel, Poi, Restaurant, Session, SessionData};

/// Print a session as pretty JSON.
pub fn print_json(session: &Session) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(session)?);
    Ok(())
}

/// Print a session for humans.
pub fn print_session(session: &Session) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    let title = match &session.city {
        Some(city) => format!("{} in {}", session.domain, city),
        None => session.domain.to_string(),
    };
    println!("{}", bold.apply_to(title));
    println!("{}", dim.apply_to(format!("session {}", session.session_id)));
    if let Some(error) = &session.error {
        println!("{} {}", Style::new().red().apply_to("Error:"), error);
    }
    println!();

    match &session.data {
        SessionData::General(general) => {
            if let Some(city) = &general.general_city_data {
                let place = [Some(city.city.as_str()), city.country.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{}", bold.apply_to(place));
                if let Some(description) = &city.description {
                    println!("{}", description);
                }
                println!();
            }
            print_pois("Points of interest", &general.points_of_interest);

            let itinerary = &general.itinerary_response;
            if !itinerary.is_empty() {
                let name = if itinerary.itinerary_name.is_empty() {
                    "Itinerary"
                } else {
                    itinerary.itinerary_name.as_str()
                };
                println!("{}", bold.apply_to(name));
                if !itinerary.overall_description.is_empty() {
                    println!("{}", dim.apply_to(&itinerary.overall_description));
                }
                for (i, poi) in itinerary.points_of_interest.iter().enumerate() {
                    println!("  {}. {}", i + 1, poi_line(poi));
                }
                println!();
            }
        }
        SessionData::Accommodation(data) => print_list("Hotels", &data.hotels, hotel_line),
        SessionData::Dining(data) => print_list("Restaurants", &data.restaurants, restaurant_line),
        SessionData::Activities(data) => print_pois("Activities", &data.activities),
    }
}

fn print_pois(heading: &str, pois: &[Poi]) {
    print_list(heading, pois, poi_line);
}

fn print_list<T>(heading: &str, items: &[T], line: fn(&T) -> String) {
    if items.is_empty() {
        return;
    }
    println!("{} ({})", Style::new().bold().apply_to(heading), items.len());
    for item in items {
        println!("  • {}", line(item));
    }
    println!();
}

fn poi_line(poi: &Poi) -> String {
    let mut line = poi.name.clone();
    if let Some(category) = &poi.category {
        line.push_str(&format!(" [{}]", category));
    }
    if let Some(distance) = poi.distance {
        line.push_str(&format!(" ({:.1} km)", distance));
    }
    line
}

fn hotel_line(hotel: &Hotel) -> String {
    let mut line = hotel.name.clone();
    if let Some(rating) = hotel.rating {
        line.push_str(&format!(" ★ {:.1}", rating));
    }
    if let Some(price) = &hotel.price_range {
        line.push_str(&format!(" {}", price));
    }
    line
}

fn restaurant_line(restaurant: &Restaurant) -> String {
    let mut line = restaurant.name.clone();
    if let Some(cuisine) = &restaurant.cuisine_type {
        line.push_str(&format!(" [{}]", cuisine));
    }
    if let Some(rating) = restaurant.rating {
        line.push_str(&format!(" ★ {:.1}", rating));
    }
    line
}
