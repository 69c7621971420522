use chrono::NaiveTime;

use crate::models::itinerary::Itinerary;
use crate::models::trip::{Destination, TripActivity, TripBudget, TripRecord};

const CLOCK_FORMATS: [&str; 3] = ["%I:%M %p", "%I:%M%p", "%H:%M"];

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let normalized = raw.trim().to_ascii_uppercase();
    CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&normalized, format).ok())
}

/// Flattens every day's activities, tagged with their day number, ordered by
/// day then clock time. The sort is stable and unparseable times go last
/// within their day.
pub fn flatten_activities(itinerary: &Itinerary) -> Vec<TripActivity> {
    let mut tagged: Vec<(u32, Option<NaiveTime>, TripActivity)> = Vec::new();

    for (index, day) in itinerary.days.iter().enumerate() {
        let day_number = if day.day_number > 0 {
            day.day_number
        } else {
            index as u32 + 1
        };

        for activity in &day.activities {
            tagged.push((
                day_number,
                parse_clock(&activity.time),
                TripActivity {
                    name: activity.title.clone(),
                    time: activity.time.clone(),
                    duration: activity.duration.clone(),
                    cost: activity.cost.max(0.0),
                    activity_type: activity.activity_type.as_str().to_string(),
                    description: activity.description.clone(),
                    day: day_number,
                    location: activity.location.clone(),
                },
            ));
        }
    }

    tagged.sort_by_key(|(day, time, _)| (*day, time.is_none(), *time));
    tagged.into_iter().map(|(_, _, activity)| activity).collect()
}

/// Maps a generated itinerary onto the trip persistence shape.
///
/// Always one destination: generated plans are single-city. A zero budget
/// total is replaced by the sum of its parts.
pub fn assemble(itinerary: &Itinerary, owner_id: &str) -> TripRecord {
    let activities = flatten_activities(itinerary);
    let activity_spend: f64 = activities.iter().map(|a| a.cost).sum();

    let estimate = &itinerary.estimated_budget;
    let parts = estimate.transport + estimate.accommodation + estimate.food + estimate.activities;
    let budget = TripBudget {
        total: if estimate.total > 0.0 { estimate.total } else { parts },
        transport: estimate.transport,
        stay: estimate.accommodation,
        activities: estimate.activities,
        food: estimate.food,
    };

    let name = match itinerary.trip_name.trim() {
        "" => format!("{} Trip", itinerary.city),
        name => name.to_string(),
    };

    let mut trip = TripRecord::new(
        owner_id,
        name,
        itinerary.start_date.clone(),
        itinerary.end_date.clone(),
    );
    trip.description = itinerary.overview.clone();
    trip.highlights = itinerary.highlights.clone();
    trip.budget = budget;
    trip.ai_generated = true;
    trip.destinations = vec![Destination {
        city: itinerary.city.clone(),
        country: itinerary.country.clone(),
        start_date: itinerary.start_date.clone(),
        end_date: itinerary.end_date.clone(),
        activities,
        budget: activity_spend,
        order: 0,
    }];
    trip
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn itinerary(value: serde_json::Value) -> Itinerary {
        serde_json::from_value(value).unwrap()
    }

    fn paris() -> Itinerary {
        itinerary(json!({
            "tripName": "Paris in Bloom",
            "city": "Paris",
            "country": "France",
            "startDate": "2024-06-15",
            "endDate": "2024-06-16",
            "overview": "Art and food",
            "highlights": ["Louvre"],
            "estimatedBudget": {"total": 900, "transport": 100, "accommodation": 500},
            "days": [
                {
                    "dayNumber": 2,
                    "date": "2024-06-16",
                    "activities": [
                        {"time": "2:00 PM", "title": "Montmartre", "cost": 0, "type": "sightseeing"},
                        {"time": "9:30 am", "title": "Croissant", "cost": 8, "type": "food"}
                    ]
                },
                {
                    "dayNumber": 1,
                    "date": "2024-06-15",
                    "activities": [
                        {"time": "whenever", "title": "Stroll", "type": "wandering"},
                        {"time": "7:00 PM", "title": "Dinner", "cost": 60, "type": "food"},
                        {"time": "10:00 AM", "title": "Louvre Museum", "cost": 17, "type": "culture"}
                    ]
                }
            ]
        }))
    }

    #[test]
    fn test_activities_ordered_by_day_then_time() {
        let names: Vec<(u32, String)> = flatten_activities(&paris())
            .into_iter()
            .map(|a| (a.day, a.name))
            .collect();
        assert_eq!(
            names,
            vec![
                (1, "Louvre Museum".to_string()),
                (1, "Dinner".to_string()),
                (1, "Stroll".to_string()),
                (2, "Croissant".to_string()),
                (2, "Montmartre".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_type_becomes_other() {
        let stroll = flatten_activities(&paris())
            .into_iter()
            .find(|a| a.name == "Stroll")
            .unwrap();
        assert_eq!(stroll.activity_type, "other");
    }

    #[test]
    fn test_single_destination_with_budget() {
        let trip = assemble(&paris(), "user-1");
        assert_eq!(trip.user_id, "user-1");
        assert_eq!(trip.name, "Paris in Bloom");
        assert!(trip.ai_generated);
        assert_eq!(trip.destinations.len(), 1);
        assert_eq!(trip.destinations[0].city, "Paris");
        assert_eq!(trip.destinations[0].activities.len(), 5);
        assert_eq!(trip.destinations[0].budget, 85.0);
        assert_eq!(trip.budget.total, 900.0);
        assert_eq!(trip.budget.stay, 500.0);
        assert_eq!(trip.budget.food, 0.0);
    }

    #[test]
    fn test_missing_budget_and_day_numbers_default() {
        let trip = assemble(
            &itinerary(json!({
                "tripName": "",
                "city": "Rome",
                "country": "Italy",
                "startDate": "2024-09-01",
                "endDate": "2024-09-02",
                "days": [
                    {"activities": [{"time": "9:00 AM", "title": "Colosseum"}]},
                    {"activities": [{"time": "9:00 AM", "title": "Vatican"}]}
                ]
            })),
            "user-2",
        );
        assert_eq!(trip.name, "Rome Trip");
        assert_eq!(trip.budget, TripBudget::default());
        let days: Vec<u32> = trip.destinations[0].activities.iter().map(|a| a.day).collect();
        assert_eq!(days, vec![1, 2]);
    }

    #[test]
    fn test_zero_total_is_sum_of_parts() {
        let mut plan = paris();
        plan.estimated_budget.total = 0.0;
        plan.estimated_budget.food = 200.0;
        assert_eq!(assemble(&plan, "u").budget.total, 800.0);
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("9:00 AM"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_clock("12:15 pm"), NaiveTime::from_hms_opt(12, 15, 0));
        assert_eq!(parse_clock("7:45PM"), NaiveTime::from_hms_opt(19, 45, 0));
        assert_eq!(parse_clock("18:30"), NaiveTime::from_hms_opt(18, 30, 0));
        assert_eq!(parse_clock("morning"), None);
    }
}
