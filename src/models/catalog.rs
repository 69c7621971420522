use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct City {
    pub name: String,
    pub country: String,
    pub region: String,
    pub cost_index: u8,
    pub popularity: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogActivity {
    pub name: String,
    pub city: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub duration: u32, // hours
    pub cost: f64,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CitySearch {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub region: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivitySearch {
    #[serde(default)]
    pub city: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
}

const CITIES: [(&str, &str, &str, u8, u8); 10] = [
    ("Paris", "France", "Europe", 8, 95),
    ("Tokyo", "Japan", "Asia", 9, 90),
    ("New York", "USA", "North America", 9, 92),
    ("Bali", "Indonesia", "Asia", 4, 88),
    ("Barcelona", "Spain", "Europe", 6, 89),
    ("Dubai", "UAE", "Middle East", 8, 85),
    ("London", "UK", "Europe", 9, 93),
    ("Bangkok", "Thailand", "Asia", 3, 87),
    ("Rome", "Italy", "Europe", 7, 91),
    ("Istanbul", "Turkey", "Europe", 5, 84),
];

const ACTIVITIES: [(&str, &str, &str, u32, f64, &str); 3] = [
    (
        "Eiffel Tower Visit",
        "Paris",
        "sightseeing",
        3,
        25.0,
        "Visit the iconic Eiffel Tower",
    ),
    (
        "Louvre Museum",
        "Paris",
        "culture",
        4,
        17.0,
        "Explore world's largest art museum",
    ),
    (
        "Seine River Cruise",
        "Paris",
        "experience",
        2,
        35.0,
        "Romantic cruise on Seine River",
    ),
];

/// Built-in city catalogue used by destination search.
pub fn cities() -> Vec<City> {
    CITIES
        .iter()
        .map(|&(name, country, region, cost_index, popularity)| City {
            name: name.to_string(),
            country: country.to_string(),
            region: region.to_string(),
            cost_index,
            popularity,
        })
        .collect()
}

pub fn activities() -> Vec<CatalogActivity> {
    ACTIVITIES
        .iter()
        .map(|&(name, city, activity_type, duration, cost, description)| CatalogActivity {
            name: name.to_string(),
            city: city.to_string(),
            activity_type: activity_type.to_string(),
            duration,
            cost,
            description: description.to_string(),
            image: String::new(),
        })
        .collect()
}
