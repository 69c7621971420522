use crate::models::catalog::{self, ActivitySearch, CatalogActivity, City, CitySearch};

/// Case-insensitive substring match on name or country, then an exact region
/// match. Empty filters match everything.
pub fn search_cities(search: &CitySearch) -> Vec<City> {
    let query = search.q.trim().to_lowercase();
    let region = search.region.trim();

    catalog::cities()
        .into_iter()
        .filter(|city| {
            query.is_empty()
                || city.name.to_lowercase().contains(&query)
                || city.country.to_lowercase().contains(&query)
        })
        .filter(|city| region.is_empty() || city.region == region)
        .collect()
}

pub fn search_activities(search: &ActivitySearch) -> Vec<CatalogActivity> {
    let city = search.city.trim();
    let activity_type = search.activity_type.trim();

    catalog::activities()
        .into_iter()
        .filter(|activity| city.is_empty() || activity.city.eq_ignore_ascii_case(city))
        .filter(|activity| activity_type.is_empty() || activity.activity_type == activity_type)
        .collect()
}
