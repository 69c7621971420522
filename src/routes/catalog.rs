use actix_web::{web, HttpResponse, Responder};

use crate::models::catalog::{ActivitySearch, CitySearch};
use crate::services::catalog_service;

/*
    /api/cities/search?q=&region=
*/
pub async fn search_cities(query: web::Query<CitySearch>) -> impl Responder {
    HttpResponse::Ok().json(catalog_service::search_cities(&query))
}

/*
    /api/activities/search?city=&type=
*/
pub async fn search_activities(query: web::Query<ActivitySearch>) -> impl Responder {
    HttpResponse::Ok().json(catalog_service::search_activities(&query))
}
