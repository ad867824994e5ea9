//! Backend de pruebas de emisión vehicular
//!
//! API administrativa para oficinas, vehículos, pruebas de emisión y
//! calendarios de prueba, con el reporte de compliance por oficina.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;
