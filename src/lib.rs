pub mod agenda; // Slot composition (dia + hora -> data_hora)
pub mod api; // HTTP surface: router, middleware, endpoints
pub mod auth; // Password hashing + signed bearer tokens
pub mod authorization; // Role allow-lists + ownership policy
pub mod config;
pub mod db;
pub mod models;
