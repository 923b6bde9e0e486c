pub mod api_doc;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod note_id;
pub mod routes;
pub mod state;
pub mod store;
