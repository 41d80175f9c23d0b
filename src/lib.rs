// Library exports for Vitrine
// This allows integration tests and external code to use Vitrine modules

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod site;
pub mod state;
pub mod store;
pub mod upload;
pub mod view;
