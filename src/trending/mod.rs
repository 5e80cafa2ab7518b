pub mod fetch;
pub mod params_store;
