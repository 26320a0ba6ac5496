pub mod cache;
pub mod chart_service;
pub mod date_grid;
pub mod firm_service;
pub mod series_service;
