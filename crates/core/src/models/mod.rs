pub mod chart;
pub mod firm;
pub mod investment;
pub mod selection;
pub mod settings;
