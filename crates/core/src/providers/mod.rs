pub mod traits;

// Fund data sources
pub mod cryptorank;
pub mod sample;
