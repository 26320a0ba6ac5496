pub mod credentials;
pub mod encryption;
pub mod format;
