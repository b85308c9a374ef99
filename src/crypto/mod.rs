pub mod kdf;
pub mod keys;
pub mod params;
