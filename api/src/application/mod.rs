pub mod ports;
pub mod subscribers;
pub mod use_cases;
