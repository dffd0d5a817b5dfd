// Time-series charts for TSAR metric services
pub mod application;
pub mod domain;
pub mod infrastructure;
