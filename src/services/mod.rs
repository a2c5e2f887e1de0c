pub mod calendar;
pub mod catalog;
pub mod dashboard;
pub mod progress;
pub mod sessions;
