pub mod booking;
pub mod expert;
