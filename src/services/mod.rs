pub mod booking_service;
pub mod expert_service;
pub mod notification_service;
pub mod reservation_service;
pub mod schedule;
pub mod seed;
