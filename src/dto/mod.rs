pub mod booking_dto;
pub mod expert_dto;
