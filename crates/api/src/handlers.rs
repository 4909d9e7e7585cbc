pub mod booking;
pub mod business;
pub mod provider;
pub mod slots;
