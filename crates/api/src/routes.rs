pub mod booking;
pub mod business;
pub mod health;
pub mod provider;
pub mod slots;
