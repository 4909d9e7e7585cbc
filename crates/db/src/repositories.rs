pub mod booking;
pub mod business;
pub mod payment;
pub mod provider;
pub mod service;
