pub mod admin;
pub mod booking;
pub mod contact;
pub mod health;
pub mod public;
pub mod reviews;
