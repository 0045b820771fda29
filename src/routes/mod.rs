pub mod admin;
pub mod auth;
pub mod author;
pub mod developer;
pub mod health;
pub mod novels;
pub mod pages;
pub mod reviews;
pub mod shelf;
