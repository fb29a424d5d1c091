//! API route handlers

pub mod access;
pub mod audit;
pub mod customization;
pub mod departments;
pub mod health;
pub mod requests;
pub mod templates;
