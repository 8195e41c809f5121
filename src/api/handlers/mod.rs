//! API route handlers for the portal.

pub mod auth;
pub mod health;
pub mod pages;
pub mod profile;
pub mod slack;
