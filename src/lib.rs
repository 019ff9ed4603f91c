//! ArtSpace content reporting and moderation service.

pub mod app_config;
pub mod auth;
pub mod content;
pub mod db;
pub mod middleware;
pub mod moderation;
pub mod notifications;
pub mod orm;
pub mod relationships;
pub mod web;
