//! PlayDeck API - Backend for a browsable, searchable catalog of browser games
//!
//! This crate provides:
//! - The REST API for browsing, searching and ranking games and categories
//! - Staff endpoints for curating the catalog and its advertisement slots
//! - A client-side search controller driving the search widget

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod error;
pub mod routes;
pub mod state;
