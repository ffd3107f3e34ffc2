//! Listing Desk - Conversational assistant for local business listings
//!
//! This crate implements a phone-identity based assistant that lets business
//! owners look up, edit, or register a listing, and lets anyone search the
//! listings corpus with free-text queries backed by tiered fuzzy search.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
