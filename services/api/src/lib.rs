pub mod adapters;
pub mod config;
pub mod error;
pub mod extract;
pub mod jwt;
pub mod web;
