//! Library exports for the catalog bot
//!
//! This module exposes internal components for testing and potential library usage.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod model;
pub mod render;
pub mod review;
pub mod route;
pub mod service;
pub mod store;
