//! SymptoWise library
//!
//! Core of the SymptoWise health companion: the health data store, the
//! notification and toast centers, and the symptom checker that ties the
//! AI assistant to the static reference content.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod models;
pub mod services;
pub mod storage;
