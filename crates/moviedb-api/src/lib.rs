//! API client library for moviedb.
//!
//! Provides a client for the TMDB v2.1 XML API.

/// TMDB v2.1 API client.
pub mod tmdb;
