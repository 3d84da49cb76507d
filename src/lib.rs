//! Thoughtful
//!
//! A note-taking backend: users jot down short thoughts, keep a personal
//! memory of named entities, and maintain a versioned system prompt. Each
//! thought is enriched in the background by an OpenAI-compatible model that
//! sees the user's latest prompt and entity names.
//!
//! # Modules
//!
//! - [`domain`]: Entities, prompts, thoughts and the enrichment state machine
//! - [`persistence`]: Storage trait with in-memory and Postgres providers
//! - [`enrichment`]: Prompt composition, worker, task scheduler, change feed
//! - [`llm`]: Chat Completions client behind the [`llm::TextGenerator`] trait
//! - [`service`]: Owner-scoped operations used by the HTTP layer
//! - [`api`]: JSON routes and the SSE change stream
//! - [`security`]: Bearer token verification

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod domain;
pub mod enrichment;
pub mod error;
pub mod llm;
pub mod persistence;
pub mod security;
pub mod server;
pub mod service;
pub mod telemetry;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::security::JwtVerifier;
use crate::service::NotesService;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Owner-scoped notes operations.
    pub notes: NotesService,
    /// Bearer token verifier used by the auth middleware.
    pub jwt: Arc<JwtVerifier>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
