#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

//! Client core for the QChat backend proxy.
//!
//! QChat serves locally hosted models (through an Ollama proxy), a hosted
//! model (through an OpenAI proxy), and document grounded Q&A over uploaded
//! PDFs. All three speak the same streaming wire format: a `POST` returning a
//! raw byte stream of newline separated JSON objects, where each object
//! carries a text delta in one of four known shapes.
//!
//! The crate is split the same way the data flows:
//!
//! - [`domain::services::FrameDecoder`] reassembles byte buffers into frames.
//! - [`domain::models::StreamChunk`] interprets one frame into a text delta.
//! - [`infrastructure::backends`] drives a request end to end and emits
//!   [`domain::models::StreamEvent`]s over a channel.
//! - [`application::session`] owns the conversation state and folds events
//!   into it, one surface per backend.

pub mod application;
pub mod configuration;
pub mod domain;
pub mod infrastructure;
