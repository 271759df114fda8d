#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

//! Core library for the linguaroom CLI.
//!
//! `linguaroom_core` provides:
//! - message orchestration via [`pipeline`]
//! - resilient text generation with retry/backoff via [`inference`]
//! - script-range and trigram language detection via [`detect`]
//! - naive grammar correction and pattern labels via [`grammar`]
//! - fixed-phrase translation via [`phrasebook`]
//! - canned tutor replies via [`fallback`]
//! - interactive practice sessions via [`repl`]
//! - shared configuration and response types via [`types`]
//!
//! # Quick Start
//!
//! ```
//! use linguaroom_core::inference::{InferenceClient, MockBackend};
//! use linguaroom_core::pipeline::Pipeline;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(InferenceClient::new(MockBackend, 3));
//! let bundle = pipeline.process("good morning").await?;
//! assert!(!bundle.reply.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod detect;
pub mod fallback;
pub mod grammar;
pub mod inference;
pub mod phrasebook;
pub mod pipeline;
pub mod repl;
pub mod types;
