//! # Style Extract
//!
//! Extract a prescriptive coding or writing style guide from a small corpus
//! of sample files using a large language model.
//!
//! Style Extract scans a directory for samples, embeds them in a fixed
//! prompt that separates style from subject matter, sends the prompt to a
//! completion endpoint in a single request, and saves the markdown reply.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   ┌─────────┐   ┌──────────┐   ┌──────────┐   ┌─────────┐
//! │  Scan   │──▶│  Load   │──▶│  Prompt  │──▶│  Client  │──▶│  Draft  │
//! │ walkdir │   │ Samples │   │ template │   │ Messages │   │  .md    │
//! └─────────┘   └─────────┘   └──────────┘   └────┬─────┘   └─────────┘
//!                                                 │
//!                                                 ▼
//!                                            ┌──────────┐
//!                                            │ Session  │
//!                                            │  turns   │
//!                                            └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! stylex scan code                  # list the samples that would be used
//! stylex prompt writing             # print the prompt, no network call
//! stylex extract code               # write skill_set/coding_stylistic_guide.md
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`scan`] | Corpus scanner |
//! | [`loader`] | Sample loader |
//! | [`prompt`] | Prompt assembly |
//! | [`client`] | Completion provider abstraction |
//! | [`session`] | Conversation log |
//! | [`draft`] | Draft persistence |
//! | [`extract`] | Pipeline orchestration |
//! | [`progress`] | Progress reporting on stderr |

pub mod client;
pub mod config;
pub mod draft;
pub mod extract;
pub mod loader;
pub mod models;
pub mod progress;
pub mod prompt;
pub mod scan;
pub mod session;
