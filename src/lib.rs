//! Aibitat — multi-agent conversation engine
//!
//! Orchestrates turn-based conversations between named agents and channels
//! (groups of agents). Each turn's text comes from a language-model
//! [`Provider`](provider::Provider); turns can call registered functions,
//! pause for human feedback, resume, retry after provider failures, or
//! terminate.
//!
//! # Quick Start
//!
//! ```no_run
//! use aibitat::prelude::*;
//!
//! # async fn example() -> aibitat::error::Result<()> {
//! let config = AibitatConfig::from_env()?;
//! let mut aibitat = Aibitat::from_config(config, &Credentials::from_env())?;
//! aibitat
//!     .agent("🧑", AgentConfig::builder().interrupt(InterruptPolicy::Always).build())?
//!     .agent("🤖", AgentConfig::default())?;
//!
//! aibitat.start(StartMessage::new("🧑", "🤖", "Is 2 + 2 = 4?")).await?;
//! for chat in aibitat.chats() {
//!     println!("{} -> {}: {}", chat.from, chat.to, chat.text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod functions;
pub mod ledger;
pub mod models;
pub mod participants;
pub mod prelude;
pub mod provider;
pub mod types;
pub mod util;
