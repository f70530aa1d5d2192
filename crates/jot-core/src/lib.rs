//! Jot Core Library
//!
//! Shared functionality for the jot quick-entry bookkeeping parser:
//! - Idempotent text normalization shared by every matcher
//! - Amount/date extraction with date masking
//! - Fuzzy account resolution with directional transfer handling
//! - Transaction kind classification and keyword-table category inference
//! - Confidence gate with a time-boxed remote augmentation race
//! - Pluggable remote language-understanding backends (Ollama, mock)
//! - Similarity-weighted learned preference store

pub mod accounts;
pub mod ai;
pub mod amount;
pub mod category;
pub mod classify;
pub mod config;
pub mod date;
pub mod error;
pub mod gate;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod prefs;

pub use accounts::{AccountResolver, Mention, TransferResolution};
pub use ai::{MockBackend, OllamaBackend, RemoteBackend, RemoteClient, RemoteParse, RemoteRequest};
pub use config::ParserConfig;
pub use error::{Error, Result};
pub use gate::ConfidenceGate;
pub use models::{Account, Category, LearnedPref, ParsedInput, TransactionKind};
pub use parser::EntryParser;
pub use prefs::{FieldOverrides, PrefMatch, PreferenceStore};
