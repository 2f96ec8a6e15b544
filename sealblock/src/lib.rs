#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::similar_names,
    clippy::doc_markdown
)]

//! Sealblock - **content-sealed blocks, event-sourced persistence and leader-gated transaction routing**
//!
//! ## Overview
//!
//! `Sealblock` is the consensus facing core of a blockchain node, written in `Rust`.
//! Blocks are sealed with a deterministic content digest (the `Seal`), and their creation is persisted
//! as an immutable `BlockCreatedEvent` whose aggregate id is the seal itself.
//! Pooled transactions are only turned into blocks by the current leader; every other node forwards
//! its uncommitted transactions to the leader.

/// Only compile this code when the `monitoring` feature is enabled.
/// ```
/// use sealblock::if_monitoring;
///
/// if_monitoring! {
///     pub use std::collections::HashMap;
/// }
/// // or
/// if_monitoring! {{
///     println!("Monitoring enabled!");
/// }};
/// ```
#[macro_export]
macro_rules! if_monitoring {
    ($block:block) => {
        #[cfg(feature = "monitoring")]
        $block
    };
    ($($item:item)*) => {
        $(
            #[cfg(feature = "monitoring")]
            $item
        )*
    };
}

pub mod config;
pub mod consensus;
mod error;
pub mod event;
pub mod event_store;
pub mod leader;
pub mod node;
pub mod runtime;
pub mod time;
pub mod txpool;

if_monitoring! {
    pub mod prometheus;
}

pub use error::{Error, SealAnchor, TxSealCause};

/// Error type used at the boundary to external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
