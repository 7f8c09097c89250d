//! # termsweep
//!
//! Search a large tree of flat files (dumps, logs, CSV/SQL exports) for
//! many terms at once and write one result file per term, optionally
//! tagged with the term's owner and handed to a notification stage.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────────┐   ┌──────────────┐   ┌────────────┐
//! │ Term set  │──▶│  Discovery  │──▶│ Worker pool  │──▶│ Aggregator │
//! │ + config  │   │ walk+filter │   │ 1 matcher    │   │ (caller)   │
//! └───────────┘   └─────────────┘   │ per worker   │   └─────┬──────┘
//!                                   └──────────────┘         │
//!                  ┌──────────────┐   ┌──────────────┐       │
//!                  │   Notifier   │◀──│ Writer + run │◀──────┤
//!                  │ (log/outbox) │   │   manifest   │  owner resolution
//!                  └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! termsweep scan --terms ./domains.txt --root /data/dumps --out ./results
//! termsweep scan --terms example.com --root /data/dumps --owners ./owners.csv
//! termsweep resolve shop.example.com --owners ./owners.csv
//! termsweep files --root /data/dumps --ext txt,csv
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and validation |
//! | [`discover`] | Candidate file enumeration |
//! | [`ignore`] | System/temporary artifact policy |
//! | [`inputs`] | Term list and owner map loading |
//! | [`scan`] | Per-file scanning and the worker pool |
//! | [`writer`] | Result artifacts and run manifest |
//! | [`notify`] | Notification seam and built-in notifiers |
//! | [`pipeline`] | End-to-end run orchestration |
//! | [`progress`] | Progress reporting on stderr |
//! | [`stats`] | End-of-run summary |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod discover;
pub mod ignore;
pub mod inputs;
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod progress;
pub mod scan;
pub mod stats;
pub mod writer;
