//! # flare
//!
//! Local risk assessment for shell commands an AI coding agent is about to
//! run. Flare never executes or blocks anything — it parses a command
//! string, runs a fixed set of analyzers over it, and returns an advisory
//! [`types::RiskAssessment`] for the caller to act on.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use flare::{assess, config::Config, oracle::Oracle};
//!
//! let config = Config::load(None).expect("failed to load config");
//! let oracle = Arc::new(Oracle::with_http_backend());
//! let report = assess::assess("rm -rf /", Path::new("."), &config, &oracle);
//!
//! println!("{}: {}", report.risk_level, report.summary);
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around a pipeline:
//!
//! 1. **[`parser`]** — turns a raw command string into an ordered list of
//!    [`types::Segment`]s, lifting subshells, backticks, and interpreter
//!    heredocs into segments of their own.
//! 2. **[`analyzers`]** — pluggable [`analyzers::Analyzer`] trait with six
//!    built-in implementations (destructive, permissions, sensitive-path,
//!    network, code-injection, package-vulnerability).
//! 3. **[`oracle`]** — a bounded, cached client for the OSV vulnerability
//!    database, consulted only by the package-vulnerability analyzer.
//! 4. **[`scorer`]** — turns the combined findings into one overall
//!    [`types::RiskAssessment`], amplifying certain severity combinations.
//! 5. **[`assess`]** — orchestrates the above in parallel via [rayon] and
//!    is the crate's single public entry point.
//! 6. **[`config`]** — load and validate configuration from TOML files.
//!
//! ## Analyzers
//!
//! | Analyzer | What it flags |
//! |---|---|
//! | `destructive` | `rm -rf`, `mkfs`, `shred`, `dd` onto a device, dangerous `git`, destructive SQL |
//! | `permissions` | `sudo`, dangerous `chmod`/`chown` on sensitive paths |
//! | `sensitive-path` | reads/writes touching credentials, agent config, or system-auth files |
//! | `network` | exfiltration, clear-text HTTP, leaked credential headers, raw sockets |
//! | `code-injection` | `eval`/inline interpreter flags, pipe-to-shell, docker escapes |
//! | `package-vulnerability` | known CVEs in packages named by `npm`/`pip`/`cargo` install |

pub mod analyzers;
pub mod assess;
pub mod config;
pub mod error;
pub mod oracle;
pub mod output;
pub mod parser;
pub mod scorer;
pub mod types;
