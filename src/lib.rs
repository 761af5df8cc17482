//! # G-Click task report
//!
//! Pulls the obligations and requests assigned to every responsible user
//! from the G-Click API and exports them as a single report.
//!
//! ## Flow
//!
//! ```text
//!   /oauth/token ──► Session (bearer token, refreshed per TokenPolicy)
//!                          │
//!   /tarefas/responsaveis ─┤  owners, minus the exclusion list
//!                          ▼
//!   /tarefas?categoria=... (paged, per owner × {Obrigacao, Solicitacao})
//!                          │
//!                          ▼
//!   status + DD/MM/YYYY dates ──► rows sorted by owner ──► XLSX / CSV
//! ```
//!
//! ## Modules
//! - `api`: token session, owners listing, paginated task listing
//! - `report`: status classification, date display, rows and export
//! - `pipeline`: one report run end to end
//! - `config`: environment-driven configuration

pub mod api;
pub mod config;
pub mod pipeline;
pub mod report;

pub use config::Config;
pub use pipeline::{ReportError, ReportPipeline, RunSummary};
