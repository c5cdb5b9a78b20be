//! sp_drive - read and write analyst files in a SharePoint document library.
//!
//! This library wraps the Microsoft Graph drive endpoints so that tabular
//! and serialized-object files can move in and out of a document library
//! without manual token, sync, or temp-file management:
//! - connect once per process with a device-code browser login
//! - resolve a named document library to a [`Drive`]
//! - read and write CSV tables, spreadsheet workbooks, and object archives
//!   through a staged local file that is always cleaned up
//!
//! # Example
//!
//! ```no_run
//! use sp_drive::{connect, ConnectConfig, TableReadOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConnectConfig::new(
//!         "https://contoso.sharepoint.com/sites/analytics",
//!         "contoso.onmicrosoft.com",
//!         "11111111-2222-3333-4444-555555555555",
//!     );
//!     let site = connect(&config).await?;
//!     let drive = site.drive("Documents").await?;
//!
//!     let table = drive
//!         .read_table("reports/summary.csv", &TableReadOptions::default())
//!         .await?;
//!     println!("{} rows", table.n_rows());
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod ops;
pub mod path;
mod stage;
pub mod table;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::{connect, Drive, Site};
pub use config::{ConnectConfig, ConnectOptions};
pub use error::{Error, Result};
pub use formats::table::{TableReadOptions, TableWriteOptions};
pub use formats::workbook::{WorkbookReadOptions, WorkbookWriteOptions};
pub use models::DriveItem;
pub use ops::WriteOutcome;
pub use table::{Cell, Table, Workbook};
