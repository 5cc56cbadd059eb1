//! Utility functions and helpers.
//!
//! - [`format`] - Thousands separators for counts in status output
//! - [`progress`] - Spinner shown while waiting on the search API
//! - [`time`] - Query windows and timestamp formatting
//!
//! # Examples
//!
//! ```
//! use nro_reject_tools::utils::time::QueryWindow;
//!
//! let window = QueryWindow::month(2024, 10).unwrap();
//! assert_eq!(
//!     window.range_clause(),
//!     "timestamp:[2024-10-01T00:00:00Z TO 2024-10-31T23:59:59Z]"
//! );
//! ```

pub mod format;
pub mod progress;
pub mod time;
