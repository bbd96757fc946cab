//! Report sinks for finished scans.
//!
//! - Plain text: one path per line, a blank line between groups
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::config::ScanConfig;
//! use blockdupe::duplicates::DuplicateFinder;
//! use blockdupe::error::ExitCode;
//! use blockdupe::output::{JsonOutput, TextOutput};
//!
//! let finder = DuplicateFinder::new(ScanConfig::new(vec![".".into()]));
//! let (groups, summary) = finder.find_duplicates().unwrap();
//!
//! print!("{}", TextOutput::new(&groups).to_text());
//!
//! let code = ExitCode::for_scan(groups.len(), summary.diagnostics.len());
//! let output = JsonOutput::new(&groups, &summary, code);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::{write_summary, TextOutput};
