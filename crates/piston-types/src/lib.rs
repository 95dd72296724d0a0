//! Wire types for the Piston code execution API.
//!
//! These are the JSON shapes exchanged with a Piston server: the runtime
//! listing returned by `GET /runtimes`, the body sent to `POST /execute`, and
//! the result that comes back. Fields the server adds that are not modelled
//! here are kept in `extra` maps so responses survive a decode/encode cycle.
//!
//! ## Example
//!
//! ```rust
//! use piston_types::{ExecuteFile, ExecuteRequest};
//!
//! let request = ExecuteRequest::new(
//!     "node-js",
//!     "*",
//!     vec![ExecuteFile::new("console.log(process.argv.slice(2))")],
//! )
//! .with_args(vec!["Hello".to_string(), "World".to_string()]);
//!
//! assert_eq!(request.files.len(), 1);
//! ```

pub mod execute;
pub mod runtime;

pub use execute::*;
pub use runtime::*;
