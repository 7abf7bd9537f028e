//! Typed client for the live input resources of the Cloudflare Stream API.
//!
//! ```rust,no_run
//! # async fn example() -> cloudflare_stream::Result<()> {
//! use cloudflare_stream::{CloudflareClient, CloudflareSettings, ListLiveInputsParams};
//!
//! let settings = CloudflareSettings {
//!     api_token: "token".to_string(),
//!     account_id: None,
//!     base_url: cloudflare_stream::DEFAULT_BASE_URL.to_string(),
//!     timeout_secs: Some(30),
//! };
//! let client = CloudflareClient::new(&settings)?;
//! let inputs = client
//!     .list_live_inputs(&ListLiveInputsParams::new("023e105f4ecef8ad9ca31a8372d0c353"))
//!     .await?;
//! for input in inputs {
//!     println!("{}", input.uid);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod live_input;
mod settings;
#[cfg(test)]
mod testing;
mod types;

pub use client::*;
pub use error::*;
pub use live_input::*;
pub use settings::*;
pub use types::*;
