//! # Solon Test
//!
//! Test utilities for Solon, exercising the CRUD dispatcher without a
//! database or a router.
//!
//! - [`MemoryTable`]: a [`StorageEngine`](solon_crud::StorageEngine) over a
//!   `Vec`, with unique columns, scoping, search, and failure injection
//! - [`TestRequest`]: builds an [`ExtractionContext`](solon_extract::ExtractionContext)
//!   carrying identity headers, path captures, and JSON bodies
//! - [`TestResponse`]: reads the `{message, results}` envelope back
//!
//! ## Example
//!
//! ```ignore
//! use solon_test::{MemoryTable, TestRequest, TestResponse};
//!
//! #[tokio::test]
//! async fn test_get_reward() {
//!     let rewards = MemoryTable::shared("rewards");
//!     let binding = Binding::new(RoleKind::User)
//!         .set_anchor(rewards.clone())
//!         .set_output(rewards);
//!
//!     let ctx = TestRequest::get("/rewards/1")
//!         .as_user("u-1", "ada@example.com")
//!         .path_param("reward_id", "1")
//!         .build();
//!
//!     let response = TestResponse::from(dispatcher.handle_get(binding, &ctx).await);
//!     response.assert_status(StatusCode::NOT_FOUND);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/solon-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod memory;
mod request;
mod response;

pub use error::TestError;
pub use memory::{MemoryRecord, MemoryTable};
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
