//! Rate-limited, retrying access to the kanban REST API
//!
//! Everything goes through one [`RequestExecutor`]: a [`RateGate`] spaces the
//! dispatches, the executor classifies responses and retries, and the paginator and
//! tree assembler are built on top of it. [`BoardClient`] bundles them behind the
//! operations the MCP tools and CLI commands call.

pub mod executor;
pub mod paginator;
pub mod rate_gate;
pub mod request;
pub mod transport;
pub mod tree;

#[cfg(test)]
pub mod testing;

pub use executor::RequestExecutor;
pub use paginator::PageOptions;
pub use rate_gate::RateGate;
pub use request::RequestSpec;
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};

use boardkit_core::tree::TreeNode;
use serde_json::Value;

use crate::config::{Config, Timing};
use crate::error::{ApiError, Error};

/// Client for one tenant. Owned by whoever issues calls; there is no global instance.
pub struct BoardClient<T = HttpTransport> {
    executor: RequestExecutor<T>,
}

impl BoardClient<HttpTransport> {
    pub fn connect(config: &Config) -> Self {
        Self::with_transport(HttpTransport::new(config), config.timing)
    }
}

impl<T: Transport> BoardClient<T> {
    pub fn with_transport(transport: T, timing: Timing) -> Self {
        Self {
            executor: RequestExecutor::new(transport, timing),
        }
    }

    pub fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }

    /// Single request, `None` for 204/empty responses
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Option<Value>, ApiError> {
        self.executor.execute(spec).await
    }

    /// Every page of an offset-paginated collection, compacted and field-selected
    pub async fn fetch_all(
        &self,
        base: &RequestSpec,
        options: &PageOptions,
    ) -> Result<Vec<Value>, ApiError> {
        paginator::fetch_all(&self.executor, base, options).await
    }

    /// Space/folder/document tree below `root_uid`, `max_depth == 0` for unlimited
    pub async fn build_tree(
        &self,
        root_uid: Option<&str>,
        max_depth: usize,
    ) -> Result<Vec<TreeNode>, Error> {
        tree::build_tree(&self.executor, root_uid, max_depth).await
    }

    /// One level of the tree
    pub async fn list_children(&self, parent_uid: Option<&str>) -> Result<Vec<TreeNode>, Error> {
        tree::list_children(&self.executor, parent_uid).await
    }

    /// Release the connection. Safe to call more than once.
    pub async fn close(&self) {
        self.executor.close().await;
    }
}
