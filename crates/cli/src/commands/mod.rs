//! CLI command implementations.
//!
//! Commands write their output to the given writer so they can be tested
//! against a buffer.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod newsletter;

use std::path::PathBuf;

use alyssa_loops_core::cart::StorageError;
use alyssa_loops_core::catalog::CatalogError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The cart could not be read or written.
    #[error("cart storage: {0}")]
    Storage(#[from] StorageError),

    /// A catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The catalog file could not be loaded.
    #[error("failed to load catalog {path}: {message}")]
    CatalogFile { path: PathBuf, message: String },

    /// Writing output failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use alyssa_loops_core::api::{ApiResponse, CheckoutRequest, CheckoutResponse};
    use alyssa_loops_core::contact::ContactRequest;

    use crate::client::{ClientError, StorefrontApi};

    /// Canned API answers; records every request.
    #[derive(Default)]
    pub struct FakeApi {
        pub contact_ok: bool,
        pub checkout_url: Option<String>,
        pub fail: bool,
        pub contacts: Mutex<Vec<ContactRequest>>,
        pub checkouts: Mutex<Vec<CheckoutRequest>>,
    }

    impl FakeApi {
        pub fn calls(&self) -> usize {
            self.contacts.lock().map_or(0, |c| c.len()) + self.checkouts.lock().map_or(0, |c| c.len())
        }
    }

    #[async_trait]
    impl StorefrontApi for FakeApi {
        async fn submit_contact(
            &self,
            request: &ContactRequest,
        ) -> Result<ApiResponse, ClientError> {
            if let Ok(mut contacts) = self.contacts.lock() {
                contacts.push(request.clone());
            }
            if self.fail {
                return Err(ClientError::Status {
                    status: 500,
                    message: String::new(),
                });
            }
            Ok(ApiResponse {
                ok: self.contact_ok,
                error: None,
            })
        }

        async fn create_checkout_session(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutResponse, ClientError> {
            if let Ok(mut checkouts) = self.checkouts.lock() {
                checkouts.push(request.clone());
            }
            if self.fail {
                return Err(ClientError::Status {
                    status: 500,
                    message: String::new(),
                });
            }
            Ok(CheckoutResponse {
                ok: self.checkout_url.is_some(),
                url: self.checkout_url.clone(),
                error: None,
            })
        }
    }
}
