//! Boundary to the third-party integration platform.
//!
//! [`IntegrationClient`] is the seam: production code talks to the platform
//! through [`HttpIntegrationClient`], tests through [`MockIntegrationClient`].
//! [`TemplateCatalog`] layers the onboarding-specific calls on top.

pub mod catalog;
pub mod client;
pub mod error;
pub mod mock;

pub use catalog::{CatalogStatus, ConnectorKeys, TemplateCatalog};
pub use client::{HttpIntegrationClient, IntegrationClient};
pub use error::ConnectorError;
pub use mock::MockIntegrationClient;
