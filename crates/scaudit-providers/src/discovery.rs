//! Supplier discovery.
//!
//! Discovery runs before an audit starts. When the service fails, the
//! caller substitutes a fixed fallback list via [`discover_or_fallback`];
//! the engine never sees the failure.

use async_trait::async_trait;

use scaudit_core::{Supplier, SupplierId, Timestamp};
use scaudit_workflow::{DiscoveryProvider, ProviderError};

use crate::client::{DiscoveredSupplier, RiskIntelClient};

/// The fixed list used when discovery fails.
pub fn fallback_suppliers() -> Vec<Supplier> {
    [
        ("1", "Global Steel Co", "Raw Materials", "Mumbai, India", 0.8, 2),
        ("2", "TechChip Solutions", "Electronics", "Shenzhen, China", 0.4, 0),
        ("3", "EcoLogistics", "Transport", "Berlin, Germany", 0.3, 0),
    ]
    .into_iter()
    .filter_map(|(id, name, industry, location, emissions, flags)| {
        let id = SupplierId::new(id).ok()?;
        Supplier::new(id, name, industry, location, emissions, flags).ok()
    })
    .collect()
}

/// Discover suppliers, substituting [`fallback_suppliers`] on failure.
pub async fn discover_or_fallback(provider: &dyn DiscoveryProvider, company_id: &str) -> Vec<Supplier> {
    match provider.discover(company_id).await {
        Ok(suppliers) => suppliers,
        Err(e) => {
            tracing::warn!(company_id, error = %e, "supplier discovery failed, using fallback list");
            fallback_suppliers()
        }
    }
}

/// Discovery backed by the risk-intelligence service.
#[derive(Debug, Clone)]
pub struct HttpDiscovery {
    client: RiskIntelClient,
}

impl HttpDiscovery {
    pub fn new(client: RiskIntelClient) -> Self {
        Self { client }
    }
}

/// Assign `sup-<index>-<millis>` ids and validate each entry.
pub fn assign_ids(
    discovered: Vec<DiscoveredSupplier>,
    epoch_millis: i64,
) -> Result<Vec<Supplier>, ProviderError> {
    discovered
        .into_iter()
        .enumerate()
        .map(|(index, d)| {
            Supplier::new(
                SupplierId::indexed(index, epoch_millis),
                d.name,
                d.industry,
                d.location,
                d.estimated_emissions,
                d.compliance_flags,
            )
            .map_err(|e| ProviderError::Invalid(format!("supplier {index}: {e}")))
        })
        .collect()
}

#[async_trait]
impl DiscoveryProvider for HttpDiscovery {
    async fn discover(&self, company_id: &str) -> Result<Vec<Supplier>, ProviderError> {
        let discovered = self.client.discover(company_id).await?;
        let suppliers = assign_ids(discovered, Timestamp::now().epoch_millis())?;
        tracing::info!(company_id, count = suppliers.len(), "suppliers discovered");
        Ok(suppliers)
    }
}

/// Discovery that always returns the same list.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    suppliers: Vec<Supplier>,
}

impl StaticDiscovery {
    pub fn new(suppliers: Vec<Supplier>) -> Self {
        Self { suppliers }
    }

    /// A provider serving [`fallback_suppliers`].
    pub fn fallback() -> Self {
        Self::new(fallback_suppliers())
    }
}

#[async_trait]
impl DiscoveryProvider for StaticDiscovery {
    async fn discover(&self, _company_id: &str) -> Result<Vec<Supplier>, ProviderError> {
        Ok(self.suppliers.clone())
    }
}
