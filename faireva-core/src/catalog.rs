//! RDA indicator catalog.
//!
//! Maps the evaluator's internal indicator names (`RDA_F1_01M`) to the published RDA
//! identifier, its description and its priority.

use std::collections::HashMap;

use serde::Serialize;
use strum::Display;
use tracing::debug;

use crate::error::{Error, Result};

/// Priority assigned to an indicator by the RDA FAIR Data Maturity Model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Priority {
    #[strum(serialize = "Essential (***)")]
    Essential,
    #[strum(serialize = "Important (**)")]
    Important,
    #[strum(serialize = "Useful (*)")]
    Useful,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorCatalogEntry {
    /// Internal name, uppercase (`RDA_A1_1_01M`)
    pub name: &'static str,
    /// Published identifier (`RDA-A1.1-01M`)
    pub id: &'static str,
    pub description: &'static str,
    pub priority: Priority,
}

const fn entry(
    name: &'static str,
    id: &'static str,
    description: &'static str,
    priority: Priority,
) -> IndicatorCatalogEntry {
    IndicatorCatalogEntry {
        name,
        id,
        description,
        priority,
    }
}

pub const RDA_INDICATORS: &[IndicatorCatalogEntry] = &[
    entry(
        "RDA_F1_01M",
        "RDA-F1-01M",
        "Metadata is identified by a persistent identifier",
        Priority::Essential,
    ),
    entry(
        "RDA_F1_01D",
        "RDA-F1-01D",
        "Data is identified by a persistent identifier",
        Priority::Essential,
    ),
    entry(
        "RDA_F1_02M",
        "RDA-F1-02M",
        "Metadata is identified by a globally unique identifier",
        Priority::Essential,
    ),
    entry(
        "RDA_F1_02D",
        "RDA-F1-02D",
        "Data is identified by a persistent identifier",
        Priority::Essential,
    ),
    entry(
        "RDA_F2_01M",
        "RDA-F2-01M",
        "Rich metadata is provided to allow discovery",
        Priority::Essential,
    ),
    entry(
        "RDA_F3_01M",
        "RDA-F3-01M",
        "Metadata includes the identifier for the data",
        Priority::Essential,
    ),
    entry(
        "RDA_F4_01M",
        "RDA-F4-01M",
        "Metadata is offered in such a way that it can be harvested and indexed",
        Priority::Essential,
    ),
    entry(
        "RDA_A1_01M",
        "RDA-A1-01M",
        "Metadata contains information to enable the user to get access to the data",
        Priority::Important,
    ),
    entry(
        "RDA_A1_02M",
        "RDA-A1-02M",
        "Metadata can be accessed manually (i.e. with human intervention)",
        Priority::Essential,
    ),
    entry(
        "RDA_A1_02D",
        "RDA-A1-02D",
        "Data can be accessed manually (i.e. with human intervention)",
        Priority::Essential,
    ),
    entry(
        "RDA_A1_03M",
        "RDA-A1-03M",
        "Metadata identifier resolves to a metadata record",
        Priority::Essential,
    ),
    entry(
        "RDA_A1_03D",
        "RDA-A1-03D",
        "Data identifier resolves to a digital object",
        Priority::Essential,
    ),
    entry(
        "RDA_A1_04M",
        "RDA-A1-04M",
        "Metadata is accessed through standardised protocol",
        Priority::Essential,
    ),
    entry(
        "RDA_A1_04D",
        "RDA-A1-04D",
        "Data is accessed through standardised protocol",
        Priority::Essential,
    ),
    entry(
        "RDA_A1_05D",
        "RDA-A1-05D",
        "Data can be accessed automatically (i.e. by a computer program)",
        Priority::Important,
    ),
    entry(
        "RDA_A1_1_01M",
        "RDA-A1.1-01M",
        "Metadata is accessible through a free access protocol",
        Priority::Essential,
    ),
    entry(
        "RDA_A1_1_01D",
        "RDA-A1.1-01D",
        "Data is accessible through a free access protocol",
        Priority::Important,
    ),
    entry(
        "RDA_A1_2_01D",
        "RDA-A1.2-01D",
        "Data is accessible through an access protocol that supports authentication and authorisation",
        Priority::Useful,
    ),
    entry(
        "RDA_A2_01M",
        "RDA-A2-01M",
        "Metadata is guaranteed to remain available after data is no longer available",
        Priority::Essential,
    ),
    entry(
        "RDA_I1_01M",
        "RDA-I1-01M",
        "Metadata uses knowledge representation expressed in standardised format",
        Priority::Important,
    ),
    entry(
        "RDA_I1_01D",
        "RDA-I1-01D",
        "Data uses knowledge representation expressed in standardised format",
        Priority::Important,
    ),
    entry(
        "RDA_I1_02M",
        "RDA-I1-02M",
        "Metadata uses machine-understandable knowledge representation",
        Priority::Important,
    ),
    entry(
        "RDA_I1_02D",
        "RDA-I1-02D",
        "Data uses machine-understandable knowledge representation",
        Priority::Important,
    ),
    entry(
        "RDA_I2_01M",
        "RDA-I2-01M",
        "Metadata uses FAIR-compliant vocabularies",
        Priority::Important,
    ),
    entry("RDA_I2_01D", "RDA-I2-01D", "Data uses FAIR-compliant vocabularies", Priority::Useful),
    entry(
        "RDA_I3_01M",
        "RDA-I3-01M",
        "Metadata includes references to other metadata",
        Priority::Important,
    ),
    entry("RDA_I3_01D", "RDA-I3-01D", "Data includes references to other data", Priority::Useful),
    entry(
        "RDA_I3_02M",
        "RDA-I3-02M",
        "Metadata includes references to other data",
        Priority::Important,
    ),
    entry(
        "RDA_I3_02D",
        "RDA-I3-02D",
        "Data includes qualified references to other data",
        Priority::Useful,
    ),
    entry(
        "RDA_I3_03M",
        "RDA-I3-03M",
        "Metadata includes qualified references to other metadata",
        Priority::Important,
    ),
    entry(
        "RDA_I3_04M",
        "RDA-I3-04M",
        "Metadata includes qualified references to other data",
        Priority::Useful,
    ),
    entry(
        "RDA_R1_01M",
        "RDA-R1-01M",
        "Plurality of accurate and relevant attributes are provided to allow reuse",
        Priority::Essential,
    ),
    entry(
        "RDA_R1_1_01M",
        "RDA-R1.1-01M",
        "Metadata includes information about the licence under which the data can be reused",
        Priority::Essential,
    ),
    entry(
        "RDA_R1_1_02M",
        "RDA-R1.1-02M",
        "Metadata refers to a standard reuse licence",
        Priority::Important,
    ),
    entry(
        "RDA_R1_1_03M",
        "RDA-R1.1-03M",
        "Metadata refers to a machine understandable reuse licence",
        Priority::Important,
    ),
    entry(
        "RDA_R1_2_01M",
        "RDA-R1.2-01M",
        "Metadata includes provenance information according to community-specific standards",
        Priority::Important,
    ),
    entry(
        "RDA_R1_2_02M",
        "RDA-R1.2-02M",
        "Metadata includes provenance information according to a cross-community language",
        Priority::Useful,
    ),
    entry(
        "RDA_R1_3_01M",
        "RDA-R1.3-01M",
        "Metadata complies with a community standard",
        Priority::Essential,
    ),
    entry(
        "RDA_R1_3_01D",
        "RDA-R1.3-01D",
        "Data complies with a community standard",
        Priority::Essential,
    ),
    entry(
        "RDA_R1_3_02M",
        "RDA-R1.3-02M",
        "Metadata is expressed in compliance with a machine-understandable community standard",
        Priority::Essential,
    ),
    entry(
        "RDA_R1_3_02D",
        "RDA-R1.3-02D",
        "Data is expressed in compliance with a machine-understandable community standard",
        Priority::Important,
    ),
];

/// Lookup table over catalog entries, keyed by uppercase internal name.
#[derive(Debug, Clone)]
pub struct IndicatorCatalog {
    entries: HashMap<String, IndicatorCatalogEntry>,
}

impl IndicatorCatalog {
    /// Builds a catalog, rejecting any name that appears twice.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = IndicatorCatalogEntry>,
    {
        let mut map = HashMap::new();
        for entry in entries {
            let key = entry.name.to_uppercase();
            if map.contains_key(&key) {
                return Err(Error::DuplicateIndicator { name: key });
            }
            map.insert(key, entry);
        }
        debug!("Loaded indicator catalog with {} entries", map.len());
        Ok(Self { entries: map })
    }

    /// The RDA FAIR Data Maturity Model indicators known to the evaluator.
    pub fn rda() -> Result<Self> {
        Self::from_entries(RDA_INDICATORS.iter().cloned())
    }

    /// Resolves an indicator by its internal name, case-insensitively.
    pub fn resolve(&self, name: &str) -> Result<&IndicatorCatalogEntry> {
        self.entries
            .get(&name.to_uppercase())
            .ok_or_else(|| Error::UnresolvedIndicator {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
