//! Startup bootstrap of the element store
//!
//! The store only caches re-derivable oracle results, so a schema mismatch is
//! resolved by wiping everything and reseeding with the foundational elements.

use shared::{ProcessRole, foundational_elements, process_info, process_warn};
use crate::error::WebServerResult;
use crate::services::element_log::RedbElementLog;
use crate::traits::ElementLog;
use crate::types::{BootstrapReport, SchemaStatus};

/// Check the schema marker, wipe on mismatch, and seed an empty store
pub async fn bootstrap_store(log: &RedbElementLog, expected_version: u64) -> WebServerResult<BootstrapReport> {
    let schema = log.schema_status(expected_version).await?;

    let wiped = match schema {
        SchemaStatus::Current => false,
        SchemaStatus::Mismatch { found, expected } => {
            process_warn!(
                ProcessRole::current(),
                "⚠️ Schema version {} does not match expected {}, wiping element store",
                found,
                expected
            );
            log.wipe().await?;
            true
        }
        SchemaStatus::Missing => {
            // Data without a marker predates versioning
            if log.len().await? > 0 {
                process_warn!(ProcessRole::current(), "⚠️ Element store has no schema marker, wiping");
                log.wipe().await?;
                true
            } else {
                false
            }
        }
    };

    if schema != SchemaStatus::Current {
        log.write_schema_version(expected_version).await?;
    }

    let mut seeded = 0;
    if log.len().await? == 0 {
        for element in foundational_elements() {
            log.append(element).await?;
            seeded += 1;
        }
        process_info!(ProcessRole::current(), "🌱 Seeded element store with {} foundational elements", seeded);
    }

    let total_elements = log.len().await?;
    Ok(BootstrapReport {
        schema,
        wiped,
        seeded,
        total_elements,
    })
}
