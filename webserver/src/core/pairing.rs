//! Pairing orchestration
//!
//! Asks the oracle what two elements make, then decides whether the result is
//! a discovery (append to the log) or already known (no write).

use std::sync::Arc;

use shared::{ProcessRole, Scope, process_error, process_info, validate_element_name};
use crate::core::known::KnownElements;
use crate::error::{WebServerError, WebServerResult};
use crate::traits::{CombinationOracle, ElementLog};
use crate::types::PairOutcome;

/// Classifies oracle results and appends discoveries exactly once
pub struct PairingOrchestrator<L, O>
where
    L: ElementLog,
    O: CombinationOracle,
{
    log: Arc<L>,
    oracle: Arc<O>,
    known: Arc<KnownElements>,
}

impl<L, O> PairingOrchestrator<L, O>
where
    L: ElementLog,
    O: CombinationOracle,
{
    pub fn new(log: Arc<L>, oracle: Arc<O>, known: Arc<KnownElements>) -> Self {
        Self { log, oracle, known }
    }

    pub fn known(&self) -> &Arc<KnownElements> {
        &self.known
    }

    /// Combine `first` and `second`
    ///
    /// Oracle and storage failures leave both the known set and the log
    /// untouched.
    pub async fn pair(&self, first: &str, second: &str) -> WebServerResult<PairOutcome> {
        validate_element_name(first)?;
        validate_element_name(second)?;

        let combination = self.oracle.combine(first, second).await?;
        if combination.result_name.trim().is_empty() {
            return Err(WebServerError::oracle("oracle returned an empty element name"));
        }

        let mut known = self.known.lock().await;
        if let Some(element) = known.get(&combination.result_name) {
            return Ok(PairOutcome::Existing { element });
        }

        let element = combination.element();
        if let Err(e) = self.log.append(element.clone()).await {
            process_error!(ProcessRole::current(), "❌ Failed to store {}: {}", element.name, e);
            return Err(e);
        }
        known.add(&element);
        drop(known);

        let scope = Scope::from_globally_new(combination.is_globally_new);
        process_info!(
            ProcessRole::current(),
            "✨ Discovered {} from {} + {} ({})",
            element,
            first,
            second,
            scope
        );
        Ok(PairOutcome::Discovery { element, scope })
    }
}
