//! Per-provider results of one listing request and their aggregation.

use common::{Fields, Outcome, keys};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::providers::ProviderId;

/// Error message of an aggregate outcome with at least one failed provider.
pub const SOME_FAILED_MESSAGE: &str = "some marketplaces failed";

/// Ordered mapping from provider id to that provider's outcome.
///
/// Insertion order is the configured provider order. Built once per
/// request by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResultSet {
    entries: Vec<(ProviderId, Outcome)>,
}

impl ProviderResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a provider's outcome, replacing an earlier one in place.
    pub fn insert(&mut self, provider: ProviderId, outcome: Outcome) {
        match self.entries.iter_mut().find(|(id, _)| *id == provider) {
            Some(entry) => entry.1 = outcome,
            None => self.entries.push((provider, outcome)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &Outcome)> {
        self.entries.iter().map(|(id, outcome)| (*id, outcome))
    }

    /// Providers whose outcome is a success, in configured order.
    pub fn successful(&self) -> Vec<ProviderId> {
        self.iter()
            .filter(|(_, outcome)| outcome.is_success())
            .map(|(id, _)| id)
            .collect()
    }

    /// Providers whose outcome is a failure, in configured order.
    pub fn failed(&self) -> Vec<(ProviderId, &Outcome)> {
        self.iter().filter(|(_, outcome)| outcome.is_failure()).collect()
    }

    /// Returns true if any failed provider can resume mid-protocol.
    pub fn has_recoverable_failures(&self) -> bool {
        self.iter()
            .any(|(_, outcome)| outcome.is_failure() && outcome.meta_flag(keys::RECOVERABLE))
    }

    /// Combines the per-provider outcomes into one response outcome.
    ///
    /// - every provider succeeded: success with payload `results`
    /// - otherwise: failure "some marketplaces failed" with payload
    ///   `successful` and `failed`, and meta `partial_success` and
    ///   `recoverable_failures`
    pub fn aggregate(&self) -> Outcome {
        let failed = self.failed();
        if failed.is_empty() {
            // Serializing string-keyed maps of JSON values cannot fail.
            let results = serde_json::to_value(self).unwrap_or_default();
            return Outcome::success(Fields::new()).with_payload(keys::RESULTS, results);
        }

        let successful: Vec<Value> = self
            .successful()
            .into_iter()
            .map(|id| Value::from(id.as_str()))
            .collect();
        let failed: Fields = failed
            .into_iter()
            .map(|(id, outcome)| {
                let message = outcome.error_message().unwrap_or_default();
                (id.as_str().to_string(), Value::from(message))
            })
            .collect();

        Outcome::failure(SOME_FAILED_MESSAGE)
            .with_meta(keys::PARTIAL_SUCCESS, !successful.is_empty())
            .with_meta(keys::RECOVERABLE_FAILURES, self.has_recoverable_failures())
            .with_payload(keys::SUCCESSFUL, successful)
            .with_payload(keys::FAILED, failed)
    }
}

impl Serialize for ProviderResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, outcome) in &self.entries {
            map.serialize_entry(id.as_str(), outcome)?;
        }
        map.end()
    }
}
