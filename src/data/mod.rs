pub mod artifact;
pub mod provider;
#[cfg(test)]
pub mod testing;
pub mod types;

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::U256;
use tokio::sync::mpsc;
use tracing::debug;

use crate::data::artifact::ContractHandle;
use crate::data::provider::ChainProvider;
use crate::data::types::*;
use crate::events::{AppEvent, MountId};
use crate::utils;

/// Number of entries kept in the timeline's recent-activity list.
const RECENT_EVENTS: usize = 20;

/// What a mounted visualization is given: the validated handles and the
/// space it may use. Handles are shared read-only.
#[derive(Clone)]
pub struct VisualizationContext {
    pub provider: Arc<dyn ChainProvider>,
    pub contract: Arc<ContractHandle>,
    pub contract_address: String,
    pub height: u16,
}

#[derive(Debug, Clone)]
pub struct VisualizationSettings {
    pub timeline_lookback: u64,
    pub timeline_buckets: usize,
    pub curve_function: Option<String>,
    pub curve_max_supply: u64,
    pub curve_samples: usize,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            timeline_lookback: 5_000,
            timeline_buckets: 24,
            curve_function: None,
            curve_max_supply: 1_000_000,
            curve_samples: 40,
        }
    }
}

/// Fetches data for the mounted visualization in background tasks. Results
/// come back on the app channel tagged with the mount that asked for them.
pub struct VisualizationService {
    settings: Arc<VisualizationSettings>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl VisualizationService {
    pub fn new(settings: VisualizationSettings, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            settings: Arc::new(settings),
            event_tx,
        }
    }

    /// Fetch the contract's logs over the lookback window and bucket them.
    pub fn fetch_timeline(&self, mount: MountId, ctx: &VisualizationContext) {
        let provider = Arc::clone(&ctx.provider);
        let contract = Arc::clone(&ctx.contract);
        let settings = Arc::clone(&self.settings);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let head = match provider.block_number().await {
                Ok(n) => n,
                Err(e) => {
                    let _ = tx.send(AppEvent::VisualizationFailed {
                        mount,
                        message: format!("Failed to get block number: {e}"),
                    });
                    return;
                }
            };

            let from = head.saturating_sub(settings.timeline_lookback);
            let logs = match provider.get_logs(contract.address(), from, head).await {
                Ok(logs) => logs,
                Err(e) => {
                    let _ = tx.send(AppEvent::VisualizationFailed {
                        mount,
                        message: format!("Failed to fetch logs for blocks {from}..={head}: {e}"),
                    });
                    return;
                }
            };

            debug!(%mount, from, head, logs = logs.len(), "timeline data fetched");
            let data = build_timeline(from, head, &logs, &contract, settings.timeline_buckets);
            let _ = tx.send(AppEvent::TimelineLoaded { mount, data });
        });
    }

    /// Sample the curve function across the configured supply range.
    pub fn fetch_curve(&self, mount: MountId, ctx: &VisualizationContext) {
        let provider = Arc::clone(&ctx.provider);
        let contract = Arc::clone(&ctx.contract);
        let settings = Arc::clone(&self.settings);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = sample_curve(provider.as_ref(), &contract, &settings).await;
            let event = match result {
                Ok(data) => {
                    debug!(%mount, function = %data.function, points = data.points.len(), "curve sampled");
                    AppEvent::CurveLoaded { mount, data }
                }
                Err(message) => AppEvent::VisualizationFailed { mount, message },
            };
            let _ = tx.send(event);
        });
    }
}

async fn sample_curve(
    provider: &dyn ChainProvider,
    contract: &ContractHandle,
    settings: &VisualizationSettings,
) -> Result<CurveData, String> {
    let function = contract
        .curve_function(settings.curve_function.as_deref())
        .ok_or_else(|| match &settings.curve_function {
            Some(name) => format!("{name} is not a view function taking and returning a uint"),
            None => "ABI has no view function taking and returning a uint".to_string(),
        })?;

    let mut points = Vec::with_capacity(settings.curve_samples + 1);
    for supply in sample_supplies(settings.curve_max_supply, settings.curve_samples) {
        let outputs = contract
            .call_function(provider, function, &[DynSolValue::Uint(supply, 256)])
            .await
            .map_err(|e| e.to_string())?;
        let value = first_uint(&outputs)
            .ok_or_else(|| format!("{} returned no uint", function.name))?;
        points.push(CurvePoint {
            supply: utils::u256_to_f64(supply),
            value: utils::u256_to_f64(value),
        });
    }

    // The position marker is optional; a contract without totalSupply still plots.
    let current_supply = contract
        .call_by_name(provider, "totalSupply", &[])
        .await
        .ok()
        .and_then(|outputs| first_uint(&outputs));

    Ok(CurveData {
        function: function.name.clone(),
        points,
        current_supply,
    })
}

fn first_uint(values: &[DynSolValue]) -> Option<U256> {
    match values.first()? {
        DynSolValue::Uint(value, _) => Some(*value),
        _ => None,
    }
}

/// Evenly spaced supplies from 0 to `max_supply` inclusive.
pub fn sample_supplies(max_supply: u64, samples: usize) -> Vec<U256> {
    let samples = samples.max(1) as u64;
    (0..=samples)
        .map(|i| U256::from(max_supply) * U256::from(i) / U256::from(samples))
        .collect()
}

/// Bucket `logs` over `from..=to` and decode the most recent ones by event name.
pub fn build_timeline(
    from: u64,
    to: u64,
    logs: &[ContractLog],
    contract: &ContractHandle,
    bucket_count: usize,
) -> TimelineData {
    let span = to.saturating_sub(from) + 1;
    let bucket_size = span.div_ceil(bucket_count.max(1) as u64).max(1);
    let buckets_needed = span.div_ceil(bucket_size);

    let mut buckets: Vec<TimelineBucket> = (0..buckets_needed)
        .map(|i| {
            let start_block = from + i * bucket_size;
            TimelineBucket {
                start_block,
                end_block: (start_block + bucket_size - 1).min(to),
                count: 0,
            }
        })
        .collect();

    let mut in_range: Vec<&ContractLog> = logs
        .iter()
        .filter(|log| log.block_number >= from && log.block_number <= to)
        .collect();

    for log in &in_range {
        let index = ((log.block_number - from) / bucket_size) as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.count += 1;
        }
    }

    in_range.sort_by(|a, b| b.block_number.cmp(&a.block_number));
    let recent = in_range
        .iter()
        .take(RECENT_EVENTS)
        .map(|log| TimelineEvent {
            block_number: log.block_number,
            timestamp: log.block_timestamp,
            name: event_label(log, contract),
            transaction_hash: log.transaction_hash,
        })
        .collect();

    TimelineData {
        from_block: from,
        to_block: to,
        buckets,
        recent,
        total_events: in_range.len(),
    }
}

fn event_label(log: &ContractLog, contract: &ContractHandle) -> String {
    match log.topic0() {
        Some(topic) => contract
            .event_name(topic)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unknown ({})", &topic.to_string()[..10])),
        None => "Anonymous".to_string(),
    }
}
