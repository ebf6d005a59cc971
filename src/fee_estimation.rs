use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::node::client::LedgerApi;
use trx_common::{
    Result, TrxError, FALLBACK_FEE_SUN, TRANSFER_BANDWIDTH_UNITS, TRANSFER_ENERGY_UNITS,
};
use trx_types::{
    Amount, ChainFeeParameters, CostEstimate, EstimateSource, ParameterSource, WireAddress,
};

pub const NOTE_BANDWIDTH_ONLY: &str = "Normal TRX transfer consumes only bandwidth (266 units)";
pub const NOTE_DEFAULT_PRICES: &str =
    "Bandwidth (266 units) priced with default resource prices, chain parameters incomplete";
pub const NOTE_PROBE_LIMIT: &str = "Node fee limit exceeds the bandwidth estimate";
pub const NOTE_PROBE_FAILED: &str = "Using default fee calculation (test transaction failed)";
pub const NOTE_FALLBACK: &str = "Used default value due to estimation error";

/// Conservative cost estimate for a plain TRX transfer.
///
/// The fee is `max(parameter-derived fee, probe fee limit)`: a probe transaction is built
/// only to read the node's advisory fee limit and is never broadcast.
pub struct FeeEstimator<'a, L: LedgerApi + ?Sized> {
    ledger: &'a L,
    budget: Option<Duration>,
}

impl<'a, L: LedgerApi + ?Sized> FeeEstimator<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            budget: None,
        }
    }

    /// Bound the whole estimate. Node calls share one deadline; a call that misses it counts as failed.
    pub fn with_timeout(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub async fn estimate(
        &self,
        sender: &WireAddress,
        receiver: &WireAddress,
        amount: Amount,
    ) -> CostEstimate {
        let deadline = self.budget.map(|budget| Instant::now() + budget);
        let params_query = async { Ok::<_, TrxError>(self.ledger.get_chain_fee_parameters().await) };
        let params = match self.timed(deadline, params_query).await {
            Ok(params) => params,
            Err(error) => {
                warn!(%error, "chain parameter query did not finish, using fallback prices");
                ChainFeeParameters::fallback()
            }
        };
        debug!(
            energy_fee = params.energy_fee,
            bandwidth_fee = params.bandwidth_fee,
            source = ?params.source,
            "fee parameters"
        );

        let probe = self
            .timed(deadline, self.ledger.create_transaction(sender, receiver, amount))
            .await;

        let (Some(bandwidth_cost), Some(energy_cost)) = (
            params.bandwidth_cost(TRANSFER_BANDWIDTH_UNITS),
            params.energy_cost(TRANSFER_ENERGY_UNITS),
        ) else {
            return fallback_estimate(&params, "resource cost overflows".into());
        };
        let Some(baseline) = bandwidth_cost.checked_add(energy_cost) else {
            return fallback_estimate(&params, "resource cost overflows".into());
        };

        let mut estimate = CostEstimate {
            success: true,
            bandwidth_used: TRANSFER_BANDWIDTH_UNITS,
            bandwidth_price: params.bandwidth_fee,
            bandwidth_cost,
            energy_used: TRANSFER_ENERGY_UNITS,
            energy_price: params.energy_fee,
            energy_cost,
            probe_fee: None,
            estimated_fee: baseline,
            source: EstimateSource::ChainParameters,
            note: if params.source == ParameterSource::Chain {
                NOTE_BANDWIDTH_ONLY.to_string()
            } else {
                NOTE_DEFAULT_PRICES.to_string()
            },
            error: None,
        };

        match probe {
            Ok(transaction) => {
                estimate.probe_fee = transaction.fee_limit();
                if let Some(probe_fee) = estimate.probe_fee {
                    if probe_fee > baseline {
                        estimate.estimated_fee = probe_fee;
                        estimate.source = EstimateSource::ProbeTransaction;
                        estimate.note = NOTE_PROBE_LIMIT.to_string();
                    }
                }
            }
            Err(error) if params.source == ParameterSource::Unavailable => {
                return fallback_estimate(
                    &params,
                    format!("chain parameters unavailable and probe failed: {error}"),
                );
            }
            Err(error) => {
                warn!(%error, "probe transaction failed, using parameter-derived fee");
                estimate.source = EstimateSource::DefaultCalculation;
                estimate.note = NOTE_PROBE_FAILED.to_string();
            }
        }

        info!(
            fee = %estimate.estimated_fee,
            source = ?estimate.source,
            "transfer cost estimated"
        );
        estimate
    }

    async fn timed<T>(
        &self,
        deadline: Option<Instant>,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match (deadline, self.budget) {
            (Some(deadline), Some(budget)) => tokio::time::timeout_at(deadline, fut)
                .await
                .unwrap_or(Err(TrxError::Timeout(budget))),
            _ => fut.await,
        }
    }
}

/// Fixed conservative fee for when nothing could be computed
fn fallback_estimate(params: &ChainFeeParameters, error: String) -> CostEstimate {
    warn!(%error, fee_sun = FALLBACK_FEE_SUN, "fee estimation failed, using fallback fee");
    CostEstimate {
        success: false,
        bandwidth_used: TRANSFER_BANDWIDTH_UNITS,
        bandwidth_price: params.bandwidth_fee,
        bandwidth_cost: params
            .bandwidth_cost(TRANSFER_BANDWIDTH_UNITS)
            .unwrap_or(Amount::ZERO),
        energy_used: TRANSFER_ENERGY_UNITS,
        energy_price: params.energy_fee,
        energy_cost: Amount::ZERO,
        probe_fee: None,
        estimated_fee: Amount::from_sun(FALLBACK_FEE_SUN),
        source: EstimateSource::Fallback,
        note: NOTE_FALLBACK.to_string(),
        error: Some(error),
    }
}
