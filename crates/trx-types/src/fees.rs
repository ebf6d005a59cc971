use crate::Amount;
use serde::{Deserialize, Serialize};

/// One `{key, value}` entry of `/wallet/getchainparameters`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParameter {
    pub key: String,
    #[serde(default)]
    pub value: Option<i64>,
}

/// Where the fee prices came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterSource {
    /// Both prices were read from the node
    Chain,
    /// The node answered but at least one price was missing, defaults filled the gaps
    Defaults,
    /// The query failed outright
    Unavailable,
}

/// Resource prices, in sun per unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFeeParameters {
    pub energy_fee: u64,
    pub bandwidth_fee: u64,
    pub source: ParameterSource,
}

impl ChainFeeParameters {
    pub const ENERGY_FEE_KEY: &'static str = "getEnergyFee";
    pub const BANDWIDTH_FEE_KEY: &'static str = "getTransactionFee";

    pub const DEFAULT_ENERGY_FEE: u64 = 420;
    pub const DEFAULT_BANDWIDTH_FEE: u64 = 1_000;

    /// Documented defaults, used when the parameter query fails
    pub fn fallback() -> Self {
        Self {
            energy_fee: Self::DEFAULT_ENERGY_FEE,
            bandwidth_fee: Self::DEFAULT_BANDWIDTH_FEE,
            source: ParameterSource::Unavailable,
        }
    }

    pub fn from_chain_parameters(params: &[ChainParameter]) -> Self {
        let lookup = |key: &str| {
            params
                .iter()
                .find(|p| p.key == key)
                .and_then(|p| p.value)
                .and_then(|v| u64::try_from(v).ok())
        };

        let energy_fee = lookup(Self::ENERGY_FEE_KEY);
        let bandwidth_fee = lookup(Self::BANDWIDTH_FEE_KEY);
        let source = if energy_fee.is_some() && bandwidth_fee.is_some() {
            ParameterSource::Chain
        } else {
            tracing::debug!(
                energy_fee = ?energy_fee,
                bandwidth_fee = ?bandwidth_fee,
                "chain parameters incomplete, filling with defaults"
            );
            ParameterSource::Defaults
        };

        Self {
            energy_fee: energy_fee.unwrap_or(Self::DEFAULT_ENERGY_FEE),
            bandwidth_fee: bandwidth_fee.unwrap_or(Self::DEFAULT_BANDWIDTH_FEE),
            source,
        }
    }

    pub fn bandwidth_cost(&self, units: u64) -> Option<Amount> {
        units.checked_mul(self.bandwidth_fee).map(Amount::from_sun)
    }

    pub fn energy_cost(&self, units: u64) -> Option<Amount> {
        units.checked_mul(self.energy_fee).map(Amount::from_sun)
    }
}

/// Which computation produced a [`CostEstimate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimateSource {
    /// Fixed resource usage priced with the chain parameters
    ChainParameters,
    /// The probe transaction's fee limit exceeded the parameter-derived fee
    ProbeTransaction,
    /// The probe failed; parameter-derived fee only
    DefaultCalculation,
    /// Nothing could be computed; fixed conservative fee
    Fallback,
}

/// Upper-bound cost of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub success: bool,
    pub bandwidth_used: u64,
    pub bandwidth_price: u64,
    pub bandwidth_cost: Amount,
    pub energy_used: u64,
    pub energy_price: u64,
    pub energy_cost: Amount,
    pub probe_fee: Option<Amount>,
    pub estimated_fee: Amount,
    pub source: EstimateSource,
    pub note: String,
    pub error: Option<String>,
}

impl CostEstimate {
    /// Fee derived from resource usage alone
    pub fn baseline_fee(&self) -> Amount {
        self.bandwidth_cost + self.energy_cost
    }

    pub fn estimated_fee_trx(&self) -> f64 {
        self.estimated_fee.as_trx()
    }
}
