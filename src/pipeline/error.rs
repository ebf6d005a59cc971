use derive_more::Display;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use trx_common::{ErrorKind, TrxError};

/// Pipeline stages in the order a run passes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[display("validating")]
    Validating,
    #[display("balance check")]
    BalanceChecked,
    #[display("cost estimation")]
    CostEstimated,
    #[display("funds confirmation")]
    FundsConfirmed,
    #[display("build")]
    Built,
    #[display("signing")]
    Signed,
    #[display("broadcast")]
    Broadcast,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Validating,
        Stage::BalanceChecked,
        Stage::CostEstimated,
        Stage::FundsConfirmed,
        Stage::Built,
        Stage::Signed,
        Stage::Broadcast,
    ];
}

/// The stage a run stopped at and why
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub error: TrxError,
}

impl PipelineFailure {
    pub fn new(stage: Stage, error: TrxError) -> Self {
        Self { stage, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl Serialize for PipelineFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineFailure", 3)?;
        state.serialize_field("stage", &self.stage)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.error.to_string())?;
        state.end()
    }
}
