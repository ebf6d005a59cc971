use jiff::Timestamp;
use serde::Serialize;
use uuid::Uuid;

use super::error::{PipelineFailure, Stage};
use trx_common::ErrorKind;
use trx_types::{Amount, BroadcastResult, CostEstimate, Network, TransactionId};

/// How a run ended
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferOutcome {
    /// The node accepted the transaction
    Succeeded {
        tx_id: TransactionId,
        explorer_url: String,
        broadcast: BroadcastResult,
    },
    Failed(PipelineFailure),
    /// The broadcast left but no answer came back. Look the id up before sending again.
    Unknown {
        tx_id: TransactionId,
        explorer_url: String,
        reason: String,
    },
}

/// Everything a presentation layer needs to render one run
#[derive(Debug, Serialize)]
pub struct TransferReport {
    pub run_id: Uuid,
    pub network: Network,
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub balance: Option<Amount>,
    pub estimate: Option<CostEstimate>,
    pub total_cost: Option<Amount>,
    pub expires_at: Option<Timestamp>,
    pub completed: Vec<Stage>,
    pub outcome: TransferOutcome,
}

impl TransferReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TransferOutcome::Succeeded { .. })
    }

    pub fn tx_id(&self) -> Option<&TransactionId> {
        match &self.outcome {
            TransferOutcome::Succeeded { tx_id, .. } | TransferOutcome::Unknown { tx_id, .. } => {
                Some(tx_id)
            }
            TransferOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&PipelineFailure> {
        match &self.outcome {
            TransferOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// `Unknown` for an indeterminate broadcast, the failure's kind otherwise
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            TransferOutcome::Succeeded { .. } => None,
            TransferOutcome::Failed(failure) => Some(failure.kind()),
            TransferOutcome::Unknown { .. } => Some(ErrorKind::Unknown),
        }
    }

    pub fn fee(&self) -> Option<Amount> {
        self.estimate.as_ref().map(|e| e.estimated_fee)
    }
}
