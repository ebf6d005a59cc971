pub mod error;
pub mod report;

use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::fee_estimation::FeeEstimator;
use crate::node::client::LedgerApi;
use crate::node::explorer_tx_url;
use crate::signer::TransactionSigner;
use trx_common::{ErrorKind, Result, TrxError, DEFAULT_STAGE_TIMEOUT};
use trx_types::{
    Address, Amount, CostEstimate, Network, SignedTransaction, TransactionId, TransactionLookup,
};

pub use error::{PipelineFailure, Stage};
pub use report::{TransferOutcome, TransferReport};

/// What the caller wants moved. Addresses are validated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

impl TransferRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Amount) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub network: Network,
    /// Upper bound for every network-bound stage
    pub stage_timeout: Duration,
}

impl PipelineConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    pub fn with_stage_timeout(mut self, stage_timeout: Duration) -> Self {
        self.stage_timeout = stage_timeout;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(Network::default())
    }
}

/// Per-run bookkeeping that ends up in the report
#[derive(Debug)]
struct Run {
    run_id: Uuid,
    network: Network,
    from: String,
    to: String,
    amount: Amount,
    balance: Option<Amount>,
    estimate: Option<CostEstimate>,
    total_cost: Option<Amount>,
    expires_at: Option<jiff::Timestamp>,
    completed: Vec<Stage>,
}

impl Run {
    fn new(network: Network, request: &TransferRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            network,
            from: request.from.clone(),
            to: request.to.clone(),
            amount: request.amount,
            balance: None,
            estimate: None,
            total_cost: None,
            expires_at: None,
            completed: Vec::new(),
        }
    }

    fn span(&self) -> Span {
        info_span!("transfer", run_id = %self.run_id, network = %self.network)
    }

    fn reached(&mut self, stage: Stage) {
        debug!(%stage, "stage complete");
        self.completed.push(stage);
    }

    fn fail(self, stage: Stage, error: TrxError) -> TransferReport {
        let failure = PipelineFailure::new(stage, error);
        warn!(kind = ?failure.kind(), "{failure}");
        self.finish(TransferOutcome::Failed(failure))
    }

    fn finish(self, outcome: TransferOutcome) -> TransferReport {
        TransferReport {
            run_id: self.run_id,
            network: self.network,
            from: self.from,
            to: self.to,
            amount: self.amount,
            balance: self.balance,
            estimate: self.estimate,
            total_cost: self.total_cost,
            expires_at: self.expires_at,
            completed: self.completed,
            outcome,
        }
    }
}

/// A run that passed funds confirmation and has not been built yet.
/// Submitting consumes it, so one preparation broadcasts at most once.
#[derive(Debug)]
pub struct PreparedTransfer {
    run: Run,
    from: Address,
    to: Address,
    balance: Amount,
    estimate: CostEstimate,
    total_cost: Amount,
}

impl PreparedTransfer {
    pub fn run_id(&self) -> Uuid {
        self.run.run_id
    }

    pub fn from(&self) -> &Address {
        &self.from
    }

    pub fn to(&self) -> &Address {
        &self.to
    }

    pub fn amount(&self) -> Amount {
        self.run.amount
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn estimate(&self) -> &CostEstimate {
        &self.estimate
    }

    pub fn fee(&self) -> Amount {
        self.estimate.estimated_fee
    }

    /// Amount plus estimated fee
    pub fn total_cost(&self) -> Amount {
        self.total_cost
    }

    pub fn completed(&self) -> &[Stage] {
        &self.run.completed
    }
}

/// `balance >= amount + fee`, returning the total on success. Equality passes.
pub fn confirm_funds(balance: Amount, amount: Amount, fee: Amount) -> Result<Amount> {
    let total = amount
        .checked_add(fee)
        .ok_or_else(|| TrxError::InvalidInput("amount plus fee overflows".into()))?;
    if balance < total {
        return Err(TrxError::InsufficientFunds {
            needed: total.as_sun(),
            available: balance.as_sun(),
        });
    }
    Ok(total)
}

/// Validate, check funds, estimate, build, sign and broadcast a TRX transfer.
///
/// The ledger and signer are injected so tests can run the whole flow without a node or a key.
/// Nothing is retried: a broadcast whose answer is lost ends as [`TransferOutcome::Unknown`].
pub struct TransferPipeline<L, S> {
    ledger: L,
    signer: S,
    config: PipelineConfig,
}

impl<L, S> TransferPipeline<L, S> {
    pub fn new(ledger: L, signer: S, config: PipelineConfig) -> Self {
        Self {
            ledger,
            signer,
            config,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl<L: LedgerApi> TransferPipeline<L, ()> {
    /// Pipeline for lookups and estimates; it cannot sign
    pub fn read_only(ledger: L, config: PipelineConfig) -> Self {
        Self::new(ledger, (), config)
    }
}

impl<L: LedgerApi, S> TransferPipeline<L, S> {
    pub async fn balance(&self, address: &str) -> Result<Amount> {
        let address = parse_address(address, "address")?;
        self.within(self.ledger.get_account_balance(&address)).await
    }

    /// Fee estimate for a request without checking the sender's funds
    pub async fn estimate(&self, request: &TransferRequest) -> Result<CostEstimate> {
        let (from, to) = validate(request)?;
        Ok(FeeEstimator::new(&self.ledger)
            .with_timeout(self.config.stage_timeout)
            .estimate(from.wire(), to.wire(), request.amount)
            .await)
    }

    /// Look a transaction up, e.g. after an `Unknown` broadcast
    pub async fn status(&self, tx_id: &TransactionId) -> Result<TransactionLookup> {
        self.within(self.ledger.get_transaction_by_id(tx_id)).await
    }

    async fn within<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = self.config.stage_timeout;
        tokio::time::timeout(limit, fut)
            .await
            .unwrap_or(Err(TrxError::Timeout(limit)))
    }
}

impl<L: LedgerApi, S: TransactionSigner> TransferPipeline<L, S> {
    /// Validating through FundsConfirmed. Nothing is built or signed yet.
    pub async fn prepare(
        &self,
        request: &TransferRequest,
    ) -> std::result::Result<PreparedTransfer, Box<TransferReport>> {
        let run = Run::new(self.config.network, request);
        let span = run.span();
        self.prepare_run(run, request)
            .instrument(span)
            .await
            .map_err(Box::new)
    }

    async fn prepare_run(
        &self,
        mut run: Run,
        request: &TransferRequest,
    ) -> std::result::Result<PreparedTransfer, TransferReport> {
        info!(from = %request.from, to = %request.to, amount = %request.amount, "preparing transfer");

        let (from, to) = match validate(request) {
            Ok(addresses) => addresses,
            Err(e) => return Err(run.fail(Stage::Validating, e)),
        };
        // the node would only answer SIGERROR after the fee work
        if let Some(key_address) = self.signer.address() {
            if key_address != from {
                let error = TrxError::InvalidInput(format!(
                    "private key belongs to {key_address}, not the sender {from}"
                ));
                return Err(run.fail(Stage::Validating, error));
            }
        }
        run.reached(Stage::Validating);

        let balance = match self.within(self.ledger.get_account_balance(&from)).await {
            Ok(balance) => balance,
            Err(e) => return Err(run.fail(Stage::BalanceChecked, e)),
        };
        run.balance = Some(balance);
        // cheap rejection before any fee work
        if balance < request.amount {
            let error = TrxError::InsufficientFunds {
                needed: request.amount.as_sun(),
                available: balance.as_sun(),
            };
            return Err(run.fail(Stage::BalanceChecked, error));
        }
        run.reached(Stage::BalanceChecked);

        let estimate = FeeEstimator::new(&self.ledger)
            .with_timeout(self.config.stage_timeout)
            .estimate(from.wire(), to.wire(), request.amount)
            .await;
        if !estimate.success {
            warn!(fee = %estimate.estimated_fee, "estimation degraded, continuing with fallback fee");
        }
        let fee = estimate.estimated_fee;
        run.estimate = Some(estimate.clone());
        run.reached(Stage::CostEstimated);

        let total_cost = match confirm_funds(balance, request.amount, fee) {
            Ok(total) => total,
            Err(e) => return Err(run.fail(Stage::FundsConfirmed, e)),
        };
        run.total_cost = Some(total_cost);
        run.reached(Stage::FundsConfirmed);
        info!(%balance, %fee, total = %total_cost, "funds confirmed");

        Ok(PreparedTransfer {
            run,
            from,
            to,
            balance,
            estimate,
            total_cost,
        })
    }

    /// Run every stage and report how it went
    pub async fn execute(&self, request: &TransferRequest) -> TransferReport {
        match self.prepare(request).await {
            Ok(prepared) => self.submit(prepared).await,
            Err(report) => *report,
        }
    }

    /// Built, Signed and Broadcast for a prepared run
    pub async fn submit(&self, prepared: PreparedTransfer) -> TransferReport {
        let span = prepared.run.span();
        self.submit_run(prepared).instrument(span).await
    }

    async fn submit_run(&self, mut prepared: PreparedTransfer) -> TransferReport {
        let built = self.build_and_sign(&mut prepared).await;
        let signed = match built {
            Ok(signed) => signed,
            Err((stage, e)) => return prepared.run.fail(stage, e),
        };

        let tx_id = signed.tx_id();
        let explorer_url = explorer_tx_url(self.config.network, &tx_id);
        let mut run = prepared.run;
        match self.within(self.ledger.broadcast_transaction(&signed)).await {
            Ok(result) if result.success => {
                run.reached(Stage::Broadcast);
                info!(%tx_id, %explorer_url, "transaction accepted");
                run.finish(TransferOutcome::Succeeded {
                    tx_id,
                    explorer_url,
                    broadcast: result,
                })
            }
            Ok(result) => {
                let error = TrxError::Rejected {
                    code: result.code.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
                    message: result.message_text().unwrap_or_default(),
                };
                run.fail(Stage::Broadcast, error)
            }
            Err(e) if matches!(e.kind(), ErrorKind::NetworkError | ErrorKind::ResponseFormatError) => {
                warn!(%tx_id, error = %e, "broadcast outcome unknown, check status before resending");
                run.finish(TransferOutcome::Unknown {
                    tx_id,
                    explorer_url,
                    reason: e.to_string(),
                })
            }
            Err(e) => run.fail(Stage::Broadcast, e),
        }
    }

    /// Build and sign without broadcasting
    pub async fn sign_only(
        &self,
        mut prepared: PreparedTransfer,
    ) -> std::result::Result<SignedTransaction, Box<TransferReport>> {
        let span = prepared.run.span();
        let built = self.build_and_sign(&mut prepared).instrument(span).await;
        built.map_err(|(stage, e)| Box::new(prepared.run.fail(stage, e)))
    }

    async fn build_and_sign(
        &self,
        prepared: &mut PreparedTransfer,
    ) -> std::result::Result<SignedTransaction, (Stage, TrxError)> {
        let unsigned = self
            .within(self.ledger.create_transaction(
                prepared.from.wire(),
                prepared.to.wire(),
                prepared.run.amount,
            ))
            .await
            .map_err(|e| (Stage::Built, e))?;
        prepared.run.expires_at = unsigned.expiration();
        prepared.run.reached(Stage::Built);
        debug!(tx_id = %unsigned.tx_id, expires_at = ?prepared.run.expires_at, "transaction built");

        let signed = self
            .signer
            .sign(unsigned)
            .map_err(|e| (Stage::Signed, e))?;
        prepared.run.reached(Stage::Signed);
        Ok(signed)
    }
}

fn parse_address(address: &str, role: &str) -> Result<Address> {
    Address::from_string(address).map_err(|e| TrxError::InvalidInput(format!("{role}: {e}")))
}

/// Local checks only; runs before any network call
fn validate(request: &TransferRequest) -> Result<(Address, Address)> {
    if request.amount.is_zero() {
        return Err(TrxError::InvalidInput(
            "amount must be greater than zero".into(),
        ));
    }
    let from = parse_address(&request.from, "sender")?;
    let to = parse_address(&request.to, "receiver")?;
    if from == to {
        return Err(TrxError::InvalidInput(
            "sender and receiver are the same address".into(),
        ));
    }
    Ok((from, to))
}
