use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::LedgerApi;
use crate::node::Node;
use trx_common::{Result, TrxError, DEFAULT_REQUEST_TIMEOUT, TRONGRID_API_KEY_HEADER};
use trx_types::{
    Address, Amount, BroadcastResult, ChainFeeParameters, ChainParameter, SignedTransaction,
    TransactionId, TransactionLookup, UnsignedTransaction, WireAddress,
};

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    data: Vec<AccountEntry>,
}

#[derive(Debug, Deserialize)]
struct AccountEntry {
    #[serde(default)]
    balance: u64,
}

#[derive(Debug, Deserialize)]
struct ChainParametersResponse {
    #[serde(rename = "chainParameter", default)]
    chain_parameter: Vec<ChainParameter>,
}

#[derive(Debug, Serialize)]
struct CreateTransactionRequest<'a> {
    owner_address: &'a WireAddress,
    to_address: &'a WireAddress,
    amount: u64,
}

#[derive(Debug, Serialize)]
struct TransactionByIdRequest {
    value: String,
}

/// JSON/HTTP client for a TronGrid-compatible full node
#[derive(Debug, Clone)]
pub struct TronGridClient {
    http: Client,
    node: Node,
}

impl TronGridClient {
    pub fn new(node: Node, options: ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = options.api_key {
            let mut value = HeaderValue::from_str(&api_key)
                .map_err(|_| TrxError::InvalidConfig("API key is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(TRONGRID_API_KEY_HEADER, value);
        }

        let http = Client::builder()
            .timeout(options.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TrxError::InvalidConfig(format!("unable to build HTTP client: {e}")))?;

        Ok(Self { http, node })
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    async fn get_json(&self, path: &str) -> Result<(StatusCode, Value)> {
        let url = self.node.endpoint(path);
        debug!(%url, "GET");
        let response = self.http.get(&url).send().await.map_err(transport_error)?;
        read_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(StatusCode, Value)> {
        let url = self.node.endpoint(path);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn fetch_chain_parameters(&self) -> Result<Vec<ChainParameter>> {
        let (status, body) = self.get_json("wallet/getchainparameters").await?;
        if !status.is_success() {
            return Err(TrxError::Network(format!(
                "chain parameter query returned HTTP {status}"
            )));
        }
        let response: ChainParametersResponse = serde_json::from_value(body)
            .map_err(|e| TrxError::ResponseFormat(format!("chain parameters: {e}")))?;
        Ok(response.chain_parameter)
    }
}

#[async_trait]
impl LedgerApi for TronGridClient {
    async fn get_account_balance(&self, address: &Address) -> Result<Amount> {
        let (status, body) = self
            .get_json(&format!("v1/accounts/{}", address.as_str()))
            .await?;
        if !status.is_success() {
            return Err(TrxError::Network(format!(
                "account lookup returned HTTP {status}"
            )));
        }

        let response: AccountsResponse = serde_json::from_value(body)
            .map_err(|e| TrxError::ResponseFormat(format!("account lookup: {e}")))?;

        let balance = match response.data.first() {
            Some(account) => Amount::from_sun(account.balance),
            None => {
                debug!(address = %address, "account not activated, reporting zero balance");
                Amount::ZERO
            }
        };
        Ok(balance)
    }

    async fn get_chain_fee_parameters(&self) -> ChainFeeParameters {
        match self.fetch_chain_parameters().await {
            Ok(params) => ChainFeeParameters::from_chain_parameters(&params),
            Err(error) => {
                warn!(%error, "chain parameter query failed, using fallback prices");
                ChainFeeParameters::fallback()
            }
        }
    }

    async fn create_transaction(
        &self,
        owner: &WireAddress,
        to: &WireAddress,
        amount: Amount,
    ) -> Result<UnsignedTransaction> {
        let request = CreateTransactionRequest {
            owner_address: owner,
            to_address: to,
            amount: amount.as_sun(),
        };
        let (status, body) = self.post_json("wallet/createtransaction", &request).await?;

        // the node reports validation failures as {"Error": "..."}, usually with HTTP 200
        if let Some(message) = node_error_message(&body) {
            return Err(TrxError::TransactionBuild(message));
        }
        if !status.is_success() {
            return Err(TrxError::TransactionBuild(format!(
                "node returned HTTP {status}"
            )));
        }
        if body.get("txID").is_none() {
            return Err(TrxError::TransactionBuild(
                "node response carries no transaction id".into(),
            ));
        }

        serde_json::from_value(body)
            .map_err(|e| TrxError::ResponseFormat(format!("unsigned transaction: {e}")))
    }

    async fn broadcast_transaction(&self, signed: &SignedTransaction) -> Result<BroadcastResult> {
        let (status, body) = self
            .post_json("wallet/broadcasttransaction", signed)
            .await?;
        // a gateway error after the request left is not the node's verdict
        let has_verdict = body.get("result").is_some() || body.get("code").is_some();
        if !status.is_success() && !has_verdict {
            return Err(TrxError::Network(format!(
                "broadcast returned HTTP {status}"
            )));
        }
        Ok(BroadcastResult::from_response(body))
    }

    async fn get_transaction_by_id(&self, tx_id: &TransactionId) -> Result<TransactionLookup> {
        let request = TransactionByIdRequest {
            value: tx_id.to_hex(),
        };
        let (status, body) = self.post_json("wallet/gettransactionbyid", &request).await?;
        if !status.is_success() {
            return Err(TrxError::Network(format!(
                "transaction lookup returned HTTP {status}"
            )));
        }
        Ok(TransactionLookup::from_response(body))
    }
}

fn transport_error(err: reqwest::Error) -> TrxError {
    if err.is_timeout() {
        TrxError::Network(format!("request timed out: {err}"))
    } else {
        TrxError::Network(err.to_string())
    }
}

async fn read_json(response: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;
    let body = serde_json::from_str(&text).map_err(|e| {
        TrxError::ResponseFormat(format!("HTTP {status}, body is not JSON: {e}"))
    })?;
    Ok((status, body))
}

fn node_error_message(body: &Value) -> Option<String> {
    body.get("Error")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(String::from)
}
