//! Shared utilities for integration testing against a mock TronGrid node.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[allow(dead_code)]
pub const PRIVATE_KEY: &str = "0d5e2ad6a7d2f3e1b0c4a9f8e7d6c5b4a3928170f6e5d4c3b2a1908f7e6d5c4b";
/// Address of `PRIVATE_KEY`
pub const SENDER: &str = "TJvs3YYe73fx2GY57Umk4TaRWXRHTQbV2P";
pub const SENDER_HEX: &str = "416247a407f4af155dd5038518dcc23ef8a07147d4";
pub const RECEIVER: &str = "TWrW1vQbT9tmCBRrJNbeeuoJ9SbGTjUceK";
pub const RECEIVER_HEX: &str = "41e515eedae1b3902cb9207fc61995371eb3303b17";
pub const RAW_DATA_HEX: &str = "0a025d8b220876a1d1a1b2c3d4e540f0b6c8e6b5325a67080112630a2d747970652e676f6f676c65617069732e636f6d2f70726f746f636f6c2e5472616e73666572436f6e747261637412320a15416247a407f4af155dd5038518dcc23ef8a07147d4121541e515eedae1b3902cb9207fc61995371eb3303b1718c0843d70d0e1c4e6b532";
/// sha256 of `RAW_DATA_HEX`
pub const TX_ID: &str = "a55db4709144cd29d6fbe2b4e338e75346b14077750ad1e0262c439538225615";

/// Status code that makes the node hang up without answering
pub const DROP_CONNECTION: u16 = 0;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[allow(dead_code)]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

pub struct MockNode {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockNode {
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn count(&self, path_prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(path_prefix))
            .count()
    }
}

/// Start a mock node on an ephemeral port. `route` maps each request to `(status, body)`.
pub async fn start_mock_node<F>(route: F) -> MockNode
where
    F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let route = Arc::new(route);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let route = route.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let Ok(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = route(&request);
                        recorded.lock().unwrap().push(request);

                        if status == DROP_CONNECTION {
                            let _ = socket.shutdown().await;
                            return;
                        }
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockNode { url, requests }
}

/// A URL nothing listens on
#[allow(dead_code)]
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(key, _)| key == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Ok(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// Unsigned transfer as `/wallet/createtransaction` returns it
#[allow(dead_code)]
pub fn unsigned_transfer(fee_limit: Option<u64>) -> Value {
    let mut tx = json!({
        "visible": false,
        "txID": TX_ID,
        "raw_data": {
            "contract": [{
                "parameter": {
                    "value": {
                        "amount": 1000000,
                        "owner_address": SENDER_HEX,
                        "to_address": RECEIVER_HEX
                    },
                    "type_url": "type.googleapis.com/protocol.TransferContract"
                },
                "type": "TransferContract"
            }],
            "ref_block_bytes": "5d8b",
            "ref_block_hash": "76a1d1a1b2c3d4e5",
            "expiration": 1760659200000u64,
            "timestamp": 1760659140000u64
        },
        "raw_data_hex": RAW_DATA_HEX
    });
    if let Some(fee_limit) = fee_limit {
        tx["raw_data"]["fee_limit"] = json!(fee_limit);
    }
    tx
}

#[allow(dead_code)]
pub fn account(balance_sun: u64) -> String {
    json!({"data": [{"address": SENDER_HEX, "balance": balance_sun}], "success": true}).to_string()
}

#[allow(dead_code)]
pub fn chain_parameters(energy_fee: i64, transaction_fee: i64) -> String {
    json!({"chainParameter": [
        {"key": "getMaintenanceTimeInterval", "value": 21600000},
        {"key": "getTransactionFee", "value": transaction_fee},
        {"key": "getEnergyFee", "value": energy_fee},
        {"key": "getAllowCreationOfContracts"}
    ]})
    .to_string()
}
