//! Shared utilities for integration tests: a programmable JSON-RPC node.

#![allow(dead_code)]

use alloy::primitives::{keccak256, U256};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use evm_transfer_demo::config::{ChainConfig, DemoConfig};

/// Well-known test private key (Anvil's first account).
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const TOKEN_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// JSON-RPC error returned by a handler: (code, message).
pub type RpcFailure = (i64, String);

type Handler = dyn Fn(&str, &Value) -> Result<Value, RpcFailure> + Send + Sync;

/// A running mock node. Records every method it was asked for.
pub struct MockNode {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.methods().iter().filter(|m| *m == method).count()
    }

    /// Params of the last call to `method`.
    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }
}

/// Start a programmable node on an ephemeral port.
pub async fn start_mock_node<F>(handler: F) -> MockNode
where
    F: Fn(&str, &Value) -> Result<Value, RpcFailure> + Send + Sync + 'static,
{
    start_stalling_node(&[], handler).await
}

/// Like [`start_mock_node`], but requests for any method in `stalled` are
/// read and recorded and then never answered. The connection stays open.
pub async fn start_stalling_node<F>(stalled: &[&'static str], handler: F) -> MockNode
where
    F: Fn(&str, &Value) -> Result<Value, RpcFailure> + Send + Sync + 'static,
{
    let stalled: Arc<Vec<&'static str>> = Arc::new(stalled.to_vec());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let handler: Arc<Handler> = Arc::new(handler);

    let recorded = calls.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    let recorded = recorded.clone();
                    let stalled = stalled.clone();
                    tokio::spawn(async move {
                        serve_connection(socket, handler, recorded, &stalled).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockNode { addr, calls }
}

/// Serve one HTTP request and close the connection.
async fn serve_connection(
    mut socket: TcpStream,
    handler: Arc<Handler>,
    recorded: Arc<Mutex<Vec<(String, Value)>>>,
    stalled: &[&'static str],
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let body = &buf[header_end..header_end + content_length];
    let request: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return,
    };

    let requests = match &request {
        Value::Array(batch) => batch.clone(),
        single => vec![single.clone()],
    };
    let stalls = requests.iter().any(|r| {
        r.get("method")
            .and_then(Value::as_str)
            .is_some_and(|m| stalled.iter().any(|s| *s == m))
    });
    if stalls {
        for r in &requests {
            let method = r.get("method").and_then(Value::as_str).unwrap_or_default();
            let params = r.get("params").cloned().unwrap_or(Value::Null);
            recorded.lock().unwrap().push((method.to_string(), params));
        }
        // Hold the socket until the client gives up.
        std::future::pending::<()>().await;
    }

    let response = match &request {
        Value::Array(batch) => Value::Array(
            batch
                .iter()
                .map(|r| answer(r, handler.as_ref(), &recorded))
                .collect(),
        ),
        single => answer(single, handler.as_ref(), &recorded),
    };

    let payload = response.to_string();
    let response_str = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let _ = socket.write_all(response_str.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn answer(request: &Value, handler: &Handler, recorded: &Mutex<Vec<(String, Value)>>) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    recorded.lock().unwrap().push((method.clone(), params.clone()));

    match handler(&method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// State served by [`ledger_node`].
#[derive(Debug, Clone)]
pub struct Ledger {
    pub chain_id: u64,
    pub block: u64,
    pub gas_price: u128,
    pub balance: U256,
    pub nonce: u64,
    pub token_balance: U256,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            block: 1_234,
            gas_price: 2_000_000_000,
            balance: U256::from(5_000_000_000_000_000_000u128),
            nonce: 7,
            token_balance: U256::from(250_000_000_000_000_000_000u128),
        }
    }
}

fn quantity(value: impl std::fmt::LowerHex) -> Value {
    Value::String(format!("0x{:x}", value))
}

/// A node that behaves like a small devnet holding `ledger`.
///
/// `eth_sendRawTransaction` rejects every transaction when the balance is
/// zero, like a real node does for a transfer it cannot fund.
pub async fn ledger_node(ledger: Ledger) -> MockNode {
    start_mock_node(move |method, params| match method {
        "eth_chainId" => Ok(quantity(ledger.chain_id)),
        "eth_blockNumber" => Ok(quantity(ledger.block)),
        "eth_gasPrice" => Ok(quantity(ledger.gas_price)),
        "eth_getBalance" => Ok(quantity(ledger.balance)),
        "eth_getTransactionCount" => Ok(quantity(ledger.nonce)),
        "eth_call" => Ok(Value::String(format!(
            "0x{}",
            alloy::primitives::hex::encode(ledger.token_balance.to_be_bytes::<32>())
        ))),
        "eth_sendRawTransaction" => {
            if ledger.balance.is_zero() {
                return Err((
                    -32000,
                    "insufficient funds for gas * price + value".to_string(),
                ));
            }
            let raw = params[0].as_str().unwrap_or_default();
            let bytes = alloy::primitives::hex::decode(raw).map_err(|e| (-32602, e.to_string()))?;
            Ok(Value::String(keccak256(bytes).to_string()))
        }
        other => Err((-32601, format!("method {} not found", other))),
    })
    .await
}

/// Answers for a healthy devnet on chain 31337, used behind stalled methods.
pub fn devnet_answers(method: &str, _params: &Value) -> Result<Value, RpcFailure> {
    let ledger = Ledger::default();
    match method {
        "eth_chainId" => Ok(quantity(ledger.chain_id)),
        "eth_gasPrice" => Ok(quantity(ledger.gas_price)),
        "eth_getTransactionCount" => Ok(quantity(ledger.nonce)),
        other => Err((-32601, format!("method {} not found", other))),
    }
}

/// Config pointing at `node`, with test token and recipient.
pub fn config_for(node: &MockNode) -> DemoConfig {
    let mut config = DemoConfig::default();
    config.chain = ChainConfig {
        rpc_url: node.url(),
        rpc_timeout_secs: 5,
        expected_chain_id: None,
    };
    config.token.contract_address = TOKEN_ADDRESS.to_string();
    config.transfer.recipient = RECIPIENT.to_string();
    config
}
