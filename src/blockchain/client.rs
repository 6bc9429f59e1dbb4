//! Ledger node client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint and handshake with `eth_chainId`
//! - Query chain state (block number, gas price, balances, nonce)
//! - Call token contracts through an [`AbiDescriptor`]
//! - Broadcast signed transactions without waiting for inclusion
//!
//! A connected [`ChainClient`] is the connection handle: every operation takes
//! it as the receiver, and dropping it releases the transport.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{TransportError, TransportResult};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::abi::{AbiDescriptor, BALANCE_OF};
use crate::blockchain::transaction::SignedTransfer;
use crate::blockchain::types::{ChainConfig, ChainError, ChainId, ChainResult};

/// Connected client for a single ledger node.
pub struct ChainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    endpoint: String,
    /// Chain ID reported during the handshake.
    chain_id: ChainId,
    timeout_duration: Duration,
}

impl ChainClient {
    /// Open a connection to `config.rpc_url`.
    ///
    /// The handshake queries `eth_chainId`; an unreachable or misbehaving
    /// endpoint, or a node on a different chain than `expected_chain_id`,
    /// fails with [`ChainError::Connection`].
    pub async fn connect(config: &ChainConfig) -> ChainResult<Self> {
        let endpoint = config.rpc_url.clone();
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        let url: url::Url = endpoint.parse().map_err(|e| ChainError::Connection {
            endpoint: endpoint.clone(),
            reason: format!("invalid RPC URL: {}", e),
        })?;
        let provider = Arc::new(ProviderBuilder::new().connect_http(url))
            as Arc<dyn Provider + Send + Sync>;

        let chain_id = match timeout(timeout_duration, provider.get_chain_id()).await {
            Ok(Ok(id)) => ChainId(id),
            Ok(Err(e)) => {
                return Err(ChainError::Connection {
                    endpoint,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ChainError::Connection {
                    endpoint,
                    reason: format!("handshake timed out after {}s", config.rpc_timeout_secs),
                })
            }
        };

        if let Some(expected) = config.expected_chain_id {
            if chain_id.0 != expected {
                return Err(ChainError::Connection {
                    endpoint,
                    reason: format!("chain ID mismatch: expected {}, got {}", expected, chain_id),
                });
            }
        }

        tracing::info!(rpc_url = %endpoint, chain_id = chain_id.0, "Connected to node");

        Ok(Self {
            provider,
            endpoint,
            chain_id,
            timeout_duration,
        })
    }

    /// Chain ID observed at connect time.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Await `call` under the RPC timeout, mapping failures to [`ChainError::Query`].
    async fn query<T, F>(&self, op: &'static str, call: F) -> ChainResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(op, error = %e, "RPC error");
                Err(ChainError::Query {
                    op,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(op, "RPC timeout");
                Err(ChainError::Query {
                    op,
                    reason: self.timeout_reason(),
                })
            }
        }
    }

    fn timeout_reason(&self) -> String {
        format!("timed out after {}s", self.timeout_duration.as_secs())
    }

    /// Latest block number.
    pub async fn current_block_height(&self) -> ChainResult<u64> {
        self.query("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    /// Suggested legacy gas price in wei.
    pub async fn suggested_gas_price(&self) -> ChainResult<u128> {
        self.query("eth_gasPrice", self.provider.get_gas_price()).await
    }

    /// Native balance in wei at the latest block.
    pub async fn native_balance(&self, address: Address) -> ChainResult<U256> {
        self.query("eth_getBalance", self.provider.get_balance(address).latest())
            .await
    }

    /// Next unused nonce for `address`, counting transactions still pending.
    pub async fn next_nonce(&self, address: Address) -> ChainResult<u64> {
        self.query(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    /// Replay-protection identifier as currently reported by the node.
    pub async fn chain_identifier(&self) -> ChainResult<ChainId> {
        self.query("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Token balance of `owner` via the descriptor's `balanceOf`.
    ///
    /// A descriptor without `balanceOf` fails before anything is sent. Reverts
    /// and undecodable results are contract-call errors; any other node error,
    /// transport failure or timeout is a query error.
    pub async fn token_balance(
        &self,
        contract: Address,
        abi: &AbiDescriptor,
        owner: Address,
    ) -> ChainResult<U256> {
        let data = abi.balance_of_call(owner)?;
        let request = TransactionRequest::default()
            .with_to(contract)
            .with_input(data);

        let output = match timeout(self.timeout_duration, self.provider.call(request)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if is_revert(&e) => {
                return Err(ChainError::contract_call(BALANCE_OF, e.to_string()))
            }
            Ok(Err(e)) => {
                tracing::warn!(op = "eth_call", error = %e, "RPC error");
                return Err(ChainError::Query {
                    op: "eth_call",
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                tracing::warn!(op = "eth_call", "RPC timeout");
                return Err(ChainError::Query {
                    op: "eth_call",
                    reason: self.timeout_reason(),
                });
            }
        };

        abi.decode_balance(&output)
    }

    /// Broadcast `signed` and return its hash. Does not wait for inclusion.
    ///
    /// A transaction signed for another chain is rejected locally, before it
    /// reaches the node.
    pub async fn submit(&self, signed: &SignedTransfer) -> ChainResult<TxHash> {
        if signed.chain_id() != Some(self.chain_id) {
            return Err(ChainError::Submission(format!(
                "transaction is signed for chain {}, node reports chain {}",
                signed
                    .chain_id()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "<none>".to_string()),
                self.chain_id
            )));
        }

        let pending = match timeout(
            self.timeout_duration,
            self.provider.send_raw_transaction(signed.raw()),
        )
        .await
        {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => return Err(ChainError::Submission(e.to_string())),
            Err(_) => return Err(ChainError::Submission(self.timeout_reason())),
        };

        let tx_hash = *pending.tx_hash();
        if tx_hash != signed.hash() {
            tracing::warn!(
                local = %signed.hash(),
                node = %tx_hash,
                "Node returned a different transaction hash"
            );
        }

        tracing::info!(tx_hash = %tx_hash, nonce = signed.nonce(), "Transaction submitted");
        Ok(tx_hash)
    }
}

/// The node reported that the contract itself reverted the call.
fn is_revert(error: &TransportError) -> bool {
    error.as_error_resp().is_some_and(|payload| {
        payload.code == 3
            || payload.as_revert_data().is_some()
            || payload.message.to_lowercase().contains("revert")
    })
}

impl Drop for ChainClient {
    fn drop(&mut self) {
        tracing::debug!(rpc_url = %self.endpoint, "Connection released");
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.endpoint)
            .field("chain_id", &self.chain_id)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
