//! Bridge wiring
//!
//! Connects the pieces: supervise the monitor process, pass its output
//! through verbatim, reassemble lines, extract signals, and hand each one
//! to the execution gate. The bridge runs until the monitor exits; a
//! non-zero exit is a supervisor error, a clean exit ends the run with Ok.

use crate::config::{BridgeConfig, Network};
use crate::gate::{ExecutionGate, TradeOutcome};
use crate::monitor::{MonitorEvent, MonitorProcess};
use crate::signal::{extract_signal, LineBuffer};
use crate::wallet::SecureWallet;
use crate::{Error, Result};
use alloy::primitives::utils::format_units;
use alloy::providers::{Provider, ProviderBuilder};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tracing::{info, warn};

/// Verify the RPC endpoint and wallet before any supervision begins.
///
/// A chain-id mismatch is fatal: executing testnet-calibrated trades
/// against the wrong chain must be impossible. A zero balance is only a
/// warning; the monitor may be running in pure simulation.
pub async fn preflight(config: &BridgeConfig, wallet: &SecureWallet) -> Result<()> {
    let url: url::Url = config
        .rpc_url
        .parse()
        .map_err(|e| Error::Rpc(format!("invalid RPC URL: {e}")))?;
    let provider = ProviderBuilder::new().connect_http(url);

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| Error::Rpc(format!("failed to fetch chain id: {e}")))?;
    if chain_id != config.network.chain_id() {
        return Err(Error::Config(format!(
            "RPC endpoint reports chain {chain_id} but {} expects {}",
            config.network.name(),
            config.network.chain_id()
        )));
    }

    let balance = provider
        .get_balance(wallet.address())
        .await
        .map_err(|e| Error::Rpc(format!("failed to fetch balance: {e}")))?;
    let balance_bnb = format_units(balance, 18).unwrap_or_else(|_| balance.to_string());

    if balance.is_zero() {
        warn!(
            address = %wallet.address(),
            "Wallet has zero BNB; real executions will fail"
        );
    } else {
        info!(
            address = %wallet.address(),
            balance_bnb = %balance_bnb,
            network = config.network.name(),
            "Preflight passed"
        );
    }
    Ok(())
}

/// The long-running supervisor loop.
///
/// Generic over the pass-through sink so tests can capture the relayed
/// output; production uses stdout.
pub struct Bridge<S = Stdout> {
    network: Network,
    gate: Arc<ExecutionGate>,
    sink: S,
}

impl Bridge<Stdout> {
    pub fn new(config: &BridgeConfig, gate: Arc<ExecutionGate>) -> Self {
        Self::with_sink(config, gate, tokio::io::stdout())
    }
}

impl<S: AsyncWrite + Unpin + Send> Bridge<S> {
    pub fn with_sink(config: &BridgeConfig, gate: Arc<ExecutionGate>, sink: S) -> Self {
        Self {
            network: config.network,
            gate,
            sink,
        }
    }

    /// Supervise the monitor command until it exits.
    pub async fn run(&mut self, command: &str, args: &[String]) -> Result<()> {
        let mut monitor = MonitorProcess::spawn(command, args)?;
        info!(command, "Monitor process started");

        let mut buffer = LineBuffer::new();
        let mut exit = None;

        while let Some(event) = monitor.next_event().await {
            match event {
                MonitorEvent::Stdout(bytes) => {
                    if let Err(e) = self.sink.write_all(&bytes).await {
                        warn!(error = %e, "Pass-through write failed");
                    }
                    let _ = self.sink.flush().await;

                    let chunk = String::from_utf8_lossy(&bytes).into_owned();
                    for line in buffer.push(&chunk) {
                        self.dispatch_line(&line).await;
                    }
                }
                MonitorEvent::StderrLine(line) => {
                    warn!(line = %line, "Monitor stderr");
                }
                MonitorEvent::Exited(status) => {
                    exit = Some(status);
                }
            }
        }

        // an unterminated final line may still carry a signal
        if let Some(line) = buffer.flush() {
            self.dispatch_line(&line).await;
        }

        match exit {
            Some(status) if status.success() => {
                info!("Monitor exited cleanly, bridge shutting down");
                Ok(())
            }
            Some(status) => Err(Error::Monitor(format!("monitor exited with {status}"))),
            None => Err(Error::Monitor(
                "monitor event stream ended without an exit status".to_string(),
            )),
        }
    }

    async fn dispatch_line(&self, line: &str) {
        match extract_signal(line) {
            Ok(None) => {}
            Ok(Some(signal)) => {
                info!(
                    token_name = %signal.token_name,
                    amount = %signal.amount,
                    simulation = signal.is_simulation,
                    "Signal received"
                );
                let outcome = self.gate.handle(&signal).await;
                if let TradeOutcome::Executed(receipt) = &outcome {
                    info!(
                        explorer = %self.network.explorer_tx_url(&receipt.tx_hash.to_string()),
                        "View transaction"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "Ignoring malformed signal line");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContractsConfig, SafetyConfig};
    use crate::executor::{TradeExecutor, TradePlan, TradeReceipt};
    use alloy::primitives::{address, Address, B256, U256};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn test_config() -> BridgeConfig {
        let network = Network::BscTestnet;
        BridgeConfig {
            network,
            contracts: ContractsConfig {
                executor: address!("1111111111111111111111111111111111111111"),
                router_a: network.default_router(),
                router_b: network.default_router(),
                base_token: network.wrapped_native(),
            },
            safety: SafetyConfig::default(),
            rpc_url: "http://localhost:8545".to_string(),
            trade_log_path: None,
        }
    }

    #[derive(Default)]
    struct CountingExecutor {
        calls: Mutex<Vec<TradePlan>>,
    }

    #[async_trait]
    impl TradeExecutor for CountingExecutor {
        async fn execute(&self, plan: &TradePlan) -> crate::Result<TradeReceipt> {
            self.calls.lock().unwrap().push(plan.clone());
            Ok(TradeReceipt {
                tx_hash: B256::with_last_byte(0xcd),
                block_number: 42,
            })
        }
    }

    fn bridge_with_stub() -> (Bridge<Vec<u8>>, Arc<CountingExecutor>) {
        let config = test_config();
        let stub = Arc::new(CountingExecutor::default());
        let gate = Arc::new(ExecutionGate::new(&config, stub.clone()));
        (Bridge::with_sink(&config, gate, Vec::new()), stub)
    }

    #[tokio::test]
    async fn markerless_output_passes_through_unchanged() {
        let (mut bridge, stub) = bridge_with_stub();

        bridge
            .run(
                "sh",
                &[
                    "-c".to_string(),
                    "printf 'Scanning pairs...\\nno opportunity\\n'".to_string(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(bridge.sink, b"Scanning pairs...\nno opportunity\n");
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn signal_line_triggers_one_execution() {
        let (mut bridge, stub) = bridge_with_stub();

        let script = concat!(
            "echo 'checking...'; ",
            r#"echo 'SIGNAL:{"token":"0xeD24FC36d5Ee211Ea25A80239Fb8C4Cfd80f12Ee","token_name":"BUSD","amount":"0.05","is_simulation":false}'"#
        );
        bridge
            .run("sh", &["-c".to_string(), script.to_string()])
            .await
            .unwrap();

        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].amount_in, U256::from(50_000_000_000_000_000u64));
        assert_eq!(
            calls[0].token_b,
            "0xeD24FC36d5Ee211Ea25A80239Fb8C4Cfd80f12Ee"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[tokio::test]
    async fn simulation_signal_executes_nothing() {
        let (mut bridge, stub) = bridge_with_stub();

        let script = r#"echo 'SIGNAL:{"token":"0xeD24FC36d5Ee211Ea25A80239Fb8C4Cfd80f12Ee","token_name":"BUSD","amount":"0.05","is_simulation":true}'"#;
        bridge
            .run("sh", &["-c".to_string(), script.to_string()])
            .await
            .unwrap();

        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_does_not_stop_the_bridge() {
        let (mut bridge, stub) = bridge_with_stub();

        let script = "echo 'SIGNAL:not-json'; echo 'still alive'";
        bridge
            .run("sh", &["-c".to_string(), script.to_string()])
            .await
            .unwrap();

        assert!(stub.calls.lock().unwrap().is_empty());
        assert!(String::from_utf8_lossy(&bridge.sink).contains("still alive"));
    }

    #[tokio::test]
    async fn signal_split_across_writes_is_still_recognized() {
        let (mut bridge, stub) = bridge_with_stub();

        let script = concat!(
            "printf 'SIG'; sleep 0.1; ",
            r#"printf 'NAL:{"token":"0xeD24FC36d5Ee211Ea25A80239Fb8C4Cfd80f12Ee","token_name":"BUSD","amount":"0.05","is_simulation":false}\n'"#
        );
        bridge
            .run("sh", &["-c".to_string(), script.to_string()])
            .await
            .unwrap();

        assert_eq!(stub.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn nonzero_monitor_exit_is_a_supervisor_error() {
        let (mut bridge, _) = bridge_with_stub();

        let result = bridge
            .run("sh", &["-c".to_string(), "exit 7".to_string()])
            .await;
        assert!(matches!(result, Err(Error::Monitor(_))));
    }
}
