#![allow(dead_code)]

use std::{
    collections::HashSet,
    fmt,
    ops::RangeInclusive,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::{
    json_abi::{Event, JsonAbi},
    primitives::{Address, B256, BlockNumber, Bytes, U256, address},
    rpc::types::Log,
};
use resilient_rpc::{
    CallDescriptor, ChainReader, Classify, Connection, Connector, ContractHandle,
    FailoverProvider, FailoverProviderBuilder, Severity, failover::classify_message,
};
use tracing_subscriber::EnvFilter;

pub const PRIMARY: &str = "http://primary";
pub const FALLBACK_1: &str = "http://fallback-1";
pub const FALLBACK_2: &str = "http://fallback-2";

pub const MINTER: Address = address!("e89afdefebdba033f6e750615f0a0f1a37c78c4a");

pub const MINTER_ABI: &str = r#"[
    {"type":"function","name":"liquidityPair","inputs":[],"outputs":[
        {"name":"","type":"address","internalType":"address"}
    ],"stateMutability":"view"},
    {"type":"event","name":"XENBurned","anonymous":false,"inputs":[
        {"name":"user","type":"address","indexed":true,"internalType":"address"},
        {"name":"amount","type":"uint256","indexed":false,"internalType":"uint256"}
    ]}
]"#;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An error carrying a node's error message, classified by its text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

impl Classify for MockError {
    fn severity(&self) -> Severity {
        classify_message(&self.0)
    }
}

/// A scripted failure: every request to `endpoint` fails with `message`, optionally only
/// log queries whose window starts at `from_block`.
#[derive(Clone, Debug)]
struct FailureRule {
    endpoint: String,
    from_block: Option<BlockNumber>,
    message: String,
}

#[derive(Debug, Default)]
struct NetworkState {
    unreachable: HashSet<String>,
    not_live: HashSet<String>,
    failures: Vec<FailureRule>,
    delays: Vec<(String, Duration)>,
    logs: Vec<Log>,
    block_number: BlockNumber,
    opens: Vec<String>,
    calls: Vec<String>,
    rebinds: Vec<String>,
    log_queries: Vec<(String, RangeInclusive<BlockNumber>)>,
}

/// A scripted set of nodes sharing one chain, recording every request made to them.
#[derive(Clone, Debug, Default)]
pub struct MockNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable(&self, endpoint: &str) {
        self.state.lock().unwrap().unreachable.insert(endpoint.to_string());
    }

    pub fn not_live(&self, endpoint: &str) {
        self.state.lock().unwrap().not_live.insert(endpoint.to_string());
    }

    pub fn fail(&self, endpoint: &str, message: &str) {
        self.state.lock().unwrap().failures.push(FailureRule {
            endpoint: endpoint.to_string(),
            from_block: None,
            message: message.to_string(),
        });
    }

    pub fn fail_window(&self, endpoint: &str, from_block: BlockNumber, message: &str) {
        self.state.lock().unwrap().failures.push(FailureRule {
            endpoint: endpoint.to_string(),
            from_block: Some(from_block),
            message: message.to_string(),
        });
    }

    pub fn delay(&self, endpoint: &str, delay: Duration) {
        self.state.lock().unwrap().delays.push((endpoint.to_string(), delay));
    }

    pub fn set_block_number(&self, block_number: BlockNumber) {
        self.state.lock().unwrap().block_number = block_number;
    }

    pub fn add_logs(&self, logs: impl IntoIterator<Item = Log>) {
        self.state.lock().unwrap().logs.extend(logs);
    }

    pub fn opens(&self) -> Vec<String> {
        self.state.lock().unwrap().opens.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn rebinds(&self) -> Vec<String> {
        self.state.lock().unwrap().rebinds.clone()
    }

    pub fn log_queries(&self) -> Vec<(String, RangeInclusive<BlockNumber>)> {
        self.state.lock().unwrap().log_queries.clone()
    }

    pub fn clear_history(&self) {
        let mut state = self.state.lock().unwrap();
        state.opens.clear();
        state.calls.clear();
        state.rebinds.clear();
        state.log_queries.clear();
    }

    fn failure(&self, endpoint: &str, from_block: Option<BlockNumber>) -> Option<MockError> {
        let state = self.state.lock().unwrap();
        state
            .failures
            .iter()
            .find(|rule| {
                rule.endpoint == endpoint &&
                    (rule.from_block.is_none() || rule.from_block == from_block)
            })
            .map(|rule| MockError(rule.message.clone()))
    }

    fn delay_for(&self, endpoint: &str) -> Option<Duration> {
        let state = self.state.lock().unwrap();
        state.delays.iter().find(|(e, _)| e == endpoint).map(|(_, delay)| *delay)
    }
}

#[derive(Clone, Debug)]
pub struct MockConnector {
    network: MockNetwork,
}

impl MockConnector {
    pub fn new(network: &MockNetwork) -> Self {
        Self { network: network.clone() }
    }
}

#[derive(Clone, Debug)]
pub struct MockProvider {
    endpoint: String,
    network: MockNetwork,
}

impl MockProvider {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Connector for MockConnector {
    type Provider = MockProvider;
    type Error = MockError;

    async fn connect(&self, address: &str) -> Result<MockProvider, MockError> {
        let mut state = self.network.state.lock().unwrap();
        state.opens.push(address.to_string());
        if state.unreachable.contains(address) {
            return Err(MockError(format!("error sending request for url ({address})")));
        }
        Ok(MockProvider { endpoint: address.to_string(), network: self.network.clone() })
    }

    async fn probe(&self, provider: &MockProvider) -> bool {
        !self.network.state.lock().unwrap().not_live.contains(&provider.endpoint)
    }
}

impl ChainReader for MockProvider {
    type Error = MockError;

    async fn block_number(&self) -> Result<BlockNumber, MockError> {
        if let Some(err) = self.network.failure(&self.endpoint, None) {
            return Err(err);
        }
        Ok(self.network.state.lock().unwrap().block_number)
    }

    async fn query_logs(
        &self,
        address: Address,
        event_signature: B256,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<Log>, MockError> {
        self.network
            .state
            .lock()
            .unwrap()
            .log_queries
            .push((self.endpoint.clone(), from_block..=to_block));

        if let Some(err) = self.network.failure(&self.endpoint, Some(from_block)) {
            return Err(err);
        }

        let state = self.network.state.lock().unwrap();
        Ok(state
            .logs
            .iter()
            .filter(|log| {
                log.address() == address &&
                    log.topics().first() == Some(&event_signature) &&
                    log.block_number.is_some_and(|n| (from_block..=to_block).contains(&n))
            })
            .cloned()
            .collect())
    }
}

/// A stand-in for a contract binding: remembers which endpoint it was built on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockBinding {
    pub address: Address,
    pub bound_to: String,
}

/// A call carrying contract bindings. Succeeds only if every binding was built on the
/// connection the call runs against.
#[derive(Clone, Debug)]
pub struct ScriptedCall {
    pub endpoint: String,
    pub bindings: Vec<MockBinding>,
    network: MockNetwork,
}

impl ScriptedCall {
    pub fn new(connection: &Connection<MockProvider>, contracts: &[Address]) -> Self {
        let endpoint = connection.endpoint().address().to_string();
        let bindings = contracts
            .iter()
            .map(|address| MockBinding { address: *address, bound_to: endpoint.clone() })
            .collect();
        Self { endpoint, bindings, network: connection.provider().network.clone() }
    }
}

impl CallDescriptor<MockProvider> for ScriptedCall {
    type Output = String;
    type Error = MockError;

    fn rebind(&self, connection: &Connection<MockProvider>) -> Self {
        let endpoint = connection.endpoint().address().to_string();
        self.network.state.lock().unwrap().rebinds.push(endpoint.clone());
        let addresses: Vec<_> = self.bindings.iter().map(|binding| binding.address).collect();
        Self::new(connection, &addresses)
    }

    async fn call(&self) -> Result<String, MockError> {
        self.network.state.lock().unwrap().calls.push(self.endpoint.clone());

        if let Some(delay) = self.network.delay_for(&self.endpoint) {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.network.failure(&self.endpoint, None) {
            return Err(err);
        }
        let stale = self.bindings.iter().find(|binding| binding.bound_to != self.endpoint);
        if let Some(stale) = stale {
            return Err(MockError(format!(
                "contract {} bound to {} used on {}",
                stale.address, stale.bound_to, self.endpoint
            )));
        }
        Ok(format!("result from {}", self.endpoint))
    }
}

pub fn network_with_provider(
    network: &MockNetwork,
    fallbacks: &[&str],
) -> FailoverProvider<MockConnector> {
    FailoverProviderBuilder::with_connector(MockConnector::new(network), PRIMARY)
        .fallbacks(fallbacks.iter().copied())
        .call_timeout(Duration::from_secs(2))
        .probe_timeout(Duration::from_secs(1))
        .build()
        .expect("valid configuration")
}

pub fn minter() -> ContractHandle {
    let abi: JsonAbi = serde_json::from_str(MINTER_ABI).expect("valid ABI");
    ContractHandle::new(MINTER, abi)
}

pub fn xen_burned() -> Event {
    minter().event("XENBurned").expect("declared event").clone()
}

pub fn burn_log(block_number: BlockNumber, log_index: u64, user: Address, amount: U256) -> Log {
    let event = xen_burned();
    raw_log(
        block_number,
        log_index,
        vec![event.selector(), user.into_word()],
        amount.to_be_bytes::<32>().to_vec().into(),
    )
}

pub fn raw_log(block_number: BlockNumber, log_index: u64, topics: Vec<B256>, data: Bytes) -> Log {
    Log {
        inner: alloy::primitives::Log::new_unchecked(MINTER, topics, data),
        block_number: Some(block_number),
        log_index: Some(log_index),
        transaction_hash: Some(B256::with_last_byte(u8::try_from(log_index % 256).unwrap())),
        ..Default::default()
    }
}

pub fn user(n: u8) -> Address {
    Address::with_last_byte(n)
}
