//! Contract handles that are rebuilt, not reused, when a call moves to another connection.

use std::{fmt, sync::Arc};

use alloy::{
    contract::{ContractInstance, Error as ContractError, Interface},
    dyn_abi::DynSolValue,
    json_abi::{Event, JsonAbi},
    network::{Ethereum, Network},
    primitives::Address,
    providers::Provider,
};

use thiserror::Error;

use crate::failover::{CallDescriptor, Connection, Endpoint};

/// An event name that does not resolve to exactly one event of a contract's interface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventLookupError {
    #[error("Event `{name}` is not declared in the interface of {address}")]
    NotDeclared { name: String, address: Address },

    /// The name is shared by several overloads. Look the event up by its full signature,
    /// e.g. `Transfer(address,address,uint256)`.
    #[error(
        "Event `{name}` is overloaded in the interface of {address}, use one of: {}",
        .signatures.join(", ")
    )]
    Overloaded { name: String, address: Address, signatures: Vec<String> },
}

/// A contract address paired with its interface description.
///
/// A handle is not tied to any connection. Use [`bind`](Self::bind) to obtain a
/// [`BoundContract`] for a specific [`Connection`].
#[derive(Clone, Debug)]
pub struct ContractHandle {
    address: Address,
    abi: Arc<JsonAbi>,
}

impl ContractHandle {
    #[must_use]
    pub fn new(address: Address, abi: JsonAbi) -> Self {
        Self { address, abi: Arc::new(abi) }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Looks up an event by name, or by full signature such as `XENBurned(address,uint256)`.
    ///
    /// # Errors
    ///
    /// * [`EventLookupError::NotDeclared`] if nothing in the interface matches.
    /// * [`EventLookupError::Overloaded`] if a bare name matches more than one overload.
    pub fn event(&self, name: &str) -> Result<&Event, EventLookupError> {
        let not_declared =
            || EventLookupError::NotDeclared { name: name.to_string(), address: self.address };

        if name.contains('(') {
            return self
                .abi
                .events()
                .find(|event| event.signature() == name)
                .ok_or_else(not_declared);
        }

        match self.abi.event(name).map(Vec::as_slice) {
            Some([event]) => Ok(event),
            Some(overloads) if !overloads.is_empty() => Err(EventLookupError::Overloaded {
                name: name.to_string(),
                address: self.address,
                signatures: overloads.iter().map(Event::signature).collect(),
            }),
            _ => Err(not_declared()),
        }
    }

    /// Builds a fresh contract binding on `connection`.
    #[must_use]
    pub fn bind<P, N>(&self, connection: &Connection<P>) -> BoundContract<P, N>
    where
        P: Provider<N> + Clone,
        N: Network,
    {
        let interface = Interface::new(JsonAbi::clone(&self.abi));
        BoundContract {
            handle: self.clone(),
            endpoint: connection.endpoint().clone(),
            instance: ContractInstance::new(self.address, connection.provider().clone(), interface),
        }
    }
}

/// A [`ContractHandle`] bound to the provider of one connection.
#[derive(Clone)]
pub struct BoundContract<P, N: Network = Ethereum> {
    handle: ContractHandle,
    endpoint: Endpoint,
    instance: ContractInstance<P, N>,
}

impl<P, N> BoundContract<P, N>
where
    P: Provider<N> + Clone,
    N: Network,
{
    #[must_use]
    pub fn handle(&self) -> &ContractHandle {
        &self.handle
    }

    /// The endpoint whose connection this binding was built on.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    #[must_use]
    pub fn instance(&self) -> &ContractInstance<P, N> {
        &self.instance
    }

    /// Prepares a read-only call of `function` with `args` on this binding.
    #[must_use]
    pub fn call(self, function: impl Into<String>, args: Vec<DynSolValue>) -> ContractCall<P, N> {
        ContractCall { contract: self, function: function.into(), args }
    }
}

/// A read-only contract function call, replayable on another connection.
///
/// Rebinding rebuilds the contract binding from its handle against the new connection.
#[derive(Clone)]
pub struct ContractCall<P, N: Network = Ethereum> {
    contract: BoundContract<P, N>,
    function: String,
    args: Vec<DynSolValue>,
}

impl<P, N: Network> fmt::Debug for BoundContract<P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundContract")
            .field("address", &self.handle.address)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl<P, N: Network> fmt::Debug for ContractCall<P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractCall")
            .field("contract", &self.contract)
            .field("function", &self.function)
            .field("args", &self.args)
            .finish()
    }
}

impl<P, N> ContractCall<P, N>
where
    P: Provider<N> + Clone,
    N: Network,
{
    #[must_use]
    pub fn contract(&self) -> &BoundContract<P, N> {
        &self.contract
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }
}

impl<P, N> CallDescriptor<P> for ContractCall<P, N>
where
    P: Provider<N> + Clone + Send + Sync,
    N: Network,
{
    type Output = Vec<DynSolValue>;
    type Error = ContractError;

    fn rebind(&self, connection: &Connection<P>) -> Self {
        Self {
            contract: self.contract.handle.bind(connection),
            function: self.function.clone(),
            args: self.args.clone(),
        }
    }

    async fn call(&self) -> Result<Vec<DynSolValue>, ContractError> {
        self.contract.instance.function(&self.function, &self.args)?.call().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{primitives::address, providers::RootProvider};

    const ABI: &str = r#"[
        {"type":"function","name":"liquidityPair","inputs":[],"outputs":[
            {"name":"","type":"address","internalType":"address"}
        ],"stateMutability":"view"},
        {"type":"event","name":"XENBurned","anonymous":false,"inputs":[
            {"name":"user","type":"address","indexed":true,"internalType":"address"},
            {"name":"amount","type":"uint256","indexed":false,"internalType":"uint256"}
        ]}
    ]"#;

    const MINTER: Address = address!("e89afdefebdba033f6e750615f0a0f1a37c78c4a");

    fn handle() -> ContractHandle {
        ContractHandle::new(MINTER, serde_json::from_str(ABI).unwrap())
    }

    fn connection(address: &str, rank: usize) -> Connection<RootProvider> {
        let provider = RootProvider::new_http(address.parse().unwrap());
        Connection::new(Endpoint::new(address, rank), provider)
    }

    #[test]
    fn event_lookup_by_name() {
        let handle = handle();

        let event = handle.event("XENBurned").unwrap();
        assert_eq!(event.inputs.len(), 2);
        assert_eq!(
            handle.event("Transfer").unwrap_err(),
            EventLookupError::NotDeclared { name: "Transfer".to_string(), address: MINTER }
        );
    }

    #[test]
    fn overloaded_event_needs_full_signature() {
        let abi = r#"[
            {"type":"event","name":"Staked","anonymous":false,"inputs":[
                {"name":"user","type":"address","indexed":true,"internalType":"address"}
            ]},
            {"type":"event","name":"Staked","anonymous":false,"inputs":[
                {"name":"user","type":"address","indexed":true,"internalType":"address"},
                {"name":"term","type":"uint256","indexed":false,"internalType":"uint256"}
            ]}
        ]"#;
        let handle = ContractHandle::new(MINTER, serde_json::from_str(abi).unwrap());

        let err = handle.event("Staked").unwrap_err();
        let EventLookupError::Overloaded { signatures, .. } = &err else {
            panic!("expected an overload error, got {err}")
        };
        assert_eq!(signatures, &["Staked(address)", "Staked(address,uint256)"]);

        let event = handle.event("Staked(address,uint256)").unwrap();
        assert_eq!(event.inputs.len(), 2);
        assert!(handle.event("Staked(uint256)").is_err());
    }

    #[test]
    fn bind_records_connection_endpoint() {
        let handle = handle();
        let primary = connection("http://localhost:8545", 0);

        let bound = handle.bind::<RootProvider, Ethereum>(&primary);

        assert_eq!(bound.endpoint(), primary.endpoint());
        assert_eq!(*bound.instance().address(), MINTER);
    }

    #[test]
    fn rebind_rebuilds_binding_on_new_connection() {
        let handle = handle();
        let primary = connection("http://localhost:8545", 0);
        let fallback = connection("http://localhost:8546", 1);

        let call = handle.bind::<RootProvider, Ethereum>(&primary).call("liquidityPair", vec![]);
        let rebound = call.rebind(&fallback);

        assert_eq!(rebound.contract().endpoint(), fallback.endpoint());
        assert_eq!(rebound.contract().handle().address(), MINTER);
        assert_eq!(rebound.function(), "liquidityPair");
        assert_eq!(call.contract().endpoint(), primary.endpoint());
    }
}
