use std::{fmt::Display, ops::RangeInclusive};

use alloy::{
    primitives::{Address, B256, BlockNumber},
    rpc::types::Log,
};

use crate::failover::{ChainReader, Classify, Connection};

/// A read-only unit of work that can be replayed on another connection.
///
/// A descriptor is always bound to one [`Connection`]. Anything it holds that is tied to that
/// connection (contract bindings, client handles) must be rebuilt by [`rebind`](Self::rebind),
/// never carried over.
pub trait CallDescriptor<P>: Sized {
    type Output;
    type Error: Classify + Display;

    /// Returns an equivalent descriptor bound to `connection`.
    fn rebind(&self, connection: &Connection<P>) -> Self;

    /// Runs the call against the connection this descriptor is bound to.
    fn call(&self) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// `eth_getLogs` for one event of one contract over one block window.
#[derive(Clone, Debug)]
pub struct LogQuery<P> {
    provider: P,
    address: Address,
    event_signature: B256,
    window: RangeInclusive<BlockNumber>,
}

impl<P: ChainReader> LogQuery<P> {
    #[must_use]
    pub fn new(
        connection: &Connection<P>,
        address: Address,
        event_signature: B256,
        window: RangeInclusive<BlockNumber>,
    ) -> Self {
        Self { provider: connection.provider().clone(), address, event_signature, window }
    }

    #[must_use]
    pub fn window(&self) -> &RangeInclusive<BlockNumber> {
        &self.window
    }
}

impl<P: ChainReader> CallDescriptor<P> for LogQuery<P> {
    type Output = Vec<Log>;
    type Error = P::Error;

    fn rebind(&self, connection: &Connection<P>) -> Self {
        Self::new(connection, self.address, self.event_signature, self.window.clone())
    }

    async fn call(&self) -> Result<Vec<Log>, P::Error> {
        let (from_block, to_block) = (*self.window.start(), *self.window.end());
        self.provider.query_logs(self.address, self.event_signature, from_block, to_block).await
    }
}

/// `eth_blockNumber`.
#[derive(Clone, Debug)]
pub struct BlockNumberQuery<P> {
    provider: P,
}

impl<P: ChainReader> BlockNumberQuery<P> {
    #[must_use]
    pub fn new(connection: &Connection<P>) -> Self {
        Self { provider: connection.provider().clone() }
    }
}

impl<P: ChainReader> CallDescriptor<P> for BlockNumberQuery<P> {
    type Output = BlockNumber;
    type Error = P::Error;

    fn rebind(&self, connection: &Connection<P>) -> Self {
        Self::new(connection)
    }

    async fn call(&self) -> Result<BlockNumber, P::Error> {
        self.provider.block_number().await
    }
}
