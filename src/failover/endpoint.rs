use std::fmt;

/// A single RPC provider address together with its position in the registry.
///
/// The primary endpoint has rank 0; fallbacks follow in the order they were registered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    address: String,
    rank: usize,
}

impl Endpoint {
    #[must_use]
    pub fn new(address: impl Into<String>, rank: usize) -> Self {
        Self { address: address.into(), rank }
    }

    /// The address the endpoint is reached at, as registered.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Position in the registry. Lower ranks are tried first.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// `true` for the rank 0 endpoint.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.rank == 0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.rank, self.address)
    }
}

/// Ordered, read-only list of candidate endpoints, primary first.
///
/// A registry always holds at least the primary endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
}

impl EndpointRegistry {
    /// Creates a registry from a primary address and fallbacks in priority order.
    #[must_use]
    pub fn new<I, S>(primary: impl Into<String>, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints = std::iter::once(primary.into())
            .chain(fallbacks.into_iter().map(Into::into))
            .enumerate()
            .map(|(rank, address)| Endpoint::new(address, rank))
            .collect();
        Self { endpoints }
    }

    /// The rank 0 endpoint.
    #[must_use]
    pub fn primary(&self) -> &Endpoint {
        &self.endpoints[0]
    }

    /// Every endpoint after the primary, in rank order.
    #[must_use]
    pub fn fallbacks(&self) -> &[Endpoint] {
        &self.endpoints[1..]
    }

    /// Iterates all endpoints in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    /// Looks up an endpoint by address.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|endpoint| endpoint.address == address)
    }
}

impl<'a> IntoIterator for &'a EndpointRegistry {
    type Item = &'a Endpoint;
    type IntoIter = std::slice::Iter<'a, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
    }
}
