use alloy::{
    dyn_abi::{DynSolValue, EventExt},
    json_abi::Event,
    primitives::{Address, B256, BlockNumber, LogData},
    rpc::types::Log,
};
use thiserror::Error;

/// Failure to decode (or re-encode) a raw log against an event description.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Log does not match the event ABI: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),

    #[error("Decoded {found} values for an event with {expected} inputs")]
    FieldCountMismatch { expected: usize, found: usize },

    #[error("Indexed field `{0}` cannot be encoded as a topic")]
    UnencodableTopic(String),

    #[error("Event has more than 4 topics")]
    TooManyTopics,
}

/// One named event parameter and its decoded value.
#[derive(Clone, Debug, PartialEq)]
pub struct EventField {
    pub name: String,
    pub indexed: bool,
    pub value: DynSolValue,
}

/// A decoded event log with its position in the chain.
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub address: Address,
    pub block_number: Option<BlockNumber>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<u64>,
    /// Parameters in declaration order.
    pub fields: Vec<EventField>,
}

impl EventRecord {
    /// Decodes `log` against `event`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the topics or data do not match the event description.
    pub fn decode(event: &Event, log: &Log) -> Result<Self, DecodeError> {
        let decoded = event.decode_log(log.data())?;

        let found = decoded.indexed.len() + decoded.body.len();
        if found != event.inputs.len() {
            return Err(DecodeError::FieldCountMismatch { expected: event.inputs.len(), found });
        }

        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        let fields = event
            .inputs
            .iter()
            .filter_map(|param| {
                let value = if param.indexed { indexed.next() } else { body.next() };
                value.map(|value| EventField {
                    name: param.name.clone(),
                    indexed: param.indexed,
                    value,
                })
            })
            .collect();

        Ok(Self {
            address: log.address(),
            block_number: log.block_number,
            transaction_hash: log.transaction_hash,
            log_index: log.log_index,
            fields,
        })
    }

    /// Re-encodes the record into raw log topics and data.
    ///
    /// Indexed dynamic values (strings, arrays) are stored as their topic hash by the node, so
    /// they round-trip as that hash.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnencodableTopic`] if an indexed value does not fit in one word.
    pub fn encode(&self, event: &Event) -> Result<LogData, DecodeError> {
        let mut topics = Vec::with_capacity(4);
        if !event.anonymous {
            topics.push(event.selector());
        }

        let mut body = Vec::new();
        for field in &self.fields {
            if field.indexed {
                let topic = field
                    .value
                    .as_word()
                    .ok_or_else(|| DecodeError::UnencodableTopic(field.name.clone()))?;
                topics.push(topic);
            } else {
                body.push(field.value.clone());
            }
        }

        let data = DynSolValue::Tuple(body).abi_encode_params();
        LogData::new(topics, data.into()).ok_or(DecodeError::TooManyTopics)
    }

    /// Returns the value of the parameter called `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DynSolValue> {
        self.fields.iter().find(|field| field.name == name).map(|field| &field.value)
    }
}
