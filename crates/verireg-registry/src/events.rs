// REGISTRY EVENTS
// Append-only notifications for external watchers
//
// SAFETY INVARIANTS:
// 1. Exactly one event per successful state-changing call
// 2. Failed calls emit nothing
// 3. Verifier events carry the full record, never a partial diff

use crate::types::VerifierRecord;
use log::error;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use verireg_token::Address;

/// Serialized adjacently tagged, `{"event": <name>, "data": <payload>}`, so
/// `u128` stake amounts decode without going through serde's buffered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum RegistryEvent {
    /// A new verifier was admitted
    VerifierRegistered(VerifierRecord),

    /// A verifier changed its location
    VerifierUpdated(VerifierRecord),

    /// Stake was pulled from the token ledger into custody
    StakeDeposited {
        amount: u128,
        verifier: VerifierRecord,
    },

    /// Stake was returned from custody to the verifier
    StakeWithdrawn {
        amount: u128,
        verifier: VerifierRecord,
    },

    /// Administrator pointed the registry at another token ledger
    TokenLedgerUpdated { previous: Address, current: Address },

    /// Administrator changed the capacity used for future admissions
    VerifiersPerShardUpdated { previous: u64, current: u64 },
}

impl RegistryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::VerifierRegistered(_) => "VerifierRegistered",
            RegistryEvent::VerifierUpdated(_) => "VerifierUpdated",
            RegistryEvent::StakeDeposited { .. } => "StakeDeposited",
            RegistryEvent::StakeWithdrawn { .. } => "StakeWithdrawn",
            RegistryEvent::TokenLedgerUpdated { .. } => "TokenLedgerUpdated",
            RegistryEvent::VerifiersPerShardUpdated { .. } => "VerifiersPerShardUpdated",
        }
    }

    /// Record snapshot carried by verifier and stake events.
    pub fn verifier(&self) -> Option<&VerifierRecord> {
        match self {
            RegistryEvent::VerifierRegistered(record)
            | RegistryEvent::VerifierUpdated(record)
            | RegistryEvent::StakeDeposited { verifier: record, .. }
            | RegistryEvent::StakeWithdrawn { verifier: record, .. } => Some(record),
            _ => None,
        }
    }
}

/// Destination for registry events. The registry holds a handle to the sink but
/// does not own the log behind it.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RegistryEvent);
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<RegistryEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.lock().clone()
    }

    pub fn last(&self) -> Option<RegistryEvent> {
        self.events.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<RegistryEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: RegistryEvent) {
        self.events.lock().push(event);
    }
}

/// Writes one JSON document per line.
pub struct JsonLinesEventSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesEventSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesEventSink {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> EventSink for JsonLinesEventSink<W> {
    fn emit(&self, event: RegistryEvent) {
        let mut writer = self.writer.lock();
        let written = serde_json::to_writer(&mut *writer, &event)
            .map_err(std::io::Error::from)
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush());
        if let Err(e) = written {
            error!("Failed to append {} to event log: {}", event.name(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShardId;

    fn record() -> VerifierRecord {
        VerifierRecord {
            id: Address::from("0xabc"),
            location: "127.0.0.1".to_string(),
            created: true,
            balance: 0,
            shard: ShardId(0),
        }
    }

    fn staked(balance: u128) -> VerifierRecord {
        VerifierRecord {
            balance,
            shard: ShardId(7),
            ..record()
        }
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemoryEventSink::new();
        sink.emit(RegistryEvent::VerifierRegistered(record()));
        sink.emit(RegistryEvent::VerifierUpdated(record()));

        let names: Vec<_> = sink.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["VerifierRegistered", "VerifierUpdated"]);
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_json_lines_format() {
        let sink = JsonLinesEventSink::new(Vec::new());
        sink.emit(RegistryEvent::VerifierRegistered(record()));
        sink.emit(RegistryEvent::VerifiersPerShardUpdated { previous: 3, current: 5 });

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "VerifierRegistered");
        assert_eq!(first["data"]["location"], "127.0.0.1");
        assert_eq!(first["data"]["created"], true);

        let second: RegistryEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second, RegistryEvent::VerifiersPerShardUpdated { previous: 3, current: 5 });
    }

    #[test]
    fn test_every_event_reads_back_from_json() {
        let events = vec![
            RegistryEvent::VerifierRegistered(staked(950)),
            RegistryEvent::VerifierUpdated(staked(u128::MAX)),
            RegistryEvent::StakeDeposited { amount: 1000, verifier: staked(1000) },
            RegistryEvent::StakeWithdrawn { amount: 50, verifier: staked(950) },
            RegistryEvent::TokenLedgerUpdated {
                previous: Address::from("0xtoken"),
                current: Address::from("0x123"),
            },
            RegistryEvent::VerifiersPerShardUpdated { previous: 3, current: 5 },
        ];

        let sink = JsonLinesEventSink::new(Vec::new());
        for event in &events {
            sink.emit(event.clone());
        }
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: Vec<RegistryEvent> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(parsed, events);
        assert_eq!(parsed[1].verifier().unwrap().balance, u128::MAX);
    }

    #[test]
    fn test_stake_events_carry_full_record() {
        let event = RegistryEvent::StakeDeposited { amount: 1000, verifier: staked(1000) };
        let record = event.verifier().unwrap();

        assert_eq!(event.name(), "StakeDeposited");
        assert_eq!(record.location, "127.0.0.1");
        assert_eq!(record.shard, ShardId(7));
        assert!(RegistryEvent::VerifiersPerShardUpdated { previous: 1, current: 2 }
            .verifier()
            .is_none());
    }
}
