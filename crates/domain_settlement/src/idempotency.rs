//! Idempotent command execution
//!
//! Every mutating settlement operation runs through [`IdempotencyExecutor`]
//! exactly once, at its outermost boundary. A retried command with the same
//! `CommandId` replays the stored outcome instead of acting again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use core_kernel::{Clock, CommandId, PortError};
use crate::error::SettlementError;
use crate::ports::IdempotencyRepository;

/// Marks a command as done
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub command_id: CommandId,
    pub completed_at: DateTime<Utc>,
    /// Stringified result of the first execution, if it had one
    pub result_ref: Option<String>,
}

impl IdempotencyRecord {
    pub fn done(command_id: CommandId, completed_at: DateTime<Utc>, result_ref: Option<String>) -> Self {
        Self {
            command_id,
            completed_at,
            result_ref,
        }
    }

    /// Parses the stored result reference back into a value
    pub fn parse_result<T: FromStr>(&self) -> Result<T, SettlementError> {
        self.result_ref
            .as_deref()
            .and_then(|r| r.parse().ok())
            .ok_or_else(|| {
                SettlementError::Repository(PortError::internal(format!(
                    "Idempotency record for {} carries no usable result",
                    self.command_id
                )))
            })
    }
}

/// Runs commands at most once per `CommandId`
///
/// The executor holds a process-wide lock across check, action and record,
/// so two commands never interleave their read-modify-write of invoices or
/// credit pools.
pub struct IdempotencyExecutor {
    records: Arc<dyn IdempotencyRepository>,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl IdempotencyExecutor {
    pub fn new(records: Arc<dyn IdempotencyRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            records,
            clock,
            lock: Mutex::new(()),
        }
    }

    /// Runs `action` once for `command_id`
    ///
    /// On a replay `replay` receives the stored record and `action` is not
    /// invoked. A failed action records nothing, so the command may be
    /// retried.
    pub fn run<T, A, R>(&self, command_id: CommandId, action: A, replay: R) -> Result<T, SettlementError>
    where
        T: fmt::Display,
        A: FnOnce() -> Result<T, SettlementError>,
        R: FnOnce(&IdempotencyRecord) -> Result<T, SettlementError>,
    {
        self.execute(command_id, action, replay, |result| Some(result.to_string()))
    }

    /// Runs a command without a result
    pub fn run_void<A>(&self, command_id: CommandId, action: A) -> Result<(), SettlementError>
    where
        A: FnOnce() -> Result<(), SettlementError>,
    {
        self.execute(command_id, action, |_| Ok(()), |_| None)
    }

    /// Returns true if `command_id` has completed
    pub fn is_done(&self, command_id: CommandId) -> Result<bool, SettlementError> {
        Ok(self.records.find(command_id)?.is_some())
    }

    fn execute<T, A, R, F>(
        &self,
        command_id: CommandId,
        action: A,
        replay: R,
        result_ref: F,
    ) -> Result<T, SettlementError>
    where
        A: FnOnce() -> Result<T, SettlementError>,
        R: FnOnce(&IdempotencyRecord) -> Result<T, SettlementError>,
        F: FnOnce(&T) -> Option<String>,
    {
        if command_id.is_nil() {
            return Err(SettlementError::validation("Command id is required"));
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(record) = self.records.find(command_id)? {
            debug!(command_id = %command_id, "Replaying completed command");
            return replay(&record);
        }

        let result = action()?;
        let record = IdempotencyRecord::done(command_id, self.clock.now(), result_ref(&result));
        self.records.save(&record)?;
        info!(command_id = %command_id, result = ?record.result_ref, "Command completed");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{DomainPort, SystemClock, TransactionId};
    use std::cell::Cell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Records(Mutex<HashMap<CommandId, IdempotencyRecord>>);

    impl DomainPort for Records {}

    impl IdempotencyRepository for Records {
        fn find(&self, command_id: CommandId) -> Result<Option<IdempotencyRecord>, PortError> {
            Ok(self.0.lock().unwrap().get(&command_id).cloned())
        }

        fn save(&self, record: &IdempotencyRecord) -> Result<(), PortError> {
            self.0.lock().unwrap().insert(record.command_id, record.clone());
            Ok(())
        }
    }

    fn executor() -> IdempotencyExecutor {
        IdempotencyExecutor::new(Arc::new(Records::default()), Arc::new(SystemClock))
    }

    #[test]
    fn test_second_run_replays() {
        let executor = executor();
        let command = CommandId::new();
        let calls = Cell::new(0);
        let txn = TransactionId::new();

        let first = executor
            .run(command, || {
                calls.set(calls.get() + 1);
                Ok(txn)
            }, |r| r.parse_result())
            .unwrap();
        let second = executor
            .run(command, || {
                calls.set(calls.get() + 1);
                Ok(TransactionId::new())
            }, |r| r.parse_result())
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(first, txn);
        assert_eq!(second, txn);
    }

    #[test]
    fn test_failed_action_is_not_recorded() {
        let executor = executor();
        let command = CommandId::new();

        let result = executor.run_void(command, || Err(SettlementError::validation("boom")));
        assert!(result.is_err());
        assert!(!executor.is_done(command).unwrap());

        executor.run_void(command, || Ok(())).unwrap();
        assert!(executor.is_done(command).unwrap());
    }

    #[test]
    fn test_nil_command_rejected() {
        let executor = executor();
        let nil = CommandId::from_uuid(uuid::Uuid::nil());
        let err = executor.run_void(nil, || Ok(())).unwrap_err();
        assert!(matches!(err, SettlementError::Validation(_)));
    }
}
