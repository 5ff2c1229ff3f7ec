//! In-memory backend for tests.
//!
//! Compiled for this crate's own tests and, behind the `test-support`
//! feature, for the tests of downstream crates.

#![allow(clippy::expect_used)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secretly_domain::{Environment, EnvironmentId, EnvironmentPayload, Variable, VariableId};
use tokio::sync::Notify;

use crate::ports::{ApiError, EnvironmentApi};

/// Backend operations, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `list` and `list_named`.
    List,
    /// `create`.
    Create,
    /// `update`.
    Update,
    /// `delete`.
    Delete,
    /// `delete_variable`.
    DeleteVariable,
}

/// A request as the backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Call {
    List,
    ListNamed(String),
    Create(EnvironmentPayload),
    Update(EnvironmentId, EnvironmentPayload),
    Delete(EnvironmentId),
    DeleteVariable(EnvironmentId, VariableId),
}

#[derive(Default)]
struct State {
    environments: Vec<Environment>,
    next_id: i64,
    calls: Vec<Call>,
    failing: HashSet<Op>,
    delete_gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl State {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn materialize(&mut self, payload: &EnvironmentPayload) -> Vec<Variable> {
        payload
            .values
            .iter()
            .map(|v| {
                let id = v.id.unwrap_or_else(|| VariableId(self.allocate()));
                Variable::persisted(id, v.key.clone(), v.value.clone())
            })
            .collect()
    }

    fn check(&self, op: Op) -> Result<(), ApiError> {
        if self.failing.contains(&op) {
            return Err(ApiError::Status {
                status: 500,
                message: Some("injected failure".to_string()),
            });
        }
        Ok(())
    }
}

/// Shared, cloneable in-memory backend.
#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<State>>,
}

impl MockApi {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an environment directly, as if another client had created it.
    pub fn seed(&self, name: &str, values: &[(&str, &str)]) -> EnvironmentId {
        let mut state = self.state.lock().expect("Lock poisoned");
        let id = EnvironmentId(state.allocate());
        let mut variables = Vec::new();
        for (key, value) in values {
            let variable_id = VariableId(state.allocate());
            variables.push(Variable::persisted(variable_id, *key, *value));
        }
        state
            .environments
            .push(Environment::persisted(id, name, variables));
        id
    }

    /// Returns the stored environments.
    pub fn environments(&self) -> Vec<Environment> {
        self.state
            .lock()
            .expect("Lock poisoned")
            .environments
            .clone()
    }

    /// Returns every request received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("Lock poisoned").calls.clone()
    }

    /// Counts the received requests matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    /// Makes every later `op` request fail with status 500.
    pub fn fail(&self, op: Op) {
        self.state.lock().expect("Lock poisoned").failing.insert(op);
    }

    /// Lets `op` requests succeed again.
    pub fn recover(&self, op: Op) {
        self.state.lock().expect("Lock poisoned").failing.remove(&op);
    }

    /// Makes the next deletes wait: `entered` is notified when a delete
    /// arrives, and the delete resumes once `release` is notified.
    pub fn gate_deletes(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        self.state.lock().expect("Lock poisoned").delete_gate =
            Some((Arc::clone(&entered), Arc::clone(&release)));
        (entered, release)
    }

    async fn wait_at_gate(&self) {
        let gate = self.state.lock().expect("Lock poisoned").delete_gate.clone();
        if let Some((entered, release)) = gate {
            entered.notify_one();
            release.notified().await;
        }
    }
}

#[async_trait]
impl EnvironmentApi for MockApi {
    async fn list(&self) -> Result<Vec<Environment>, ApiError> {
        let mut state = self.state.lock().expect("Lock poisoned");
        state.calls.push(Call::List);
        state.check(Op::List)?;
        Ok(state.environments.clone())
    }

    async fn list_named(&self, name: &str) -> Result<Vec<Environment>, ApiError> {
        let mut state = self.state.lock().expect("Lock poisoned");
        state.calls.push(Call::ListNamed(name.to_string()));
        state.check(Op::List)?;
        Ok(state
            .environments
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        payload: &EnvironmentPayload,
    ) -> Result<Option<EnvironmentId>, ApiError> {
        let mut state = self.state.lock().expect("Lock poisoned");
        state.calls.push(Call::Create(payload.clone()));
        state.check(Op::Create)?;
        let id = EnvironmentId(state.allocate());
        let variables = state.materialize(payload);
        state
            .environments
            .push(Environment::persisted(id, payload.name.clone(), variables));
        Ok(Some(id))
    }

    async fn update(
        &self,
        id: EnvironmentId,
        payload: &EnvironmentPayload,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().expect("Lock poisoned");
        state.calls.push(Call::Update(id, payload.clone()));
        state.check(Op::Update)?;
        let variables = state.materialize(payload);
        let environment = state
            .environments
            .iter_mut()
            .find(|e| e.id == Some(id))
            .ok_or(ApiError::Status {
                status: 404,
                message: None,
            })?;
        environment.name.clone_from(&payload.name);
        environment.variables = variables;
        Ok(())
    }

    async fn delete(&self, id: EnvironmentId) -> Result<(), ApiError> {
        self.wait_at_gate().await;
        let mut state = self.state.lock().expect("Lock poisoned");
        state.calls.push(Call::Delete(id));
        state.check(Op::Delete)?;
        state.environments.retain(|e| e.id != Some(id));
        Ok(())
    }

    async fn delete_variable(
        &self,
        environment: EnvironmentId,
        variable: VariableId,
    ) -> Result<(), ApiError> {
        self.wait_at_gate().await;
        let mut state = self.state.lock().expect("Lock poisoned");
        state.calls.push(Call::DeleteVariable(environment, variable));
        state.check(Op::DeleteVariable)?;
        if let Some(env) = state
            .environments
            .iter_mut()
            .find(|e| e.id == Some(environment))
        {
            env.variables.retain(|v| v.id != Some(variable));
        }
        Ok(())
    }
}
