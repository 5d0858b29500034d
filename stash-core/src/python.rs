//! Python Bindings
//!
//! Exposes [`Store`] to Python. State crosses the boundary as JSON text so
//! the Python side can use `json.loads` on whatever it receives.

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;
use serde_json::Value;

use crate::error::StoreError;
use crate::store::{Store, SubscriptionId};

fn to_py_err(err: StoreError) -> PyErr {
    match err {
        StoreError::UnknownStore(_) => PyKeyError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse(json: &str) -> PyResult<Value> {
    serde_json::from_str(json).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Python-exposed Store type.
#[pyclass(name = "Store")]
pub struct PyStore {
    inner: Store,
}

#[pymethods]
impl PyStore {
    /// Create a new store from an id and a JSON object.
    #[new]
    fn new(id: String, initial_state: &str) -> PyResult<Self> {
        let inner = crate::create_store(id, parse(initial_state)?).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    #[getter]
    fn id(&self) -> String {
        self.inner.id().to_owned()
    }

    /// Current state as JSON.
    #[getter]
    fn state(&self) -> String {
        self.inner.state().to_string()
    }

    fn patch(&self, partial: &str) -> PyResult<()> {
        self.inner.patch(parse(partial)?).map_err(to_py_err)
    }

    fn replace_state(&self, new_state: &str) -> PyResult<()> {
        self.inner.replace_state(parse(new_state)?).map_err(to_py_err)
    }

    fn replace_and_notify(&self, new_state: &str) -> PyResult<()> {
        self.inner
            .replace_and_notify(parse(new_state)?)
            .map_err(to_py_err)
    }

    /// Register `callback(event_json, state_json)`; returns the subscription id.
    fn subscribe(&self, callback: PyObject) -> u64 {
        let id = self.inner.subscribe(move |event, state| {
            Python::with_gil(|py| {
                let event = match serde_json::to_string(event) {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::error!(error = %err, "failed to serialize change event");
                        return;
                    }
                };
                if let Err(err) = callback.call1(py, (event, state.to_string())) {
                    err.print(py);
                }
            });
        });
        id.raw()
    }

    fn unsubscribe(&self, id: u64) -> bool {
        self.inner.unsubscribe(SubscriptionId::from_raw(id))
    }

    fn dispose(&self) -> usize {
        self.inner.dispose()
    }

    fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "Store(id={:?}, subscribers={})",
            self.inner.id(),
            self.inner.subscriber_count()
        )
    }
}
