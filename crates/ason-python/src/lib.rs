//! # ason-python
//!
//! Python bindings for ASON values, built with PyO3.
//!
//! Exposes the `ason` module:
//!
//! - `Ason(value)` -- convert any Python value; supports `|`, `&`, `~`,
//!   `join()`, rich comparisons, iteration, `str()` and `repr()`
//! - `parse(expression, **bindings)` -- read an ASON expression with
//!   keyword arguments bound as variables
//! - `UNIVERSE`, `EMPTY`, `WILD` -- the sentinel values
//!
//! Objects that are not one of the core Python types convert through their
//! `__ason__()` method, or `__json__()` if there is no `__ason__`. Lists and
//! dicts are walked one level per conversion step, so a container holding
//! itself stops at the converter's depth limit.

use pyo3::basic::CompareOp;
use pyo3::exceptions::{
    PyMemoryError, PyOverflowError, PyRecursionError, PyRuntimeError, PyTypeError, PyValueError,
};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString};
use pyo3::IntoPyObject;

use ason_core::engine::ReadError;
use ason_core::error::{ConversionError, ParseError};
use ason_core::{Ason, AsonError, CmpOp, HostValue, Item, Iter, Namespace, ToAson};

/// Map a bridge error onto the closest Python exception.
fn to_py_err(err: impl Into<AsonError>) -> PyErr {
    let err = err.into();
    let message = err.to_string();
    match err {
        AsonError::Conversion(ConversionError::NotRepresentable { .. }) => {
            PyOverflowError::new_err(message)
        }
        AsonError::Conversion(ConversionError::AllocationFailure(_)) => {
            PyMemoryError::new_err(message)
        }
        AsonError::Conversion(ConversionError::Host(_)) => PyRuntimeError::new_err(message),
        AsonError::Conversion(ConversionError::DepthExceeded { .. })
        | AsonError::Parse(ParseError::Read(ReadError::TooDeep { .. })) => {
            PyRecursionError::new_err(message)
        }
        AsonError::Conversion(ConversionError::Expression(_)) | AsonError::Parse(_) => {
            PyValueError::new_err(message)
        }
        AsonError::Conversion(_) | AsonError::Comparison(_) | AsonError::Iteration(_) => {
            PyTypeError::new_err(message)
        }
    }
}

/// A Python object converted lazily through `__ason__` / `__json__`.
struct PyDelegate(Py<PyAny>);

impl PyDelegate {
    fn call(&self, method: &str) -> Option<Result<HostValue, ConversionError>> {
        Python::with_gil(|py| {
            let obj = self.0.bind(py);
            match obj.hasattr(method) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some(Err(ConversionError::Host(e.to_string()))),
            }
            Some(
                obj.call_method0(method)
                    .and_then(|returned| host_value(&returned))
                    .map_err(|e| ConversionError::Host(e.to_string())),
            )
        })
    }
}

impl ToAson for PyDelegate {
    fn to_ason(&self) -> Option<Result<HostValue, ConversionError>> {
        self.call("__ason__")
    }

    fn to_json(&self) -> Option<Result<HostValue, ConversionError>> {
        self.call("__json__")
    }

    fn type_name(&self) -> String {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .get_type()
                .name()
                .map(|name| name.to_string())
                .unwrap_or_else(|_| "object".to_string())
        })
    }
}

/// A Python list or dict whose items are described when the converter
/// reaches it.
struct PyContainer(Py<PyAny>);

impl ToAson for PyContainer {
    fn to_ason(&self) -> Option<Result<HostValue, ConversionError>> {
        Some(Python::with_gil(|py| {
            container_items(self.0.bind(py)).map_err(|e| ConversionError::Host(e.to_string()))
        }))
    }

    fn type_name(&self) -> String {
        Python::with_gil(|py| {
            if self.0.bind(py).is_instance_of::<PyDict>() {
                "dict".to_string()
            } else {
                "list".to_string()
            }
        })
    }
}

fn container_items(obj: &Bound<'_, PyAny>) -> PyResult<HostValue> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        let pairs = dict
            .iter()
            .map(|(k, v)| Ok((host_value(&k)?, host_value(&v)?)))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(HostValue::Map(pairs));
    }
    let items = obj
        .downcast::<PyList>()?
        .iter()
        .map(|item| host_value(&item))
        .collect::<PyResult<Vec<_>>>()?;
    Ok(HostValue::List(items))
}

/// An operand that could not be described, e.g. a `str` holding a lone
/// surrogate. Comparisons see it as an unconvertible value.
struct Undescribable(String);

impl ToAson for Undescribable {
    fn to_ason(&self) -> Option<Result<HostValue, ConversionError>> {
        Some(Err(ConversionError::Host(self.0.clone())))
    }
}

/// A Python int too large for 128 bits; always fails to convert.
struct OversizedInt(String);

impl ToAson for OversizedInt {
    fn to_ason(&self) -> Option<Result<HostValue, ConversionError>> {
        Some(Err(ConversionError::NotRepresentable {
            value: self.0.clone(),
        }))
    }

    fn type_name(&self) -> String {
        "int".to_string()
    }
}

/// Describe a Python object as a host value. Never inspects `__ason__`
/// eagerly; unknown objects become delegates resolved during conversion.
fn host_value(obj: &Bound<'_, PyAny>) -> PyResult<HostValue> {
    if let Ok(s) = obj.downcast::<PyString>() {
        return Ok(HostValue::String(s.to_str()?.to_owned()));
    }
    // bool before int: Python bools are ints.
    if let Ok(b) = obj.downcast::<PyBool>() {
        return Ok(HostValue::Bool(b.is_true()));
    }
    if obj.is_none() {
        return Ok(HostValue::Null);
    }
    if obj.is_instance_of::<PyInt>() {
        return Ok(match obj.extract::<i128>() {
            Ok(i) => HostValue::Int(i),
            Err(_) => HostValue::extension(OversizedInt(obj.str()?.to_string())),
        });
    }
    if let Ok(f) = obj.downcast::<PyFloat>() {
        return Ok(HostValue::Float(f.value()));
    }
    if let Ok(wrapped) = obj.downcast::<PyAson>() {
        return Ok(HostValue::Ason(wrapped.get().inner.clone()));
    }
    if obj.is_instance_of::<PyList>() || obj.is_instance_of::<PyDict>() {
        return Ok(HostValue::extension(PyContainer(obj.clone().unbind())));
    }
    Ok(HostValue::extension(PyDelegate(obj.clone().unbind())))
}

fn cmp_op(op: CompareOp) -> CmpOp {
    match op {
        CompareOp::Lt => CmpOp::Lt,
        CompareOp::Le => CmpOp::Le,
        CompareOp::Eq => CmpOp::Eq,
        CompareOp::Ne => CmpOp::Ne,
        CompareOp::Gt => CmpOp::Gt,
        CompareOp::Ge => CmpOp::Ge,
    }
}

/// An ASON value.
#[pyclass(name = "Ason", module = "ason", frozen)]
struct PyAson {
    inner: Ason,
}

impl PyAson {
    fn operate<F>(&self, other: &Bound<'_, PyAny>, op: F) -> PyResult<Self>
    where
        F: FnOnce(&Ason, HostValue) -> Result<Ason, ConversionError>,
    {
        let other = host_value(other)?;
        let inner = op(&self.inner, other).map_err(to_py_err)?;
        Ok(Self { inner })
    }
}

#[pymethods]
impl PyAson {
    /// Convert a Python value into an ASON value.
    ///
    /// Raises:
    ///     TypeError: If the value (or a dict key) cannot be converted.
    ///     OverflowError: If an int does not fit in 64 bits.
    #[new]
    fn new(value: &Bound<'_, PyAny>) -> PyResult<Self> {
        let host = host_value(value)?;
        let inner = ason_core::convert(&host).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!("{:?}", self.inner)
    }

    fn __or__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.operate(other, |a, b| a.union(b))
    }

    fn __ror__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.operate(other, |a, b| a.union(b))
    }

    fn __and__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.operate(other, |a, b| a.intersect(b))
    }

    fn __rand__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.operate(other, |a, b| a.intersect(b))
    }

    fn __invert__(&self) -> Self {
        Self {
            inner: self.inner.complement(),
        }
    }

    /// Overlay `other` onto this value (objects merge, lists concatenate).
    fn join(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.operate(other, |a, b| a.join(b))
    }

    fn __richcmp__(&self, other: &Bound<'_, PyAny>, op: CompareOp) -> PyResult<bool> {
        let other = host_value(other)
            .unwrap_or_else(|err| HostValue::extension(Undescribable(err.to_string())));
        self.inner.compare(other, cmp_op(op)).map_err(to_py_err)
    }

    fn __iter__(&self) -> PyResult<PyAsonIter> {
        let inner = self.inner.iter().map_err(to_py_err)?;
        Ok(PyAsonIter { inner })
    }

    /// Name of the value's type tag, e.g. `"List"` or `"Union"`.
    #[getter]
    fn type_tag(&self) -> String {
        format!("{:?}", self.inner.type_tag())
    }

    fn is_union(&self) -> bool {
        self.inner.is_union()
    }

    fn is_complement(&self) -> bool {
        self.inner.is_complement()
    }
}

/// Iterator over an `Ason` list, union (values) or object (`(key, value)` tuples).
#[pyclass(name = "AsonIterator", module = "ason")]
struct PyAsonIter {
    inner: Iter,
}

#[pymethods]
impl PyAsonIter {
    fn __iter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __next__(mut slf: PyRefMut<'_, Self>, py: Python<'_>) -> PyResult<Option<PyObject>> {
        let item = match slf.inner.next() {
            Some(item) => item,
            None => return Ok(None),
        };
        let object = match item {
            Item::Value(value) => Py::new(py, PyAson { inner: value })?.into_any(),
            Item::Pair(key, value) => (key, PyAson { inner: value })
                .into_pyobject(py)?
                .into_any()
                .unbind(),
        };
        Ok(Some(object))
    }
}

/// Read an ASON expression. Keyword arguments are bound as variables for
/// this read only.
///
/// Args:
///     expression: ASON expression text, e.g. `"[x, *] | null"`.
///     **bindings: Values for the variables the expression mentions.
///
/// Raises:
///     ValueError: If the expression does not read or a name is invalid.
#[pyfunction]
#[pyo3(signature = (expression, **bindings))]
fn parse(expression: &str, bindings: Option<&Bound<'_, PyDict>>) -> PyResult<PyAson> {
    let mut namespace = Namespace::new();
    if let Some(bindings) = bindings {
        for (name, value) in bindings.iter() {
            let name: String = name.extract()?;
            namespace
                .bind(name, host_value(&value)?)
                .map_err(to_py_err)?;
        }
    }
    let inner = namespace.resolve(expression).map_err(to_py_err)?;
    Ok(PyAson { inner })
}

/// The `ason` extension module.
#[pymodule]
fn ason(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyAson>()?;
    m.add_class::<PyAsonIter>()?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add("UNIVERSE", PyAson { inner: Ason::universe() })?;
    m.add("EMPTY", PyAson { inner: Ason::empty() })?;
    m.add("WILD", PyAson { inner: Ason::wild() })?;
    Ok(())
}
