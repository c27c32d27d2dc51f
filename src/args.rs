//! Bound arguments and operation generators.
//!
//! A generator is a named callable that turns an argument tuple into an
//! [`Element`]. Arguments are opaque to the engine: they are stored
//! type-erased and recovered by the generator with typed accessors.

use crate::core::{AtomicOperation, Element};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A single type-erased argument value.
pub type ArgValue = Arc<dyn Any + Send + Sync>;

/// Positional and keyword arguments captured for a later generator call.
///
/// Cloning is cheap; values are shared.
#[derive(Clone, Default)]
pub struct Args {
    positional: Vec<ArgValue>,
    keyword: BTreeMap<String, ArgValue>,
}

impl Args {
    /// Creates an empty argument tuple.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.positional.push(Arc::new(value));
        self
    }

    /// Sets a keyword argument, replacing any previous value under `name`.
    pub fn kwarg<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.keyword.insert(name.into(), Arc::new(value));
        self
    }

    /// Returns positional argument `idx` if present and of type `T`.
    pub fn get<T: Any>(&self, idx: usize) -> Option<&T> {
        self.positional.get(idx)?.downcast_ref::<T>()
    }

    /// Returns keyword argument `name` if present and of type `T`.
    pub fn keyword<T: Any>(&self, name: &str) -> Option<&T> {
        self.keyword.get(name)?.downcast_ref::<T>()
    }

    /// Returns all positional arguments that have type `T`, in order.
    pub fn positional_of<T: Any>(&self) -> impl Iterator<Item = &T> + '_ {
        self.positional.iter().filter_map(|v| v.downcast_ref::<T>())
    }

    /// Number of positional arguments.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// Returns `true` if no positional or keyword arguments are bound.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Keyword names, sorted.
    pub fn keyword_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.keyword.keys().map(String::as_str)
    }

    /// Partial application: `later` positionals are appended after ours and
    /// `later` keywords override ours.
    pub fn merged(&self, later: &Args) -> Args {
        let mut out = self.clone();
        out.positional.extend(later.positional.iter().cloned());
        for (name, value) in &later.keyword {
            out.keyword.insert(name.clone(), Arc::clone(value));
        }
        out
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("positional", &self.positional.len())
            .field("keyword", &self.keyword.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Signature of a generator callable.
pub type GeneratorFn<A> = dyn Fn(&Args) -> Element<A> + Send + Sync;

/// A named callable producing an operation, a sequence, or a meta-operation.
///
/// Generators may be pure or stateful; the engine decides how often they are
/// invoked (see the meta-operation variants).
pub struct OperationGenerator<A: AtomicOperation> {
    name: Arc<str>,
    call: Arc<GeneratorFn<A>>,
}

impl<A: AtomicOperation> OperationGenerator<A> {
    /// Creates a generator from a closure.
    pub fn new<F>(name: impl Into<Arc<str>>, call: F) -> Self
    where
        F: Fn(&Args) -> Element<A> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            call: Arc::new(call),
        }
    }

    /// Convenience constructor for generators that build exactly one operation.
    pub fn single<F>(name: impl Into<Arc<str>>, build: F) -> Self
    where
        F: Fn(&Args) -> A + Send + Sync + 'static,
    {
        Self::new(name, move |args: &Args| Element::Op(build(args)))
    }

    /// Generator name, used in display labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the generator.
    pub fn invoke(&self, args: &Args) -> Element<A> {
        (self.call)(args)
    }
}

impl<A: AtomicOperation> Clone for OperationGenerator<A> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            call: Arc::clone(&self.call),
        }
    }
}

impl<A: AtomicOperation> fmt::Debug for OperationGenerator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationGenerator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
