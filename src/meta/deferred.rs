//! Postponed generator instantiation.

use crate::args::{Args, OperationGenerator};
use crate::core::{AtomicOperation, Decomposition, Element};
use parking_lot::RwLock;
use std::fmt;
use std::iter;
use std::sync::Arc;

/// Calls its generator only when decomposed, and again on every decomposition.
///
/// Arguments come from two places: arguments pre-bound at construction
/// ([`Deferred::with_args`]) and arguments bound later through [`Deferred::bind`].
/// Late positionals are appended after the pre-bound ones; late keywords
/// override them.
///
/// # Invariants
/// - No memoization: each `decompose_once` pull invokes the generator anew.
/// - Clones share the late-binding slot.
#[derive(Clone)]
pub struct Deferred<A: AtomicOperation> {
    generator: OperationGenerator<A>,
    prebound: Args,
    late: Arc<RwLock<Args>>,
}

impl<A: AtomicOperation> Deferred<A> {
    pub fn new(generator: OperationGenerator<A>) -> Self {
        Self {
            generator,
            prebound: Args::new(),
            late: Arc::new(RwLock::new(Args::new())),
        }
    }

    /// Pre-binds arguments.
    pub fn with_args(mut self, args: Args) -> Self {
        self.prebound = args;
        self
    }

    /// Binds late arguments, replacing any earlier late binding.
    pub fn bind(&self, args: Args) {
        *self.late.write() = args;
    }

    /// Pre-bound arguments merged with the late binding.
    pub fn bound_args(&self) -> Args {
        self.prebound.merged(&self.late.read())
    }

    pub fn generator(&self) -> &OperationGenerator<A> {
        &self.generator
    }

    /// Invokes the generator with the currently bound arguments.
    pub fn instantiate(&self) -> Element<A> {
        self.generator.invoke(&self.bound_args())
    }

    /// Invokes the generator with `extra` merged over the bound arguments,
    /// leaving the bound state untouched.
    pub fn instantiate_with(&self, extra: &Args) -> Element<A> {
        self.generator.invoke(&self.bound_args().merged(extra))
    }

    /// Single-element stream; the generator runs when the element is pulled.
    pub fn decompose_once(&self) -> Decomposition<A> {
        let this = self.clone();
        Box::new(iter::once_with(move || this.instantiate()))
    }
}

impl<A: AtomicOperation> fmt::Display for Deferred<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DEFER({})", self.generator.name())
    }
}

impl<A: AtomicOperation> fmt::Debug for Deferred<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("generator", &self.generator.name())
            .field("args", &self.bound_args())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{h, zpow, Gate};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn zpow_generator() -> OperationGenerator<Gate> {
        OperationGenerator::single("ZPow", |args: &Args| {
            zpow(
                args.keyword::<i64>("exponent").copied().unwrap_or(0),
                args.get::<u32>(0).copied().unwrap_or(0),
            )
        })
    }

    #[test]
    fn fresh_instantiation_per_decomposition() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let gen = OperationGenerator::single("counting", move |_: &Args| {
            h(counter.fetch_add(1, Ordering::SeqCst) as u32)
        });
        let deferred = Deferred::new(gen);
        let first: Vec<_> = deferred.decompose_once().collect();
        let second: Vec<_> = deferred.decompose_once().collect();
        assert_eq!(first[0].as_op(), Some(&h(0)));
        assert_eq!(second[0].as_op(), Some(&h(1)));
    }

    #[test]
    fn generator_not_called_until_pulled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let gen = OperationGenerator::single("lazy", move |_: &Args| {
            counter.fetch_add(1, Ordering::SeqCst);
            h(0)
        });
        let deferred = Deferred::new(gen);
        let mut stream = deferred.decompose_once();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(stream.next().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn partial_binding() {
        let deferred = Deferred::new(zpow_generator()).with_args(Args::new().arg(4u32));
        assert_eq!(deferred.instantiate().as_op(), Some(&zpow(0, 4)));

        deferred.bind(Args::new().kwarg("exponent", 3i64));
        assert_eq!(deferred.instantiate().as_op(), Some(&zpow(3, 4)));

        let once = deferred.instantiate_with(&Args::new().kwarg("exponent", 5i64));
        assert_eq!(once.as_op(), Some(&zpow(5, 4)));
        // instantiate_with leaves the binding alone.
        assert_eq!(deferred.instantiate().as_op(), Some(&zpow(3, 4)));
    }

    #[test]
    fn clones_share_late_binding() {
        let deferred = Deferred::new(zpow_generator());
        let clone = deferred.clone();
        deferred.bind(Args::new().arg(2u32).kwarg("exponent", 1i64));
        assert_eq!(clone.instantiate().as_op(), Some(&zpow(1, 2)));
    }
}
