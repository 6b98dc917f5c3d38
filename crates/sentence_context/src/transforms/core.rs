use anyhow::{Context, Result};
use std::marker::PhantomData;

/// A stateless conversion step used to preprocess sentence text.
///
/// Steps compose with `.then(...)`, so a lowercasing step followed by a
/// tokenizer reads as `Lowercase.then(WhitespaceTokenize)`. The composed
/// chain is itself a `Transform` and can be handed to a `DocumentReader`
/// as its preprocessor.
///
/// Note: `then()` requires the output of `self` to be the input of `next`,
/// and both halves must be concrete (`Sized`) types.
pub trait Transform<I, O>: Send + Sync {
    /// Applies the transformation to the input
    fn apply(&self, input: I) -> Result<O>;

    #[inline]
    fn then<T, M>(self, next: T) -> Chain<Self, T, O>
    where
        Self: Sized,
        T: Transform<O, M>,
        O: Send,
        M: Send,
    {
        Chain {
            first: self,
            second: next,
            _marker: PhantomData,
        }
    }
}

/// Two transforms run back to back (`A` -> `B`).
/// - `PhantomData<M>` pins the intermediate type.
#[derive(Debug)]
pub struct Chain<A, B, M> {
    first: A,
    second: B,
    _marker: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    /// Builds a chain without going through [`Transform::then`], e.g. when the
    /// two halves are picked at runtime from CLI flags.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<I, M, O, A, B> Transform<I, O> for Chain<A, B, M>
where
    A: Transform<I, M>,
    B: Transform<M, O>,
    M: Send,
{
    fn apply(&self, input: I) -> Result<O> {
        self.first
            .apply(input)
            .and_then(|mid| self.second.apply(mid))
            .with_context(|| {
                format!(
                    "Preprocessing chain failed: {} → {} → {}",
                    std::any::type_name::<A>(),
                    std::any::type_name::<B>(),
                    std::any::type_name::<O>()
                )
            })
    }
}

/// Boxed transforms forward to the inner value, so a preprocessor chosen at
/// runtime can be stored as `Box<dyn Transform<String, Vec<String>>>`.
impl<I, O, T> Transform<I, O> for Box<T>
where
    T: Transform<I, O> + ?Sized,
{
    fn apply(&self, input: I) -> Result<O> {
        (**self).apply(input)
    }
}
