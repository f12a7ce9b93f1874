//! Variadic call arguments: positional items plus a trailing options map.
//!
//! Endpoint helpers accept "one identifier, several identifiers, or a list
//! of identifiers, optionally followed by options". [`Arguments`] splits
//! that shape once so the helper can work with plain items and an
//! [`Options`] map.

use crate::transport::Options;

/// One raw call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<T> {
    One(T),
    Many(Vec<T>),
    Options(Options),
}

impl<T> Argument<T> {
    pub fn one(item: impl Into<T>) -> Self {
        Argument::One(item.into())
    }

    pub fn many<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        Argument::Many(items.into_iter().map(Into::into).collect())
    }

    /// The single item, if this is `One`.
    pub fn into_one(self) -> Option<T> {
        match self {
            Argument::One(item) => Some(item),
            _ => None,
        }
    }
}

/// Positional arguments with the options map split off.
///
/// Only a mapping in the *last* position becomes the options. A mapping
/// anywhere else stays positional and contributes no items to
/// [`flatten`](Arguments::flatten).
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments<T> {
    positional: Vec<Argument<T>>,
    options: Options,
}

impl<T> Arguments<T> {
    pub fn new(mut raw: Vec<Argument<T>>) -> Self {
        let options = match raw.pop() {
            Some(Argument::Options(options)) => options,
            Some(last) => {
                raw.push(last);
                Options::new()
            }
            None => Options::new(),
        };
        Self {
            positional: raw,
            options,
        }
    }

    /// Positional items only, no options.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        Self {
            positional: items.into_iter().map(|i| Argument::One(i.into())).collect(),
            options: Options::new(),
        }
    }

    pub fn positional(&self) -> &[Argument<T>] {
        &self.positional
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn into_options(self) -> Options {
        self.options
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    /// Remove and return the last positional argument.
    pub fn pop(&mut self) -> Option<Argument<T>> {
        self.positional.pop()
    }

    /// Positional items with one level of `Many` expanded, in order.
    pub fn flatten(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut flat = Vec::with_capacity(self.positional.len());
        for arg in &self.positional {
            match arg {
                Argument::One(item) => flat.push(item.clone()),
                Argument::Many(items) => flat.extend(items.iter().cloned()),
                Argument::Options(_) => {}
            }
        }
        flat
    }

    /// Consuming form of [`flatten`](Self::flatten) that also hands back the options.
    pub fn into_flat(self) -> (Vec<T>, Options) {
        let mut flat = Vec::with_capacity(self.positional.len());
        for arg in self.positional {
            match arg {
                Argument::One(item) => flat.push(item),
                Argument::Many(items) => flat.extend(items),
                Argument::Options(_) => {}
            }
        }
        (flat, self.options)
    }
}
