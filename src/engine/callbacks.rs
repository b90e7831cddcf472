//! Host callbacks for one `translate` call.

use crate::error::TranslationFailure;
use crate::types::TranslationUnit;

/// Receiver of a `translate` outcome.
///
/// Exactly one of `on_after_loading` / `on_error` fires per executed call,
/// followed by `always`.
pub trait TranslateCallbacks: Send + Sync {
    fn on_after_loading(&self, unit: TranslationUnit);

    fn on_error(&self, failure: &TranslationFailure, message: &str);

    fn always(&self) {}
}

type LoadedFn = Box<dyn Fn(TranslationUnit) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&TranslationFailure, &str) + Send + Sync>;
type AlwaysFn = Box<dyn Fn() + Send + Sync>;

/// Closure-backed [`TranslateCallbacks`]. Unset handlers do nothing.
#[derive(Default)]
pub struct FnCallbacks {
    on_after_loading: Option<LoadedFn>,
    on_error: Option<ErrorFn>,
    always: Option<AlwaysFn>,
}

impl FnCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_after_loading<F>(mut self, f: F) -> Self
    where
        F: Fn(TranslationUnit) + Send + Sync + 'static,
    {
        self.on_after_loading = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&TranslationFailure, &str) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn always<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.always = Some(Box::new(f));
        self
    }
}

impl TranslateCallbacks for FnCallbacks {
    fn on_after_loading(&self, unit: TranslationUnit) {
        if let Some(f) = &self.on_after_loading {
            f(unit);
        }
    }

    fn on_error(&self, failure: &TranslationFailure, message: &str) {
        if let Some(f) = &self.on_error {
            f(failure, message);
        }
    }

    fn always(&self) {
        if let Some(f) = &self.always {
            f();
        }
    }
}
