//! Response classification.
//!
//! Reduces a [`Response`] to exactly one [`State`], consulting the
//! [`StateFactory`] on the success path and issuing navigation intents for
//! server and connectivity failures. Classification never fails from the
//! caller's point of view: internal errors are downgraded to an
//! exception-flavoured API error state.

mod guard;
mod navigation;

pub use guard::DedupNavigator;
pub use navigation::{
    ChannelNavigator, NavigationIntent, NavigationPort, NoopNavigator, RetryAction, Surface,
};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{ClassifierConfig, Config};
use crate::response::{Classification, Response};
use crate::state::{ErrorType, NonRenderState, RenderState, State, StateFactory};

/// Overrides default API error synthesis: `(status_code, message) -> state`.
pub type ApiErrorAction<V> =
    Arc<dyn Fn(Option<u16>, String) -> anyhow::Result<State<V>> + Send + Sync>;

/// Failures inside classification. Never escape [`ResponseClassifier`].
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Success response carried no payload")]
    MissingPayload,

    #[error("State factory failed: {0}")]
    Factory(anyhow::Error),

    #[error("API error hook failed: {0}")]
    ApiErrorHook(anyhow::Error),

    #[error("{callback} panicked: {message}")]
    Panicked {
        callback: &'static str,
        message: String,
    },
}

/// Per-call options of [`ResponseClassifier::classify_with`].
pub struct ClassifyOptions<V> {
    pub on_api_error: Option<ApiErrorAction<V>>,
    pub retry: Option<RetryAction>,
}

impl<V> ClassifyOptions<V> {
    pub fn new() -> Self {
        Self {
            on_api_error: None,
            retry: None,
        }
    }

    pub fn on_api_error<H>(mut self, hook: H) -> Self
    where
        H: Fn(Option<u16>, String) -> anyhow::Result<State<V>> + Send + Sync + 'static,
    {
        self.on_api_error = Some(Arc::new(hook));
        self
    }

    pub fn retry<R>(mut self, retry: R) -> Self
    where
        R: Fn() + Send + Sync + 'static,
    {
        self.retry = Some(Arc::new(retry));
        self
    }
}

impl<V> Default for ClassifyOptions<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for ClassifyOptions<V> {
    fn clone(&self) -> Self {
        Self {
            on_api_error: self.on_api_error.clone(),
            retry: self.retry.clone(),
        }
    }
}

/// Maps transport outcomes into UI states for one engine instance.
pub struct ResponseClassifier<F: StateFactory> {
    factory: F,
    config: ClassifierConfig,
    navigator: DedupNavigator<Arc<dyn NavigationPort>>,
}

impl<F: StateFactory> ResponseClassifier<F> {
    /// Classifier with default messages and no navigation adapter.
    pub fn new(factory: F) -> Self {
        let window = crate::config::NavigationConfig::default().dedup_window();
        Self {
            factory,
            config: ClassifierConfig::default(),
            navigator: DedupNavigator::new(Arc::new(NoopNavigator), window),
        }
    }

    /// Classifier configured from a loaded [`Config`].
    pub fn from_config(factory: F, config: &Config, navigator: Arc<dyn NavigationPort>) -> Self {
        Self {
            factory,
            config: config.classifier.clone(),
            navigator: DedupNavigator::new(navigator, config.navigation.dedup_window()),
        }
    }

    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs the navigation port, wrapped in the de-duplication guard.
    pub fn with_navigator(mut self, navigator: Arc<dyn NavigationPort>, window: Duration) -> Self {
        self.navigator = DedupNavigator::new(navigator, window);
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn navigator(&self) -> &DedupNavigator<Arc<dyn NavigationPort>> {
        &self.navigator
    }

    /// Classifies with default options.
    pub fn classify(
        &self,
        response: Response<F::Payload>,
        error_type: ErrorType,
    ) -> Option<State<F::View>> {
        self.classify_with(response, error_type, ClassifyOptions::default())
    }

    /// Classifies a response into a state.
    ///
    /// Returns `None` only for a parsing error absorbed in a release build.
    pub fn classify_with(
        &self,
        response: Response<F::Payload>,
        error_type: ErrorType,
        options: ClassifyOptions<F::View>,
    ) -> Option<State<F::View>> {
        let classification = response.classification;
        tracing::debug!(
            classification = %classification,
            status = ?response.status_code,
            error_type = ?error_type,
            "Classifying response"
        );

        match self.try_classify(response, error_type, &options) {
            Ok(state) => state,
            Err(err) => {
                tracing::error!(
                    classification = %classification,
                    error = %err,
                    "Classification failed, emitting exception state"
                );
                Some(self.synthesize(error_type, None, Classification::ApiError, true))
            }
        }
    }

    fn try_classify(
        &self,
        response: Response<F::Payload>,
        error_type: ErrorType,
        options: &ClassifyOptions<F::View>,
    ) -> Result<Option<State<F::View>>, ClassifyError> {
        if response.is_unauthorized() {
            return Ok(Some(unauthorized()));
        }

        match response.classification {
            Classification::Success => {
                let payload = response.payload.ok_or(ClassifyError::MissingPayload)?;
                let state = guarded("state factory", || self.factory.create(payload))?
                    .map_err(ClassifyError::Factory)?;
                Ok(Some(State::Render(state)))
            }
            Classification::ApiError => {
                let message = response
                    .first_message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| self.config.api_error_message.clone());

                if let Some(hook) = &options.on_api_error {
                    let status = response.status_code;
                    return guarded("API error hook", || hook(status, message))?
                        .map(Some)
                        .map_err(ClassifyError::ApiErrorHook);
                }

                Ok(Some(self.synthesize(
                    error_type,
                    Some(message),
                    Classification::ApiError,
                    false,
                )))
            }
            // Caught by is_unauthorized above.
            Classification::UnauthorizedError => Ok(Some(unauthorized())),
            Classification::NetworkError => Ok(Some(self.synthesize(
                error_type,
                Some(response.exception_message),
                Classification::NetworkError,
                false,
            ))),
            Classification::ParsingError => {
                if !self.config.build_mode.is_debug() {
                    tracing::debug!("Parsing error absorbed in release build");
                    return Ok(None);
                }
                Ok(Some(self.synthesize(
                    error_type,
                    Some(response.exception_message),
                    Classification::ParsingError,
                    false,
                )))
            }
            Classification::ServerError => {
                self.navigate(Surface::Maintenance, options);
                Ok(Some(self.synthesize(
                    ErrorType::None,
                    None,
                    Classification::ServerError,
                    false,
                )))
            }
            Classification::NoInternetError => {
                self.navigate(Surface::NoConnectivity, options);
                Ok(Some(self.synthesize(
                    ErrorType::None,
                    None,
                    Classification::NoInternetError,
                    false,
                )))
            }
            Classification::Unclassified => Ok(Some(self.synthesize(
                ErrorType::NonRender,
                None,
                Classification::Unclassified,
                false,
            ))),
        }
    }

    fn navigate(&self, surface: Surface, options: &ClassifyOptions<F::View>) {
        self.navigator
            .navigate(NavigationIntent::new(surface, options.retry.clone()));
    }

    /// Builds the error state for `error_type`.
    fn synthesize(
        &self,
        error_type: ErrorType,
        message: Option<String>,
        classification: Classification,
        is_exception: bool,
    ) -> State<F::View> {
        let text = || {
            if is_exception {
                self.config.exception_message.clone()
            } else {
                message
                    .clone()
                    .unwrap_or_else(|| self.config.generic_error_message.clone())
            }
        };

        match error_type {
            ErrorType::Render => State::Render(RenderState::error(text())),
            ErrorType::None => State::NonRender(NonRenderState::error("", classification)),
            ErrorType::NonRender => State::NonRender(NonRenderState::error(text(), classification)),
        }
    }
}

fn unauthorized<V>() -> State<V> {
    tracing::info!("Unauthorized response, signalling re-authentication");
    State::NonRender(NonRenderState::error("", Classification::UnauthorizedError))
}

/// Runs a caller-supplied callback, turning a panic into [`ClassifyError::Panicked`].
fn guarded<T>(callback: &'static str, call: impl FnOnce() -> T) -> Result<T, ClassifyError> {
    panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| ClassifyError::Panicked {
        callback,
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
