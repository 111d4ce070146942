//! Shared test fixtures: a small screen domain and recording ports.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;
use std::time::Duration;

use blocflow::bloc::Event;
use blocflow::classifier::{ChannelNavigator, NavigationIntent, ResponseClassifier};
use blocflow::config::{BuildMode, ClassifierConfig};
use blocflow::state::{RenderState, StateFactory};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

/// Payloads the fake transport produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Profile { name: String },
    Feed { items: Vec<String> },
    Corrupt,
    /// Makes the factory panic.
    Poisoned,
}

/// What the fake screen renders.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Profile(String),
    Feed(usize),
    EmptyFeed,
}

pub struct ScreenFactory;

impl StateFactory for ScreenFactory {
    type Payload = Payload;
    type View = View;

    fn create(&self, payload: Payload) -> anyhow::Result<RenderState<View>> {
        match payload {
            Payload::Profile { name } => Ok(RenderState::Data(View::Profile(name))),
            Payload::Feed { items } if items.is_empty() => Ok(RenderState::Data(View::EmptyFeed)),
            Payload::Feed { items } => Ok(RenderState::Data(View::Feed(items.len()))),
            Payload::Corrupt => Err(anyhow::anyhow!("payload failed validation")),
            Payload::Poisoned => panic!("factory received poisoned payload"),
        }
    }
}

/// Events of the fake screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    Search { query: String },
    Submit { step: u32 },
    Refresh,
    Fail,
}

impl Event for ScreenEvent {
    fn kind(&self) -> &'static str {
        match self {
            ScreenEvent::Search { .. } => "search",
            ScreenEvent::Submit { .. } => "submit",
            ScreenEvent::Refresh => "refresh",
            ScreenEvent::Fail => "fail",
        }
    }
}

pub fn debug_config() -> ClassifierConfig {
    ClassifierConfig {
        build_mode: BuildMode::Debug,
        ..ClassifierConfig::default()
    }
}

pub fn release_config() -> ClassifierConfig {
    ClassifierConfig {
        build_mode: BuildMode::Release,
        ..ClassifierConfig::default()
    }
}

/// Classifier over [`ScreenFactory`] whose navigation intents are captured.
pub fn screen_classifier(
    config: ClassifierConfig,
) -> (ResponseClassifier<ScreenFactory>, UnboundedReceiver<NavigationIntent>) {
    let (navigator, receiver) = ChannelNavigator::new();
    let classifier = ResponseClassifier::new(ScreenFactory)
        .with_config(config)
        .with_navigator(Arc::new(navigator), Duration::from_secs(60));
    (classifier, receiver)
}

pub fn drain_intents(receiver: &mut UnboundedReceiver<NavigationIntent>) -> Vec<NavigationIntent> {
    let mut intents = Vec::new();
    while let Ok(intent) = receiver.try_recv() {
        intents.push(intent);
    }
    intents
}

/// Append-only log shared between handlers and assertions.
pub type Journal<T> = Arc<Mutex<Vec<T>>>;

pub fn journal<T>() -> Journal<T> {
    Arc::new(Mutex::new(Vec::new()))
}
