//! Chat-event routing for automatic summarization.
//!
//! Frontends feed raw events in; the router holds the small amount of state
//! needed to turn "swipe then render" into a resummarize, and answers with
//! an action the session executes. State is explicit so a swipe that never
//! renders cannot leak into later decisions.

use recap_domain::config::SummarizationConfig;

/// Raw chat events as reported by a frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// A message finished rendering.
    Rendered { index: usize },
    /// The message at `index` was swiped to a new variant.
    Swiped { index: usize },
    /// The message at `index` was edited in place.
    Edited { index: usize },
    /// The message at `index` was continued (text appended).
    Continued { index: usize },
    /// A different chat was loaded.
    ChatChanged,
}

/// What the session should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    None,
    /// Summarize the message if it has no summary yet.
    Summarize(usize),
    /// Discard any existing summary and summarize again.
    Resummarize(usize),
    /// Rebuild timeline and memory caches from the new log.
    RebuildCaches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerState {
    Idle,
    /// A swipe happened at the index; the next render there resummarizes.
    AwaitingSwipeRender(usize),
    /// A continue happened at the index; same deal.
    AwaitingContinueRender(usize),
}

/// Per-session event router.
#[derive(Debug)]
pub struct TriggerRouter {
    state: TriggerState,
}

impl Default for TriggerRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerRouter {
    pub fn new() -> Self {
        Self {
            state: TriggerState::Idle,
        }
    }

    pub fn on_event(&mut self, event: TriggerEvent, cfg: &SummarizationConfig) -> TriggerAction {
        match event {
            TriggerEvent::Swiped { index } => {
                self.state = TriggerState::AwaitingSwipeRender(index);
                TriggerAction::None
            }
            TriggerEvent::Continued { index } => {
                self.state = TriggerState::AwaitingContinueRender(index);
                TriggerAction::None
            }
            TriggerEvent::Rendered { index } => match self.state {
                TriggerState::AwaitingSwipeRender(awaited)
                | TriggerState::AwaitingContinueRender(awaited)
                    if awaited == index =>
                {
                    self.state = TriggerState::Idle;
                    if cfg.auto_summarize {
                        TriggerAction::Resummarize(index)
                    } else {
                        TriggerAction::None
                    }
                }
                _ => {
                    if cfg.auto_summarize {
                        TriggerAction::Summarize(index)
                    } else {
                        TriggerAction::None
                    }
                }
            },
            TriggerEvent::Edited { index } => {
                if cfg.auto_summarize {
                    TriggerAction::Resummarize(index)
                } else {
                    TriggerAction::None
                }
            }
            TriggerEvent::ChatChanged => {
                self.state = TriggerState::Idle;
                TriggerAction::RebuildCaches
            }
        }
    }
}
