use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("ragchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("ragchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("ragchat.client.request_duration_seconds");

pub(crate) static CHAT_SUBMITS: Counter = Counter::new("ragchat.chat.submits");
pub(crate) static CHAT_SUBMITS_REJECTED: Counter = Counter::new("ragchat.chat.submits_rejected");
pub(crate) static CHAT_FALLBACKS: Counter = Counter::new("ragchat.chat.fallbacks");
pub(crate) static CHAT_ABANDONED: Counter = Counter::new("ragchat.chat.abandoned");

pub(crate) static HISTORY_REFRESHES: Counter = Counter::new("ragchat.history.refreshes");
pub(crate) static HISTORY_REFRESH_ERRORS: Counter = Counter::new("ragchat.history.refresh_errors");
pub(crate) static HISTORY_REFRESH_STALE: Counter = Counter::new("ragchat.history.refresh_stale");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&CHAT_SUBMITS);
    collector.register_counter(&CHAT_SUBMITS_REJECTED);
    collector.register_counter(&CHAT_FALLBACKS);
    collector.register_counter(&CHAT_ABANDONED);

    collector.register_counter(&HISTORY_REFRESHES);
    collector.register_counter(&HISTORY_REFRESH_ERRORS);
    collector.register_counter(&HISTORY_REFRESH_STALE);
}
