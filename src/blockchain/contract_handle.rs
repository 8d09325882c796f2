use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::AppError;

const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
enum HandleState<T> {
    Pending { last_error: Option<String> },
    Ready(T),
}

/// A contract binding that becomes available once its asynchronous
/// initialisation succeeds. Failed attempts are retried with backoff in the
/// background. Waiters give up once `timeout`, counted from creation, has
/// passed, but a later `get` still succeeds if initialisation recovers.
#[derive(Clone)]
pub struct ContractHandle<T: Clone> {
    name: &'static str,
    timeout: Duration,
    deadline: Instant,
    state: Arc<watch::Sender<HandleState<T>>>,
}

impl<T> ContractHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, timeout: Duration) -> Self {
        let (state, _) = watch::channel(HandleState::Pending { last_error: None });
        Self {
            name,
            timeout,
            deadline: Instant::now() + timeout,
            state: Arc::new(state),
        }
    }

    /// Handle that is already initialised
    pub fn ready(name: &'static str, value: T) -> Self {
        let handle = Self::new(name, Duration::from_secs(1));
        handle.resolve(value);
        handle
    }

    /// Run `init` in the background until it succeeds and publish the value
    /// to every waiter
    pub fn spawn_init<F, Fut, E>(name: &'static str, timeout: Duration, mut init: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let handle = Self::new(name, timeout);
        let publisher = handle.clone();

        tokio::spawn(async move {
            let mut delay = INITIAL_RETRY_DELAY;
            let mut attempt: u32 = 1;

            loop {
                match init().await {
                    Ok(value) => {
                        tracing::info!(contract = name, attempt, "Contract handle initialised");
                        publisher.resolve(value);
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(
                            contract = name,
                            attempt,
                            retry_in_ms = delay.as_millis() as u64,
                            error = %e,
                            "Contract handle initialisation failed, retrying"
                        );
                        publisher.record_failure(e.to_string());
                    }
                }

                // Every other copy of the handle is gone
                if Arc::strong_count(&publisher.state) == 1 {
                    return;
                }

                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY);
                attempt += 1;
            }
        });

        handle
    }

    pub fn resolve(&self, value: T) {
        self.state.send_replace(HandleState::Ready(value));
    }

    fn record_failure(&self, reason: String) {
        self.state.send_if_modified(|state| match state {
            HandleState::Pending { last_error } => {
                *last_error = Some(reason);
                true
            }
            HandleState::Ready(_) => false,
        });
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), HandleState::Ready(_))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wait for initialisation, failing once the deadline has passed
    pub async fn get(&self) -> Result<T, AppError> {
        let mut rx = self.state.subscribe();

        let waited = tokio::time::timeout_at(
            self.deadline,
            rx.wait_for(|state| matches!(state, HandleState::Ready(_))),
        )
        .await;

        match waited {
            Ok(Ok(state)) => match &*state {
                HandleState::Ready(value) => Ok(value.clone()),
                HandleState::Pending { .. } => Err(AppError::InternalError(format!(
                    "{} contract handle still pending", self.name
                ))),
            },
            Ok(Err(_)) => Err(AppError::InternalError(format!(
                "{} contract handle dropped", self.name
            ))),
            Err(_) => {
                let last_error = match &*self.state.borrow() {
                    HandleState::Pending { last_error: Some(e) } => format!(" (last error: {})", e),
                    _ => String::new(),
                };
                Err(AppError::Timeout(format!(
                    "{} contract not initialised within {}s{}",
                    self.name,
                    self.timeout.as_secs(),
                    last_error
                )))
            }
        }
    }
}
