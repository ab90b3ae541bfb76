//! Single-flight status toggles with bounded retry.
//!
//! ```text
//! Idle ──toggle──▶ Toggling(id, 1) ──ok──▶ Idle (bound list reloads)
//!                     │
//!                     ├─transient error, attempts left──▶ Toggling(id, n+1)
//!                     └─terminal error / attempts spent──▶ Failed(id, reason)
//! ```
//!
//! At most one toggle is in flight per coordinator. A request arriving while
//! another row is toggling is rejected, not queued. The coordinator never
//! updates rows optimistically: it waits for the server, then reloads the
//! whole list.

use std::marker::PhantomData;
use std::sync::Arc;

use backoffice_core::api::{ResourceApi, ToggleApi};
use backoffice_core::entities::{Resource, ToggleAction};
use backoffice_core::types::DbId;
use tokio::sync::RwLock;

use crate::list::{Reload, ResourceListController};
use crate::retry::{next_delay, ToggleRetryConfig};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Decides whether a resource may be toggled at all.
pub trait TogglePolicy<R>: Send + Sync {
    fn can_toggle(&self, resource: &R, action: ToggleAction) -> bool;
}

/// Forbids system-protected resources and actions the entity lacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtectedResourcePolicy;

impl<R: Resource> TogglePolicy<R> for ProtectedResourcePolicy {
    fn can_toggle(&self, resource: &R, action: ToggleAction) -> bool {
        !resource.is_protected() && R::supported_toggles().contains(&action)
    }
}

impl<R, F> TogglePolicy<R> for F
where
    F: Fn(&R, ToggleAction) -> bool + Send + Sync,
{
    fn can_toggle(&self, resource: &R, action: ToggleAction) -> bool {
        self(resource, action)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TogglePhase {
    #[default]
    Idle,
    Toggling {
        resource_id: DbId,
        action: ToggleAction,
        attempt: u32,
    },
    Failed {
        resource_id: DbId,
        action: ToggleAction,
        reason: String,
    },
}

/// What the view reads to render toggle indicators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToggleState {
    pub phase: TogglePhase,
    pub error: Option<String>,
    /// Retries spent on the current or most recent toggle.
    pub retry_count: u32,
}

impl ToggleState {
    pub fn is_toggling(&self) -> bool {
        matches!(self.phase, TogglePhase::Toggling { .. })
    }

    pub fn toggling_resource_id(&self) -> Option<DbId> {
        match self.phase {
            TogglePhase::Toggling { resource_id, .. } => Some(resource_id),
            _ => None,
        }
    }

    /// Whether `id`'s row should show the in-progress indicator.
    pub fn is_row_toggling(&self, id: DbId) -> bool {
        self.toggling_resource_id() == Some(id)
    }
}

/// Why a toggle request was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRejection {
    /// The policy forbids toggling this resource.
    Forbidden,
    /// Another toggle is in flight.
    Busy { resource_id: DbId },
    /// `retry_failed` was called with no failed toggle to retry.
    NothingToRetry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Succeeded { attempts: u32 },
    Failed { attempts: u32, reason: String },
    Rejected(ToggleRejection),
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Serialises status toggles for one list screen.
pub struct StatusToggleCoordinator<R> {
    api: Arc<dyn ToggleApi>,
    list: Arc<dyn Reload>,
    policy: Box<dyn TogglePolicy<R>>,
    config: ToggleRetryConfig,
    state: RwLock<ToggleState>,
    _resource: PhantomData<fn(&R)>,
}

impl<R: Resource> StatusToggleCoordinator<R> {
    /// Coordinator calling `api` and reloading `list` after each success.
    pub fn new(api: Arc<dyn ToggleApi>, list: Arc<dyn Reload>, config: ToggleRetryConfig) -> Self {
        Self {
            api,
            list,
            policy: Box::new(ProtectedResourcePolicy),
            config,
            state: RwLock::new(ToggleState::default()),
            _resource: PhantomData,
        }
    }

    /// Coordinator bound to a list controller whose API also toggles.
    pub fn for_list<A>(list: &Arc<ResourceListController<A>>, config: ToggleRetryConfig) -> Self
    where
        A: ResourceApi<Resource = R> + ToggleApi + 'static,
    {
        let api: Arc<dyn ToggleApi> = list.api();
        let reload: Arc<dyn Reload> = Arc::clone(list) as Arc<dyn Reload>;
        Self::new(api, reload, config)
    }

    /// Replace the default [`ProtectedResourcePolicy`].
    pub fn with_policy(mut self, policy: impl TogglePolicy<R> + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub async fn state(&self) -> ToggleState {
        self.state.read().await.clone()
    }

    pub async fn is_row_toggling(&self, id: DbId) -> bool {
        self.state.read().await.is_row_toggling(id)
    }

    /// Policy check. Views use this to disable the switch up front.
    pub fn can_toggle(&self, resource: &R, action: ToggleAction) -> bool {
        self.policy.can_toggle(resource, action)
    }

    /// Flip `action` on `resource`, retrying transient failures.
    ///
    /// No-op (returns [`ToggleOutcome::Rejected`]) when the policy forbids
    /// it or another toggle is already in flight.
    pub async fn toggle(&self, resource: &R, action: ToggleAction) -> ToggleOutcome {
        let id = resource.id();
        if !self.can_toggle(resource, action) {
            tracing::debug!(resource = R::KIND, resource_id = id, %action, "Toggle forbidden by policy");
            return ToggleOutcome::Rejected(ToggleRejection::Forbidden);
        }

        {
            let mut state = self.state.write().await;
            if let Some(busy) = state.toggling_resource_id() {
                tracing::debug!(
                    resource = R::KIND,
                    resource_id = id,
                    busy_with = busy,
                    "Toggle rejected, another toggle is in flight",
                );
                return ToggleOutcome::Rejected(ToggleRejection::Busy { resource_id: busy });
            }
            Self::begin(&mut state, id, action);
        }

        self.run(id, action).await
    }

    /// Re-run the last failed toggle (the view's retry affordance).
    pub async fn retry_failed(&self) -> ToggleOutcome {
        let (id, action) = {
            let mut state = self.state.write().await;
            let TogglePhase::Failed {
                resource_id,
                action,
                ..
            } = state.phase
            else {
                return ToggleOutcome::Rejected(ToggleRejection::NothingToRetry);
            };
            Self::begin(&mut state, resource_id, action);
            (resource_id, action)
        };
        self.run(id, action).await
    }

    /// Dismiss a failure and return to idle.
    pub async fn clear_error(&self) {
        let mut state = self.state.write().await;
        if matches!(state.phase, TogglePhase::Failed { .. }) {
            *state = ToggleState::default();
        }
    }

    fn begin(state: &mut ToggleState, resource_id: DbId, action: ToggleAction) {
        *state = ToggleState {
            phase: TogglePhase::Toggling {
                resource_id,
                action,
                attempt: 1,
            },
            error: None,
            retry_count: 0,
        };
    }

    async fn run(&self, id: DbId, action: ToggleAction) -> ToggleOutcome {
        let mut attempt = 1u32;
        let mut delay = self.config.initial_delay;

        loop {
            if self.config.log_attempts {
                tracing::info!(resource = R::KIND, resource_id = id, %action, attempt, "Toggling");
            }

            let err = match self.api.toggle(id, action).await {
                Ok(()) => {
                    {
                        let mut state = self.state.write().await;
                        state.phase = TogglePhase::Idle;
                        state.error = None;
                        state.retry_count = attempt - 1;
                    }
                    tracing::info!(resource = R::KIND, resource_id = id, %action, attempt, "Toggle succeeded");
                    self.list.reload().await;
                    return ToggleOutcome::Succeeded { attempts: attempt };
                }
                Err(e) => e,
            };

            if !(err.is_transient() && self.config.allows_retry_after(attempt)) {
                let reason = err.user_message();
                {
                    let mut state = self.state.write().await;
                    state.phase = TogglePhase::Failed {
                        resource_id: id,
                        action,
                        reason: reason.clone(),
                    };
                    state.error = Some(reason.clone());
                    state.retry_count = attempt - 1;
                }
                tracing::warn!(
                    resource = R::KIND,
                    resource_id = id,
                    %action,
                    attempts = attempt,
                    error = %err,
                    "Toggle failed",
                );
                return ToggleOutcome::Failed {
                    attempts: attempt,
                    reason,
                };
            }

            if self.config.log_attempts {
                tracing::warn!(
                    resource = R::KIND,
                    resource_id = id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Toggle attempt {attempt} failed, retrying",
                );
            }
            tokio::time::sleep(delay).await;
            delay = next_delay(delay, &self.config);
            attempt += 1;

            let mut state = self.state.write().await;
            state.phase = TogglePhase::Toggling {
                resource_id: id,
                action,
                attempt,
            };
            state.retry_count = attempt - 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
