use std::sync::{
    Arc,
    mpsc::{self, Receiver},
};

use log::{debug, info};

use crate::{
    identity::{IdentityProvider, Principal, Subscription},
    navigation::{Navigator, Route},
};

/// Decide where a user must be sent given their session and current location.
///
/// Returns `None` when the pair is already valid: no session outside the
/// unauthenticated area and a session inside it are the only redirects.
pub fn guard_decision(session: Option<&Principal>, location: &Route) -> Option<Route> {
    match (session, location.is_unauthenticated_area()) {
        (None, false) => Some(Route::DEFAULT_UNAUTHENTICATED),
        (Some(_), true) => Some(Route::DEFAULT_AUTHENTICATED),
        _ => None,
    }
}

/// Keeps the navigator consistent with the session reported by the identity provider.
///
/// The guard holds one subscription, made for the location it was last evaluated
/// at. When the location changes the subscription is released and a new one is
/// made, which delivers the current session right away, so every navigation is
/// checked. Notifications are queued on a channel and applied in [`SessionGuard::poll`]
/// on the UI thread.
pub struct SessionGuard {
    provider: Arc<dyn IdentityProvider>,
    location: Route,
    subscription: Option<Subscription>,
    session_rx: Receiver<Option<Principal>>,
    // None until the first notification arrives
    session: Option<Option<Principal>>,
}

impl SessionGuard {
    pub fn mount(provider: Arc<dyn IdentityProvider>, location: &Route) -> Self {
        let (_, session_rx) = mpsc::channel();
        let mut guard = Self {
            provider,
            location: location.clone(),
            subscription: None,
            session_rx,
            session: None,
        };
        guard.subscribe();
        guard
    }

    fn subscribe(&mut self) {
        // release the old subscription before making the new one
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }

        let (session_tx, session_rx) = mpsc::channel();
        self.session_rx = session_rx;
        self.subscription = Some(self.provider.on_session_changed(Box::new(
            move |session: Option<&Principal>| {
                let _ = session_tx.send(session.cloned());
            },
        )));
    }

    /// Apply queued session notifications to the navigator.
    ///
    /// Each notification causes at most one `replace`. Returns the number of
    /// navigations performed.
    pub fn poll(&mut self, navigator: &mut Navigator) -> usize {
        if navigator.current() != &self.location {
            debug!(
                "guard: location changed {} -> {}, resubscribing",
                self.location,
                navigator.current()
            );
            self.location = navigator.current().clone();
            self.subscribe();
        }

        let mut navigations = 0;
        while let Ok(session) = self.session_rx.try_recv() {
            let decision = guard_decision(session.as_ref(), &self.location);
            self.session = Some(session);

            if let Some(target) = decision {
                info!("guard: redirecting {} -> {}", self.location, target);
                navigator.replace(target);
                navigations += 1;
                self.location = navigator.current().clone();
                self.subscribe();
            }
        }
        navigations
    }

    /// The last session seen, or `None` when no session exists or none was reported yet.
    pub fn session(&self) -> Option<&Principal> {
        self.session.as_ref().and_then(|session| session.as_ref())
    }

    /// Whether at least one notification has been received.
    pub fn is_session_known(&self) -> bool {
        self.session.is_some()
    }

    pub fn location(&self) -> &Route {
        &self.location
    }
}
