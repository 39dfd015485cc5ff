use crossbeam_channel::{unbounded, Receiver, Sender};

/// Notifications emitted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    /// Every factory, descriptor and cached instance of `epoch` has been
    /// destroyed. The next accessor call starts a new discovery.
    PluginsReloaded { epoch: u64 },
}

pub type Observer = Box<dyn FnMut(&RegistryEvent) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Explicitly registered callbacks, invoked in subscription order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(candidate, _)| *candidate != id);
        self.observers.len() != before
    }

    pub(crate) fn emit(&mut self, event: &RegistryEvent) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

/// Handle an external collaborator (a settings dialog, a CLI) uses to ask
/// the registry for a reload. Requests are served by
/// [`PluginManager::process_reload_requests`](crate::PluginManager::process_reload_requests).
#[derive(Debug, Clone)]
pub struct ReloadRequester {
    sender: Sender<()>,
}

impl ReloadRequester {
    /// Queue a reload. Returns `false` when the registry is gone.
    pub fn request(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

pub(crate) fn reload_channel() -> (ReloadRequester, Receiver<()>) {
    let (sender, receiver) = unbounded();
    (ReloadRequester { sender }, receiver)
}
