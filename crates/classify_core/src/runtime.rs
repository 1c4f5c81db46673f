use crate::client::Classifier;
use crate::flow::{Effect, Flow, Msg, init, transition};
use crate::render::{ElementMap, View, render};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread;

/// Owns the flow and runs its effects. Lives on the UI thread; classify calls run on
/// worker threads and report back through the channel.
pub struct FlowRuntime {
    flow: Flow,
    sender: Sender<Msg>,
    receiver: Receiver<Msg>,
    classifier: Arc<dyn Classifier + Send + Sync>,
    elements: ElementMap,
    decimals: usize,
}

impl FlowRuntime {
    pub fn new(
        classifier: Arc<dyn Classifier + Send + Sync>,
        elements: ElementMap,
        decimals: usize,
    ) -> Self {
        let (sender, receiver) = channel();
        let (flow, effects) = init();
        let runtime = Self {
            flow,
            sender,
            receiver,
            classifier,
            elements,
            decimals,
        };
        runtime.spawn_effects(effects);
        runtime
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Handle for code outside the UI thread that wants to feed messages in.
    pub fn sender(&self) -> Sender<Msg> {
        self.sender.clone()
    }

    /// Swap the classifier and number formatting. The flow (queued file, UI state,
    /// pending request) is kept; a response already in flight still lands.
    pub fn reconfigure(&mut self, classifier: Arc<dyn Classifier + Send + Sync>, decimals: usize) {
        self.classifier = classifier;
        self.decimals = decimals;
    }

    pub fn dispatch(&mut self, msg: Msg) {
        tracing::debug!("event: {}", msg.to_display_string());
        let (flow, effects) = transition(std::mem::take(&mut self.flow), msg);
        self.flow = flow;
        if !effects.is_empty() {
            tracing::debug!(
                "effects: {:?}",
                effects.iter().map(Effect::to_display_string).collect::<Vec<_>>()
            );
        }
        self.spawn_effects(effects);
    }

    /// Apply every message that has arrived so far. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(msg) => {
                    self.dispatch(msg);
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return handled,
            }
        }
    }

    /// Block until the next message arrives and apply it. `false` if the channel closed.
    pub fn pump_blocking(&mut self) -> bool {
        match self.receiver.recv() {
            Ok(msg) => {
                self.dispatch(msg);
                true
            }
            Err(_) => false,
        }
    }

    pub fn view(&self) -> View {
        render(&self.flow.ui, &self.elements, self.decimals)
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::ProcessQueue => match self.flow.queue.current() {
                // the drop surface "finishes" immediately; payload is already encoded
                Some(file) => self.send(Msg::UploadComplete(file.clone())),
                None => tracing::debug!("process requested with an empty queue"),
            },
            Effect::PostClassify { token, image_data } => {
                let classifier = Arc::clone(&self.classifier);
                let sender = self.sender.clone();
                thread::spawn(move || {
                    let response = classifier.classify(&image_data);
                    if sender
                        .send(Msg::ClassificationResponse { token, response })
                        .is_err()
                    {
                        tracing::debug!("runtime gone before response {token} arrived");
                    }
                });
            }
        }
    }

    fn send(&self, msg: Msg) {
        if let Err(e) = self.sender.send(msg) {
            tracing::warn!("could not queue message: {e}");
        }
    }
}
