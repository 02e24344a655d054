//! Ready-made [`Notifier`] and [`Confirmation`] implementations

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::traits::{ConfirmPrompt, Confirmation, Notice, NoticeKind, Notifier};

/// Sends every notice to the logs. Useful for headless binaries
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => log::warn!("{}: {}", notice.title, notice.message),
            NoticeKind::Success | NoticeKind::Info => log::info!("{}: {}", notice.title, notice.message),
        }
    }
}


/// Keeps every notice it is given, so that tests can check what the user would have seen
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    pub fn last(&self) -> Option<Notice> {
        lock(&self.notices).last().cloned()
    }

    pub fn clear(&self) {
        lock(&self.notices).clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        log::debug!("Notice: {:?}", notice);
        lock(&self.notices).push(notice);
    }
}


/// Answers every confirmation dialog the same way, and remembers what was asked
#[derive(Debug)]
pub struct ScriptedConfirmation {
    answer: bool,
    prompts: Mutex<Vec<ConfirmPrompt>>,
}

impl ScriptedConfirmation {
    /// A user that always taps "confirm"
    pub fn accepting() -> Self {
        Self { answer: true, prompts: Mutex::new(Vec::new()) }
    }

    /// A user that always taps "cancel"
    pub fn refusing() -> Self {
        Self { answer: false, prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<ConfirmPrompt> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl Confirmation for ScriptedConfirmation {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        lock(&self.prompts).push(prompt.clone());
        self.answer
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
