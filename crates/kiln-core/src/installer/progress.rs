use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use parking_lot::Mutex;

use crate::downloads::{progress::ProgressSender, traits::DownloadResult};

use super::InstallState;

/// One step of an installation as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub state: InstallState,
    pub message: String,
    /// Overall completion in `[0, 1]`, never decreasing within one run.
    pub fraction: Option<f32>,
}

/// Forwards [`ProgressEvent`]s while keeping the reported fraction monotonic.
pub struct StageProgress {
    sender: Arc<dyn ProgressSender<ProgressEvent>>,
    last: Mutex<f32>,
}

impl StageProgress {
    pub fn new(sender: Arc<dyn ProgressSender<ProgressEvent>>) -> Self {
        Self {
            sender,
            last: Mutex::new(0.0),
        }
    }

    pub fn last(&self) -> f32 {
        *self.last.lock()
    }

    pub async fn report(&self, state: InstallState, message: impl Into<String>, fraction: Option<f32>) {
        let fraction = fraction.map(|value| {
            let mut last = self.last.lock();
            *last = last.max(value.clamp(0.0, 1.0));
            *last
        });

        self.sender
            .update(ProgressEvent {
                state,
                message: message.into(),
                fraction,
            })
            .await;
    }
}

/// Turns finished downloads into progress inside `range` of the overall run.
pub(crate) struct TaskProgress<'a> {
    progress: &'a StageProgress,
    state: InstallState,
    range: (f32, f32),
    total: usize,
    done: AtomicUsize,
    results: Option<Mutex<Vec<DownloadResult>>>,
}

impl<'a> TaskProgress<'a> {
    pub fn new(progress: &'a StageProgress, state: InstallState, range: (f32, f32), total: usize) -> Self {
        Self {
            progress,
            state,
            range,
            total,
            done: AtomicUsize::new(0),
            results: Some(Mutex::new(Vec::new())),
        }
    }

    /// Only reports progress and drops the results.
    #[must_use]
    pub fn counting_only(mut self) -> Self {
        self.results = None;
        self
    }

    pub fn into_results(self) -> Vec<DownloadResult> {
        self.results.map(|results| results.into_inner()).unwrap_or_default()
    }

    fn fraction(&self, done: usize) -> f32 {
        let (start, end) = self.range;
        if self.total == 0 {
            return end;
        }

        #[allow(clippy::cast_precision_loss)]
        let ratio = done.min(self.total) as f32 / self.total as f32;
        start + (end - start) * ratio
    }
}

#[async_trait::async_trait]
impl ProgressSender<DownloadResult> for TaskProgress<'_> {
    async fn update(&self, data: DownloadResult) {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        let message = format!("{} {}", data.kind.as_str(), data.name);

        self.progress.report(self.state, message, Some(self.fraction(done))).await;

        if let Some(results) = &self.results {
            results.lock().push(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::downloads::progress::CallbackSender;

    use super::*;

    #[tokio::test]
    async fn fraction_never_decreases() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sender = CallbackSender({
            let seen = seen.clone();
            move |event: ProgressEvent| seen.lock().push(event.fraction)
        });
        let progress = StageProgress::new(Arc::new(sender));

        progress.report(InstallState::PlanningVanilla, "a", Some(0.3)).await;
        progress.report(InstallState::DownloadingVanilla, "b", Some(0.1)).await;
        progress.report(InstallState::DownloadingVanilla, "c", None).await;
        progress.report(InstallState::Ready, "d", Some(7.0)).await;

        assert_eq!(*seen.lock(), [Some(0.3), Some(0.3), None, Some(1.0)]);
    }
}
