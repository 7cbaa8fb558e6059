#[async_trait::async_trait]
pub trait ProgressSender<P: Send>: Sync + Send {
    /// It can technically return error but we will ignore them.
    async fn update(&self, data: P);
}

#[async_trait::async_trait]
impl<P: Send> ProgressSender<P> for tokio::sync::mpsc::Sender<P> {
    async fn update(&self, data: P) {
        let _ = self.send(data).await;
    }
}

#[async_trait::async_trait]
impl<P: Send> ProgressSender<P> for tokio::sync::mpsc::UnboundedSender<P> {
    async fn update(&self, data: P) {
        let _ = self.send(data);
    }
}

#[async_trait::async_trait]
impl<P: Send> ProgressSender<P> for std::sync::mpsc::Sender<P> {
    async fn update(&self, data: P) {
        let _ = self.send(data);
    }
}

/// Sender that drops everything.
pub struct NoProgress;

#[async_trait::async_trait]
impl<P: Send + 'static> ProgressSender<P> for NoProgress {
    async fn update(&self, _data: P) {}
}

/// Adapts a plain callback into a [`ProgressSender`].
pub struct CallbackSender<F>(pub F);

#[async_trait::async_trait]
impl<P, F> ProgressSender<P> for CallbackSender<F>
where
    P: Send + 'static,
    F: Fn(P) + Send + Sync,
{
    async fn update(&self, data: P) {
        (self.0)(data);
    }
}
