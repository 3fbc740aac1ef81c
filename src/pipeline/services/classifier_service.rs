use crate::error::{BoxError, PipelineError};
use crate::pipeline::inference::Classifier;
use crate::pipeline::types::FeatureWindow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::timeout::TimeoutLayer;
use tower::util::BoxCloneSyncService;
use tower::{Service, ServiceBuilder, ServiceExt};

/// Adapts a [`Classifier`] to a tower service over window snapshots.
#[derive(Clone)]
pub struct ClassifierService {
    inner: Arc<dyn Classifier>,
}

impl ClassifierService {
    pub fn new(inner: Arc<dyn Classifier>) -> Self {
        Self { inner }
    }
}

impl Service<FeatureWindow> for ClassifierService {
    type Response = Vec<f32>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, window: FeatureWindow) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move { inner.predict(&window).await })
    }
}

/// The composed classification stage.
///
/// Each call runs on its own clone of the service stack, so concurrent
/// classifications never wait on one another.
pub struct ClassifierStage {
    service: BoxCloneSyncService<FeatureWindow, Vec<f32>, BoxError>,
}

impl ClassifierStage {
    pub fn new(classifier: Arc<dyn Classifier>, timeout: Option<Duration>) -> Self {
        let service = ServiceBuilder::new()
            .option_layer(timeout.map(TimeoutLayer::new))
            .service(ClassifierService::new(classifier));
        Self {
            service: BoxCloneSyncService::new(service),
        }
    }

    pub async fn classify(&self, window: FeatureWindow) -> Result<Vec<f32>, PipelineError> {
        self.service
            .clone()
            .oneshot(window)
            .await
            .map_err(PipelineError::Classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubClassifier;
    use crate::pipeline::types::FeatureVector;

    fn window() -> FeatureWindow {
        FeatureWindow::new(vec![FeatureVector::zeros(2); 3])
    }

    #[tokio::test]
    async fn forwards_classifier_output() {
        let classifier = Arc::new(StubClassifier::fixed(vec![0.9, 0.1]));
        let stage = ClassifierStage::new(classifier.clone(), None);
        let probabilities = stage.classify(window()).await.unwrap();
        assert_eq!(probabilities, vec![0.9, 0.1]);
        assert_eq!(classifier.calls(), 1);
    }

    #[tokio::test]
    async fn slow_classifier_times_out() {
        let classifier = StubClassifier::fixed(vec![0.9, 0.1]).with_delay(Duration::from_millis(500));
        let stage = ClassifierStage::new(Arc::new(classifier), Some(Duration::from_millis(20)));
        let result = stage.classify(window()).await;
        assert!(matches!(
            result,
            Err(PipelineError::Classifier(e)) if e.is::<tower::timeout::error::Elapsed>()
        ));
    }

    #[tokio::test]
    async fn classifier_failure_is_surfaced() {
        let stage = ClassifierStage::new(Arc::new(StubClassifier::failing("model crashed")), None);
        let result = stage.classify(window()).await;
        assert!(matches!(result, Err(PipelineError::Classifier(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_classifications_overlap() {
        let classifier = Arc::new(
            StubClassifier::fixed(vec![0.9, 0.1]).with_delay(Duration::from_millis(200)),
        );
        let stage = Arc::new(ClassifierStage::new(classifier.clone(), None));

        let started = std::time::Instant::now();
        let calls = (0..4).map(|_| {
            let stage = stage.clone();
            tokio::spawn(async move { stage.classify(window()).await })
        });
        for result in futures::future::join_all(calls).await {
            assert_eq!(result.unwrap().unwrap(), vec![0.9, 0.1]);
        }
        assert_eq!(classifier.calls(), 4);
        assert!(started.elapsed() < Duration::from_millis(700));
    }
}
