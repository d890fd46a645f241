//! Load generator publishing a numbered order at a fixed interval.

use order_gateway_core::{OrderError, PublishEvent, Sidecar};
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;

/// Produces `{"orderId": n}` events with `n` counting up from 1.
#[derive(Debug, Clone)]
pub struct OrderProducer {
    template: PublishEvent,
    last_order_id: u64,
}

impl OrderProducer {
    /// Create a producer publishing `event_name` to `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NoTargets`] if `targets` is empty.
    pub fn new(event_name: impl Into<String>, targets: Vec<String>) -> Result<Self, OrderError> {
        Ok(Self {
            template: PublishEvent::new(event_name, Value::Null, targets)?,
            last_order_id: 0,
        })
    }

    /// Next event in the sequence.
    pub fn next_event(&mut self) -> PublishEvent {
        self.last_order_id += 1;

        PublishEvent {
            data: json!({ "orderId": self.last_order_id }),
            ..self.template.clone()
        }
    }

    /// Publish one event per `period` until `shutdown` completes.
    ///
    /// The first event goes out immediately. A failed publish is logged and
    /// its order id is not reused. Returns the number of successful publishes.
    pub async fn run<S, F>(&mut self, sidecar: &S, period: Duration, shutdown: F) -> u64
    where
        S: Sidecar + ?Sized,
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(period);
        let mut published = 0;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!(published, "Producer stopping");
                    return published;
                }
                _ = ticker.tick() => {
                    let event = self.next_event();
                    match sidecar.publish(&event).await {
                        Ok(()) => {
                            published += 1;
                            tracing::info!(order_id = self.last_order_id, "Published order");
                        }
                        Err(e) => {
                            tracing::warn!(order_id = self.last_order_id, error = %e, "Failed to publish order");
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use order_gateway_core::SidecarError;
    use order_gateway_testing::RecordingSidecar;

    fn producer() -> OrderProducer {
        OrderProducer::new("neworder", vec!["neworder".to_string()]).unwrap()
    }

    #[test]
    fn test_events_count_up_from_one() {
        let mut producer = producer();

        let first = producer.next_event();
        let second = producer.next_event();

        assert_eq!(first.event_name, "neworder");
        assert_eq!(first.to, vec!["neworder".to_string()]);
        assert_eq!(first.data, json!({ "orderId": 1 }));
        assert_eq!(second.data, json!({ "orderId": 2 }));
    }

    #[test]
    fn test_requires_targets() {
        assert_eq!(
            OrderProducer::new("neworder", vec![]).unwrap_err(),
            OrderError::NoTargets
        );
    }

    #[tokio::test]
    async fn test_run_keeps_going_after_failed_publish() {
        let sidecar = RecordingSidecar::new();
        sidecar.fail_next(SidecarError::Unreachable("connection refused".into()));
        let mut producer = producer();

        let watched = sidecar.clone();
        let published = producer
            .run(&sidecar, Duration::from_millis(1), async move {
                while watched.published().len() < 3 {
                    tokio::task::yield_now().await;
                }
            })
            .await;

        let attempts = sidecar.published();
        assert!(attempts.len() >= 3);
        assert_eq!(attempts[0].data, json!({ "orderId": 1 }));
        assert_eq!(attempts[1].data, json!({ "orderId": 2 }));
        assert_eq!(published, u64::try_from(attempts.len()).unwrap() - 1);
    }
}
