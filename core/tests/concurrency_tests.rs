// tests/concurrency_tests.rs
mod common;

use common::*;
use rewind::{Chain, Envelope, RewindError, Status};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_steps_never_overlap_within_one_execution() {
  setup_tracing();
  let in_flight = Arc::new(AtomicUsize::new(0));
  let max_seen = Arc::new(AtomicUsize::new(0));

  let mut chain = Chain::<u32>::new();
  for delay_ms in [15u64, 5, 10] {
    let in_flight = Arc::clone(&in_flight);
    let max_seen = Arc::clone(&max_seen);
    chain.append(
      move |envelope: Envelope<u32>| {
        let in_flight = Arc::clone(&in_flight);
        let max_seen = Arc::clone(&max_seen);
        async move {
          let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
          max_seen.fetch_max(now, Ordering::SeqCst);
          tokio::time::sleep(Duration::from_millis(delay_ms)).await;
          in_flight.fetch_sub(1, Ordering::SeqCst);
          Ok::<_, anyhow::Error>(envelope.map(|v| v + 1))
        }
      },
      |envelope: Envelope<u32>| async move { Ok::<_, anyhow::Error>(envelope) },
    );
  }

  let envelope = chain.execute(0).await.unwrap();
  assert_eq!(envelope.value, 3);
  assert_eq!(max_seen.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_chain_executes_concurrently_with_isolated_state() {
  setup_tracing();
  let mut chain = Chain::<i64>::named("shared");
  chain.append_named(
    "double",
    |envelope: Envelope<i64>| async move {
      tokio::time::sleep(Duration::from_millis(5)).await;
      Ok::<_, anyhow::Error>(envelope.map(|v| v * 2))
    },
    |envelope: Envelope<i64>| async move { Ok::<_, anyhow::Error>(envelope.map(|v| v / 2)) },
  );
  chain.append_named(
    "reject_odd_input",
    |envelope: Envelope<i64>| async move {
      tokio::time::sleep(Duration::from_millis(5)).await;
      // Doubled values are even, so inspect the original parity through value / 2.
      if (envelope.value / 2) % 2 != 0 {
        return Ok::<_, anyhow::Error>(envelope.fail("odd input"));
      }
      Ok(envelope)
    },
    |envelope: Envelope<i64>| async move { Ok::<_, anyhow::Error>(envelope) },
  );
  let chain = Arc::new(chain);

  let handles: Vec<_> = (0..16i64)
    .map(|input| {
      let chain = Arc::clone(&chain);
      tokio::spawn(async move { (input, chain.execute(input).await) })
    })
    .collect();

  for handle in handles {
    let (input, result) = handle.await.unwrap();
    let envelope = result.unwrap();
    if input % 2 == 0 {
      assert_eq!(envelope.status(), Status::Ok, "input {}", input);
      assert_eq!(envelope.value, input * 2);
      assert_eq!(envelope.completed_count(), 2);
    } else {
      assert_eq!(envelope.status(), Status::Failed, "input {}", input);
      assert_eq!(envelope.value, input);
      assert_eq!(envelope.completed_count(), 1);
    }
  }
}

#[tokio::test]
async fn test_timeout_wrapped_step_fails_through_normal_compensation() {
  setup_tracing();
  let log = CallLog::new();
  let mut chain = Chain::new();
  append_ok_step(&mut chain, &log, "reserve", 1);

  let slow_log = log.clone();
  chain.append_named(
    "slow_call",
    move |envelope: Envelope<Ledger>| {
      let log = slow_log.clone();
      async move {
        log.push("slow_call:fwd".to_string());
        let call = tokio::time::sleep(Duration::from_secs(5));
        match tokio::time::timeout(Duration::from_millis(10), call).await {
          Ok(()) => Ok(envelope),
          Err(elapsed) => Ok::<_, anyhow::Error>(envelope.fail_with(elapsed)),
        }
      }
    },
    |envelope: Envelope<Ledger>| async move { Ok::<_, anyhow::Error>(envelope) },
  );

  let envelope = chain.execute(Ledger::default()).await.unwrap();

  assert_eq!(envelope.status(), Status::Failed);
  assert!(matches!(envelope.failure_detail(), Some(RewindError::StepError { .. })));
  assert_eq!(log.entries(), vec!["reserve:fwd", "slow_call:fwd", "reserve:rev"]);
  assert_eq!(envelope.value.total, 0);
}
