// core/examples/repository_steps.rs

//! Uses an in-memory repository as the external collaborator: each step inserts
//! a row on the way forward and deletes it when compensated.

use async_trait::async_trait;
use parking_lot::Mutex;
use rewind::{Chain, ChainStep, Envelope, RewindError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Default)]
struct Repository {
  rows: Mutex<HashMap<String, u64>>,
}

impl Repository {
  fn add(&self, key: &str, value: u64) -> bool {
    let mut rows = self.rows.lock();
    if rows.contains_key(key) {
      return false;
    }
    rows.insert(key.to_string(), value);
    true
  }

  fn remove(&self, key: &str) {
    self.rows.lock().remove(key);
  }

  fn len(&self) -> usize {
    self.rows.lock().len()
  }
}

#[derive(Clone, Debug)]
struct License {
  key: String,
  seats: u64,
}

struct InsertStep {
  table: &'static str,
  repo: Arc<Repository>,
}

#[async_trait]
impl ChainStep<License> for InsertStep {
  fn name(&self) -> Option<&str> {
    Some(self.table)
  }

  async fn forward(&self, envelope: Envelope<License>) -> anyhow::Result<Envelope<License>> {
    if self.repo.add(&envelope.value.key, envelope.value.seats) {
      info!(table = self.table, key = %envelope.value.key, "Inserted row");
      Ok(envelope)
    } else {
      let reason = format!("{} already holds {}", self.table, envelope.value.key);
      Ok(envelope.fail(reason))
    }
  }

  async fn reverse(&self, envelope: Envelope<License>) -> anyhow::Result<Envelope<License>> {
    info!(table = self.table, key = %envelope.value.key, "Deleting row");
    self.repo.remove(&envelope.value.key);
    Ok(envelope)
  }
}

#[tokio::main]
async fn main() -> Result<(), RewindError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  let licenses = Arc::new(Repository::default());
  let assignments = Arc::new(Repository::default());
  // A stale assignment makes the second insert fail for "ACME-1".
  assignments.add("ACME-1", 1);

  let mut chain = Chain::named("issue_license");
  chain.append_step(InsertStep {
    table: "licenses",
    repo: Arc::clone(&licenses),
  });
  chain.append_step(InsertStep {
    table: "assignments",
    repo: Arc::clone(&assignments),
  });

  let issued = chain
    .execute(License {
      key: "ACME-2".to_string(),
      seats: 10,
    })
    .await?;
  info!("ACME-2 status: {:?}", issued.status());

  let rejected = chain
    .execute(License {
      key: "ACME-1".to_string(),
      seats: 5,
    })
    .await?;
  info!("ACME-1 status: {:?}, detail: {:?}", rejected.status(), rejected.failure_detail().map(ToString::to_string));

  assert!(issued.is_ok());
  assert!(rejected.is_failed());
  // Only ACME-2 remains in licenses; the ACME-1 insert was compensated.
  assert_eq!(licenses.len(), 1);
  assert_eq!(assignments.len(), 2);

  Ok(())
}
