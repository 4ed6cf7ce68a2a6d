// core/examples/basic_chain.rs

use rewind::{Chain, Envelope, RewindError, Status};
use tracing::info;

// 1. Define the payload the steps will transform
#[derive(Clone, Debug, Default)]
struct BasicPayload {
  message_log: Vec<String>,
  counter: i32,
}

#[tokio::main]
async fn main() -> Result<(), RewindError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Chain Example ---");

  // 2. Create a chain and append steps in execution order.
  //    Each step has a forward operation and its inverse.
  let mut chain = Chain::<BasicPayload>::named("basic");

  chain.append_named(
    "step_alpha",
    |mut envelope: Envelope<BasicPayload>| async move {
      envelope.value.counter += 1;
      let msg = format!("Alpha executed: counter = {}", envelope.value.counter);
      info!("{}", msg);
      envelope.value.message_log.push(msg);
      Ok::<_, anyhow::Error>(envelope)
    },
    |mut envelope: Envelope<BasicPayload>| async move {
      envelope.value.counter -= 1;
      Ok::<_, anyhow::Error>(envelope)
    },
  );

  chain.append_named(
    "step_beta",
    |mut envelope: Envelope<BasicPayload>| async move {
      envelope.value.counter *= 2;
      let msg = format!("Beta executed: counter = {}", envelope.value.counter);
      info!("{}", msg);
      envelope.value.message_log.push(msg);
      Ok::<_, anyhow::Error>(envelope)
    },
    |mut envelope: Envelope<BasicPayload>| async move {
      envelope.value.counter /= 2;
      Ok::<_, anyhow::Error>(envelope)
    },
  );

  chain.append_named(
    "step_gamma",
    |mut envelope: Envelope<BasicPayload>| async move {
      envelope.value.counter -= 1;
      let msg = format!("Gamma executed: counter = {}", envelope.value.counter);
      info!("{}", msg);
      envelope.value.message_log.push(msg);
      Ok::<_, anyhow::Error>(envelope.with_message("all steps done"))
    },
    |mut envelope: Envelope<BasicPayload>| async move {
      envelope.value.counter += 1;
      Ok::<_, anyhow::Error>(envelope)
    },
  );

  // 3. Execute and inspect the status
  let envelope = chain.execute(BasicPayload::default()).await?;

  info!("Chain finished with status {:?}", envelope.status());
  info!("Completed steps: {}", envelope.completed_count());
  info!("Final counter: {}", envelope.value.counter);
  info!("Message: {:?}", envelope.message);

  assert_eq!(envelope.status(), Status::Ok);
  assert_eq!(envelope.value.counter, 1); // (0 + 1) * 2 - 1
  assert_eq!(envelope.value.message_log.len(), 3);

  Ok(())
}
