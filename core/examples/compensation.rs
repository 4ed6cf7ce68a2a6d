// core/examples/compensation.rs

use rewind::{Chain, Envelope, RewindError};
use tracing::{error, info, warn};

#[derive(Clone, Debug, Default)]
struct Booking {
  flight: Option<String>,
  hotel: Option<String>,
  car: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum BookingError {
  #[error("Car rental service unavailable")]
  CarServiceDown,
}

#[tokio::main]
async fn main() -> Result<(), RewindError> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
    .init();

  info!("--- Compensation Example ---");

  let mut chain = Chain::<Booking>::named("trip");

  chain.append_named(
    "book_flight",
    |mut envelope: Envelope<Booking>| async move {
      info!("Booking flight");
      envelope.value.flight = Some("LH-400".to_string());
      Ok::<_, BookingError>(envelope)
    },
    |mut envelope: Envelope<Booking>| async move {
      warn!("Cancelling flight {:?}", envelope.value.flight);
      envelope.value.flight = None;
      Ok::<_, BookingError>(envelope)
    },
  );

  chain.append_named(
    "book_hotel",
    |mut envelope: Envelope<Booking>| async move {
      info!("Booking hotel");
      envelope.value.hotel = Some("Harbour View".to_string());
      Ok::<_, BookingError>(envelope)
    },
    |mut envelope: Envelope<Booking>| async move {
      warn!("Cancelling hotel {:?}", envelope.value.hotel);
      envelope.value.hotel = None;
      Ok::<_, BookingError>(envelope)
    },
  );

  // This step raises an error; the chain absorbs it and unwinds hotel, then flight.
  chain.append_named(
    "rent_car",
    |_envelope: Envelope<Booking>| async move { Err::<Envelope<Booking>, _>(BookingError::CarServiceDown) },
    |envelope: Envelope<Booking>| async move { Ok::<_, BookingError>(envelope) },
  );

  let (result, trace) = chain.execute_traced(Booking::default()).await;
  let envelope = result?;

  if envelope.is_failed() {
    if let Some(detail) = envelope.failure_detail() {
      error!("Trip booking failed: {}", detail);
    }
  }
  info!("Forward steps: {:?}", trace.forward_steps());
  info!("Compensated steps: {:?}", trace.compensated_steps());
  info!("Final booking: {:?}", envelope.value);

  assert_eq!(trace.compensated_steps(), vec!["book_hotel", "book_flight"]);
  assert!(envelope.value.flight.is_none() && envelope.value.hotel.is_none() && envelope.value.car.is_none());
  assert_eq!(envelope.completed_count(), 2);

  Ok(())
}
