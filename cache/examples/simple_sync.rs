use fibre_ttl::{Lookup, ManualClock, TimeDelta, TtlCacheBuilder, Utc};
use std::thread;
use std::time::Duration;

fn main() {
  let clock = ManualClock::new(Utc::now());
  let (cache, janitor) = TtlCacheBuilder::<String, String>::new()
    .clock(clock.clone())
    .cleanup_interval(Duration::from_millis(50))
    .build()
    .expect("failed to build cache");

  cache.set("session:42".into(), "alice".into(), TimeDelta::seconds(30));
  println!("fresh: {:?}", cache.get("session:42"));

  clock.advance(TimeDelta::seconds(31));
  match cache.lookup("session:42") {
    Lookup::Expired(stale) => println!("expired, last value was {stale:?}"),
    other => println!("unexpected: {other:?}"),
  }

  thread::sleep(Duration::from_millis(150));
  println!("after sweep: len = {}", cache.len());
  println!("{:#?}", cache.metrics());

  janitor.join();
}
