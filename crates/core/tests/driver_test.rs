//! Driver loop behavior: ordering, once-per-cycle dispatch, additive sleep,
//! and fatal lifecycle failures.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use menagerie_core::{
    Animal, BehaviorConfig, Driver, Error, Habitat, LifeError, LifeResult, Probes, Registry,
    Sampling,
};

type Journal = Arc<Mutex<Vec<(&'static str, Instant)>>>;

/// Records each lifecycle call, optionally taking some time about it.
struct Recorder {
    name: &'static str,
    journal: Journal,
    work: Duration,
}

impl Animal for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn eat(&self, _habitat: &Habitat) -> LifeResult {
        Ok(())
    }

    fn drink(&self, _habitat: &Habitat) -> LifeResult {
        Ok(())
    }

    fn excrete_solid(&self, _habitat: &Habitat) -> LifeResult {
        Ok(())
    }

    fn excrete_liquid(&self, _habitat: &Habitat) -> LifeResult {
        Ok(())
    }

    fn live(&self, _habitat: &Habitat) -> LifeResult {
        self.journal.lock().unwrap().push((self.name, Instant::now()));
        if !self.work.is_zero() {
            thread::sleep(self.work);
        }
        Ok(())
    }
}

/// Fails every lifecycle.
struct Sickly;

impl Animal for Sickly {
    fn name(&self) -> &'static str {
        "sickly"
    }

    fn eat(&self, _habitat: &Habitat) -> LifeResult {
        Err(LifeError::Disconnected)
    }

    fn drink(&self, _habitat: &Habitat) -> LifeResult {
        Ok(())
    }

    fn excrete_solid(&self, _habitat: &Habitat) -> LifeResult {
        Ok(())
    }

    fn excrete_liquid(&self, _habitat: &Habitat) -> LifeResult {
        Ok(())
    }
}

const NAMES: [&str; 5] = ["ant", "bee", "cow", "doe", "elk"];

fn recorders(journal: &Journal, work: Duration) -> Registry {
    Registry::new(
        NAMES
            .iter()
            .map(|&name| {
                Box::new(Recorder {
                    name,
                    journal: Arc::clone(journal),
                    work,
                }) as Box<dyn Animal>
            })
            .collect(),
    )
}

fn driver(registry: Registry, tick: Duration) -> Driver {
    let probes = Arc::new(Probes::for_registry(&registry, Sampling::record_all()));
    Driver::new(registry, Habitat::new(probes, BehaviorConfig::quiet()), tick)
}

#[test]
fn test_each_cycle_visits_every_animal_once_in_order() {
    let journal = Journal::default();
    let driver = driver(recorders(&journal, Duration::ZERO), Duration::from_millis(1));

    driver.run_cycles(3).unwrap();

    let visited: Vec<_> = journal.lock().unwrap().iter().map(|(n, _)| *n).collect();
    let expected: Vec<_> = NAMES.iter().copied().cycle().take(15).collect();
    assert_eq!(visited, expected);
    assert_eq!(driver.habitat().probes().cycles(), 3);
}

#[test]
fn test_lives_are_counted_per_animal() {
    let journal = Journal::default();
    let driver = driver(recorders(&journal, Duration::ZERO), Duration::from_millis(1));

    driver.run_cycles(4).unwrap();

    let snapshot = driver.habitat().probes().snapshot();
    assert_eq!(snapshot.entities.len(), NAMES.len());
    assert!(snapshot.entities.iter().all(|e| e.lives == 4));
    assert_eq!(snapshot.unattributed.lives, 0);
}

#[test]
fn test_sleep_is_added_after_the_work() {
    let journal = Journal::default();
    let work = Duration::from_millis(10);
    let tick = Duration::from_millis(40);
    let driver = driver(recorders(&journal, work), tick);

    driver.run_cycles(3).unwrap();

    let starts: Vec<Instant> = journal
        .lock()
        .unwrap()
        .iter()
        .filter(|(name, _)| *name == NAMES[0])
        .map(|(_, at)| *at)
        .collect();
    assert_eq!(starts.len(), 3);

    // Five animals at 10ms each, then the 40ms tick.
    let minimum_gap = work * 5 + tick;
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= minimum_gap);
    }
}

#[test]
fn test_failure_stops_the_cycle_and_names_the_animal() {
    let journal = Journal::default();
    let registry = Registry::new(vec![
        Box::new(Recorder {
            name: "before",
            journal: Arc::clone(&journal),
            work: Duration::ZERO,
        }),
        Box::new(Sickly),
        Box::new(Recorder {
            name: "after",
            journal: Arc::clone(&journal),
            work: Duration::ZERO,
        }),
    ]);
    let driver = driver(registry, Duration::from_millis(1));

    let err = driver.run_cycles(2).unwrap_err();

    assert!(matches!(
        err,
        Error::Life {
            animal: "sickly",
            source: LifeError::Disconnected
        }
    ));
    let visited: Vec<_> = journal.lock().unwrap().iter().map(|(n, _)| *n).collect();
    assert_eq!(visited, ["before"]);
    assert_eq!(driver.habitat().probes().cycles(), 0);
}

#[test]
fn test_run_returns_only_on_failure() {
    let driver = driver(Registry::new(vec![Box::new(Sickly)]), Duration::from_millis(1));
    let result = driver.run();
    assert!(matches!(result, Err(Error::Life { animal: "sickly", .. })));
}

#[test]
fn test_unbounded_run_keeps_pace_with_the_tick() {
    let journal = Journal::default();
    let tick = Duration::from_millis(100);
    let driver = driver(recorders(&journal, Duration::ZERO), tick);
    let probes = Arc::clone(driver.habitat().probes());

    thread::spawn(move || driver.run());
    thread::sleep(tick * 3);

    let snapshot = probes.snapshot();
    let lives: Vec<u64> = snapshot.entities.iter().map(|e| e.lives).collect();
    let (min, max) = (
        *lives.iter().min().unwrap(),
        *lives.iter().max().unwrap(),
    );
    // Three ticks in: cycles at 0, 100 and 200ms, maybe a fourth at the edge.
    assert!((2..=4).contains(&min), "lives: {lives:?}");
    assert!(max - min <= 1, "lives: {lives:?}");
}
