mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use racevisor::{
    Amb, Observer, ProducerRef, RaceError, Recorder, Signal, SignalKind, SourceFn, Subject, Timed,
};
use support::{Probe, Src, sources};
use tokio_util::sync::CancellationToken;

type Rec = Recorder<u32, String>;

fn recorder() -> Arc<Rec> {
    Arc::new(Rec::new())
}

#[tokio::test(start_paused = true)]
async fn fastest_source_wins_with_its_full_sequence() {
    let slow = Timed::<u32, String>::every("slow", Duration::from_millis(3000), [31, 32, 33])
        .complete(Duration::from_millis(12_000));
    let medium = Timed::<u32, String>::every("medium", Duration::from_millis(2000), [21, 22, 23])
        .complete(Duration::from_millis(8000));
    let fast = Timed::<u32, String>::every("fast", Duration::from_millis(1000), [11, 12, 13])
        .complete(Duration::from_millis(4000));
    let amb = Amb::new([Arc::new(slow) as Src, Arc::new(medium), Arc::new(fast)]).unwrap();

    let rec = recorder();
    let handle = amb.race(rec.clone());
    assert!(rec.await_terminal(Duration::from_secs(60)).await);

    assert_eq!(handle.winner(), Some(2));
    assert_eq!(rec.values(), vec![11, 12, 13]);
    assert_eq!(rec.completions(), 1);
    assert!(rec.errors().is_empty());

    // Losers stay silent even after their own schedules would have fired.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(rec.values(), vec![11, 12, 13]);
    assert_eq!(rec.completions(), 1);
}

#[test]
fn error_wins_and_cancels_everyone_else() {
    let probes = [Probe::new("a"), Probe::new("b"), Probe::new("c")];
    let amb = Amb::new(sources(&probes)).unwrap();
    let rec = recorder();
    let handle = amb.race(rec.clone());

    probes[1].error("boom");
    probes[0].next(1);
    probes[2].complete();

    assert_eq!(handle.winner(), Some(1));
    assert_eq!(rec.errors(), vec!["boom".to_string()]);
    assert!(rec.values().is_empty());
    assert_eq!(rec.completions(), 0);
    assert!(probes[0].is_cancelled());
    assert!(probes[2].is_cancelled());
    assert!(!probes[1].is_cancelled());
}

#[test]
fn empty_source_wins_by_completion() {
    let never = Arc::new(Subject::<u32, String>::named("never"));
    let empty: Src = SourceFn::arc("empty", |observer: support::Obs| {
        observer.on_complete();
        Ok(Box::new(CancellationToken::new()))
    });
    let unreached = Arc::new(Subject::<u32, String>::named("unreached"));
    let amb = Amb::new([never.clone() as Src, empty, unreached.clone()]).unwrap();

    let rec = recorder();
    let handle = amb.race(rec.clone());

    assert_eq!(handle.winner(), Some(1));
    assert!(handle.is_finished());
    assert_eq!(rec.completions(), 1);
    assert!(rec.values().is_empty());
    assert!(!never.has_observers());
    assert_eq!(unreached.observer_count(), 0);
}

#[test]
fn severance_precedes_delivery_for_every_winner() {
    struct Checker {
        probes: Vec<Arc<Probe>>,
        winner: usize,
        delivered: AtomicUsize,
        severed_first: AtomicBool,
    }

    impl Checker {
        fn check(&self) {
            if self.delivered.fetch_add(1, Ordering::SeqCst) == 0 {
                let others_cancelled = self
                    .probes
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != self.winner)
                    .all(|(_, p)| p.is_cancelled());
                self.severed_first.store(others_cancelled, Ordering::SeqCst);
            }
        }
    }

    impl Observer<u32, String> for Checker {
        fn on_next(&self, _value: u32) {
            self.check();
        }
        fn on_error(&self, _error: String) {
            self.check();
        }
        fn on_complete(&self) {
            self.check();
        }
    }

    for n in 2..=9 {
        for winner in 0..n {
            for kind in [SignalKind::Next, SignalKind::Error, SignalKind::Complete] {
                let probes: Vec<_> = (0..n).map(|i| Probe::new(&format!("p{i}"))).collect();
                let amb = Amb::new(sources(&probes)).unwrap();
                let checker = Arc::new(Checker {
                    probes: probes.clone(),
                    winner,
                    delivered: AtomicUsize::new(0),
                    severed_first: AtomicBool::new(false),
                });
                let handle = amb.race(checker.clone());
                assert!(probes.iter().all(|p| p.is_subscribed()));

                match kind {
                    SignalKind::Next => probes[winner].next(7),
                    SignalKind::Error => probes[winner].error("e"),
                    SignalKind::Complete => probes[winner].complete(),
                }

                assert_eq!(handle.winner(), Some(winner), "n={n} winner={winner} {kind:?}");
                assert!(
                    checker.severed_first.load(Ordering::SeqCst),
                    "n={n} winner={winner} {kind:?}: a loser was still attached"
                );
                assert!(!probes[winner].is_cancelled());

                for (i, p) in probes.iter().enumerate().filter(|(i, _)| *i != winner) {
                    assert_eq!(p.cancels.load(Ordering::SeqCst), 1, "probe {i}");
                    p.next(1);
                    p.complete();
                }
                assert_eq!(checker.delivered.load(Ordering::SeqCst), 1);
            }
        }
    }
}

#[test]
fn every_source_is_subscribed_once_per_race() {
    let probes = [Probe::hot("a"), Probe::hot("b"), Probe::hot("c")];
    let amb = Amb::new(sources(&probes)).unwrap();

    amb.race(recorder());
    assert!(probes.iter().all(|p| p.subscriptions.load(Ordering::SeqCst) == 1));

    amb.race(recorder());
    assert!(probes.iter().all(|p| p.subscriptions.load(Ordering::SeqCst) == 2));
}

#[test]
fn synchronous_winner_stops_subscription_of_later_sources() {
    let sync: Src = SourceFn::arc("sync", |observer: support::Obs| {
        observer.on_next(1);
        observer.on_complete();
        Ok(Box::new(CancellationToken::new()))
    });
    let later = Probe::new("later");
    let amb = Amb::new([sync, later.src()]).unwrap();

    let rec = recorder();
    let handle = amb.race(rec.clone());

    assert_eq!(handle.winner(), Some(0));
    assert_eq!(rec.values(), vec![1]);
    assert_eq!(rec.completions(), 1);
    assert!(!later.is_subscribed());
}

#[test]
fn blocking_subscribe_delays_the_next_source() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let slow_log = log.clone();
    let slow: Src = SourceFn::arc("slow-subscribe", move |_observer: support::Obs| {
        slow_log.lock().push("slow:start");
        thread::sleep(Duration::from_millis(50));
        slow_log.lock().push("slow:end");
        Ok(Box::new(CancellationToken::new()))
    });
    let next_log = log.clone();
    let next: Src = SourceFn::arc("next", move |observer: support::Obs| {
        next_log.lock().push("next");
        observer.on_next(2);
        Ok(Box::new(CancellationToken::new()))
    });
    let amb = Amb::new([slow, next]).unwrap();

    let rec = recorder();
    let handle = amb.race(rec.clone());

    assert_eq!(*log.lock(), vec!["slow:start", "slow:end", "next"]);
    assert_eq!(handle.winner(), Some(1));
    assert_eq!(rec.values(), vec![2]);
}

#[test]
fn one_definition_runs_independent_races() {
    let a = Arc::new(Subject::<u32, String>::named("a"));
    let b = Arc::new(Subject::<u32, String>::named("b"));
    let amb = Amb::new([a.clone() as Src, b.clone()]).unwrap();

    let first = recorder();
    let first_handle = amb.race(first.clone());
    a.next(1);

    let second = recorder();
    let second_handle = amb.race(second.clone());
    b.next(2);
    a.next(3);

    assert_ne!(first_handle.race_id(), second_handle.race_id());
    assert_eq!(first_handle.winner(), Some(0));
    assert_eq!(second_handle.winner(), Some(1));
    assert_eq!(first.values(), vec![1, 3]);
    assert_eq!(second.values(), vec![2]);
    // `a` still feeds the first race only.
    assert_eq!(a.observer_count(), 1);
    assert_eq!(b.observer_count(), 1);
}

#[test]
fn concurrent_emitters_produce_a_single_winner() {
    const N: usize = 8;

    for _ in 0..100 {
        let subjects: Vec<_> = (0..N)
            .map(|i| Arc::new(Subject::<u32, String>::named(format!("s{i}"))))
            .collect();
        let amb = Amb::new(subjects.iter().map(|s| s.clone() as Src)).unwrap();
        let rec = recorder();
        let handle = amb.race(rec.clone());

        let barrier = Arc::new(Barrier::new(N));
        let workers: Vec<_> = subjects
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let s = s.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    s.next(i as u32);
                    s.next(i as u32 + 100);
                    s.complete();
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        let winner = handle.winner().expect("some source must win");
        assert_eq!(rec.values(), vec![winner as u32, winner as u32 + 100]);
        assert_eq!(rec.completions(), 1);
    }
}

#[test]
fn cancel_before_decision_severs_everyone() {
    let probes = [Probe::new("a"), Probe::new("b")];
    let amb = Amb::new(sources(&probes)).unwrap();
    let rec = Arc::new(Rec::with_demand(0u64));
    let handle = amb.race(rec.clone());

    handle.cancel();
    handle.cancel();

    assert!(handle.is_cancelled());
    assert_eq!(handle.winner(), None);
    for p in &probes {
        assert_eq!(p.cancels.load(Ordering::SeqCst), 1);
        assert!(p.producer.cancelled.load(Ordering::SeqCst));
    }

    probes[0].next(1);
    probes[1].complete();
    handle.request(10u64);

    assert!(rec.values().is_empty());
    assert_eq!(rec.completions(), 0);
    assert_eq!(probes[0].requested(), 0);
}

#[test]
fn cancel_after_decision_severs_the_winner_once() {
    let probes = [Probe::new("a"), Probe::new("b")];
    let amb = Amb::new(sources(&probes)).unwrap();
    let rec = recorder();
    let handle = amb.race(rec.clone());

    probes[0].next(1);
    handle.cancel();
    rec.cancel();
    handle.cancel();

    assert!(handle.is_cancelled());
    assert_eq!(handle.winner(), Some(0));
    assert_eq!(probes[0].cancels.load(Ordering::SeqCst), 1);
    assert_eq!(probes[1].cancels.load(Ordering::SeqCst), 1);

    probes[0].next(2);
    probes[0].complete();
    assert_eq!(rec.values(), vec![1]);
    assert_eq!(rec.completions(), 0);
}

#[test]
fn subscribe_failure_is_the_first_signal() {
    let failing: Src = SourceFn::arc("failing", |_observer: support::Obs| {
        Err("unreachable host".to_string())
    });
    let later = Probe::new("later");
    let amb = Amb::new([failing, later.src()]).unwrap();

    let rec = recorder();
    let handle = amb.race(rec.clone());

    assert_eq!(handle.winner(), Some(0));
    assert_eq!(rec.errors(), vec!["unreachable host".to_string()]);
    assert!(!later.is_subscribed());
}

#[test]
fn late_producer_of_a_loser_is_cancelled_unused() {
    let probes = [Probe::hot("a"), Probe::hot("b")];
    let amb = Amb::new(sources(&probes)).unwrap();
    let rec = recorder();
    let _handle = amb.race(rec.clone());

    probes[1].next(5);
    probes[0].attach_producer_late();

    assert!(probes[0].producer.cancelled.load(Ordering::SeqCst));
    assert_eq!(probes[0].producer.requests.load(Ordering::SeqCst), 0);
}

#[test]
fn late_producer_of_the_winner_gets_pending_demand() {
    let probes = [Probe::hot("a"), Probe::hot("b")];
    let amb = Amb::new(sources(&probes)).unwrap();
    let rec = Arc::new(Rec::with_demand(4u64));
    let handle = amb.race(rec.clone());

    probes[0].next(1);
    probes[0].attach_producer_late();
    handle.request(2u64);

    assert_eq!(probes[0].requested(), 6);
    assert_eq!(probes[0].producer.requests.load(Ordering::SeqCst), 2);
}

#[test]
fn signals_after_terminal_are_dropped() {
    let probe = Probe::new("only");
    let amb = Amb::new([probe.src()]).unwrap();
    let mut events = amb.bus().subscribe();
    let rec = recorder();
    let _handle = amb.race(rec.clone());

    probe.next(1);
    probe.complete();
    probe.complete();
    probe.error("late");
    probe.next(2);

    assert_eq!(rec.values(), vec![1]);
    assert_eq!(rec.completions(), 1);
    assert!(rec.errors().is_empty());

    let mut violations = 0;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == racevisor::EventKind::ProtocolViolation {
            violations += 1;
        }
    }
    assert_eq!(violations, 3);
}

#[test]
fn single_source_is_mirrored() {
    let only = Arc::new(Subject::<u32, String>::named("only"));
    let amb = Amb::new([only.clone() as Src]).unwrap();
    let rec = recorder();
    let handle = amb.race(rec.clone());

    only.next(1);
    only.next(2);
    only.error("done".into());

    assert_eq!(handle.winner(), Some(0));
    assert_eq!(rec.values(), vec![1, 2]);
    assert_eq!(rec.errors(), vec!["done".to_string()]);
}

#[test]
fn empty_source_list_is_rejected() {
    let res = Amb::<u32, String>::new(Vec::new());
    assert_eq!(res.err(), Some(RaceError::NoSources));
}

#[test]
fn downstream_receives_handle_before_subscription() {
    struct Eager {
        saw_producer_first: AtomicBool,
        probe: Arc<Probe>,
        values: Mutex<Vec<Signal<u32, String>>>,
    }

    impl Observer<u32, String> for Eager {
        fn on_producer(&self, producer: ProducerRef) {
            self.saw_producer_first
                .store(!self.probe.is_subscribed(), Ordering::SeqCst);
            producer.request(racevisor::Demand::new(3));
        }
        fn on_next(&self, value: u32) {
            self.values.lock().push(Signal::Next(value));
        }
        fn on_error(&self, error: String) {
            self.values.lock().push(Signal::Error(error));
        }
        fn on_complete(&self) {
            self.values.lock().push(Signal::Complete);
        }
    }

    let probe = Probe::new("p");
    let amb = Amb::new([probe.src()]).unwrap();
    let eager = Arc::new(Eager {
        saw_producer_first: AtomicBool::new(false),
        probe: probe.clone(),
        values: Mutex::new(Vec::new()),
    });
    amb.race(eager.clone());

    assert!(eager.saw_producer_first.load(Ordering::SeqCst));
    assert_eq!(probe.requested(), 3);
    probe.next(9);
    assert_eq!(*eager.values.lock(), vec![Signal::Next(9)]);
}

#[test]
fn finished_race_releases_its_downstream() {
    let a = Arc::new(Subject::<u32, String>::named("a"));
    let b = Arc::new(Subject::<u32, String>::named("b"));
    let amb = Amb::new([a.clone() as Src, b.clone()]).unwrap();
    let rec = recorder();
    let handle = amb.race(rec.clone());

    a.next(1);
    a.complete();
    assert_eq!(rec.values(), vec![1]);
    assert_eq!(rec.completions(), 1);

    let weak = Arc::downgrade(&rec);
    drop((handle, rec));
    assert!(weak.upgrade().is_none());
}

#[test]
fn cancelled_race_releases_its_downstream() {
    let a = Arc::new(Subject::<u32, String>::named("a"));
    let b = Arc::new(Subject::<u32, String>::named("b"));
    let amb = Amb::new([a.clone() as Src, b.clone()]).unwrap();

    let undecided = recorder();
    amb.race(undecided.clone());
    undecided.cancel();

    let decided = recorder();
    amb.race(decided.clone());
    b.next(5);
    decided.cancel();

    assert!(!a.has_observers());
    assert!(!b.has_observers());

    let weak = [Arc::downgrade(&undecided), Arc::downgrade(&decided)];
    drop((undecided, decided));
    assert!(weak.iter().all(|w| w.upgrade().is_none()));
}
