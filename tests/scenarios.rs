//! Scenario coverage for the scheduler's priority, round-robin, and
//! wait/signal semantics. Every test drives the process-wide scheduler
//! singleton, so each is `#[serial]`-guarded — `cargo test`'s default
//! runner would otherwise interleave `init`/`end` cycles across threads
//! against one global instance.

use std::sync::{Arc, Mutex};

use serial_test::serial;

fn trace_handle() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn push(trace: &Arc<Mutex<Vec<String>>>, label: &str) {
    trace.lock().unwrap().push(label.to_string());
}

#[test]
#[serial]
fn strict_priority_preemption_runs_child_to_completion_first() {
    rrsched::init(2, 1).unwrap();

    let trace = trace_handle();
    let t = Arc::clone(&trace);
    rrsched::fork(
        move |_priority| {
            push(&t, "H1:start");
            push(&t, "H1:end");
        },
        rrsched::MAX_PRIO,
    )
    .unwrap();

    // `fork` only returns to main once H1 has fully run: a priority-5
    // child immediately preempts a priority-0 parent.
    push(&trace, "main:resume");

    assert_eq!(
        *trace.lock().unwrap(),
        vec!["H1:start", "H1:end", "main:resume"]
    );

    rrsched::end();
}

#[test]
#[serial]
fn lower_priority_fork_does_not_preempt_until_completion() {
    rrsched::init(2, 1).unwrap();

    let trace = trace_handle();
    let t1 = Arc::clone(&trace);
    rrsched::fork(
        move |_priority| {
            push(&t1, "H1");
            let t2 = Arc::clone(&t1);
            // H1 forks a *lower*-priority child; it must not preempt H1.
            rrsched::fork(
                move |_priority| {
                    push(&t2, "H2");
                },
                1,
            )
            .unwrap();
            // H1 keeps running to completion without ever yielding.
        },
        3,
    )
    .unwrap();

    assert_eq!(*trace.lock().unwrap(), vec!["H1", "H2"]);

    rrsched::end();
}

#[test]
#[serial]
fn wait_then_signal_resumes_waiters_in_fifo_order() {
    // A generous quantum keeps round-robin preemption from interleaving
    // with the FIFO property under test.
    rrsched::init(100, 1).unwrap();

    let trace = trace_handle();

    let ta = Arc::clone(&trace);
    rrsched::fork(
        move |_priority| {
            let tb = Arc::clone(&ta);
            rrsched::fork(
                move |_priority| {
                    let tc = Arc::clone(&tb);
                    rrsched::fork(
                        move |_priority| {
                            rrsched::wait(0).unwrap();
                            push(&tc, "C-resumed");
                        },
                        2,
                    )
                    .unwrap();
                    rrsched::wait(0).unwrap();
                    push(&tb, "B-resumed");
                },
                2,
            )
            .unwrap();
            rrsched::wait(0).unwrap();
            push(&ta, "A-resumed");
        },
        2,
    )
    .unwrap();

    // All three tasks (A, B, then C) are now parked on event 0, having
    // waited in that order.
    let woken = rrsched::signal(0).unwrap();
    assert_eq!(woken, 3);

    assert_eq!(
        *trace.lock().unwrap(),
        vec!["A-resumed", "B-resumed", "C-resumed"]
    );

    rrsched::end();
}

#[test]
#[serial]
fn signal_of_empty_event_wakes_nobody() {
    rrsched::init(5, 1).unwrap();
    assert_eq!(rrsched::signal(0).unwrap(), 0);
    rrsched::end();
}

#[test]
#[serial]
fn round_robin_alternates_at_quantum_boundaries() {
    rrsched::init(2, 1).unwrap();

    let trace = trace_handle();
    let t1 = Arc::clone(&trace);
    rrsched::fork(
        move |_priority| {
            let t2 = Arc::clone(&t1);
            rrsched::fork(
                move |_priority| {
                    for _ in 0..3 {
                        push(&t2, "H2");
                        rrsched::exec();
                    }
                },
                2,
            )
            .unwrap();
            for _ in 0..3 {
                push(&t1, "H1");
                rrsched::exec();
            }
        },
        2,
    )
    .unwrap();

    let recorded = trace.lock().unwrap().clone();
    assert_eq!(recorded.iter().filter(|l| l.as_str() == "H1").count(), 3);
    assert_eq!(recorded.iter().filter(|l| l.as_str() == "H2").count(), 3);

    // Quantum = 2 bounds how long either peer can run uninterrupted:
    // no label should repeat three times in a row.
    for window in recorded.windows(3) {
        assert!(
            !(window[0] == window[1] && window[1] == window[2]),
            "quantum boundary was not enforced: {recorded:?}"
        );
    }

    rrsched::end();
}

#[test]
#[serial]
fn invalid_arguments_are_rejected() {
    assert!(rrsched::init(0, 0).is_err());

    rrsched::init(2, 1).unwrap();
    assert!(matches!(
        rrsched::fork(|_| {}, rrsched::MAX_PRIO + 1),
        Err(rrsched::SchedError::InvalidPriority { priority }) if priority == rrsched::MAX_PRIO + 1
    ));
    assert!(matches!(
        rrsched::wait(1),
        Err(rrsched::SchedError::InvalidEvent { .. })
    ));
    assert!(matches!(
        rrsched::signal(1),
        Err(rrsched::SchedError::InvalidEvent { .. })
    ));
    rrsched::end();
}

#[test]
#[serial]
fn fork_before_init_fails() {
    assert!(matches!(
        rrsched::fork(|_| {}, 0),
        Err(rrsched::SchedError::NotInitialized)
    ));
}

#[test]
#[serial]
fn end_is_idempotent_when_not_initialized() {
    rrsched::end();
    rrsched::end();
}

#[test]
#[serial]
fn quantum_exhaustion_with_no_candidate_does_not_underflow() {
    // Regression test: a lone runnable task exhausting its quantum with
    // an empty ready queue used to underflow `remaining_quantum` on the
    // following `exec`, panicking and poisoning the global mutex.
    rrsched::init(1, 0).unwrap();
    rrsched::exec();
    rrsched::exec();
    rrsched::exec();
    rrsched::end();
}

#[test]
#[serial]
fn wait_with_no_other_runnable_task_is_rejected() {
    // Regression test: `wait` used to `.expect()` a ready candidate and
    // panic (poisoning the global mutex) when the caller was the only
    // runnable task. It must now fail gracefully instead.
    rrsched::init(2, 1).unwrap();
    assert!(matches!(
        rrsched::wait(0),
        Err(rrsched::SchedError::NoRunnableTask)
    ));
    rrsched::end();
}

#[test]
#[serial]
fn double_init_is_rejected() {
    rrsched::init(1, 0).unwrap();
    assert!(matches!(
        rrsched::init(1, 0),
        Err(rrsched::SchedError::AlreadyInitialized)
    ));
    rrsched::end();
}
