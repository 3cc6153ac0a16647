//! Stress tests for the sequential scheduler

use parking_lot::Mutex;
use sequential_scheduler::prelude::*;
use std::sync::Arc;
use std::thread;

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_many_small_tasks() {
    let scheduler = SequentialScheduler::new(true).unwrap();
    let counter = Arc::new(Mutex::new(0u64));

    let handles: Vec<_> = (0..100_000)
        .map(|_| {
            let counter = counter.clone();
            scheduler.submit_fn(move || *counter.lock() += 1)
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*counter.lock(), 100_000);
}

#[test]
#[ignore]
fn stress_test_many_producers() {
    let scheduler = SequentialScheduler::new(true).unwrap();
    let log = Arc::new(Mutex::new(Vec::with_capacity(16 * 5_000)));

    let producers: Vec<_> = (0..16)
        .map(|producer| {
            let handle = scheduler.handle();
            let log = log.clone();
            thread::spawn(move || {
                for seq in 0..5_000 {
                    let log = log.clone();
                    handle.spawn(move || log.lock().push((producer, seq)));
                }
                handle.submit_fn(|| ()).join().unwrap();
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    scheduler.submit_fn(|| ()).join().unwrap();

    let log = log.lock();
    assert_eq!(log.len(), 16 * 5_000);

    let mut next = vec![0; 16];
    for &(producer, seq) in log.iter() {
        assert_eq!(next[producer], seq, "producer {} out of order", producer);
        next[producer] += 1;
    }
}

#[test]
#[ignore]
fn stress_test_create_dispose_cycles() {
    for i in 0..200 {
        let scheduler = SequentialScheduler::new(true).unwrap();
        let value = scheduler.submit_fn(move || i * 2).join().unwrap();
        assert_eq!(value, i * 2, "Iteration {}", i);

        scheduler.dispose();
        scheduler.join().unwrap();
    }
}

#[test]
#[ignore]
fn stress_test_dispose_under_load() {
    for _ in 0..50 {
        let scheduler = SequentialScheduler::new(true).unwrap();
        let handle = scheduler.handle();

        let producer = thread::spawn(move || {
            let mut tasks = Vec::new();
            for i in 0..1_000 {
                tasks.push(handle.submit_fn(move || i));
            }
            tasks
        });

        scheduler.dispose();
        scheduler.join().unwrap();
        let tasks = producer.join().unwrap();
        drop(scheduler);

        // every task either ran or was abandoned; nothing hangs
        for task in tasks {
            match task.join() {
                Ok(_) | Err(Error::Abandoned) => {}
                Err(other) => panic!("unexpected: {:?}", other),
            }
        }
    }
}
