// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

mod common;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;

use common::ExactDecayCounter;
use decaysketches::countmin::ClockMode;
use decaysketches::countmin::TimeDecayCountMinSketch;
use decaysketches::countmin::TimeDecayFrequency;
use decaysketches::decay::ExponentialDecay;
use decaysketches::decay::NoDecay;
use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::lt;

const NUM_THREADS: i64 = 8;
const ADDS_PER_THREAD: i64 = 20_000;
const NUM_ITEMS: i64 = 16;

fn item_for(thread: i64, i: i64) -> i64 {
    (i * 7 + thread) % NUM_ITEMS
}

fn timestamp_for(i: i64) -> i64 {
    i / 100 * 10
}

#[test]
fn test_concurrent_adds_without_decay_are_exact() {
    for clock_mode in [ClockMode::SharedColumn, ClockMode::PerCell] {
        let sketch = TimeDecayCountMinSketch::builder(NoDecay)
            .error_bounds(0.0001, 0.99)
            .seed(9001)
            .clock_mode(clock_mode)
            .build()
            .unwrap();

        thread::scope(|s| {
            for t in 0..NUM_THREADS {
                let sketch = &sketch;
                s.spawn(move || {
                    for i in 0..ADDS_PER_THREAD {
                        sketch.add(item_for(t, i), 1 + i % 3, timestamp_for(i)).unwrap();
                    }
                });
            }
        });

        let mut expected = vec![0i64; NUM_ITEMS as usize];
        for t in 0..NUM_THREADS {
            for i in 0..ADDS_PER_THREAD {
                expected[item_for(t, i) as usize] += 1 + i % 3;
            }
        }

        let query_time = timestamp_for(ADDS_PER_THREAD);
        assert_eq!(sketch.size(), expected.iter().sum::<i64>() as u64);
        for (item, count) in expected.into_iter().enumerate() {
            // no decay means racing writers can not lose anything
            assert_eq!(
                sketch.estimate_count(item as i64, query_time).unwrap(),
                count as f64,
                "item {item} with {clock_mode:?}"
            );
        }
    }
}

#[test]
fn test_concurrent_adds_track_exact_decayed_counts() {
    let decay = ExponentialDecay::with_half_life(10_000.0).unwrap();
    let sketch = TimeDecayCountMinSketch::with_error_bounds(0.0001, 0.99, 9001, decay).unwrap();
    let exact = ExactDecayCounter::new(decay);

    thread::scope(|s| {
        for t in 0..NUM_THREADS {
            let sketch = &sketch;
            s.spawn(move || {
                for i in 0..ADDS_PER_THREAD {
                    sketch.add(item_for(t, i), 1, timestamp_for(i)).unwrap();
                }
            });
        }
    });
    for t in 0..NUM_THREADS {
        for i in 0..ADDS_PER_THREAD {
            exact.add(item_for(t, i), 1, timestamp_for(i)).unwrap();
        }
    }

    assert_eq!(sketch.size(), exact.size());
    let query_time = timestamp_for(ADDS_PER_THREAD);
    for item in exact.items() {
        let expected = exact.estimate_count(item, query_time).unwrap();
        let estimate = sketch.estimate_count(item, query_time).unwrap();
        let ratio = (estimate - expected).abs() / expected;
        assert_that!(ratio, lt(0.01));
    }
}

#[test]
fn test_readers_run_alongside_writers() {
    let decay = ExponentialDecay::with_half_life(1_000.0).unwrap();
    let sketch = TimeDecayCountMinSketch::with_dimensions(4, 256, 3, decay).unwrap();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        for t in 0..NUM_THREADS {
            let sketch = &sketch;
            s.spawn(move || {
                for i in 0..ADDS_PER_THREAD {
                    sketch.add(item_for(t, i), 1, timestamp_for(i)).unwrap();
                }
            });
        }
        let sketch = &sketch;
        let done = &done;
        s.spawn(move || {
            // far enough ahead of every writer that no clock can pass it
            let query_time = timestamp_for(ADDS_PER_THREAD) + 1;
            while !done.load(Ordering::Acquire) {
                for item in 0..NUM_ITEMS {
                    let estimate = sketch.estimate_count(item, query_time).unwrap();
                    assert_that!(estimate, ge(0.0));
                }
                thread::yield_now();
            }
        });
        // writers are joined when the scope ends; stop the reader once they are done
        while sketch.size() < (NUM_THREADS * ADDS_PER_THREAD) as u64 {
            thread::yield_now();
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(sketch.size(), (NUM_THREADS * ADDS_PER_THREAD) as u64);
}
