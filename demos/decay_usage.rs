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

use decaysketches::countmin::TimeDecayCountMinSketch;
use decaysketches::decay::ExponentialDecay;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // a day-long half-life, timestamps in seconds
    let decay = ExponentialDecay::with_half_life(24.0 * 60.0 * 60.0).unwrap();
    let sketch = TimeDecayCountMinSketch::with_error_bounds(0.001, 0.99, 9001, decay).unwrap();

    println!(
        "Created sketch with depth={} width={} (eps={}, confidence={})",
        sketch.depth(),
        sketch.width(),
        sketch.relative_error(),
        sketch.confidence()
    );

    println!("\nRecording page views over three days...");
    let hour = 60 * 60;
    for h in 0..72 {
        let timestamp = h * hour;
        // /home is popular early on, /news picks up later
        let home = if h < 24 { 50 } else { 5 };
        let news = if h < 48 { 2 } else { 40 };
        sketch.add("/home", home, timestamp).unwrap();
        sketch.add("/news", news, timestamp).unwrap();
        sketch.add(404, 1, timestamp).unwrap();
    }

    let now = 72 * hour;
    for page in ["/home", "/news"] {
        println!(
            "Decayed views of {page}: {:.2}",
            sketch.estimate_count(page, now).unwrap()
        );
    }
    println!(
        "Decayed count of status 404: {:.2}",
        sketch.estimate_count(404, now).unwrap()
    );
    println!("Raw number of events: {}", sketch.size());

    println!("\nQuerying before the last update fails:");
    match sketch.estimate_count("/home", now - 2 * hour) {
        Ok(estimate) => println!("unexpected estimate {estimate}"),
        Err(err) => println!("{err}"),
    }

    println!("\nDebug: {:?}", sketch);
}
