// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Adapter between the processor's sink interface and the DogStatsD client.

use dogstatsd_client::StatsdClient;
use garbagedog_core::MetricSink;

pub struct DogStatsdSink {
    client: StatsdClient,
}

impl DogStatsdSink {
    pub fn new(client: StatsdClient) -> Self {
        Self { client }
    }
}

impl MetricSink for DogStatsdSink {
    fn timing(&self, metric: &str, seconds: f64, tags: &[String]) {
        self.client.timing(metric, seconds, tags);
    }

    fn histogram(&self, metric: &str, value: f64, tags: &[String]) {
        self.client.histogram(metric, value, tags);
    }
}
