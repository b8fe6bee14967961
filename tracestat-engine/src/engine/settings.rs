use tracestat_analysis::TrackerSettings;
use tracestat_config::TracestatConfig;

/// Tracker parameters taken from a loaded configuration.
pub fn tracker_settings(config: &TracestatConfig) -> TrackerSettings {
    TrackerSettings {
        epoch_duration_ns: config.tracker.epoch_duration_ns,
        progress_interval: config.tracker.progress_interval,
        flow_capacity: config.flow_table.capacity,
        flow_ttl_ns: config.flow_table.ttl_ns,
        expiration: config.flow_table.expiration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestat_core::FlowExpiration;

    #[test]
    fn settings_follow_config() {
        let mut config = TracestatConfig::default();
        config.flow_table.capacity = 128;
        config.flow_table.expiration = FlowExpiration::Activity;
        config.tracker.epoch_duration_ns = 500;

        let settings = tracker_settings(&config);
        assert_eq!(settings.flow_capacity, 128);
        assert_eq!(settings.expiration, FlowExpiration::Activity);
        assert_eq!(settings.epoch_duration_ns, 500);
        assert_eq!(settings.flow_ttl_ns, config.flow_table.ttl_ns);
    }
}
