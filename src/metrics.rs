#[derive(Clone)]
pub struct Metrics {
    pub registry: prometheus::Registry,
    sections: prometheus::IntCounterVec,
    pub last_total_rap: prometheus::Gauge,
    pub last_collectible_count: prometheus::Gauge,
    pub last_lookup: prometheus::Gauge,
    pub relayed: prometheus::IntCounterVec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Profile,
    Collectibles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Empty,
    Error,
}

impl From<Section> for &'static str {
    fn from(value: Section) -> Self {
        match value {
            Section::Profile => "profile",
            Section::Collectibles => "collectibles",
        }
    }
}

impl From<Outcome> for &'static str {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Ok => "ok",
            Outcome::Empty => "empty",
            Outcome::Error => "error",
        }
    }
}

impl Metrics {
    pub fn new(registry: prometheus::Registry) -> Result<Self, prometheus::Error> {
        let sections = prometheus::IntCounterVec::new(
            prometheus::Opts::new("lookup_sections", "The number of page sections loaded"),
            &["section", "outcome"],
        )?;
        registry.register(Box::new(sections.clone()))?;

        let last_total_rap = prometheus::Gauge::new(
            "last_total_rap",
            "The Total RAP of the most recently loaded inventory",
        )?;
        registry.register(Box::new(last_total_rap.clone()))?;

        let last_collectible_count = prometheus::Gauge::new(
            "last_collectible_count",
            "The number of collectibles in the most recently loaded inventory",
        )?;
        registry.register(Box::new(last_collectible_count.clone()))?;

        let last_lookup =
            prometheus::Gauge::new("last_lookup", "The Unix Timestamp of the last lookup")?;
        registry.register(Box::new(last_lookup.clone()))?;

        let relayed = prometheus::IntCounterVec::new(
            prometheus::Opts::new("relayed_requests", "The number of requests through the relay"),
            &["outcome"],
        )?;
        registry.register(Box::new(relayed.clone()))?;

        Ok(Self {
            registry,
            sections,
            last_total_rap,
            last_collectible_count,
            last_lookup,
            relayed,
        })
    }

    pub fn record(&self, section: Section, outcome: Outcome) {
        let labels: [&str; 2] = [section.into(), outcome.into()];
        self.sections.with_label_values(&labels).inc();
    }

    pub fn touch(&self) {
        if let Ok(unix_timestamp) =
            std::time::SystemTime::now().duration_since(std::time::SystemTime::UNIX_EPOCH)
        {
            self.last_lookup.set(unix_timestamp.as_secs() as f64);
        }
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = prometheus::TextEncoder::new();
        encoder.encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_sections() {
        let metrics = Metrics::new(prometheus::Registry::new()).unwrap();

        metrics.record(Section::Profile, Outcome::Ok);
        metrics.record(Section::Collectibles, Outcome::Error);
        metrics.record(Section::Collectibles, Outcome::Error);
        metrics.last_total_rap.set(3250.0);

        assert_eq!(
            metrics
                .sections
                .with_label_values(&["profile", "ok"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .sections
                .with_label_values(&["collectibles", "error"])
                .get(),
            2
        );

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("lookup_sections"));
        assert!(encoded.contains("last_total_rap 3250"));
    }
}
