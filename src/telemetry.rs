use opentelemetry::global;
use opentelemetry_sdk::metrics::MeterProvider;
use tracing::info;

use crate::error::TelemetryError;
use crate::metrics::Metrics;

pub struct TelemetryConfig {
    pub enable_metrics: bool,
}

pub struct TelemetryService {
    provider: Option<MeterProvider>,
}

impl TelemetryService {
    pub fn new(config: TelemetryConfig) -> Self {
        let provider = config.enable_metrics.then(|| {
            let provider = MeterProvider::builder().build();
            global::set_meter_provider(provider.clone());
            provider
        });

        Self { provider }
    }

    pub fn metrics_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush and stop the meter provider, if one was installed.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        if let Some(provider) = &self.provider {
            provider
                .shutdown()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        }
        Ok(())
    }
}

pub fn init_telemetry(enable_metrics: bool) -> TelemetryService {
    let service = TelemetryService::new(TelemetryConfig { enable_metrics });

    if service.metrics_enabled() {
        Metrics::init();
        info!("OpenTelemetry metrics initialized");
    } else {
        info!("Metrics collection disabled");
    }

    service
}
