use payconfirm::application::confirmer::{ConfirmerConfig, PaymentConfirmer};
use payconfirm::domain::ports::PaymentGatewayArc;
use payconfirm::infrastructure::in_memory::ScriptedGateway;
use std::sync::Arc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn confirmer_with(gateway: ScriptedGateway) -> (PaymentConfirmer, Arc<ScriptedGateway>) {
    let gateway = Arc::new(gateway);
    let confirmer = PaymentConfirmer::new(
        Arc::clone(&gateway) as PaymentGatewayArc,
        ConfirmerConfig::default(),
    );
    (confirmer, gateway)
}
