mod common;

use common::{confirmer_with, init_tracing};
use payconfirm::application::events::NOTICE_VERIFICATION_TIMEOUT;
use payconfirm::domain::payment::PaymentStatus;
use payconfirm::infrastructure::in_memory::{ScriptedCheck, ScriptedGateway};
use rust_decimal_macros::dec;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_sixty_pending_attempts_end_in_verification_timeout() {
    init_tracing();
    // Empty script: the gateway answers pending forever.
    let (confirmer, gateway) = confirmer_with(ScriptedGateway::with_script("tx-001", vec![]));
    let mut notices = confirmer.notices();
    let mut views = confirmer.views();

    confirmer
        .initialize("inv-1", dec!(1000), "+250788123456")
        .await
        .unwrap();

    let view = views
        .wait_for(|v| v.status.is_terminal())
        .await
        .unwrap()
        .clone();

    assert_eq!(view.status, PaymentStatus::Failed);
    assert_eq!(view.error.as_deref(), Some(NOTICE_VERIFICATION_TIMEOUT));
    assert_eq!(view.attempt_count, 60);
    assert_eq!(gateway.status_calls(), 60);

    // No 61st check, ever.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(gateway.status_calls(), 60);

    // The timeout copy directs to support instead of claiming the charge
    // failed.
    let _info = notices.try_recv().unwrap();
    let timeout = notices.try_recv().unwrap();
    assert_eq!(timeout.message, NOTICE_VERIFICATION_TIMEOUT);
    assert!(timeout.message.contains("contact support"));
    assert!(!timeout.message.starts_with("Payment failed"));
}

#[tokio::test(start_paused = true)]
async fn test_transient_check_errors_keep_polling() {
    init_tracing();
    let (confirmer, gateway) = confirmer_with(ScriptedGateway::with_script(
        "tx-001",
        vec![
            ScriptedCheck::TransportError("connection reset".to_string()),
            ScriptedCheck::TransportError("502 Bad Gateway".to_string()),
            ScriptedCheck::Completed,
        ],
    ));
    let mut views = confirmer.views();

    confirmer
        .initialize("inv-1", dec!(1000), "+250788123456")
        .await
        .unwrap();

    let view = views
        .wait_for(|v| v.status.is_terminal())
        .await
        .unwrap()
        .clone();

    // The two blips were never surfaced, polling just carried on.
    assert_eq!(view.status, PaymentStatus::Completed);
    assert_eq!(view.error, None);
    assert_eq!(view.attempt_count, 3);
    assert_eq!(gateway.status_calls(), 3);
}
