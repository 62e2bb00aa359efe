//! # Takeover Tests
//!
//! Merchant takeover and release, and how they gate AI replies.

use super::*;
use lib_core::model::{ControlMode, TakeoverCommand};
use lib_core::AppError;
use shared::SessionRef;

fn session_ref(session_id: &str) -> SessionRef {
    SessionRef { session_id: session_id.to_string() }
}

#[tokio::test]
async fn test_took_over_session_gets_no_ai_until_release() {
    // Arrange
    let responder = ScriptedResponder::new("Yes, we have 3 left.");
    let (gateway, _pool) = test_gateway(responder.clone()).await;
    let (mut customer, session) = join_customer(&gateway, "m1", None).await;
    let mut merchant = join_merchant(&gateway, "m1").await;
    customer.drain();

    // Act: takeover, then the customer asks
    let transition = gateway
        .apply_takeover(merchant.conn, session_ref(&session.id), TakeoverCommand::Takeover)
        .await
        .unwrap();
    let outcome = gateway
        .send_message(customer.conn, message(&session.id, "Is this in stock?", SenderType::Customer))
        .await
        .unwrap();

    // Assert
    assert_eq!(transition.to, ControlMode::HumanActive);
    assert!(outcome.ai_task.is_none());
    assert_eq!(responder.calls(), 0);
    assert_eq!(customer.drain_names(), ["merchant:takeover", "message:receive"]);
    assert_eq!(merchant.drain_names(), ["merchant:takeover", "message:receive"]);

    // Act: merchant answers, then releases
    gateway
        .send_message(merchant.conn, message(&session.id, "Let me check.", SenderType::Merchant))
        .await
        .unwrap();
    gateway
        .apply_takeover(merchant.conn, session_ref(&session.id), TakeoverCommand::Release)
        .await
        .unwrap();
    let outcome = gateway
        .send_message(customer.conn, message(&session.id, "Thanks!", SenderType::Customer))
        .await
        .unwrap();
    outcome.ai_task.expect("AI owns the session again").await.unwrap();

    // Assert
    assert_eq!(
        customer.drain_names(),
        ["message:receive", "merchant:release_takeover", "message:receive", "ai:response"]
    );

    let senders: Vec<SenderType> = gateway
        .session_history("m1", &session.id)
        .await
        .unwrap()
        .iter()
        .map(|m| m.sender_type)
        .collect();
    assert_eq!(
        senders,
        [SenderType::Customer, SenderType::Merchant, SenderType::Customer, SenderType::Ai]
    );
}

#[tokio::test]
async fn test_repeated_takeover_is_not_rebroadcast() {
    let (gateway, _pool) = test_gateway(ScriptedResponder::new("Hello!")).await;
    let (mut customer, session) = join_customer(&gateway, "m1", None).await;
    let merchant = join_merchant(&gateway, "m1").await;
    customer.drain();

    let first = gateway
        .apply_takeover(merchant.conn, session_ref(&session.id), TakeoverCommand::Takeover)
        .await
        .unwrap();
    let second = gateway
        .apply_takeover(merchant.conn, session_ref(&session.id), TakeoverCommand::Takeover)
        .await
        .unwrap();

    assert!(first.changed());
    assert!(!second.changed());
    assert_eq!(customer.drain_names(), ["merchant:takeover"]);
}

#[tokio::test]
async fn test_release_without_takeover_is_a_no_op() {
    let (gateway, _pool) = test_gateway(ScriptedResponder::new("Hello!")).await;
    let (mut customer, session) = join_customer(&gateway, "m1", None).await;
    let merchant = join_merchant(&gateway, "m1").await;
    customer.drain();

    let transition = gateway
        .apply_takeover(merchant.conn, session_ref(&session.id), TakeoverCommand::Release)
        .await
        .unwrap();

    assert!(!transition.changed());
    assert_eq!(transition.to, ControlMode::AiActive);
    assert!(customer.drain().is_empty());
}

#[tokio::test]
async fn test_concurrent_takeovers_converge_on_one_transition() {
    // Arrange
    let (gateway, _pool) = test_gateway(ScriptedResponder::new("Hello!")).await;
    let (mut customer, session) = join_customer(&gateway, "m1", None).await;
    let first_tab = join_merchant(&gateway, "m1").await;
    let second_tab = join_merchant(&gateway, "m1").await;
    customer.drain();

    // Act
    let (a, b) = tokio::join!(
        gateway.apply_takeover(first_tab.conn, session_ref(&session.id), TakeoverCommand::Takeover),
        gateway.apply_takeover(second_tab.conn, session_ref(&session.id), TakeoverCommand::Takeover),
    );

    // Assert
    let changed = [a.unwrap(), b.unwrap()].iter().filter(|t| t.changed()).count();
    assert_eq!(changed, 1);
    assert_eq!(customer.drain_names(), ["merchant:takeover"]);

    let summary = gateway.list_sessions("m1").await.unwrap();
    assert!(summary[0].merchant_took_over);
    assert!(summary[0].ai_enabled);
}

#[tokio::test]
async fn test_ai_reply_in_flight_is_discarded_after_takeover() {
    // Arrange
    let responder = GatedResponder::new("Hello! How can I help?");
    let (gateway, _pool) = test_gateway(responder.clone()).await;
    let (mut customer, session) = join_customer(&gateway, "m1", None).await;
    let merchant = join_merchant(&gateway, "m1").await;
    customer.drain();

    let outcome = gateway
        .send_message(customer.conn, message(&session.id, "Hi", SenderType::Customer))
        .await
        .unwrap();
    responder.started.notified().await;

    // Act: the merchant takes over while the model is still answering
    gateway
        .apply_takeover(merchant.conn, session_ref(&session.id), TakeoverCommand::Takeover)
        .await
        .unwrap();
    responder.release.notify_one();
    outcome.ai_task.unwrap().await.unwrap();

    // Assert
    assert_eq!(customer.drain_names(), ["message:receive", "merchant:takeover"]);
    let history = gateway.session_history("m1", &session.id).await.unwrap();
    assert!(history.iter().all(|m| m.sender_type != SenderType::Ai));
}

#[tokio::test]
async fn test_only_owning_merchant_can_take_over() {
    let (gateway, _pool) = test_gateway(ScriptedResponder::new("Hello!")).await;
    let (customer, session) = join_customer(&gateway, "m1", None).await;
    let other_merchant = join_merchant(&gateway, "m2").await;

    let by_customer = gateway
        .apply_takeover(customer.conn, session_ref(&session.id), TakeoverCommand::Takeover)
        .await;
    let by_other = gateway
        .apply_takeover(other_merchant.conn, session_ref(&session.id), TakeoverCommand::Takeover)
        .await;

    assert!(matches!(by_customer, Err(AppError::Forbidden(_))));
    assert!(matches!(by_other, Err(AppError::Forbidden(_))));
    assert!(!gateway.list_sessions("m1").await.unwrap()[0].merchant_took_over);
}

#[tokio::test]
async fn test_closed_session_cannot_be_taken_over() {
    let (gateway, _pool) = test_gateway(ScriptedResponder::new("Hello!")).await;
    let (_customer, session) = join_customer(&gateway, "m1", None).await;
    let merchant = join_merchant(&gateway, "m1").await;
    gateway.close_session("m1", &session.id).await.unwrap();

    let result = gateway
        .apply_takeover(merchant.conn, session_ref(&session.id), TakeoverCommand::Takeover)
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}
