//! End-to-end order round flow driven through the bot event loop with
//! a stub gateway, no network required.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use burrito_bob::bot::{Bot, Event};
use burrito_bob::config::BotConfig;
use burrito_bob::error::GatewayError;
use burrito_bob::gateway::{Gateway, Member, MessageEvent, MessageStream};
use burrito_bob::round::prompts;
use burrito_bob::round::report::ABANDONED_HEADING;

/// Gateway stub: fixed member list, records every send.
struct StubGateway {
    members: Vec<Member>,
    sent: Mutex<Vec<(String, String)>>,
}

impl StubGateway {
    fn new(members: Vec<Member>) -> Self {
        Self {
            members,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for StubGateway {
    fn name(&self) -> &str {
        "stub"
    }

    async fn self_id(&self) -> Result<Option<String>, GatewayError> {
        Ok(Some("UBOT".to_string()))
    }

    async fn start(&self) -> Result<MessageStream, GatewayError> {
        Ok(Box::pin(futures::stream::empty()))
    }

    async fn member_list(&self) -> Result<Vec<Member>, GatewayError> {
        Ok(self.members.clone())
    }

    async fn send_to_user(&self, username: &str, text: &str) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap()
            .push((username.to_string(), text.to_string()));
        Ok(())
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

fn member(id: &str, name: &str, real_name: &str, is_bot: bool) -> Member {
    Member {
        id: id.into(),
        name: name.into(),
        real_name: real_name.into(),
        is_bot,
    }
}

fn team() -> Vec<Member> {
    vec![
        member("USLACKBOT", "slackbot", "slackbot", false),
        member("UBOT", "burritobob", "Burrito Bob", true),
        member("U1", "kent", "Kent Yunge", false),
        member("U2", "maria", "Maria Field", false),
        member("U3", "dan", "Dan Oak", false),
    ]
}

fn config() -> BotConfig {
    BotConfig {
        bot_token: SecretString::from("xoxb-test"),
        app_token: SecretString::from("xapp-test"),
        bot_name: "burritobob".to_string(),
        port: 0,
        fillings: vec![
            "vegetarian".into(),
            "ham".into(),
            "bacon".into(),
            "sausage".into(),
            "chorizo".into(),
        ],
        order_timeout: Duration::from_secs(600),
    }
}

fn setup() -> (Bot, Arc<StubGateway>) {
    let gateway = Arc::new(StubGateway::new(team()));
    let bot = Bot::new(config(), Arc::clone(&gateway) as Arc<dyn Gateway>);
    (bot, gateway)
}

/// Send a direct message from the given user id into the event loop.
async fn dm(bot: &mut Bot, user: &str, text: &str) {
    let event = MessageEvent::new("message", text)
        .with_channel(format!("D{user}"))
        .with_user(user);
    bot.handle_event(Event::Inbound(event)).await;
}

#[tokio::test]
async fn full_round_from_trigger_to_report() {
    let (mut bot, gateway) = setup();

    // Kent kicks off a round from a DM
    dm(&mut bot, "U1", "hey, start order for the team!").await;
    assert!(bot.round_active());

    let sent = gateway.sent();
    // Ack to the initiator first, then one interest prompt per human
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0], ("kent".to_string(), prompts::ROUND_STARTED_ACK.to_string()));
    let prompted: Vec<&str> = sent[1..].iter().map(|(to, _)| to.as_str()).collect();
    assert_eq!(prompted, vec!["kent", "maria", "dan"]);
    for (_, text) in &sent[1..] {
        assert_eq!(text, &prompts::interest_prompt("Kent Yunge"));
    }

    // Kent walks the whole interview
    dm(&mut bot, "U1", "Yes!").await;
    assert_eq!(gateway.sent().last().unwrap().1, prompts::ITEM_TYPE_PROMPT);
    dm(&mut bot, "U1", "a taco please").await;
    assert_eq!(
        gateway.sent().last().unwrap().1,
        prompts::filling_prompt(&config().fillings)
    );
    dm(&mut bot, "U1", "bacon").await;
    assert_eq!(gateway.sent().last().unwrap().1, prompts::SALSA_PROMPT);
    dm(&mut bot, "U1", "hot please").await;
    assert_eq!(gateway.sent().last().unwrap().1, prompts::INSTRUCTIONS_PROMPT);
    dm(&mut bot, "U1", "extra napkins").await;
    assert_eq!(
        gateway.sent().last().unwrap().1,
        prompts::closing("Kent Yunge")
    );

    // Maria declines and gets no further messages
    let before = gateway.sent().len();
    dm(&mut bot, "U2", "no thanks").await;
    assert_eq!(gateway.sent().len(), before);

    // Dan says yes, orders a burrito, then goes quiet
    dm(&mut bot, "U3", "yes").await;
    dm(&mut bot, "U3", "burrito").await;

    // The window elapses and the report goes to the initiator
    bot.handle_event(Event::RoundTimeout).await;
    assert!(!bot.round_active());

    let (to, report) = gateway.sent().last().unwrap().clone();
    assert_eq!(to, "kent");
    assert!(report.contains(
        "Kent Yunge wants a bacon taco with hot salsa\nSpecial Instructions: extra napkins"
    ));
    let (_, after_heading) = report.split_once(ABANDONED_HEADING).unwrap();
    assert!(after_heading.contains("Dan Oak"));
    assert!(!report.contains("Maria Field"));

    // A fresh round can start immediately
    dm(&mut bot, "U2", "start order").await;
    assert!(bot.round_active());
}

#[tokio::test]
async fn retries_on_unrecognized_answers() {
    let (mut bot, gateway) = setup();
    dm(&mut bot, "U1", "start order").await;

    dm(&mut bot, "U3", "maybe?").await;
    assert_eq!(gateway.sent().last().unwrap().1, prompts::INTEREST_RETRY);

    dm(&mut bot, "U3", "yes").await;
    dm(&mut bot, "U3", "a quesadilla").await;
    assert_eq!(gateway.sent().last().unwrap().1, prompts::ITEM_TYPE_RETRY);

    dm(&mut bot, "U3", "taco").await;
    dm(&mut bot, "U3", "pineapple").await;
    assert_eq!(gateway.sent().last().unwrap().1, prompts::FILLING_RETRY);

    dm(&mut bot, "U3", "chorizo").await;
    dm(&mut bot, "U3", "medium").await;
    assert_eq!(gateway.sent().last().unwrap().1, prompts::SALSA_RETRY);
}

#[tokio::test]
async fn trigger_during_active_round_does_not_restart() {
    let (mut bot, gateway) = setup();
    dm(&mut bot, "U1", "start order").await;
    let after_start = gateway.sent().len();

    // Treated as a (bad) interest answer, not a new round
    dm(&mut bot, "U2", "start order").await;
    assert!(bot.round_active());
    let sent = gateway.sent();
    assert_eq!(sent.len(), after_start + 1);
    assert_eq!(sent.last().unwrap().1, prompts::INTEREST_RETRY);
}

#[tokio::test]
async fn ignores_channel_messages_and_bot_senders() {
    let (mut bot, gateway) = setup();

    // Trigger text in a public channel is ignored
    let event = MessageEvent::new("message", "start order")
        .with_channel("C024BE91L")
        .with_user("U1");
    bot.handle_event(Event::Inbound(event)).await;
    assert!(!bot.round_active());
    assert!(gateway.sent().is_empty());

    // The bot's own messages never trigger anything
    let event = MessageEvent::new("message", "start order")
        .with_channel("DU1")
        .with_user("U1")
        .with_username("burritobob");
    bot.handle_event(Event::Inbound(event)).await;
    assert!(!bot.round_active());

    // Non-message events are dropped
    let event = MessageEvent::new("user_typing", "").with_channel("DU1");
    bot.handle_event(Event::Inbound(event)).await;
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn completed_participant_is_asked_to_be_patient() {
    let (mut bot, gateway) = setup();
    dm(&mut bot, "U1", "start order").await;

    dm(&mut bot, "U2", "yes").await;
    dm(&mut bot, "U2", "burrito").await;
    dm(&mut bot, "U2", "ham").await;
    dm(&mut bot, "U2", "mild").await;
    dm(&mut bot, "U2", "none").await;

    dm(&mut bot, "U2", "actually can I change that?").await;
    let (to, text) = gateway.sent().last().unwrap().clone();
    assert_eq!(to, "maria");
    assert_eq!(text, prompts::BE_PATIENT);
}

/// Gateway whose sends always fail, for exercising delivery errors.
struct FailingGateway {
    inner: StubGateway,
}

#[async_trait]
impl Gateway for FailingGateway {
    fn name(&self) -> &str {
        "failing"
    }

    async fn self_id(&self) -> Result<Option<String>, GatewayError> {
        self.inner.self_id().await
    }

    async fn start(&self) -> Result<MessageStream, GatewayError> {
        self.inner.start().await
    }

    async fn member_list(&self) -> Result<Vec<Member>, GatewayError> {
        self.inner.member_list().await
    }

    async fn send_to_user(&self, username: &str, _text: &str) -> Result<(), GatewayError> {
        Err(GatewayError::SendFailed {
            name: self.name().into(),
            reason: format!("no route to {username}"),
        })
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), GatewayError> {
        self.inner.shutdown().await
    }
}

#[tokio::test]
async fn send_failures_do_not_derail_the_round() {
    let gateway = Arc::new(FailingGateway {
        inner: StubGateway::new(team()),
    });
    let mut bot = Bot::new(config(), Arc::clone(&gateway) as Arc<dyn Gateway>);

    // Every delivery fails, but the round starts and keeps advancing
    dm(&mut bot, "U1", "start order").await;
    assert!(bot.round_active());

    dm(&mut bot, "U2", "yes").await;
    dm(&mut bot, "U2", "taco").await;
    assert!(bot.round_active());

    // The report send fails too; teardown still happens
    bot.handle_event(Event::RoundTimeout).await;
    assert!(!bot.round_active());
}

#[tokio::test]
async fn timeout_with_no_round_is_a_no_op() {
    let (mut bot, gateway) = setup();
    bot.handle_event(Event::RoundTimeout).await;
    assert!(!bot.round_active());
    assert!(gateway.sent().is_empty());
}
