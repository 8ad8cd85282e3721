//! Flow controller tests driven through the public command protocol.

use chatdonate::flow::{
    DataDonationFlow, ExtractStep, FilePromptTexts, FlowContext, KnownFilesValidator,
    PromptFileStep, ReviewStep, ReviewTexts,
};
use chatdonate::platforms::whatsapp;
use chatdonate::prelude::*;

const CHAT: &str = "\
Messages and calls are end-to-end encrypted.
[15/01/2024, 10:30:00] Ann: morning
[15/01/2024, 10:31:00] Bob: hi Ann
[15/01/2024, 10:32:00] Cy: hello
[16/01/2024, 11:00:00] Ann: bye";

fn opener() -> MemoryOpener {
    MemoryOpener::new()
        .with_archive("good", MemoryArchive::new().with_entry("_chat.txt", CHAT))
        .with_archive("photos", MemoryArchive::new().with_entry("IMG_0001.jpg", vec![1u8, 2, 3]))
}

fn whatsapp_flow(config: FlowConfig) -> DataDonationFlow {
    create_flow(Platform::WhatsApp, config, ChatConfig::default(), opener())
}

fn count_pages(driver: &ScriptedDriver, pred: impl Fn(&Page) -> bool) -> usize {
    driver.pages.iter().filter(|p| pred(p)).count()
}

#[test]
fn test_retry_loop_runs_once_per_confirmation() {
    let mut flow = whatsapp_flow(FlowConfig::new("1"));
    let mut driver = ScriptedDriver::new([
        Payload::String("photos".into()),
        Payload::True,
        Payload::String("photos".into()),
        Payload::True,
        Payload::String("good".into()),
        Payload::String("Ann".into()),
        Payload::Json("{}".into()),
    ]);
    flow.run_with(&mut driver);

    assert_eq!(count_pages(&driver, |p| matches!(p, Page::FileInput { .. })), 3);
    assert_eq!(
        count_pages(&driver, |p| matches!(p, Page::RetryConfirmation { .. })),
        2
    );
    assert_eq!(count_pages(&driver, |p| matches!(p, Page::Review { .. })), 1);
    assert_eq!(driver.remaining(), 0);
}

#[test]
fn test_retry_page_names_platform() {
    let mut flow = whatsapp_flow(FlowConfig::new("1"));
    let mut driver = ScriptedDriver::new([Payload::String("missing".into()), Payload::False]);
    flow.run_with(&mut driver);

    match &driver.pages[1] {
        Page::RetryConfirmation { platform, .. } => assert_eq!(platform, "Whatsapp Group Chat"),
        other => panic!("expected retry page, got {other:?}"),
    }
    assert!(flow.is_finished());
    assert!(driver.donations.is_empty());
}

#[test]
fn test_consent_payload_is_forwarded_verbatim() {
    let consent = r#"[{"id":"table_id_Member_1","deleted_rows":[]}]"#;
    let mut flow = whatsapp_flow(FlowConfig::new("abc"));
    let mut driver = ScriptedDriver::new([
        Payload::String("good".into()),
        Payload::String("Cy".into()),
        Payload::Json(consent.into()),
    ]);
    flow.run_with(&mut driver);

    assert_eq!(
        driver.donations,
        vec![("abc-whatsapp-chat".to_string(), consent.to_string())]
    );
    assert_eq!(driver.exit, Some((0, "Success".to_string())));
    assert!(matches!(driver.pages.last(), Some(Page::End)));
}

#[test]
fn test_skipping_name_selection_abandons() {
    let mut flow = whatsapp_flow(FlowConfig::new("1"));
    let mut driver = ScriptedDriver::new([Payload::String("good".into()), Payload::Void]);
    flow.run_with(&mut driver);

    assert_eq!(count_pages(&driver, |p| matches!(p, Page::Review { .. })), 0);
    assert!(driver.donations.is_empty());
    assert!(flow.state().is_empty());
    assert_eq!(driver.exit, Some((0, "Success".to_string())));
}

#[test]
fn test_log_donation_collects_session_log() {
    let mut flow = whatsapp_flow(FlowConfig::new("9").with_donate_logs(true));
    let mut driver = ScriptedDriver::new([
        Payload::String("good".into()),
        Payload::String("Bob".into()),
        Payload::Json("{}".into()),
    ]);
    flow.run_with(&mut driver);

    let logs: Vec<&str> = driver.donations_for("9-tracking").collect();
    assert!(logs.len() >= 2);

    let last: Vec<String> = serde_json::from_str(logs.last().unwrap()).unwrap();
    assert!(last.iter().any(|l| l.contains("starting data donation flow")));
    // Log lines never carry participant names
    assert!(last.iter().all(|l| !l.contains("Bob") && !l.contains("Ann")));

    // Each log donation extends the previous one
    let first: Vec<String> = serde_json::from_str(logs[0]).unwrap();
    assert!(first.len() <= last.len());
    assert_eq!(driver.donations_for("9-whatsapp-chat").count(), 1);
}

#[test]
fn test_log_donation_carries_no_export_names() {
    let entry = "WhatsApp Chat with Ann Smith.txt";
    let opener = MemoryOpener::new()
        .with_archive(
            "broken",
            MemoryArchive::new().with_entry(entry, "Ann Smith\nwas here"),
        )
        .with_archive(
            "upload",
            MemoryArchive::new().with_entry(entry, CHAT.replace("Ann", "Ann Smith")),
        );
    let config = FlowConfig::new("3").with_donate_logs(true);
    let mut flow = create_flow(Platform::WhatsApp, config, ChatConfig::default(), opener);
    let mut driver = ScriptedDriver::new([
        Payload::String("broken".into()),
        Payload::True,
        Payload::String("upload".into()),
        Payload::String("Ann Smith".into()),
        Payload::Json("{}".into()),
    ]);
    flow.run_with(&mut driver);

    assert_eq!(driver.donations_for("3-whatsapp-chat").count(), 1);
    let logs: Vec<&str> = driver.donations_for("3-tracking").collect();
    assert!(logs.len() >= 3);
    for donation in logs {
        for name in [entry, "Ann", "Smith", "Bob", "Cy"] {
            assert!(!donation.contains(name), "{name} leaked into {donation}");
        }
    }
}

#[test]
fn test_protocol_without_driver() {
    let mut flow = whatsapp_flow(FlowConfig::new("1"));
    assert!(flow.resume(Payload::Void).is_none());

    let first = flow.start().unwrap();
    assert!(matches!(first, Command::Render { page: Page::FileInput { .. } }));
    assert!(flow.start().is_none());

    let next = flow.resume(Payload::String("good".into())).unwrap();
    match next {
        Command::Render {
            page: Page::RadioSelect { options, .. },
        } => assert_eq!(options, vec!["Ann", "Bob", "Cy"]),
        other => panic!("expected name selection, got {other:?}"),
    }
}

#[test]
fn test_custom_flow_with_extract_step() {
    let ctx = FlowContext::new("Demo", "demo", FlowConfig::new("5"), opener());
    let extractor = |_: &dyn Archive| {
        let mut table = Table::new("demo", Translatable::same("Demo"), ["n"]);
        table.push_row(["1"]);
        vec![table]
    };
    let mut flow = DataDonationFlow::new(ctx)
        .add_step(PromptFileStep::new(
            FilePromptTexts::default(),
            whatsapp::ddp_categories(),
            Box::new(KnownFilesValidator),
        ))
        .add_step(ExtractStep::new(extractor))
        .add_step(ReviewStep::new(ReviewTexts {
            review_data_header: Translatable::same("Review"),
            review_data_description: Translatable::same("Check it"),
        }))
        .with_exit();

    let mut driver = ScriptedDriver::new([Payload::String("good".into()), Payload::False]);
    flow.run_with(&mut driver);

    assert_eq!(
        driver.donations_for("5-demo").collect::<Vec<_>>(),
        vec![r#"{"status":"data_submission declined"}"#]
    );
}
