use alerting::{Channel, RecordingNotifier};
use hive_health::{AlertSeverity, HealthStatus};
use ingest::{seed_hives, AuthConfig, IngestConfig, IngestError, Ingestor, Portal, SeedHive};
use std::sync::Arc;
use storage::{AlertType, NewHive, Requester};
use tokio::io::{AsyncBufReadExt, BufReader};

fn seeded() -> (Ingestor, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let ingestor = Ingestor::from_config(&IngestConfig::default(), notifier.clone());

    let seeds: Vec<SeedHive> = serde_json::from_str(
        r#"[
            {"name": "Acacia", "device_id": "hive-001", "owner_id": 1, "owner_name": "amina",
             "email": "amina@example.com", "phone": "+254712345678"},
            {"name": "Baobab", "device_id": "hive-002", "owner_id": 1, "owner_name": "amina"},
            {"name": "Cedar", "device_id": "hive-003", "owner_id": 2, "owner_name": "otieno",
             "email": "otieno@example.com"},
            {"name": "Pending", "device_id": "hive-004", "owner_id": 2, "approved": false}
        ]"#,
    )
    .unwrap();
    seed_hives(&ingestor, seeds).unwrap();

    (ingestor, notifier)
}

#[test]
fn test_full_pipeline() {
    let (ingestor, notifier) = seeded();

    let cold = ingestor
        .ingest_json(r#"{"deviceId": "hive-001", "temperature": 5, "humidity": 55, "hiveWeight": 30}"#)
        .unwrap();
    assert_eq!(cold.assessment.score, 70);
    assert_eq!(cold.assessment.status, HealthStatus::Warning);
    assert_eq!(cold.alerts.len(), 1);
    assert_eq!(cold.alerts[0].severity, AlertSeverity::Critical);
    assert_eq!(cold.notified, 1);

    let storm = ingestor
        .ingest_json(r#"{"deviceId": "hive-003", "temperature": 45, "humidity": 85, "gasLevel": 250}"#)
        .unwrap();
    assert_eq!(storm.assessment.score, 15);
    assert_eq!(storm.assessment.status, HealthStatus::Critical);
    assert_eq!(storm.alerts.len(), 3);
    assert_eq!(storm.notified, 3);

    let fine = ingestor
        .ingest_json(r#"{"deviceId": "hive-002", "temperature": 30, "humidity": 60, "hiveWeight": 40}"#)
        .unwrap();
    assert!(fine.alerts.is_empty());
    assert_eq!(fine.assessment.notes(), "");

    // Critical alert for the owner with a phone goes out by SMS too
    let sent = notifier.sent();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0].channels(), vec![Channel::Email, Channel::Sms]);
    // Owner without a phone only gets email
    assert_eq!(sent[1].channels(), vec![Channel::Email]);

    let repo = ingestor.repository();
    assert_eq!(repo.reading_count().unwrap(), 3);
    assert_eq!(repo.unread_count().unwrap(), 4);

    let owner_stats = repo.dashboard_stats(&Requester::user(1)).unwrap();
    assert_eq!(owner_stats.total_hives, 2);
    assert_eq!(owner_stats.active_alerts, 1);
    assert_eq!(owner_stats.temperature_avg, 17.5);
    assert_eq!(owner_stats.weight_avg, 35.0);

    let admin_stats = repo.dashboard_stats(&Requester::admin(0)).unwrap();
    assert_eq!(admin_stats.total_hives, 4);
    assert_eq!(admin_stats.active_alerts, 4);
}

#[test]
fn test_stuck_critical_hive_does_not_starve_others() {
    let (ingestor, notifier) = seeded();

    let stuck = r#"{"deviceId": "hive-001", "temperature": 5}"#;
    let notified: usize = (0..12)
        .map(|_| ingestor.ingest_json(stuck).unwrap().notified)
        .sum();
    assert_eq!(notified, 1);

    let other = ingestor
        .ingest_json(r#"{"deviceId": "hive-003", "gasLevel": 300}"#)
        .unwrap();
    assert_eq!(other.alerts[0].severity, AlertSeverity::Critical);
    assert_eq!(other.notified, 1);

    // Every repeat still reaches the alert log
    assert_eq!(ingestor.repository().unread_count().unwrap(), 13);
    assert_eq!(notifier.sent().len(), 2);
}

#[test]
fn test_escalation_notifies_inside_cooldown() {
    let (ingestor, _) = seeded();

    let high = ingestor
        .ingest_json(r#"{"deviceId": "hive-001", "gasLevel": 150}"#)
        .unwrap();
    assert_eq!(high.notified, 1);
    let repeat = ingestor
        .ingest_json(r#"{"deviceId": "hive-001", "gasLevel": 160}"#)
        .unwrap();
    assert_eq!(repeat.notified, 0);
    let critical = ingestor
        .ingest_json(r#"{"deviceId": "hive-001", "gasLevel": 260}"#)
        .unwrap();
    assert_eq!(critical.notified, 1);
    let still_critical = ingestor
        .ingest_json(r#"{"deviceId": "hive-001", "gasLevel": 280}"#)
        .unwrap();
    assert_eq!(still_critical.notified, 0);
}

#[test]
fn test_rejections_do_not_touch_storage() {
    let (ingestor, notifier) = seeded();

    assert!(matches!(
        ingestor.ingest_json(r#"{"deviceId": "hive-004", "temperature": 5}"#),
        Err(IngestError::HiveNotActive(_))
    ));
    assert!(matches!(
        ingestor.ingest_json(r#"{"deviceId": "hive-999", "temperature": 5}"#),
        Err(IngestError::UnknownDevice(_))
    ));
    assert!(matches!(
        ingestor.ingest_json(r#"{"deviceId": "hive-001", "temperature": 500}"#),
        Err(IngestError::Validation(_))
    ));

    assert_eq!(ingestor.repository().reading_count().unwrap(), 0);
    assert_eq!(ingestor.repository().unread_count().unwrap(), 0);
    assert!(notifier.sent().is_empty());
}

#[test]
fn test_deleting_a_hive_is_logged() {
    let (ingestor, _) = seeded();
    let repo = ingestor.repository();
    let hive = repo.find_by_device("hive-002").unwrap().unwrap();

    repo.remove_hive(hive.id, &Requester::user(1)).unwrap();

    let log = repo.list_alerts(true, 10).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].alert_type, AlertType::HiveDeleted);
    assert!(matches!(
        ingestor.ingest_json(r#"{"deviceId": "hive-002", "temperature": 30}"#),
        Err(IngestError::UnknownDevice(_))
    ));
}

#[test]
fn test_account_owns_monitored_hive() {
    let notifier = Arc::new(RecordingNotifier::new());
    let config = IngestConfig {
        auth: AuthConfig {
            admin_password: Some("bootstrap-pw".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let ingestor = Ingestor::from_config(&config, notifier.clone());
    let portal = Portal::from_config(&config, ingestor.repository().clone());
    portal.bootstrap_admin().unwrap();

    let keeper = portal.register("amina", "honeycomb").unwrap();
    let session = portal.login("amina", "honeycomb").unwrap();
    ingestor
        .register_contact(keeper.id, Some("amina@example.com"), None)
        .unwrap();

    let hive = portal
        .register_hive(
            &session,
            NewHive {
                name: "Acacia".to_string(),
                device_id: "hive-100".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

    // Pending until an admin approves it
    let reading = r#"{"deviceId": "hive-100", "temperature": 41}"#;
    assert!(matches!(
        ingestor.ingest_json(reading),
        Err(IngestError::HiveNotActive(_))
    ));

    let admin = portal.login("Admin", "bootstrap-pw").unwrap();
    ingestor.repository().approve_hive(hive.id, &admin).unwrap();

    let outcome = ingestor.ingest_json(reading).unwrap();
    assert_eq!(outcome.notified, 1);
    assert_eq!(notifier.sent()[0].recipient.email.as_deref(), Some("amina@example.com"));

    let stats = ingestor.repository().dashboard_stats(&session).unwrap();
    assert_eq!(stats.total_hives, 1);
    assert_eq!(stats.active_alerts, 1);
    assert_eq!(stats.temperature_avg, 41.0);
}

#[tokio::test]
async fn test_line_stream() {
    let (ingestor, _) = seeded();
    let input = concat!(
        r#"{"deviceId": "hive-001", "temperature": 12}"#,
        "\n\n",
        "garbage\n",
        r#"{"deviceId": "hive-003", "batteryLevel": 15, "signalStrength": 20}"#,
        "\n",
    );

    let mut lines = BufReader::new(input.as_bytes()).lines();
    let (mut ok, mut failed) = (0, 0);
    while let Some(line) = lines.next_line().await.unwrap() {
        if line.trim().is_empty() {
            continue;
        }
        match ingestor.ingest_json(&line) {
            Ok(_) => ok += 1,
            Err(IngestError::Parse(_)) => failed += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!((ok, failed), (2, 1));

    let latest = ingestor
        .repository()
        .latest_reading(3)
        .unwrap()
        .expect("reading for hive 3");
    assert_eq!(latest.assessment.score, 85);
}
