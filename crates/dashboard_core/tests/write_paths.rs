use dashboard_core::model::alert::{AlertPatch, NewAlert};
use dashboard_core::model::note::{NewNote, NotePatch};
use dashboard_core::model::planning::{NewPlanningItem, PlanningPatch};
use dashboard_core::model::user::{NewUser, UserPatch};
use dashboard_core::model::warehouse::{NewWarehouseItem, WarehousePatch};
use dashboard_core::model::work::{NewWork, WorkPatch, WorkStatus};
use dashboard_core::repo::warehouse_repo::WarehouseListQuery;
use dashboard_core::{
    DashboardService, DeleteOutcome, RepoError, Store, UpdateOutcome, ValidationError,
};

fn seeded_service() -> DashboardService {
    let service = DashboardService::new(Store::open_in_memory().unwrap());
    service.initialize().unwrap();
    service
}

#[test]
fn work_update_distinguishes_noop_not_found_and_updated() {
    let service = seeded_service();
    let mut work = NewWork::new("Kalibracja oscyloskopu");
    work.deadline = Some("2030-06-01".to_string());
    let id = service.create_work(&work).unwrap();
    let before = service.get_work(id).unwrap().unwrap();
    assert_eq!(before.status, WorkStatus::Pending);
    assert_eq!(before.progress, 0);

    assert_eq!(
        service.update_work(id, &WorkPatch::default()).unwrap(),
        UpdateOutcome::NoOp
    );
    let patch = WorkPatch {
        status: Some(WorkStatus::InProgress),
        progress: Some(40),
        ..WorkPatch::default()
    };
    assert_eq!(
        service.update_work(i64::MAX, &patch).unwrap(),
        UpdateOutcome::NotFound
    );

    assert_eq!(service.update_work(id, &patch).unwrap(), UpdateOutcome::Updated);
    let after = service.get_work(id).unwrap().unwrap();
    assert_eq!(after.status, WorkStatus::InProgress);
    assert_eq!(after.progress, 40);
    assert_eq!(after.title, before.title);
    assert_eq!(after.deadline, before.deadline);
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn back_to_back_updates_always_advance_updated_at() {
    let service = seeded_service();

    for round in 0..50 {
        let id = service
            .create_work(&NewWork::new(format!("Przegląd {round}")))
            .unwrap();
        let before = service.get_work(id).unwrap().unwrap();
        let patch = WorkPatch {
            progress: Some(10),
            ..WorkPatch::default()
        };
        assert_eq!(service.update_work(id, &patch).unwrap(), UpdateOutcome::Updated);
        let first = service.get_work(id).unwrap().unwrap();
        assert!(first.updated_at > before.updated_at);

        assert_eq!(service.update_work(id, &patch).unwrap(), UpdateOutcome::Updated);
        let second = service.get_work(id).unwrap().unwrap();
        assert!(second.updated_at > first.updated_at);
    }
}

#[test]
fn work_validation_runs_before_writing() {
    let service = seeded_service();

    let mut work = NewWork::new("Pomiar");
    work.progress = 101;
    assert!(matches!(
        service.create_work(&work),
        Err(RepoError::Validation(ValidationError::OutOfRange {
            field: "progress",
            ..
        }))
    ));

    let mut work = NewWork::new("Pomiar");
    work.deadline = Some("15.01.2024".to_string());
    assert!(matches!(
        service.create_work(&work),
        Err(RepoError::Validation(ValidationError::InvalidDate { .. }))
    ));

    assert!(matches!(
        service.create_work(&NewWork::new("  ")),
        Err(RepoError::Validation(ValidationError::MissingField("title")))
    ));
    assert_eq!(service.table_counts().unwrap()[1], ("works", 3));
}

#[test]
fn alert_read_flag_can_be_set_either_way() {
    let service = seeded_service();
    let mut alert = NewAlert::new("Temperatura poza zakresem");
    alert.message = Some("Komora 2".to_string());
    alert.priority = 3;
    let id = service.create_alert(&alert).unwrap();

    let created = service.get_alert(id).unwrap().unwrap();
    assert!(!created.is_read);
    assert_eq!(created.priority, 3);

    assert_eq!(service.mark_alert_read(id, true).unwrap(), UpdateOutcome::Updated);
    assert!(service.get_alert(id).unwrap().unwrap().is_read);
    assert_eq!(service.mark_alert_read(id, false).unwrap(), UpdateOutcome::Updated);
    assert!(!service.get_alert(id).unwrap().unwrap().is_read);

    assert_eq!(
        service.mark_alert_read(i64::MAX, true).unwrap(),
        UpdateOutcome::NotFound
    );
    assert_eq!(
        service.update_alert(id, &AlertPatch::default()).unwrap(),
        UpdateOutcome::NoOp
    );
    assert!(service.get_alert(i64::MAX).unwrap().is_none());
}

#[test]
fn note_lifecycle_refreshes_updated_at_and_deletes_once() {
    let service = seeded_service();
    let mut note = NewNote::new("Zamówienie", "Lutownica");
    note.is_alert = true;
    note.alert_time = "14:30".to_string();
    let id = service.create_note(&note).unwrap();
    let before = service.get_note(id).unwrap().unwrap();

    let patch = NotePatch {
        text: Some("Lutownica i cyna".to_string()),
        is_alert: Some(false),
        ..NotePatch::default()
    };
    assert_eq!(service.update_note(id, &patch).unwrap(), UpdateOutcome::Updated);
    let after = service.get_note(id).unwrap().unwrap();
    assert_eq!(after.text, "Lutownica i cyna");
    assert!(!after.is_alert);
    assert_eq!(after.alert_time, "14:30");
    assert!(after.updated_at > before.updated_at);

    assert_eq!(service.delete_note(id).unwrap(), DeleteOutcome::Deleted);
    assert_eq!(service.delete_note(id).unwrap(), DeleteOutcome::NotFound);
    assert!(service.get_note(id).unwrap().is_none());
}

#[test]
fn note_name_length_is_capped() {
    let service = seeded_service();
    let long_name = "n".repeat(256);

    let err = service
        .create_note(&NewNote::new(long_name.clone(), ""))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::TooLong {
            field: "name",
            max_chars: 255,
            actual_chars: 256,
        })
    ));
    assert!(service.create_note(&NewNote::new("n".repeat(255), "")).is_ok());

    let patch = NotePatch {
        name: Some(long_name),
        ..NotePatch::default()
    };
    assert!(matches!(
        service.update_note(1, &patch),
        Err(RepoError::Validation(ValidationError::TooLong { .. }))
    ));
}

#[test]
fn planning_lifecycle() {
    let service = seeded_service();
    let id = service
        .create_planning_item(&NewPlanningItem::new("Szkolenie BHP", "Marzec"))
        .unwrap();
    let before = service.get_planning_item(id).unwrap().unwrap();

    let patch = PlanningPatch {
        text: Some("Kwiecień".to_string()),
        ..PlanningPatch::default()
    };
    assert_eq!(
        service.update_planning_item(id, &patch).unwrap(),
        UpdateOutcome::Updated
    );
    let after = service.get_planning_item(id).unwrap().unwrap();
    assert_eq!(after.name, "Szkolenie BHP");
    assert_eq!(after.text, "Kwiecień");
    assert!(after.updated_at > before.updated_at);

    assert_eq!(
        service.delete_planning_item(id).unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        service.delete_planning_item(id).unwrap(),
        DeleteOutcome::NotFound
    );
    assert!(matches!(
        service.create_planning_item(&NewPlanningItem::new("", "x")),
        Err(RepoError::Validation(ValidationError::MissingField("name")))
    ));
}

#[test]
fn negative_quantity_is_rejected_and_store_is_unchanged() {
    let service = seeded_service();
    let item = service
        .get_warehouse_item_by_code("DEV/MCU/00345")
        .unwrap()
        .unwrap();

    let err = service.update_warehouse_quantity(item.id, -1).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NegativeQuantity(-1))
    ));
    let patch = WarehousePatch {
        quantity: Some(-5),
        ..WarehousePatch::default()
    };
    assert!(matches!(
        service.update_warehouse_item(item.id, &patch),
        Err(RepoError::Validation(ValidationError::NegativeQuantity(-5)))
    ));
    assert!(matches!(
        service.add_warehouse_item(&NewWarehouseItem::new("Zły", "BAD/001", -3)),
        Err(RepoError::Validation(ValidationError::NegativeQuantity(-3)))
    ));

    let unchanged = service.get_warehouse_item(item.id).unwrap().unwrap();
    assert_eq!(unchanged, item);
    assert!(service
        .get_warehouse_item_by_code("BAD/001")
        .unwrap()
        .is_none());
}

#[test]
fn quantity_update_overwrites_value() {
    let service = seeded_service();
    let item = service
        .get_warehouse_item_by_code("SEN/TMP/00456")
        .unwrap()
        .unwrap();

    assert_eq!(
        service.update_warehouse_quantity(item.id, 0).unwrap(),
        UpdateOutcome::Updated
    );
    let after = service.get_warehouse_item(item.id).unwrap().unwrap();
    assert_eq!(after.quantity, 0);
    assert!(after.updated_at > item.updated_at);
    assert_eq!(
        service.update_warehouse_quantity(i64::MAX, 1).unwrap(),
        UpdateOutcome::NotFound
    );
}

#[test]
fn duplicate_warehouse_code_is_a_conflict() {
    let service = seeded_service();
    let before = service.list_warehouse(&WarehouseListQuery::default()).len();

    let err = service
        .add_warehouse_item(&NewWarehouseItem::new("Rezystor kopia", "MAT/ELE/00123", 1))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict { table: "warehouse", .. }));
    assert_eq!(
        service.list_warehouse(&WarehouseListQuery::default()).len(),
        before
    );

    let arduino = service
        .get_warehouse_item_by_code("DEV/MCU/00345")
        .unwrap()
        .unwrap();
    let rename = WarehousePatch {
        code: Some("MAT/ELE/00123".to_string()),
        ..WarehousePatch::default()
    };
    assert!(matches!(
        service.update_warehouse_item(arduino.id, &rename),
        Err(RepoError::Conflict { .. })
    ));
}

#[test]
fn warehouse_delete_removes_one_row() {
    let service = seeded_service();
    let id = service
        .add_warehouse_item(&NewWarehouseItem::new("Multimetr", "DEV/MTR/00678", 4))
        .unwrap();

    assert_eq!(
        service.delete_warehouse_item(id).unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        service.delete_warehouse_item(id).unwrap(),
        DeleteOutcome::NotFound
    );
    assert_eq!(service.list_warehouse(&WarehouseListQuery::default()).len(), 5);
}

#[test]
fn users_never_expose_passwords() {
    let service = seeded_service();
    let id = service
        .create_user(&NewUser::new("mzielinska", "s3cret!", "m.zielinska@devicelab.com"))
        .unwrap();

    let user = service.get_user_by_id(id).unwrap().unwrap();
    assert!(user.active);
    assert_eq!(user.last_login, None);
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("password"));
    assert!(!json.contains("s3cret!"));

    let admin = service.get_user_by_username("admin").unwrap().unwrap();
    assert!(!serde_json::to_string(&admin).unwrap().contains("admin123"));
}

#[test]
fn user_uniqueness_and_login_tracking() {
    let service = seeded_service();

    let err = service
        .create_user(&NewUser::new("admin", "x", "other@devicelab.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict { table: "users", .. }));
    let err = service
        .create_user(&NewUser::new("nowy", "x", "admin@devicelab.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict { table: "users", .. }));
    assert!(matches!(
        service.create_user(&NewUser::new("nowy", "x", "not-an-email")),
        Err(RepoError::Validation(ValidationError::InvalidEmail(_)))
    ));

    let admin = service.get_user_by_username("admin").unwrap().unwrap();
    assert_eq!(service.record_login(admin.id).unwrap(), UpdateOutcome::Updated);
    let logged_in = service.get_user_by_id(admin.id).unwrap().unwrap();
    assert!(logged_in.last_login.is_some());
    assert_eq!(
        service.record_login(i64::MAX).unwrap(),
        UpdateOutcome::NotFound
    );

    let patch = UserPatch {
        email: Some("root@devicelab.com".to_string()),
        password: Some("changed".to_string()),
        ..UserPatch::default()
    };
    assert_eq!(service.update_user(admin.id, &patch).unwrap(), UpdateOutcome::Updated);
    assert_eq!(
        service.get_user_by_id(admin.id).unwrap().unwrap().email,
        "root@devicelab.com"
    );
    assert_eq!(
        service.update_user(admin.id, &UserPatch::default()).unwrap(),
        UpdateOutcome::NoOp
    );
}
