use sea_orm::{Database, DatabaseConnection};

use engine::{
    CatalogVariant, ControlVariables, Engine, EngineError, Packaging, PriceTier, PriceTiers,
    ScenarioDraft, TierLabel, UnitCosts, Worksheet, WorksheetState,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn variant(code: &str, foreign: f64, units_per_carton: u32) -> CatalogVariant {
    CatalogVariant {
        id: Uuid::new_v4(),
        brand: "Acme".to_string(),
        model: format!("Model {code}"),
        code: code.to_string(),
        description: format!("{code} description"),
        packaging: Packaging {
            units_per_carton,
            length_cm: 50.0,
            width_cm: 40.0,
            height_cm: 30.0,
        },
        costs: UnitCosts {
            foreign,
            local: 0.0,
        },
        prices: PriceTiers {
            standard: 120.0,
            online: 110.0,
            proposal: 100.0,
        },
    }
}

async fn seeded_engine() -> (Engine, Vec<CatalogVariant>) {
    let (engine, _db) = engine_with_db().await;
    let variants = vec![variant("B-200", 20.0, 6), variant("A-100", 10.0, 12)];
    assert_eq!(engine.upsert_variants(&variants).await.unwrap(), 2);
    (engine, variants)
}

fn tuples(worksheet: &Worksheet) -> Vec<(Uuid, u32, f64)> {
    worksheet
        .lines()
        .iter()
        .map(|line| (line.variant.id, line.quantity, line.target_price))
        .collect()
}

#[tokio::test]
async fn catalog_is_listed_in_code_order_and_upsert_replaces() {
    let (engine, mut variants) = seeded_engine().await;

    let listed = engine.list_purchasable_variants().await.unwrap();
    let codes: Vec<&str> = listed.iter().map(|v| v.code.as_str()).collect();
    assert_eq!(codes, vec!["A-100", "B-200"]);

    variants[0].prices.standard = 99.0;
    engine.upsert_variants(&variants[..1]).await.unwrap();
    let fetched = engine.catalog_variant(variants[0].id).await.unwrap().unwrap();
    assert_eq!(fetched, variants[0]);
    assert_eq!(engine.list_purchasable_variants().await.unwrap().len(), 2);

    assert!(engine.catalog_variant(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_rejects_non_finite_amounts_and_writes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let mut broken = variant("C-300", 10.0, 4);
    broken.prices.online = f64::NAN;
    let variants = vec![variant("A-100", 10.0, 12), broken];

    let err = engine.upsert_variants(&variants).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.list_purchasable_variants().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_then_load_restores_controls_and_lines() {
    let (engine, variants) = seeded_engine().await;

    let mut worksheet = Worksheet::new();
    worksheet.switch_tier(PriceTier::Online);
    worksheet.add_line(Some(&variants[0]), 12).unwrap();
    let second = worksheet.add_line(Some(&variants[1]), 30).unwrap();
    worksheet.set_manual_price(second, 42.5).unwrap();
    worksheet
        .set_controls(ControlVariables {
            exchange_rate: 4.5,
            duty_exempt: false,
            manual_duty_percent: 8.0,
            ..Default::default()
        })
        .unwrap();
    let before = tuples(&worksheet);
    let controls = *worksheet.controls();
    let landed: Vec<f64> = worksheet
        .rows()
        .iter()
        .map(|row| row.costs.landed_unit_cost)
        .collect();

    let id = worksheet.save(&engine, "  Q4 order ").await.unwrap();
    assert_eq!(worksheet.state(), WorksheetState::Saved);

    let mut fresh = Worksheet::new();
    fresh.load(&engine, id, false).await.unwrap();

    assert_eq!(fresh.state(), WorksheetState::Loaded);
    assert_eq!(fresh.scenario_id(), Some(id));
    assert_eq!(*fresh.controls(), controls);
    assert_eq!(tuples(&fresh), before);
    assert!(
        fresh
            .lines()
            .iter()
            .all(|line| line.tier_label == TierLabel::Manual)
    );
    let reloaded: Vec<f64> = fresh
        .rows()
        .iter()
        .map(|row| row.costs.landed_unit_cost)
        .collect();
    assert_eq!(reloaded, landed);

    let scenario = engine.load_scenario(id).await.unwrap();
    assert_eq!(scenario.name, "Q4 order");
    assert_eq!(scenario.lines[1].captured, variants[1].prices);
}

#[tokio::test]
async fn saving_twice_creates_two_scenarios() {
    let (engine, variants) = seeded_engine().await;
    let mut worksheet = Worksheet::new();
    worksheet.add_line(Some(&variants[0]), 1).unwrap();

    let first = worksheet.save(&engine, "Draft").await.unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    worksheet.add_line(Some(&variants[1]), 2).unwrap();
    let second = worksheet.save(&engine, "Draft").await.unwrap();
    assert_ne!(first, second);

    let listed = engine.list_saved_scenarios().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second);
    assert_eq!(listed[0].line_count, 2);
    assert_eq!(listed[1].id, first);
    assert_eq!(listed[1].line_count, 1);
}

#[tokio::test]
async fn empty_scenario_round_trips() {
    let (engine, _db) = engine_with_db().await;
    let id = engine
        .save_scenario(&ScenarioDraft {
            name: "Nothing yet".to_string(),
            controls: ControlVariables::default(),
            lines: vec![],
        })
        .await
        .unwrap();

    let scenario = engine.load_scenario(id).await.unwrap();
    assert!(scenario.lines.is_empty());
    assert_eq!(scenario.controls, ControlVariables::default());
    assert_eq!(engine.list_saved_scenarios().await.unwrap()[0].line_count, 0);
}

#[tokio::test]
async fn loading_unknown_scenario_keeps_worksheet() {
    let (engine, variants) = seeded_engine().await;
    let mut worksheet = Worksheet::new();
    worksheet.add_line(Some(&variants[0]), 3).unwrap();
    let before = tuples(&worksheet);

    let err = worksheet
        .load(&engine, Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(tuples(&worksheet), before);
    assert_eq!(worksheet.state(), WorksheetState::Editing);
    assert!(worksheet.in_flight().is_none());
}

#[tokio::test]
async fn loading_over_unsaved_lines_needs_confirmation() {
    let (engine, variants) = seeded_engine().await;
    let mut saved = Worksheet::new();
    saved.add_line(Some(&variants[1]), 5).unwrap();
    let id = saved.save(&engine, "Saved").await.unwrap();

    let mut worksheet = Worksheet::new();
    worksheet.add_line(Some(&variants[0]), 1).unwrap();
    let err = worksheet.load(&engine, id, false).await.unwrap_err();
    assert!(matches!(err, EngineError::ConfirmationRequired(_)));
    assert_eq!(worksheet.lines().len(), 1);

    worksheet.load(&engine, id, true).await.unwrap();
    assert_eq!(worksheet.lines()[0].variant.id, variants[1].id);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (engine, variants) = seeded_engine().await;
    let mut worksheet = Worksheet::new();
    worksheet.add_line(Some(&variants[0]), 4).unwrap();
    let id = worksheet.save(&engine, "Gone soon").await.unwrap();

    engine.delete_scenario(id).await.unwrap();
    engine.delete_scenario(id).await.unwrap();
    engine.delete_scenario(Uuid::new_v4()).await.unwrap();

    assert!(engine.list_saved_scenarios().await.unwrap().is_empty());
    let err = engine.load_scenario(id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn blank_name_is_rejected_before_reaching_the_store() {
    let (engine, variants) = seeded_engine().await;
    let mut worksheet = Worksheet::new();
    worksheet.add_line(Some(&variants[0]), 4).unwrap();

    let err = worksheet.save(&engine, "   ").await.unwrap_err();
    assert_eq!(err, EngineError::MissingName("scenario".to_string()));
    assert!(engine.list_saved_scenarios().await.unwrap().is_empty());
    assert_eq!(worksheet.state(), WorksheetState::Editing);
}
