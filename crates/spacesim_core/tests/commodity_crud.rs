use spacesim_core::db::open_db_in_memory;
use spacesim_core::{
    CascadeStep, Commodity, CommodityMarketRepository, CommodityRepository, CommodityService,
    CommodityUpdate, NewCommodityMarket, PaginationConfig, RepoError, ServiceError, SolarSystem,
    SolarSystemRepository, SqliteCommodityMarketRepository, SqliteCommodityRepository,
    SqliteSolarSystemRepository,
};
use std::collections::HashSet;

#[test]
fn create_generates_id_and_ignores_client_supplied_one() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();

    let mut draft = Commodity::new("Water", 1.0, 1.0);
    draft.id = "client-chosen".to_string();
    let created = repo.create(&draft).unwrap();

    assert!(!created.id.is_empty());
    assert_ne!(created.id, "client-chosen");
    assert_eq!(created.name, "Water");
    assert_eq!(repo.get_by_id(&created.id).unwrap(), created);
    assert!(repo.get_by_id("client-chosen").unwrap_err().is_not_found());
}

#[test]
fn generated_ids_are_unique() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();

    let ids: HashSet<String> = (0..50)
        .map(|index| {
            repo.create(&Commodity::new(format!("c{index}"), 0.0, 0.0))
                .unwrap()
                .id
        })
        .collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn get_missing_commodity_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();

    let err = repo.get_by_id("missing").unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { entity: "commodity", ref id } if id == "missing"
    ));
}

#[test]
fn update_replaces_mass_and_volume_together() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();
    let created = repo.create(&Commodity::new("Ore", 2.5, 0.5)).unwrap();

    let updated = repo
        .update(
            &created.id,
            &CommodityUpdate {
                unit_mass: 3.0,
                unit_volume: 0.75,
            },
        )
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Ore");
    assert_eq!(updated.unit_mass, 3.0);
    assert_eq!(updated.unit_volume, 0.75);
    assert_eq!(repo.get_by_id(&created.id).unwrap(), updated);
}

#[test]
fn update_missing_commodity_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();

    let err = repo
        .update(
            "missing",
            &CommodityUpdate {
                unit_mass: 1.0,
                unit_volume: 1.0,
            },
        )
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn removing_a_nonexistent_commodity_twice_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();

    repo.remove("never-existed").unwrap();
    repo.remove("never-existed").unwrap();
}

#[test]
fn remove_deletes_the_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();
    let created = repo.create(&Commodity::new("Fuel", 0.8, 1.0)).unwrap();

    repo.remove(&created.id).unwrap();
    assert!(repo.get_by_id(&created.id).unwrap_err().is_not_found());
}

#[test]
fn negative_mass_is_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();

    let err = repo.create(&Commodity::new("Antimatter", -1.0, 1.0)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation {
            operation: "commodity.create",
            ..
        }
    ));
}

#[test]
fn non_finite_values_are_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommodityRepository::try_new(&conn).unwrap();

    let err = repo
        .create(&Commodity::new("Void", f64::NAN, 1.0))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidInput(_)));

    let created = repo.create(&Commodity::new("Dust", 0.1, 0.1)).unwrap();
    let err = repo
        .update(
            &created.id,
            &CommodityUpdate {
                unit_mass: 1.0,
                unit_volume: f64::INFINITY,
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidInput(_)));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err = SqliteCommodityRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn store_rejects_removing_a_commodity_still_traded() {
    let conn = open_db_in_memory().unwrap();
    let commodities = SqliteCommodityRepository::try_new(&conn).unwrap();
    let systems = SqliteSolarSystemRepository::try_new(&conn).unwrap();
    let markets = SqliteCommodityMarketRepository::try_new(&conn).unwrap();

    let water = commodities.create(&Commodity::new("Water", 1.0, 1.0)).unwrap();
    let sol = systems.create(&SolarSystem::new("Sol")).unwrap();
    markets
        .create(&NewCommodityMarket {
            solar_system_id: sol.id.clone(),
            commodity_id: water.id.clone(),
            base_price: 100.0,
            demand_quantity: 50,
        })
        .unwrap();

    let err = commodities.remove(&water.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation {
            operation: "commodity.remove",
            ..
        }
    ));
    assert!(commodities.get_by_id(&water.id).is_ok());
}

#[test]
fn service_remove_clears_markets_of_the_commodity_only() {
    let conn = open_db_in_memory().unwrap();
    let systems = SqliteSolarSystemRepository::try_new(&conn).unwrap();
    let markets = SqliteCommodityMarketRepository::try_new(&conn).unwrap();
    let service = CommodityService::new(
        SqliteCommodityRepository::try_new(&conn).unwrap(),
        PaginationConfig::default(),
    );

    let water = service.create(&Commodity::new("Water", 1.0, 1.0)).unwrap();
    let ore = service.create(&Commodity::new("Ore", 5.0, 1.0)).unwrap();
    let sol = systems.create(&SolarSystem::new("Sol")).unwrap();
    for commodity_id in [&water.id, &ore.id] {
        markets
            .create(&NewCommodityMarket {
                solar_system_id: sol.id.clone(),
                commodity_id: commodity_id.clone(),
                base_price: 10.0,
                demand_quantity: 5,
            })
            .unwrap();
    }

    service.remove(&water.id).unwrap();

    assert!(service.find(&water.id).unwrap_err().is_not_found());
    let remaining = markets.list_by_solar_system_id(&sol.id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].commodity_id, ore.id);
    assert_eq!(remaining[0].commodity_name, "Ore");
}

#[test]
fn service_remove_of_missing_commodity_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let service = CommodityService::new(
        SqliteCommodityRepository::try_new(&conn).unwrap(),
        PaginationConfig::default(),
    );

    service.remove("ghost").unwrap();
    service.remove("ghost").unwrap();
}

#[test]
fn remove_with_markets_reports_removed_market_count() {
    let conn = open_db_in_memory().unwrap();
    let commodities = SqliteCommodityRepository::try_new(&conn).unwrap();
    let systems = SqliteSolarSystemRepository::try_new(&conn).unwrap();
    let markets = SqliteCommodityMarketRepository::try_new(&conn).unwrap();

    let water = commodities.create(&Commodity::new("Water", 1.0, 1.0)).unwrap();
    for name in ["Sol", "Vega"] {
        let system = systems.create(&SolarSystem::new(name)).unwrap();
        markets
            .create(&NewCommodityMarket {
                solar_system_id: system.id,
                commodity_id: water.id.clone(),
                base_price: 10.0,
                demand_quantity: 1,
            })
            .unwrap();
    }

    assert_eq!(commodities.remove_with_markets(&water.id).unwrap(), 2);
    assert!(commodities.get_by_id(&water.id).unwrap_err().is_not_found());
    assert_eq!(commodities.remove_with_markets(&water.id).unwrap(), 0);
}

#[test]
fn failed_commodity_delete_keeps_its_markets() {
    let conn = open_db_in_memory().unwrap();
    let systems = SqliteSolarSystemRepository::try_new(&conn).unwrap();
    let markets = SqliteCommodityMarketRepository::try_new(&conn).unwrap();
    let service = CommodityService::new(
        SqliteCommodityRepository::try_new(&conn).unwrap(),
        PaginationConfig::default(),
    );

    let water = service.create(&Commodity::new("Water", 1.0, 1.0)).unwrap();
    let sol = systems.create(&SolarSystem::new("Sol")).unwrap();
    markets
        .create(&NewCommodityMarket {
            solar_system_id: sol.id.clone(),
            commodity_id: water.id.clone(),
            base_price: 100.0,
            demand_quantity: 50,
        })
        .unwrap();
    conn.execute_batch(
        "CREATE TEMP TRIGGER block_commodity_delete
         BEFORE DELETE ON commodities
         BEGIN
             SELECT RAISE(ABORT, 'blocked');
         END;",
    )
    .unwrap();

    let err = service.remove(&water.id).unwrap_err();
    match err {
        ServiceError::Repo { operation, source } => {
            assert_eq!(operation, "removing commodity");
            assert!(matches!(
                source,
                RepoError::TransactionFailure {
                    step: CascadeStep::DeleteCommodity,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(service.find(&water.id).unwrap(), water);
    let remaining = markets.list_by_solar_system_id(&sol.id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].commodity_name, "Water");
}
