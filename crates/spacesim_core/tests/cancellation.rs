use spacesim_core::db::open_db_in_memory;
use spacesim_core::{
    CancelHandle, Commodity, CommodityMarketRepository, CommodityRepository, NewCommodityMarket,
    RepoError, SolarSystem, SolarSystemRepository, SqliteCommodityMarketRepository,
    SqliteCommodityRepository, SqliteSolarSystemRepository,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Calls `cancel` every 20ms until `finished` is set.
fn spawn_canceller(handle: CancelHandle, finished: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !finished.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(20));
            handle.cancel();
        }
    })
}

#[test]
fn cancel_handle_interrupts_a_running_statement() {
    let conn = open_db_in_memory().unwrap();
    let finished = Arc::new(AtomicBool::new(false));
    let canceller = spawn_canceller(
        CancelHandle::for_connection(&conn),
        Arc::clone(&finished),
    );

    let result: rusqlite::Result<i64> = conn.query_row(
        "WITH RECURSIVE counter(x) AS (
            SELECT 1
            UNION ALL
            SELECT x + 1 FROM counter
         )
         SELECT COUNT(*) FROM counter;",
        [],
        |row| row.get(0),
    );
    finished.store(true, Ordering::SeqCst);
    canceller.join().unwrap();

    let err = RepoError::from_sqlite("test.count", result.unwrap_err());
    assert!(err.is_cancelled());
    assert!(matches!(err, RepoError::Cancelled { operation: "test.count" }));
}

#[test]
fn cancelled_cascade_leaves_system_and_markets_intact() {
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

    // Deleting the parent row runs a billion-row cross join first.
    conn.execute_batch(
        "CREATE TEMP TABLE filler (n INTEGER NOT NULL);
         WITH RECURSIVE seq(x) AS (
             SELECT 1
             UNION ALL
             SELECT x + 1 FROM seq WHERE x < 1000
         )
         INSERT INTO filler (n) SELECT x FROM seq;
         CREATE TEMP TRIGGER slow_solar_system_delete
         BEFORE DELETE ON solar_systems
         BEGIN
             SELECT COUNT(*) FROM filler a, filler b, filler c;
         END;",
    )
    .unwrap();

    let finished = Arc::new(AtomicBool::new(false));
    let canceller = spawn_canceller(
        CancelHandle::for_connection(&conn),
        Arc::clone(&finished),
    );
    let result = systems.remove_cascade(&sol.id);
    finished.store(true, Ordering::SeqCst);
    canceller.join().unwrap();

    let err = result.unwrap_err();
    assert!(err.is_cancelled(), "unexpected error: {err}");
    assert_eq!(systems.get_by_id(&sol.id).unwrap(), sol);
    let remaining = markets.list_by_solar_system_id(&sol.id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].commodity_id, water.id);
}
