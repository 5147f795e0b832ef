use paillier_proximity::errors::ProximityError;
use paillier_proximity::keypair::SharedParams;
use paillier_proximity::protocol::threshold;
use paillier_proximity::{
    Coordinate, Location, Proximity, run_bounded_location_with, run_exact_distance,
    run_exact_distance_with, run_threshold_proximity_with,
};

use rand::SeedableRng;
use rand::rngs::StdRng;

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .unwrap();
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_line_number(false)
            .with_file(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    });
}

fn params() -> Result<SharedParams, ProximityError> {
    SharedParams::try_with(64, 16, 1 << 16)
}

#[test]
fn exact_distance_three_four_five() -> Result<(), ProximityError> {
    init_tracing();

    let mut rng = StdRng::seed_from_u64(1);
    let distance = run_exact_distance_with(
        &params()?,
        Coordinate::new(0, 0),
        Coordinate::new(3, 4),
        &mut rng,
    )?;
    assert_eq!(distance, 5.0);

    let distance = run_exact_distance_with(
        &params()?,
        Coordinate::new(1, 1),
        Coordinate::new(1, 1),
        &mut rng,
    )?;
    assert_eq!(distance, 0.0);

    Ok(())
}

#[test]
fn exact_distance_with_default_params() -> Result<(), ProximityError> {
    init_tracing();

    let distance = run_exact_distance(Coordinate::new(-7, 2), Coordinate::new(5, -3))?;
    assert_eq!(distance, 13.0);

    Ok(())
}

#[test]
fn threshold_proximity_near_and_far() -> Result<(), ProximityError> {
    init_tracing();

    let mut rng = StdRng::seed_from_u64(2);
    let near = run_threshold_proximity_with(
        &params()?,
        Coordinate::new(10, 10),
        Coordinate::new(21, 13),
        15,
        &mut rng,
    )?;
    assert_eq!(near, Proximity::Near);
    assert!(near.is_near());

    let far = run_threshold_proximity_with(
        &params()?,
        Coordinate::new(10, 10),
        Coordinate::new(150, 150),
        100,
        &mut rng,
    )?;
    assert_eq!(far, Proximity::Far);
    assert!(!far.is_near());

    Ok(())
}

#[test]
fn threshold_table_size_is_threshold_squared() -> Result<(), ProximityError> {
    init_tracing();

    let mut rng = StdRng::seed_from_u64(3);
    let params = params()?;
    let (_alice, query) =
        threshold::AliceSession::start(&params, Coordinate::new(10, 10), 15, &mut rng)?;
    let table = threshold::BobSession::new(params, Coordinate::new(21, 13))
        .respond(&query, &mut rng)?;
    assert_eq!(table.entries.len(), 225);

    Ok(())
}

#[test]
fn bounded_location_within_and_out_of_range() -> Result<(), ProximityError> {
    init_tracing();

    let mut rng = StdRng::seed_from_u64(4);
    let within = run_bounded_location_with(
        &params()?,
        Coordinate::new(10, 10),
        Coordinate::new(15, 15),
        50,
        &mut rng,
    )?;
    assert_eq!(within, Location::Within(Coordinate::new(15, 15)));

    let outside = run_bounded_location_with(
        &params()?,
        Coordinate::new(10, 10),
        Coordinate::new(200, 200),
        50,
        &mut rng,
    )?;
    assert_eq!(outside, Location::OutOfRange);
    assert_eq!(outside.coordinate(), None);

    Ok(())
}

#[test]
fn oversized_radius_is_rejected() -> Result<(), ProximityError> {
    init_tracing();

    let mut rng = StdRng::seed_from_u64(5);
    let small = SharedParams::try_with(64, 16, 100)?;
    let result = run_threshold_proximity_with(
        &small,
        Coordinate::new(0, 0),
        Coordinate::new(1, 1),
        11,
        &mut rng,
    );
    assert!(matches!(result, Err(ProximityError::InvalidParameters(_))));

    Ok(())
}

#[test]
fn seeded_runs_are_reproducible() -> Result<(), ProximityError> {
    init_tracing();

    let params = params()?;
    let query = |seed| -> Result<_, ProximityError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (_alice, query) =
            threshold::AliceSession::start(&params, Coordinate::new(3, 9), 4, &mut rng)?;
        Ok(query)
    };

    assert_eq!(query(6)?, query(6)?);
    assert_ne!(query(6)?, query(7)?);

    Ok(())
}
