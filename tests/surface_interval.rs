use dive_deco_planner::pressure::{altitude_pressure, STANDARD_PRESSURE};
use dive_deco_planner::tissue::LoadSegment;
use dive_deco_planner::{BuhlmannAlgorithm, DecoError, Gas, Tissue, Tissues};

fn loaded_after_dive() -> [Tissue; 16] {
    let mut tissues = Tissues::create(STANDARD_PRESSURE);
    tissues.load(&LoadSegment::flat(5.0, 1800.0), &Gas::air());
    tissues.to_loaded()
}

#[test]
fn test_infinite_interval_resets_tissues() {
    let algorithm = BuhlmannAlgorithm::new();
    let rested = algorithm
        .apply_surface_interval(&loaded_after_dive(), 0.0, f64::INFINITY)
        .unwrap();
    assert_eq!(rested, Tissues::create(STANDARD_PRESSURE).to_loaded());

    let at_altitude = algorithm
        .apply_surface_interval(&loaded_after_dive(), 1500.0, f64::INFINITY)
        .unwrap();
    assert_eq!(at_altitude, Tissues::create(altitude_pressure(1500.0)).to_loaded());
}

#[test]
fn test_interval_off_gasses() {
    let algorithm = BuhlmannAlgorithm::new();
    let loaded = loaded_after_dive();
    let short = algorithm.apply_surface_interval(&loaded, 0.0, 600.0).unwrap();
    let long = algorithm.apply_surface_interval(&loaded, 0.0, 6.0 * 3600.0).unwrap();
    let saturated = Tissue::at_surface(STANDARD_PRESSURE);

    for i in 0..16 {
        assert!(short[i].load_n2 < loaded[i].load_n2);
        assert!(long[i].load_n2 < short[i].load_n2);
        assert!(long[i].load_n2 > saturated.load_n2);
    }
}

#[test]
fn test_zero_interval_keeps_tissues() {
    let loaded = loaded_after_dive();
    let kept = BuhlmannAlgorithm::new().apply_surface_interval(&loaded, 0.0, 0.0).unwrap();
    for (k, l) in kept.iter().zip(loaded.iter()) {
        assert!((k.load_n2 - l.load_n2).abs() < 1e-12);
        assert_eq!(k.load_he, 0.0);
    }
}

#[test]
fn test_invalid_interval() {
    let algorithm = BuhlmannAlgorithm::new();
    let loaded = loaded_after_dive();

    assert_eq!(
        algorithm.apply_surface_interval(&loaded, 0.0, -1.0),
        Err(DecoError::NegativeSurfaceInterval(-1.0))
    );
    assert!(algorithm.apply_surface_interval(&loaded, 0.0, f64::NAN).is_err());
    assert_eq!(
        algorithm.apply_surface_interval(&loaded, -10.0, 60.0),
        Err(DecoError::NegativeAltitude(-10.0))
    );
    assert_eq!(
        algorithm.apply_surface_interval(&loaded[..10], 0.0, 60.0),
        Err(DecoError::InvalidTissueCount { expected: 16, found: 10 })
    );
}
