use dive_deco_planner::ceiling::GradientFactors;
use dive_deco_planner::gas::Gas;
use dive_deco_planner::pressure::{DepthConverter, Salinity};
use dive_deco_planner::tissue::{LoadSegment, Tissues};

/// Ceiling in meters after an instant descent and `minutes` at `depth` on air.
fn planner_ceiling(depth: f64, minutes: f64) -> f64 {
    // dive-deco uses 1 bar per 10 m
    let converter = DepthConverter::new(Salinity::Brackish, 0.0);
    let mut tissues = Tissues::create(converter.surface_pressure());
    let air = Gas::nitrox(0.21).unwrap();
    tissues.load(&LoadSegment::flat(converter.to_bar(depth), minutes * 60.0), &air);

    let gradients = GradientFactors::new(1.0, 1.0, converter.surface_pressure());
    converter.from_bar(gradients.ceiling(&tissues))
}

#[cfg(feature = "std")]
#[test]
fn test_ceiling_against_dive_deco() {
    use dive_deco::{BuhlmannConfig, BuhlmannModel, DecoModel, Depth, Gas, Time};

    let dives = [(40.0, 30.0), (50.0, 20.0), (30.0, 60.0)];
    for (depth, minutes) in dives {
        let config = BuhlmannConfig::new().with_gradient_factors(100, 100);
        let mut model = BuhlmannModel::default();
        model.update_config(config);

        let air = Gas::new(0.21, 0.);
        model.record(Depth::from_meters(depth), Time::from_minutes(minutes), &air);
        let reference = model.ceiling().as_meters();
        let ceiling = planner_ceiling(depth, minutes);

        println!("DEPTH: {}m TIME: {}min - ceiling: {:.2}m - reference ceiling: {:.2}m", depth, minutes, ceiling, reference);
        assert!(reference > 0.0);
        assert!((ceiling - reference).abs() < 1.5);
    }
}

#[cfg(feature = "std")]
#[test]
fn test_deco_stops_against_dive_deco() {
    use dive_deco::{BuhlmannConfig, BuhlmannModel, DecoModel, DecoStage, DecoStageType, Depth, Time};
    use dive_deco_planner::{AlgorithmParams, BuhlmannAlgorithm, Gases, Options, SafetyStop, Segments};

    let config = BuhlmannConfig::new().with_gradient_factors(80, 80);
    let mut model = BuhlmannModel::default();
    model.update_config(config);

    let air = dive_deco::Gas::air();
    let bottom_depth = Depth::from_meters(50.);
    model.record_travel(bottom_depth, Time::from_seconds(150.), &air);
    model.record(bottom_depth, Time::from_seconds(20 * 60), &air);
    let runtime = model.deco(vec![air]).unwrap();
    let reference: f64 = runtime
        .deco_stages
        .iter()
        .filter(|stage: &&DecoStage| stage.stage_type == DecoStageType::DecoStop)
        .map(|stage| stage.duration.as_seconds())
        .sum();

    let (gases, planner_air) = Gases::with_bottom_gas(Gas::air());
    let mut segments = Segments::new();
    segments.add(0.0, 50.0, planner_air, 150);
    segments.add_flat(50.0, planner_air, 1200);
    let options = Options::default()
        .with_gradient_factors(0.8, 0.8)
        .with_salinity(Salinity::Brackish)
        .with_safety_stop(SafetyStop::Never)
        .with_ascent_speed(10.0);
    let params = AlgorithmParams::new(&segments, &gases, &options);
    let profile = BuhlmannAlgorithm::new().decompression(&params).unwrap();
    let stops: u32 = profile.segments[2..].iter().filter(|s| s.is_flat()).map(|s| s.duration).sum();

    println!("stop time: {} s - reference stop time: {:.0} s", stops, reference);
    assert!(reference > 0.0);
    assert!((stops as f64 - reference).abs() < 0.1 * reference);
}

#[test]
fn test_no_ceiling_for_short_shallow_dive() {
    assert_eq!(planner_ceiling(12.0, 20.0), 0.0);
}
