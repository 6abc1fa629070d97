use dive_deco_planner::{
    AirBreakOptions, AlgorithmParams, BuhlmannAlgorithm, Gas, GasId, Gases, Options, SafetyStop, Segment, Segments,
};

struct TechDive {
    gases: Gases,
    trimix: GasId,
    ean50: GasId,
    oxygen: GasId,
}

fn tech_dive(trimix: Gas) -> TechDive {
    let (mut gases, trimix) = Gases::with_bottom_gas(trimix);
    let ean50 = gases.add_deco_gas(Gas::nitrox(0.5).unwrap());
    let oxygen = gases.add_deco_gas(Gas::oxygen());
    TechDive {
        gases,
        trimix,
        ean50,
        oxygen,
    }
}

fn normoxic_dive() -> TechDive {
    tech_dive(Gas::trimix(0.18, 0.45).unwrap())
}

fn hypoxic_dive() -> TechDive {
    tech_dive(Gas::trimix(0.1, 0.7).unwrap())
}

fn options(air_breaks: bool) -> Options {
    Options::default()
        .with_last_stop_depth(6.0)
        .with_safety_stop(SafetyStop::Never)
        .with_air_breaks(AirBreakOptions {
            enabled: air_breaks,
            ..AirBreakOptions::default()
        })
}

fn six_meter_legs(dive: &TechDive, bottom: u32, options: &Options) -> Vec<Segment> {
    let mut segments = Segments::new();
    segments.add(0.0, 75.0, dive.trimix, 250);
    segments.add_flat(75.0, dive.trimix, bottom);

    let params = AlgorithmParams::new(&segments, &dive.gases, options);
    let profile = BuhlmannAlgorithm::new().decompression(&params).unwrap();

    profile.segments[2..]
        .iter()
        .filter(|s| s.is_flat() && s.start_depth == 6.0)
        .copied()
        .collect()
}

fn total(legs: &[Segment]) -> u32 {
    legs.iter().map(|s| s.duration).sum()
}

#[test]
fn test_long_oxygen_stop_is_interrupted() {
    let dive = normoxic_dive();
    let legs = six_meter_legs(&dive, 1200, &options(true));

    assert_eq!(legs.len(), 3);
    // gas switch minute counts into the first oxygen period
    assert_eq!((legs[0].gas, legs[0].duration), (dive.oxygen, 1200));
    assert_eq!((legs[1].gas, legs[1].duration), (dive.trimix, 300));
    assert_eq!((legs[2].gas, legs[2].duration), (dive.oxygen, 224));
}

#[test]
fn test_breaks_dont_change_stop_length() {
    let dive = normoxic_dive();
    let with_breaks = six_meter_legs(&dive, 1200, &options(true));
    let without_breaks = six_meter_legs(&dive, 1200, &options(false));

    assert_eq!(without_breaks.len(), 1);
    assert_eq!(without_breaks[0].gas, dive.oxygen);
    assert_eq!(total(&with_breaks), total(&without_breaks));
}

#[test]
fn test_short_oxygen_stop_has_no_breaks() {
    let dive = normoxic_dive();
    let legs = six_meter_legs(&dive, 530, &options(true));

    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].gas, dive.oxygen);
    assert!(legs[0].duration <= 1200);
}

#[test]
fn test_hypoxic_bottom_gas_breaks_on_deco_gas() {
    let dive = hypoxic_dive();
    let conservative = |air_breaks: bool| options(air_breaks).with_gradient_factors(0.3, 0.7);
    let legs = six_meter_legs(&dive, 530, &conservative(true));
    let without_breaks = six_meter_legs(&dive, 530, &conservative(false));

    assert_eq!(legs.len(), 3);
    assert_eq!((legs[0].gas, legs[0].duration), (dive.oxygen, 1200));
    assert_eq!((legs[1].gas, legs[1].duration), (dive.ean50, 300));
    assert_eq!(legs[2].gas, dive.oxygen);

    let stop = total(&without_breaks);
    assert_eq!(total(&legs), stop);
    assert_eq!(legs[2].duration, stop - 1500);
    assert!(legs[2].duration > 0 && legs[2].duration < 1200);
}
