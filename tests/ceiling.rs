use dive_deco_planner::ceiling::{max_ceiling, tolerated_pressure, GradientFactors, GF_LOW_POSITION_MIN};
use dive_deco_planner::gas::Gas;
use dive_deco_planner::pressure::DepthConverter;
use dive_deco_planner::tissue::{LoadSegment, Tissue, Tissues};
use rand::Rng;

fn loaded_tissues(converter: &DepthConverter, depth: f64, seconds: f64) -> Tissues {
    let mut tissues = Tissues::create(converter.surface_pressure());
    let descent = LoadSegment::new(converter.surface_pressure(), 120.0, depth * converter.bar_per_meter() / 120.0);
    tissues.load(&descent, &Gas::air());
    tissues.load(&LoadSegment::flat(converter.to_bar(depth), seconds), &Gas::air());
    tissues
}

#[test]
fn test_ceiling_with_high_n2_load() {
    let tissue = Tissue {
        load_n2: 5.0,
        load_he: 0.0,
    };
    assert!(tolerated_pressure(&tissue, 0, 1.0) > 1.0);
}

#[test]
fn test_ceiling_with_high_he_load() {
    let tissue = Tissue {
        load_n2: 0.0,
        load_he: 5.0,
    };
    assert!(tolerated_pressure(&tissue, 0, 1.0) > 1.0);
}

#[test]
fn test_lower_gradient_factor_is_deeper() {
    let tissue = Tissue {
        load_n2: 2.5,
        load_he: 0.5,
    };
    for i in 0..16 {
        assert!(tolerated_pressure(&tissue, i, 0.3) > tolerated_pressure(&tissue, i, 0.8));
    }
}

#[test]
fn test_max_ceiling_with_multiple_tissues() {
    let mut loaded = [Tissue::default(); 16];
    for (i, tissue) in loaded.iter_mut().enumerate() {
        tissue.load_n2 = 1.0 + i as f64 * 0.1;
    }
    let tissues = Tissues::from_loaded(&loaded).unwrap();
    let (pressure, index) = max_ceiling(&tissues, 1.0);

    for (i, tissue) in loaded.iter().enumerate() {
        assert!(tolerated_pressure(tissue, i, 1.0) <= pressure);
    }
    assert!((tolerated_pressure(&loaded[index], index, 1.0) - pressure).abs() < 1e-12);
}

#[test]
fn test_surface_tissues_have_no_ceiling() {
    let converter = DepthConverter::for_salt_water();
    let tissues = Tissues::create(converter.surface_pressure());
    let gradients = GradientFactors::new(0.4, 0.85, converter.surface_pressure());
    assert_eq!(converter.from_bar(gradients.ceiling(&tissues)), 0.0);
}

#[test]
fn test_first_stop_stays_fixed() {
    let converter = DepthConverter::for_salt_water();
    let mut tissues = loaded_tissues(&converter, 50.0, 1500.0);
    let mut gradients = GradientFactors::new(0.3, 0.7, converter.surface_pressure());
    assert_eq!(gradients.first_stop_pressure(), None);

    gradients.fix_first_stop(&tissues);
    let first_stop = gradients.first_stop_pressure().unwrap();
    assert!(first_stop > converter.surface_pressure() + GF_LOW_POSITION_MIN);

    tissues.load(&LoadSegment::flat(converter.to_bar(9.0), 1200.0), &Gas::air());
    gradients.ceiling(&tissues);
    assert_eq!(gradients.first_stop_pressure(), Some(first_stop));
}

#[test]
fn test_unfixed_first_stop_follows_tissues() {
    let converter = DepthConverter::for_salt_water();
    let tissues = loaded_tissues(&converter, 40.0, 1200.0);
    let unfixed = GradientFactors::new(0.3, 0.7, converter.surface_pressure());
    let mut fixed = unfixed;
    fixed.fix_first_stop(&tissues);

    assert_eq!(unfixed.ceiling(&tissues), fixed.ceiling(&tissues));
}

#[test]
fn test_shallow_first_stop_is_kept_below_surface() {
    let converter = DepthConverter::for_salt_water();
    let tissues = loaded_tissues(&converter, 12.0, 600.0);
    let mut gradients = GradientFactors::new(0.3, 0.7, converter.surface_pressure());
    gradients.fix_first_stop(&tissues);

    assert_eq!(
        gradients.first_stop_pressure(),
        Some(converter.surface_pressure() + GF_LOW_POSITION_MIN)
    );
}

#[test]
fn test_ceiling_between_gradient_factors() {
    let converter = DepthConverter::for_salt_water();
    let tissues = loaded_tissues(&converter, 45.0, 1500.0);

    let interpolated = GradientFactors::new(0.3, 0.7, converter.surface_pressure()).ceiling(&tissues);
    let low = GradientFactors::new(0.3, 0.3, converter.surface_pressure()).ceiling(&tissues);
    let high = GradientFactors::new(0.7, 0.7, converter.surface_pressure()).ceiling(&tissues);

    assert!(interpolated <= low + 1e-9);
    assert!(interpolated >= high - 1e-9);
}

#[test]
fn test_longer_stop_never_raises_ceiling() {
    let converter = DepthConverter::for_salt_water();
    let tissues = loaded_tissues(&converter, 40.0, 1800.0);
    let mut gradients = GradientFactors::new(0.4, 0.85, converter.surface_pressure());
    gradients.fix_first_stop(&tissues);

    let mut rng = rand::rng();
    for _ in 0..20 {
        let stop = converter.to_bar(3.0 * rng.random_range(1..=3) as f64);
        let mut durations: Vec<f64> = (0..20).map(|_| rng.random_range(0.0..10800.0)).collect();
        durations.sort_by(f64::total_cmp);

        let mut previous = f64::INFINITY;
        for seconds in durations {
            let mut at_stop = tissues;
            at_stop.load(&LoadSegment::flat(stop, seconds), &Gas::air());
            let ceiling = converter.from_bar(gradients.ceiling(&at_stop));
            assert!(ceiling <= previous + 1e-9);
            previous = ceiling;
        }
    }
}
