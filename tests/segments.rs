use dive_deco_planner::{GasId, Segment, Segments};

const AIR: GasId = GasId(0);
const EAN50: GasId = GasId(1);

fn square_profile() -> Segments {
    let mut segments = Segments::new();
    segments.add(0.0, 30.0, AIR, 120);
    segments.add_flat(30.0, AIR, 600);
    segments.add_change_to(20.0, AIR, 60);
    segments.add_flat(20.0, AIR, 600);
    segments
}

#[test]
fn test_profile_summary() {
    let segments = square_profile();
    assert_eq!(segments.len(), 4);
    assert_eq!(segments.duration(), 1380);
    assert_eq!(segments.max_depth(), 30.0);
    assert_eq!(segments.current_depth(), 20.0);
    assert_eq!(segments.last(), Some(&Segment::new(20.0, 20.0, AIR, 600)));
}

#[test]
fn test_segment_speed() {
    let descent = Segment::new(0.0, 30.0, AIR, 120);
    assert_eq!(descent.speed(), 0.25);
    assert_eq!(descent.average_depth(), 15.0);
    assert!(!descent.is_flat());
    assert_eq!(Segment::new(10.0, 10.0, AIR, 0).speed(), 0.0);
}

#[test]
fn test_depth_at() {
    let segments = square_profile();
    assert_eq!(segments.depth_at(0), 0.0);
    assert_eq!(segments.depth_at(60), 15.0);
    assert_eq!(segments.depth_at(500), 30.0);
    assert!((segments.depth_at(750) - 25.0).abs() < 1e-9);
    assert_eq!(segments.depth_at(100_000), 20.0);
}

#[test]
fn test_deepest_part() {
    let segments = square_profile();
    let deepest = segments.deepest_part();
    assert_eq!(deepest.len(), 2);
    assert_eq!(Segments::average_depth(deepest), 27.5);
    assert_eq!(Segments::average_depth(&[]), 0.0);
}

#[test]
fn test_remove_reconnects_legs() {
    let mut segments = square_profile();
    let removed = segments.remove(1);
    assert_eq!(removed, Some(Segment::new(30.0, 30.0, AIR, 600)));
    assert_eq!(segments.items()[1], Segment::new(30.0, 20.0, AIR, 60));

    segments.remove(0);
    assert_eq!(segments.items()[0].start_depth, 0.0);
    assert_eq!(segments.remove(10), None);
}

#[test]
fn test_merge_joins_same_gas_and_speed() {
    let mut segments = Segments::new();
    segments.add(0.0, 30.0, AIR, 120);
    segments.add_flat(30.0, AIR, 600);
    segments.add(30.0, 27.0, AIR, 30);
    segments.add(27.0, 24.0, AIR, 30);
    segments.add_flat(24.0, AIR, 60);
    segments.add_flat(24.0, EAN50, 60);
    segments.add_flat(24.0, EAN50, 120);

    let merged = segments.merge_flat(2);
    assert_eq!(
        merged,
        vec![
            Segment::new(0.0, 30.0, AIR, 120),
            Segment::new(30.0, 30.0, AIR, 600),
            Segment::new(30.0, 24.0, AIR, 60),
            Segment::new(24.0, 24.0, AIR, 60),
            Segment::new(24.0, 24.0, EAN50, 180),
        ]
    );
}

#[test]
fn test_merge_keeps_user_legs() {
    let mut segments = Segments::new();
    segments.add(0.0, 10.0, AIR, 60);
    segments.add(10.0, 20.0, AIR, 60);

    assert_eq!(segments.merge_flat(2).len(), 2);
    assert_eq!(segments.merge_flat(0), vec![Segment::new(0.0, 20.0, AIR, 120)]);
}
