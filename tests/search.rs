use dive_deco_planner::search::{BinaryIntervalSearch, SearchContext};
use dive_deco_planner::DecoError;
use rand::Rng;

#[test]
fn test_finds_random_limits() {
    let mut rng = rand::rng();
    let context = SearchContext::new(1200, 0, 86_400);
    for _ in 0..100 {
        let limit = rng.random_range(0..86_000);
        let found = BinaryIntervalSearch::search(&context, |value| Ok(value <= limit)).unwrap();
        assert_eq!(found, limit);
    }
}

#[test]
fn test_search_steps_are_bounded() {
    let context = SearchContext::new(1200, 0, 86_400);
    let mut steps = 0;
    BinaryIntervalSearch::search(&context, |value| {
        steps += 1;
        Ok(value < 50_000)
    })
    .unwrap();
    assert!(steps < 40);
}

#[test]
fn test_starts_from_initial_value() {
    let context = SearchContext::new(10, 100, 1000);
    let found = BinaryIntervalSearch::search(&context, |value| {
        assert!(value >= 100);
        Ok(value < 333)
    })
    .unwrap();
    assert_eq!(found, 332);
}

#[test]
fn test_invalid_interval() {
    let context = SearchContext::new(10, 200, 100);
    let result = BinaryIntervalSearch::search(&context, |_| Ok(true));
    assert_eq!(result, Err(DecoError::InvalidSearchInterval { initial: 200, max: 100 }));

    let context = SearchContext::new(0, 0, 100);
    assert!(BinaryIntervalSearch::search(&context, |_| Ok(true)).is_err());
}

#[test]
fn test_unresolved_at_limit() {
    let context = SearchContext::new(60, 0, 1000);
    let result = BinaryIntervalSearch::search(&context, |_| Ok(true));
    assert_eq!(result, Err(DecoError::UnresolvedSearch { limit: 1000 }));
}

#[test]
fn test_predicate_error_is_propagated() {
    let context = SearchContext::new(60, 0, 1000);
    let result = BinaryIntervalSearch::search(&context, |value| {
        if value > 100 {
            return Err(DecoError::NegativeSurfaceInterval(-1.0));
        }
        Ok(true)
    });
    assert_eq!(result, Err(DecoError::NegativeSurfaceInterval(-1.0)));
}
