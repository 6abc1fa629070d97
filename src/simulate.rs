use crate::context::AlgorithmContext;
use crate::segments::Segment;
use crate::tissue::LoadSegment;
use crate::DecoError;

/// Feeds a leg already appended to the context profile into the tissues and
/// moves the run time. Returns the summed change of tissue loading.
///
/// Without statistics the whole leg is one Schreiner step, otherwise it is
/// sliced per second and every second is recorded.
pub fn swim(context: &mut AlgorithmContext, segment: &Segment) -> Result<f64, DecoError> {
    let gas = context.gas(segment.gas)?;
    let speed = segment.speed() * context.converter.bar_per_meter();

    if !context.collects_statistics() {
        let start_pressure = context.converter.to_bar(segment.start_depth);
        let load = LoadSegment::new(start_pressure, segment.duration as f64, speed);
        let change = context.tissues.load(&load, &gas);
        context.run_time += segment.duration;
        return Ok(change);
    }

    let mut change = 0.0;
    for elapsed in 0..segment.duration {
        let start_pressure = context.converter.to_bar(segment.depth_at(elapsed));
        let load = LoadSegment::new(start_pressure, 1.0, speed);
        change += context.tissues.load(&load, &gas);
        context.run_time += 1;
        context.record_statistics(segment.depth_at(elapsed + 1));
    }
    Ok(change)
}

/// Appends the legs to the context profile and swims them in order.
pub fn replay(context: &mut AlgorithmContext, segments: &[Segment]) -> Result<(), DecoError> {
    for segment in segments.iter() {
        let added = context
            .segments
            .add(segment.start_depth, segment.end_depth, segment.gas, segment.duration);
        context.current_gas = segment.gas;
        swim(context, &added)?;
    }
    Ok(())
}
