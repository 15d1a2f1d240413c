//! Getting Started Example - Your First Pipeline
//!
//! Builds a two-stage pipeline that parses integers out of strings and
//! keeps the even squares, showing gated intake, batching, and draining.
//!
//! Run with: cargo run --example getting_started

use piper::prelude::*;

fn main() -> PiperResult<()> {
    // Install a tracing subscriber so the pipeline's log output is
    // visible on stderr.
    tracing_subscriber::fmt::init();

    // Step 1: Declare the segment tree. `parse` drops anything that is
    // not an integer; `square` only accepts evens, odds bypass it.
    let parse = SegmentDescriptor::process(
        "parse",
        |ctx: &mut SegmentContext<'_, String>, batch: Vec<String>| {
            for raw in batch {
                match raw.trim().parse::<i64>() {
                    Ok(_) => ctx.emit([raw]),
                    Err(_) => ctx.warn_items("dropping unparseable input", &[raw]),
                }
            }
            Ok(())
        },
    );

    let square = SegmentDescriptor::process(
        "square",
        |ctx: &mut SegmentContext<'_, String>, batch: Vec<String>| {
            for raw in batch {
                if let Ok(n) = raw.trim().parse::<i64>() {
                    ctx.emit([(n * n).to_string()]);
                }
            }
            Ok(())
        },
    )
    .with_allow(|raw: &String| {
        raw.trim()
            .parse::<i64>()
            .map(|n| n % 2 == 0)
            .unwrap_or(false)
    })
    .with_batch_size(2);

    let pipeline_desc = SegmentDescriptor::container("main", vec![parse, square]);

    // Step 2: Instantiate and feed input.
    let mut pipeline = Pipeline::init(pipeline_desc, ())?;
    pipeline.enqueue(
        ["1", "2", "oops", "3", "4"]
            .into_iter()
            .map(str::to_owned),
    );

    // Step 3: Drive the pipeline and drain the results.
    pipeline.flush()?;
    println!("ready: {}", pipeline.ready());
    for item in pipeline.dequeue(10)? {
        println!("-> {item}");
    }

    Ok(())
}
