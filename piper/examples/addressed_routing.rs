//! Addressed Routing Example - Sorting Items Between Sub-Pipelines
//!
//! A classifier segment routes work sideways by address: small numbers go
//! to the `small` sub-pipeline, large ones to `large`, and anything the
//! classifier dislikes is ejected straight past both. The small bucket
//! hands its output past the large bucket with `inject_after`.
//!
//! Run with: cargo run --example addressed_routing

use piper::prelude::*;

fn main() -> PiperResult<()> {
    // Install a tracing subscriber so the bucket tags logged below are
    // visible on stderr.
    tracing_subscriber::fmt::init();

    let classify =
        SegmentDescriptor::process("classify", |ctx: &mut SegmentContext<'_, u32>, batch| {
            for n in batch {
                if n == 0 {
                    ctx.eject([n]); // skip both sub-pipelines
                } else if n < 100 {
                    ctx.inject_at("small/tag", [n])?;
                } else {
                    ctx.inject_at("large/tag", [n])?;
                }
            }
            Ok(())
        });

    let small_tag =
        SegmentDescriptor::process("tag", |ctx: &mut SegmentContext<'_, u32>, batch| {
            ctx.info_items("small bucket", &batch);
            // Route around the `large` sub-pipeline instead of draining
            // into it.
            ctx.inject_after("large", batch)?;
            Ok(())
        });

    let large_tag =
        SegmentDescriptor::process("tag", |ctx: &mut SegmentContext<'_, u32>, batch| {
            ctx.info_items("large bucket", &batch);
            ctx.emit(batch);
            Ok(())
        });

    let desc = SegmentDescriptor::container(
        "main",
        vec![
            classify,
            SegmentDescriptor::container("small", vec![small_tag]),
            SegmentDescriptor::container("large", vec![large_tag]),
        ],
    );

    let mut pipeline = Pipeline::init(desc, ())?;
    // INFO is gated on the resolved verbosity; raise it at the root so
    // every segment inherits it and the bucket tags reach the log.
    pipeline.set_verbose(pipeline.root(), Some(1));
    pipeline.enqueue([0, 7, 250, 42, 1000]);
    pipeline.flush()?;

    let drained = pipeline.dequeue(5)?;
    println!("drained in completion order: {drained:?}");
    Ok(())
}
